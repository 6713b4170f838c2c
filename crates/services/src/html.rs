//! Small helpers for article stub bodies.

/// Escape text for use inside HTML text content or quoted attributes.
#[must_use]
pub fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// A raw quote character found in text content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteHit {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
    pub quote: char,
}

/// Find `"` and `'` characters in text content, outside of tags.
///
/// Quotes inside `<...>` belong to attributes and are fine. This is a
/// heuristic: comments and `<script>` bodies are not special-cased.
#[must_use]
pub fn find_unescaped_quotes(body: &str) -> Vec<QuoteHit> {
    let mut hits = Vec::new();
    let mut in_tag = false;
    for (line_idx, line) in body.lines().enumerate() {
        for (col_idx, ch) in line.chars().enumerate() {
            match ch {
                '<' => in_tag = true,
                '>' => in_tag = false,
                '"' | '\'' if !in_tag => hits.push(QuoteHit {
                    line: line_idx + 1,
                    column: col_idx + 1,
                    quote: ch,
                }),
                _ => {}
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_and_quotes() {
        assert_eq!(
            escape_text(r#"Don't <b>"quote"</b> & go"#),
            "Don&apos;t &lt;b&gt;&quot;quote&quot;&lt;/b&gt; &amp; go"
        );
    }

    #[test]
    fn quotes_in_attributes_are_ignored() {
        let body = "<a href=\"/x\" title='y'>link</a>\n";
        assert!(find_unescaped_quotes(body).is_empty());
    }

    #[test]
    fn quotes_in_text_are_reported_with_position() {
        let body = "<p>fine</p>\n<p>don't \"do\" this</p>";
        let hits = find_unescaped_quotes(body);
        assert_eq!(hits.len(), 3);
        assert_eq!(
            hits[0],
            QuoteHit {
                line: 2,
                column: 7,
                quote: '\''
            }
        );
        assert_eq!(hits[1].quote, '"');
        assert_eq!(hits[1].column, 10);
    }

    #[test]
    fn tags_spanning_lines_keep_state() {
        let body = "<img\n  alt=\"pic\"\n/> it's";
        let hits = find_unescaped_quotes(body);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].line, 3);
    }

    #[test]
    fn escaped_text_has_no_hits() {
        let body = format!("<h1>{}</h1>", escape_text("It's \"fine\""));
        assert!(find_unescaped_quotes(&body).is_empty());
    }
}
