//! Structured reading of a quiz question's `additionalContext` annotation.
//!
//! Authors may write labeled sections such as `Headline:` or
//! `Acceptance checks:` in free text. [`parse_explanation`] pulls those
//! sections out; when no label is present it returns `None` and the caller
//! shows the annotation verbatim.
//!
//! Parsing is lenient: it never fails, and malformed text maps to best-effort
//! substrings.

use serde::Serialize;

/// Labeled sections recognized in an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Headline,
    WhyCorrect,
    WhyOthersWrong,
    CursorLeverage,
    AcceptanceChecks,
}

/// Longest label first so that a longer label wins at the same position.
const LABELS: [(Section, &str); 5] = [
    (Section::WhyOthersWrong, "Why others are wrong"),
    (Section::AcceptanceChecks, "Acceptance checks"),
    (Section::CursorLeverage, "Cursor leverage"),
    (Section::WhyCorrect, "Why correct"),
    (Section::Headline, "Headline"),
];

impl Section {
    /// Canonical label text, without the colon.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Section::Headline => "Headline",
            Section::WhyCorrect => "Why correct",
            Section::WhyOthersWrong => "Why others are wrong",
            Section::CursorLeverage => "Cursor leverage",
            Section::AcceptanceChecks => "Acceptance checks",
        }
    }

    /// Whether the section's value is split into bullet items.
    #[must_use]
    pub fn is_list(self) -> bool {
        matches!(
            self,
            Section::WhyOthersWrong | Section::CursorLeverage | Section::AcceptanceChecks
        )
    }
}

/// Sections extracted from an annotation, plus the original text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedExplanation {
    pub headline: Option<String>,
    pub why_correct: Option<String>,
    pub why_wrong: Vec<String>,
    pub leverage: Vec<String>,
    pub acceptance_checks: Vec<String>,
    pub raw: String,
}

impl ParsedExplanation {
    /// Render the sections back into labeled annotation text, one per line.
    #[must_use]
    pub fn to_annotation(&self) -> String {
        let mut lines = Vec::new();
        if let Some(headline) = &self.headline {
            lines.push(format!("{}: {headline}", Section::Headline.label()));
        }
        if let Some(why) = &self.why_correct {
            lines.push(format!("{}: {why}", Section::WhyCorrect.label()));
        }
        for (section, items) in [
            (Section::WhyOthersWrong, &self.why_wrong),
            (Section::CursorLeverage, &self.leverage),
            (Section::AcceptanceChecks, &self.acceptance_checks),
        ] {
            if !items.is_empty() {
                lines.push(format!("{}: {}", section.label(), items.join("; ")));
            }
        }
        lines.join("\n")
    }
}

/// A label occurrence: which section, where the label starts, where its value starts.
#[derive(Debug, Clone, Copy)]
struct LabelHit {
    section: Section,
    start: usize,
    value_start: usize,
}

/// Parse a free-form annotation into labeled sections.
///
/// Returns `None` for absent or blank input and for text without any
/// recognized `<Label>:` marker.
#[must_use]
pub fn parse_explanation(text: Option<&str>) -> Option<ParsedExplanation> {
    let text = text?;
    if text.trim().is_empty() {
        return None;
    }

    let hits = scan_labels(text);
    if hits.is_empty() {
        return None;
    }

    let mut parsed = ParsedExplanation {
        raw: text.to_owned(),
        ..ParsedExplanation::default()
    };
    let mut filled = Vec::with_capacity(hits.len());

    for (idx, hit) in hits.iter().enumerate() {
        // First occurrence of a label wins.
        if filled.contains(&hit.section) {
            continue;
        }
        filled.push(hit.section);

        let end = hits.get(idx + 1).map_or(text.len(), |next| next.start);
        let value = &text[hit.value_start..end];
        match hit.section {
            Section::Headline => parsed.headline = scalar(value),
            Section::WhyCorrect => parsed.why_correct = scalar(value),
            Section::WhyOthersWrong => parsed.why_wrong = split_items(value),
            Section::CursorLeverage => parsed.leverage = split_items(value),
            Section::AcceptanceChecks => parsed.acceptance_checks = split_items(value),
        }
    }

    Some(parsed)
}

/// Find every label occurrence in document order.
///
/// Scanning resumes after each matched label, so a label's own text is never
/// matched twice.
fn scan_labels(text: &str) -> Vec<LabelHit> {
    let bytes = text.as_bytes();
    let mut hits = Vec::new();
    let mut skip_until = 0;

    for (pos, _) in text.char_indices() {
        if pos < skip_until {
            continue;
        }
        if let Some((section, len)) = label_at(bytes, pos) {
            let value_start = pos + len + 1;
            hits.push(LabelHit {
                section,
                start: pos,
                value_start,
            });
            skip_until = value_start;
        }
    }
    hits
}

/// Match a label, case-insensitively, immediately followed by `:`.
fn label_at(bytes: &[u8], pos: usize) -> Option<(Section, usize)> {
    LABELS.iter().find_map(|(section, label)| {
        let len = label.len();
        let candidate = bytes.get(pos..pos + len)?;
        let matches = candidate.eq_ignore_ascii_case(label.as_bytes())
            && bytes.get(pos + len) == Some(&b':');
        matches.then_some((*section, len))
    })
}

fn scalar(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn is_item_delimiter(ch: char) -> bool {
    matches!(ch, ';' | '\n' | '\r' | '•')
}

fn is_bullet_marker(ch: char) -> bool {
    matches!(ch, '-' | '–' | '•') || ch.is_whitespace()
}

/// Split a list-valued section into trimmed, non-empty items.
fn split_items(value: &str) -> Vec<String> {
    value
        .split(is_item_delimiter)
        .map(|item| item.trim_start_matches(is_bullet_marker).trim_end())
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}
