use guide_core::model::{ArticleId, Catalog, QuestionId};
use guide_core::{ParsedExplanation, parse_explanation};

/// How a question's annotation should be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplanationView {
    /// Labeled sections were found.
    Structured(ParsedExplanation),
    /// No labels; show the annotation verbatim.
    Raw(String),
    /// Nothing to show.
    Empty,
}

impl ExplanationView {
    #[must_use]
    pub fn from_annotation(text: Option<&str>) -> Self {
        match text {
            None => Self::Empty,
            Some(raw) if raw.trim().is_empty() => Self::Empty,
            Some(raw) => parse_explanation(Some(raw))
                .map_or_else(|| Self::Raw(raw.to_owned()), Self::Structured),
        }
    }

    /// Plain-text rendering for terminals.
    #[must_use]
    pub fn render_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Raw(raw) => raw.clone(),
            Self::Structured(parsed) => {
                let mut out = Vec::new();
                if let Some(headline) = &parsed.headline {
                    out.push(headline.clone());
                }
                if let Some(why) = &parsed.why_correct {
                    out.push(format!("Why correct: {why}"));
                }
                push_list(&mut out, "Why others are wrong", &parsed.why_wrong);
                push_list(&mut out, "Cursor leverage", &parsed.leverage);
                push_list(&mut out, "Acceptance checks", &parsed.acceptance_checks);
                out.join("\n")
            }
        }
    }
}

fn push_list(out: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push(format!("{title}:"));
    out.extend(items.iter().map(|item| format!("  - {item}")));
}

/// Explanation views for every question of an article's quiz, in quiz order.
///
/// Returns `None` if the article does not exist; an article without a quiz
/// yields an empty list.
#[must_use]
pub fn explain_article(
    catalog: &Catalog,
    article: &ArticleId,
) -> Option<Vec<(QuestionId, ExplanationView)>> {
    let article = catalog.article(article)?;
    let views = article
        .quiz
        .iter()
        .flat_map(|quiz| quiz.questions.iter())
        .map(|q| {
            (
                q.id.clone(),
                ExplanationView::from_annotation(q.additional_context.as_deref()),
            )
        })
        .collect();
    Some(views)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlabeled_text_falls_back_to_raw() {
        let view = ExplanationView::from_annotation(Some("Retries need a dedup key."));
        assert_eq!(view, ExplanationView::Raw("Retries need a dedup key.".into()));
        assert_eq!(view.render_text(), "Retries need a dedup key.");
    }

    #[test]
    fn blank_or_missing_is_empty() {
        assert_eq!(ExplanationView::from_annotation(None), ExplanationView::Empty);
        assert_eq!(
            ExplanationView::from_annotation(Some("  ")),
            ExplanationView::Empty
        );
    }

    #[test]
    fn structured_render_lists_sections() {
        let view = ExplanationView::from_annotation(Some(
            "Headline: Dedup.\nWhy others are wrong: - a; - b",
        ));
        assert!(matches!(view, ExplanationView::Structured(_)));
        assert_eq!(
            view.render_text(),
            "Dedup.\nWhy others are wrong:\n  - a\n  - b"
        );
    }
}
