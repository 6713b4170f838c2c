//! Proficiency roll-up from articles to topics and categories.
//!
//! Scores come from a [`ScoreSource`]; everything here is recomputed on each
//! call and never fails. Missing data counts as 0.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::model::{ArticleId, Catalog, CategoryId, TopicId};

/// A 0–100 mastery score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct Proficiency(u8);

impl Proficiency {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(100);

    /// Builds a score, clamping anything above 100.
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Floor of the arithmetic mean; `ZERO` for an empty set.
    #[must_use]
    pub fn mean<I>(scores: I) -> Self
    where
        I: IntoIterator<Item = Proficiency>,
    {
        let (sum, count) = scores
            .into_iter()
            .fold((0_u64, 0_u64), |(sum, count), p| (sum + u64::from(p.0), count + 1));
        if count == 0 {
            return Self::ZERO;
        }
        Self::new(u8::try_from(sum / count).unwrap_or(100))
    }
}

impl fmt::Display for Proficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Per-article score lookup, backed by whatever tracks quiz results.
pub trait ScoreSource {
    /// The recorded score for an article, if any.
    fn score(&self, article: &ArticleId) -> Option<u8>;
}

impl ScoreSource for HashMap<ArticleId, u8> {
    fn score(&self, article: &ArticleId) -> Option<u8> {
        self.get(article).copied()
    }
}

impl<S: ScoreSource + ?Sized> ScoreSource for &S {
    fn score(&self, article: &ArticleId) -> Option<u8> {
        (**self).score(article)
    }
}

/// Score of a single article; 0 when nothing is recorded.
#[must_use]
pub fn article_proficiency(source: &impl ScoreSource, article: &ArticleId) -> Proficiency {
    source.score(article).map_or(Proficiency::ZERO, Proficiency::new)
}

/// Floor of the mean over the topic's articles; 0 for an empty or unknown topic.
#[must_use]
pub fn topic_proficiency(
    catalog: &Catalog,
    source: &impl ScoreSource,
    topic: &TopicId,
) -> Proficiency {
    let Some(topic) = catalog.topic(topic) else {
        return Proficiency::ZERO;
    };
    Proficiency::mean(
        topic
            .articles
            .iter()
            .map(|a| article_proficiency(source, &a.id)),
    )
}

/// Floor of the mean over every article of every topic in the category.
///
/// Articles are pooled across topics, so larger topics weigh more. Returns 0
/// for a category with no articles or an unknown category.
#[must_use]
pub fn category_proficiency(
    catalog: &Catalog,
    source: &impl ScoreSource,
    category: &CategoryId,
) -> Proficiency {
    let Some(category) = catalog.category(category) else {
        return Proficiency::ZERO;
    };
    Proficiency::mean(category.articles().map(|a| article_proficiency(source, &a.id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Article, Category, Topic};

    fn topic(id: &str, articles: &[&str]) -> Topic {
        Topic {
            id: TopicId::new(id).unwrap(),
            name: id.to_uppercase(),
            articles: articles
                .iter()
                .map(|a| Article::stub(ArticleId::new(a).unwrap(), *a))
                .collect(),
        }
    }

    fn catalog(topics: Vec<Topic>) -> Catalog {
        Catalog::new(vec![Category {
            id: CategoryId::new("backend").unwrap(),
            name: "Backend".into(),
            topics,
        }])
    }

    fn scores(pairs: &[(&str, u8)]) -> HashMap<ArticleId, u8> {
        pairs
            .iter()
            .map(|(id, s)| (ArticleId::new(id).unwrap(), *s))
            .collect()
    }

    #[test]
    fn missing_article_scores_are_zero() {
        let source = scores(&[]);
        let id = ArticleId::new("retries").unwrap();
        assert_eq!(article_proficiency(&source, &id), Proficiency::ZERO);
    }

    #[test]
    fn article_scores_are_clamped() {
        let source = scores(&[("retries", 250)]);
        let id = ArticleId::new("retries").unwrap();
        assert_eq!(article_proficiency(&source, &id).value(), 100);
    }

    #[test]
    fn empty_topic_is_zero() {
        let catalog = catalog(vec![topic("empty", &[])]);
        let source = scores(&[]);
        let id = TopicId::new("empty").unwrap();
        assert_eq!(topic_proficiency(&catalog, &source, &id).value(), 0);
    }

    #[test]
    fn unknown_topic_and_category_are_zero() {
        let catalog = catalog(vec![topic("a", &["x"])]);
        let source = scores(&[("x", 90)]);
        assert_eq!(
            topic_proficiency(&catalog, &source, &TopicId::new("nope").unwrap()),
            Proficiency::ZERO
        );
        assert_eq!(
            category_proficiency(&catalog, &source, &CategoryId::new("nope").unwrap()),
            Proficiency::ZERO
        );
    }

    #[test]
    fn topic_mean_is_floored() {
        let catalog = catalog(vec![topic("t", &["a", "b", "c"])]);
        let source = scores(&[("a", 100), ("b", 100)]);
        let id = TopicId::new("t").unwrap();
        assert_eq!(topic_proficiency(&catalog, &source, &id).value(), 66);
    }

    #[test]
    fn category_mean_flattens_across_topics() {
        // Pooled: floor(200 / 3) = 66. Mean of topic means would give 50.
        let catalog = catalog(vec![topic("a", &["a1", "a2"]), topic("b", &["b1"])]);
        let source = scores(&[("a1", 100), ("a2", 100), ("b1", 0)]);
        let id = CategoryId::new("backend").unwrap();
        assert_eq!(category_proficiency(&catalog, &source, &id).value(), 66);
    }

    #[test]
    fn category_with_only_empty_topics_is_zero() {
        let catalog = catalog(vec![topic("a", &[]), topic("b", &[])]);
        let source = scores(&[]);
        let id = CategoryId::new("backend").unwrap();
        assert_eq!(category_proficiency(&catalog, &source, &id), Proficiency::ZERO);
    }

    #[test]
    fn category_with_equal_topic_sizes() {
        let catalog = catalog(vec![topic("a", &["a1", "a2"]), topic("b", &["b1"])]);
        let source = scores(&[("a1", 100), ("a2", 0), ("b1", 50)]);
        let id = CategoryId::new("backend").unwrap();
        assert_eq!(category_proficiency(&catalog, &source, &id).value(), 50);
    }

    #[test]
    fn display_renders_percent() {
        assert_eq!(Proficiency::new(42).to_string(), "42%");
    }
}
