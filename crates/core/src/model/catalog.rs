use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ArticleId, CategoryId, TopicId};
use crate::model::quiz::{Quiz, QuizError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("category {0} is defined more than once")]
    DuplicateCategory(CategoryId),

    #[error("topic {0} is defined more than once")]
    DuplicateTopic(TopicId),

    #[error("article {0} is defined more than once")]
    DuplicateArticle(ArticleId),

    #[error("{kind} {id} has an empty name")]
    EmptyName { kind: &'static str, id: String },

    #[error("topic {0} does not exist")]
    UnknownTopic(TopicId),

    #[error("article {article} has an invalid quiz: {source}")]
    InvalidQuiz {
        article: ArticleId,
        #[source]
        source: QuizError,
    },
}

//
// ─── STATUSES ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LearningStatus {
    #[default]
    NotStarted,
    InProgress,
    Learned,
}

impl LearningStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LearningStatus::NotStarted => "not-started",
            LearningStatus::InProgress => "in-progress",
            LearningStatus::Learned => "learned",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriorityStatus {
    Low,
    #[default]
    Medium,
    High,
}

impl PriorityStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PriorityStatus::Low => "low",
            PriorityStatus::Medium => "medium",
            PriorityStatus::High => "high",
        }
    }
}

//
// ─── CONTENT TREE ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: ArticleId,
    pub name: String,
    #[serde(default)]
    pub learning_status: LearningStatus,
    #[serde(default)]
    pub priority_status: PriorityStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Quiz>,
}

impl Article {
    /// A fresh, quiz-less article as produced by scaffolding.
    #[must_use]
    pub fn stub(id: ArticleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            learning_status: LearningStatus::default(),
            priority_status: PriorityStatus::default(),
            quiz: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
    #[serde(default)]
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

impl Category {
    /// Every article of every topic, in document order.
    pub fn articles(&self) -> impl Iterator<Item = &Article> {
        self.topics.iter().flat_map(|t| t.articles.iter())
    }
}

/// Root of the content tree: categories contain topics, topics contain articles.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Catalog {
    #[must_use]
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Check id uniqueness, names, and embedded quizzes.
    ///
    /// # Errors
    ///
    /// Returns the first structural `CatalogError`, or else the first
    /// invalid quiz, in document order.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if let Some(err) = self.structure_errors().into_iter().next() {
            return Err(err);
        }
        for article in self.articles() {
            if let Some(quiz) = &article.quiz {
                quiz.validate().map_err(|source| CatalogError::InvalidQuiz {
                    article: article.id.clone(),
                    source,
                })?;
            }
        }
        Ok(())
    }

    /// Every duplicate id and blank name, in document order. Quizzes are
    /// not inspected.
    #[must_use]
    pub fn structure_errors(&self) -> Vec<CatalogError> {
        let mut errors = Vec::new();
        let mut categories = HashSet::new();
        let mut topics = HashSet::new();
        let mut articles = HashSet::new();

        for category in &self.categories {
            if !categories.insert(&category.id) {
                errors.push(CatalogError::DuplicateCategory(category.id.clone()));
            }
            errors.extend(require_name("category", category.id.as_str(), &category.name).err());
            for topic in &category.topics {
                if !topics.insert(&topic.id) {
                    errors.push(CatalogError::DuplicateTopic(topic.id.clone()));
                }
                errors.extend(require_name("topic", topic.id.as_str(), &topic.name).err());
                for article in &topic.articles {
                    if !articles.insert(&article.id) {
                        errors.push(CatalogError::DuplicateArticle(article.id.clone()));
                    }
                    errors.extend(require_name("article", article.id.as_str(), &article.name).err());
                }
            }
        }
        errors
    }

    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    #[must_use]
    pub fn topic(&self, id: &TopicId) -> Option<&Topic> {
        self.categories
            .iter()
            .flat_map(|c| c.topics.iter())
            .find(|t| &t.id == id)
    }

    fn topic_mut(&mut self, id: &TopicId) -> Option<&mut Topic> {
        self.categories
            .iter_mut()
            .flat_map(|c| c.topics.iter_mut())
            .find(|t| &t.id == id)
    }

    #[must_use]
    pub fn article(&self, id: &ArticleId) -> Option<&Article> {
        self.articles().find(|a| &a.id == id)
    }

    /// The topic that contains the given article.
    #[must_use]
    pub fn topic_of(&self, id: &ArticleId) -> Option<&Topic> {
        self.categories
            .iter()
            .flat_map(|c| c.topics.iter())
            .find(|t| t.articles.iter().any(|a| &a.id == id))
    }

    /// Every article in the catalog, in document order.
    pub fn articles(&self) -> impl Iterator<Item = &Article> {
        self.categories.iter().flat_map(Category::articles)
    }

    /// Append an article to an existing topic.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownTopic` if the topic is missing,
    /// `CatalogError::DuplicateArticle` if the id is already used anywhere,
    /// or `CatalogError::EmptyName` for a blank display name.
    pub fn insert_article(&mut self, topic_id: &TopicId, article: Article) -> Result<(), CatalogError> {
        require_name("article", article.id.as_str(), &article.name)?;
        if self.article(&article.id).is_some() {
            return Err(CatalogError::DuplicateArticle(article.id));
        }
        let topic = self
            .topic_mut(topic_id)
            .ok_or_else(|| CatalogError::UnknownTopic(topic_id.clone()))?;
        topic.articles.push(article);
        Ok(())
    }
}

fn require_name(kind: &'static str, id: &str, name: &str) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::EmptyName {
            kind,
            id: id.to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::QuestionId;
    use crate::model::quiz::{QuestionKind, QuizQuestion};

    fn article(id: &str) -> Article {
        Article::stub(ArticleId::new(id).unwrap(), format!("Article {id}"))
    }

    fn sample() -> Catalog {
        Catalog::new(vec![Category {
            id: CategoryId::new("backend").unwrap(),
            name: "Backend".into(),
            topics: vec![
                Topic {
                    id: TopicId::new("reliability").unwrap(),
                    name: "Reliability".into(),
                    articles: vec![article("retries"), article("idempotency")],
                },
                Topic {
                    id: TopicId::new("testing").unwrap(),
                    name: "Testing".into(),
                    articles: vec![article("contract-tests")],
                },
            ],
        }])
    }

    #[test]
    fn lookups_walk_the_tree() {
        let catalog = sample();
        catalog.validate().unwrap();

        let id = ArticleId::new("contract-tests").unwrap();
        assert_eq!(catalog.article(&id).unwrap().name, "Article contract-tests");
        assert_eq!(catalog.topic_of(&id).unwrap().id.as_str(), "testing");
        let ids: Vec<_> = catalog.articles().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["retries", "idempotency", "contract-tests"]);
    }

    #[test]
    fn validate_detects_duplicate_articles_across_topics() {
        let mut catalog = sample();
        catalog.categories[0].topics[1].articles.push(article("retries"));
        assert_eq!(
            catalog.validate(),
            Err(CatalogError::DuplicateArticle(ArticleId::new("retries").unwrap()))
        );
    }

    #[test]
    fn validate_detects_blank_names() {
        let mut catalog = sample();
        catalog.categories[0].topics[0].name = "  ".into();
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::EmptyName { kind: "topic", .. })
        ));
    }

    #[test]
    fn structure_errors_collects_every_problem_past_a_bad_quiz() {
        let mut catalog = sample();
        catalog.categories[0].topics[0].articles[0].quiz = Some(Quiz {
            total_points: None,
            questions: vec![QuizQuestion {
                id: QuestionId::new("q1").unwrap(),
                kind: QuestionKind::MultipleChoice,
                points: 25,
                question: "Which?".into(),
                options: Vec::new(),
                correct_answer: None,
                additional_context: None,
                key_concepts: Vec::new(),
            }],
        });
        catalog.categories[0].topics[1].id = TopicId::new("reliability").unwrap();
        catalog.categories[0].topics[1].articles[0].name = String::new();

        assert_eq!(
            catalog.structure_errors(),
            vec![
                CatalogError::DuplicateTopic(TopicId::new("reliability").unwrap()),
                CatalogError::EmptyName {
                    kind: "article",
                    id: "contract-tests".into()
                },
            ]
        );
        assert_eq!(
            catalog.validate(),
            Err(CatalogError::DuplicateTopic(TopicId::new("reliability").unwrap()))
        );
    }

    #[test]
    fn insert_article_appends_to_topic() {
        let mut catalog = sample();
        let topic = TopicId::new("testing").unwrap();
        catalog.insert_article(&topic, article("fuzzing")).unwrap();
        let names: Vec<_> = catalog
            .topic(&topic)
            .unwrap()
            .articles
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(names, vec!["contract-tests", "fuzzing"]);
    }

    #[test]
    fn insert_article_rejects_unknown_topic_and_duplicates() {
        let mut catalog = sample();
        let missing = TopicId::new("nope").unwrap();
        assert_eq!(
            catalog.insert_article(&missing, article("fuzzing")),
            Err(CatalogError::UnknownTopic(missing))
        );
        let topic = TopicId::new("testing").unwrap();
        assert!(matches!(
            catalog.insert_article(&topic, article("retries")),
            Err(CatalogError::DuplicateArticle(_))
        ));
    }

    #[test]
    fn statuses_default_when_missing_from_json() {
        let raw = r#"{
            "categories": [{
                "id": "backend",
                "name": "Backend",
                "topics": [{
                    "id": "reliability",
                    "name": "Reliability",
                    "articles": [
                        { "id": "retries", "name": "Retries" },
                        { "id": "idempotency", "name": "Idempotency",
                          "learningStatus": "learned", "priorityStatus": "high" }
                    ]
                }]
            }]
        }"#;
        let catalog: Catalog = serde_json::from_str(raw).unwrap();
        let articles: Vec<_> = catalog.articles().collect();
        assert_eq!(articles[0].learning_status, LearningStatus::NotStarted);
        assert_eq!(articles[0].priority_status, PriorityStatus::Medium);
        assert_eq!(articles[1].learning_status, LearningStatus::Learned);
        assert_eq!(articles[1].priority_status, PriorityStatus::High);
    }
}
