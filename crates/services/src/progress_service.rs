use std::sync::Arc;

use guide_core::model::{
    ArticleId, Catalog, CategoryId, GradedQuiz, LearningStatus, SubmittedAnswer, TopicId,
};
use guide_core::{Clock, Proficiency, proficiency};
use serde::Serialize;
use storage::repository::{AttemptRecord, ProgressRepository, ProgressSnapshot};

use crate::error::ProgressServiceError;

/// Result of grading and recording one quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSubmission {
    pub attempt_id: i64,
    pub graded: GradedQuiz,
    /// Article proficiency after this attempt was recorded.
    pub proficiency: Proficiency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleReport {
    pub id: ArticleId,
    pub name: String,
    pub learning_status: LearningStatus,
    pub proficiency: Proficiency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicReport {
    pub id: TopicId,
    pub name: String,
    pub proficiency: Proficiency,
    pub articles: Vec<ArticleReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReport {
    pub id: CategoryId,
    pub name: String,
    pub proficiency: Proficiency,
    pub topics: Vec<TopicReport>,
}

/// Proficiency for the whole catalog, computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProficiencyReport {
    pub categories: Vec<CategoryReport>,
}

impl ProficiencyReport {
    /// Build the report for every category of the catalog.
    #[must_use]
    pub fn build(catalog: &Catalog, snapshot: &ProgressSnapshot) -> Self {
        let categories = catalog
            .categories
            .iter()
            .map(|category| CategoryReport {
                id: category.id.clone(),
                name: category.name.clone(),
                proficiency: proficiency::category_proficiency(catalog, snapshot, &category.id),
                topics: category
                    .topics
                    .iter()
                    .map(|topic| TopicReport {
                        id: topic.id.clone(),
                        name: topic.name.clone(),
                        proficiency: proficiency::topic_proficiency(catalog, snapshot, &topic.id),
                        articles: topic
                            .articles
                            .iter()
                            .map(|article| ArticleReport {
                                id: article.id.clone(),
                                name: article.name.clone(),
                                learning_status: article.learning_status,
                                proficiency: proficiency::article_proficiency(
                                    snapshot,
                                    &article.id,
                                ),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        Self { categories }
    }
}

/// Grades quiz attempts and rolls recorded scores up the content tree.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    catalog: Arc<Catalog>,
    attempts: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<Catalog>, attempts: Arc<dyn ProgressRepository>) -> Self {
        Self {
            clock,
            catalog,
            attempts,
        }
    }

    /// Grade answers for an article's quiz and record the attempt.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::UnknownArticle` or `NoQuiz` when there is
    /// nothing to grade, `Quiz` for invalid answers, and `Storage` if the
    /// attempt cannot be persisted.
    pub async fn submit_quiz(
        &self,
        article_id: &ArticleId,
        answers: &[SubmittedAnswer],
    ) -> Result<QuizSubmission, ProgressServiceError> {
        let article = self
            .catalog
            .article(article_id)
            .ok_or_else(|| ProgressServiceError::UnknownArticle(article_id.clone()))?;
        let quiz = article
            .quiz
            .as_ref()
            .ok_or_else(|| ProgressServiceError::NoQuiz(article_id.clone()))?;

        let graded = quiz.grade(answers)?;
        let record = AttemptRecord::new(
            article_id.clone(),
            graded.earned(),
            graded.possible(),
            self.clock.now(),
        );
        let attempt_id = self.attempts.append_attempt(record).await?;
        tracing::info!(
            article = %article_id,
            attempt_id,
            earned = graded.earned(),
            possible = graded.possible(),
            "recorded quiz attempt"
        );

        let proficiency = self.article_proficiency(article_id).await?;
        Ok(QuizSubmission {
            attempt_id,
            graded,
            proficiency,
        })
    }

    /// Load the current best score of every article.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn snapshot(&self) -> Result<ProgressSnapshot, ProgressServiceError> {
        let snapshot = self.attempts.best_scores().await?;
        tracing::debug!(scored_articles = snapshot.len(), "loaded progress snapshot");
        Ok(snapshot)
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn article_proficiency(
        &self,
        article: &ArticleId,
    ) -> Result<Proficiency, ProgressServiceError> {
        let snapshot = self.snapshot().await?;
        Ok(proficiency::article_proficiency(&snapshot, article))
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn topic_proficiency(
        &self,
        topic: &TopicId,
    ) -> Result<Proficiency, ProgressServiceError> {
        let snapshot = self.snapshot().await?;
        Ok(proficiency::topic_proficiency(&self.catalog, &snapshot, topic))
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn category_proficiency(
        &self,
        category: &CategoryId,
    ) -> Result<Proficiency, ProgressServiceError> {
        let snapshot = self.snapshot().await?;
        Ok(proficiency::category_proficiency(
            &self.catalog,
            &snapshot,
            category,
        ))
    }

    /// Full catalog report from a single snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn report(&self) -> Result<ProficiencyReport, ProgressServiceError> {
        let snapshot = self.snapshot().await?;
        Ok(ProficiencyReport::build(&self.catalog, &snapshot))
    }

    /// Forget every recorded attempt for an article.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::UnknownArticle` if the article is not in
    /// the catalog, or `Storage` on repository failures.
    pub async fn reset_article(&self, article: &ArticleId) -> Result<u64, ProgressServiceError> {
        if self.catalog.article(article).is_none() {
            return Err(ProgressServiceError::UnknownArticle(article.clone()));
        }
        let removed = self.attempts.clear_article(article).await?;
        tracing::info!(article = %article, removed, "reset article progress");
        Ok(removed)
    }
}
