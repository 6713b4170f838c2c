use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guide_core::ScoreSource;
use guide_core::model::ArticleId;
use guide_core::model::quiz::percent_floor;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// One graded quiz attempt for an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub id: Option<i64>,
    pub article_id: ArticleId,
    pub points_earned: u64,
    pub points_possible: u64,
    pub submitted_at: DateTime<Utc>,
}

impl AttemptRecord {
    #[must_use]
    pub fn new(
        article_id: ArticleId,
        points_earned: u64,
        points_possible: u64,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            article_id,
            points_earned,
            points_possible,
            submitted_at,
        }
    }

    /// Floor percentage of points earned.
    #[must_use]
    pub fn percent(&self) -> u8 {
        percent_floor(self.points_earned, self.points_possible)
    }
}

/// Best recorded score per article, frozen at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    scores: HashMap<ArticleId, u8>,
}

impl ProgressSnapshot {
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Keep the higher of the existing and the given score.
    pub fn record_best(&mut self, article: ArticleId, score: u8) {
        let entry = self.scores.entry(article).or_insert(0);
        *entry = (*entry).max(score.min(100));
    }
}

impl FromIterator<(ArticleId, u8)> for ProgressSnapshot {
    fn from_iter<T: IntoIterator<Item = (ArticleId, u8)>>(iter: T) -> Self {
        let mut snapshot = Self::default();
        for (article, score) in iter {
            snapshot.record_best(article, score);
        }
        snapshot
    }
}

impl ScoreSource for ProgressSnapshot {
    fn score(&self, article: &ArticleId) -> Option<u8> {
        self.scores.get(article).copied()
    }
}

/// Tracking store for quiz attempts.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Append a graded attempt and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn append_attempt(&self, attempt: AttemptRecord) -> Result<i64, StorageError>;

    /// Attempts for one article, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn attempts_for_article(
        &self,
        article: &ArticleId,
    ) -> Result<Vec<AttemptRecord>, StorageError>;

    /// Best attempt percentage for every article that has attempts.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn best_scores(&self) -> Result<ProgressSnapshot, StorageError>;

    /// Drop every attempt for an article and return how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn clear_article(&self, article: &ArticleId) -> Result<u64, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<InMemoryState>>,
}

/// Ids keep increasing across deletes, like `SQLite` rowids.
#[derive(Default)]
struct InMemoryState {
    last_id: i64,
    attempts: Vec<AttemptRecord>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn append_attempt(&self, mut attempt: AttemptRecord) -> Result<i64, StorageError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = guard
            .last_id
            .checked_add(1)
            .ok_or_else(|| StorageError::Serialization("attempt id overflow".into()))?;
        guard.last_id = id;
        attempt.id = Some(id);
        guard.attempts.push(attempt);
        Ok(id)
    }

    async fn attempts_for_article(
        &self,
        article: &ArticleId,
    ) -> Result<Vec<AttemptRecord>, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut found: Vec<_> = guard
            .attempts
            .iter()
            .filter(|a| &a.article_id == article)
            .cloned()
            .collect();
        found.sort_by_key(|a| (a.submitted_at, a.id));
        Ok(found)
    }

    async fn best_scores(&self) -> Result<ProgressSnapshot, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .attempts
            .iter()
            .map(|a| (a.article_id.clone(), a.percent()))
            .collect())
    }

    async fn clear_article(&self, article: &ArticleId) -> Result<u64, StorageError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let before = guard.attempts.len();
        guard.attempts.retain(|a| &a.article_id != article);
        Ok((before - guard.attempts.len()) as u64)
    }
}

/// Repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub attempts: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let attempts: Arc<dyn ProgressRepository> = Arc::new(InMemoryRepository::new());
        Self { attempts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guide_core::time::fixed_now;

    fn article(id: &str) -> ArticleId {
        ArticleId::new(id).unwrap()
    }

    #[tokio::test]
    async fn best_scores_keep_the_highest_attempt() {
        let repo = InMemoryRepository::new();
        let now = fixed_now();
        repo.append_attempt(AttemptRecord::new(article("retries"), 10, 25, now))
            .await
            .unwrap();
        repo.append_attempt(AttemptRecord::new(article("retries"), 20, 25, now))
            .await
            .unwrap();
        repo.append_attempt(AttemptRecord::new(article("retries"), 5, 25, now))
            .await
            .unwrap();

        let snapshot = repo.best_scores().await.unwrap();
        assert_eq!(snapshot.score(&article("retries")), Some(80));
        assert_eq!(snapshot.score(&article("other")), None);
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn attempts_are_listed_oldest_first() {
        let repo = InMemoryRepository::new();
        let now = fixed_now();
        repo.append_attempt(AttemptRecord::new(
            article("retries"),
            1,
            2,
            now + chrono::Duration::minutes(5),
        ))
        .await
        .unwrap();
        repo.append_attempt(AttemptRecord::new(article("retries"), 2, 2, now))
            .await
            .unwrap();

        let attempts = repo.attempts_for_article(&article("retries")).await.unwrap();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].submitted_at, now);
        assert_eq!(attempts[0].id, Some(2));
    }

    #[tokio::test]
    async fn clear_article_removes_only_that_article() {
        let repo = InMemoryRepository::new();
        let now = fixed_now();
        repo.append_attempt(AttemptRecord::new(article("a"), 1, 1, now))
            .await
            .unwrap();
        repo.append_attempt(AttemptRecord::new(article("b"), 1, 1, now))
            .await
            .unwrap();

        assert_eq!(repo.clear_article(&article("a")).await.unwrap(), 1);
        let snapshot = repo.best_scores().await.unwrap();
        assert_eq!(snapshot.score(&article("a")), None);
        assert_eq!(snapshot.score(&article("b")), Some(100));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_clearing() {
        let repo = InMemoryRepository::new();
        let now = fixed_now();
        let a = repo
            .append_attempt(AttemptRecord::new(article("a"), 1, 1, now))
            .await
            .unwrap();
        let b = repo
            .append_attempt(AttemptRecord::new(article("b"), 1, 1, now))
            .await
            .unwrap();
        repo.clear_article(&article("a")).await.unwrap();
        let c = repo
            .append_attempt(AttemptRecord::new(article("c"), 1, 1, now))
            .await
            .unwrap();

        assert_eq!((a, b, c), (1, 2, 3));
        let surviving = repo.attempts_for_article(&article("b")).await.unwrap();
        assert_eq!(surviving[0].id, Some(2));
    }

    #[test]
    fn zero_point_attempts_score_zero() {
        let attempt = AttemptRecord::new(article("a"), 0, 0, fixed_now());
        assert_eq!(attempt.percent(), 0);
    }
}
