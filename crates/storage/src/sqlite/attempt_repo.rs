use guide_core::model::ArticleId;
use sqlx::Row;

use super::{
    SqliteRepository,
    mapping::{article_id_from_str, i64_from_u64, map_attempt_row, score_from_i64, ser},
};
use crate::repository::{AttemptRecord, ProgressRepository, ProgressSnapshot, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn append_attempt(&self, attempt: AttemptRecord) -> Result<i64, StorageError> {
        let earned = i64_from_u64("points_earned", attempt.points_earned)?;
        let possible = i64_from_u64("points_possible", attempt.points_possible)?;
        let res = sqlx::query(
            r"
                INSERT INTO quiz_attempts (article_id, points_earned, points_possible, submitted_at)
                VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(attempt.article_id.as_str())
        .bind(earned)
        .bind(possible)
        .bind(attempt.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn attempts_for_article(
        &self,
        article: &ArticleId,
    ) -> Result<Vec<AttemptRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, article_id, points_earned, points_possible, submitted_at
                FROM quiz_attempts
                WHERE article_id = ?1
                ORDER BY submitted_at ASC, id ASC
            ",
        )
        .bind(article.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_attempt_row(&row)?);
        }
        Ok(out)
    }

    async fn best_scores(&self) -> Result<ProgressSnapshot, StorageError> {
        // Integer division floors for non-negative operands.
        let rows = sqlx::query(
            r"
                SELECT
                    article_id,
                    MAX(CASE WHEN points_possible = 0 THEN 0
                             ELSE (points_earned * 100) / points_possible END) AS best
                FROM quiz_attempts
                GROUP BY article_id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut snapshot = ProgressSnapshot::default();
        for row in rows {
            let article: String = row.try_get("article_id").map_err(ser)?;
            let best: i64 = row.try_get("best").map_err(ser)?;
            snapshot.record_best(article_id_from_str(&article)?, score_from_i64(best)?);
        }
        Ok(snapshot)
    }

    async fn clear_article(&self, article: &ArticleId) -> Result<u64, StorageError> {
        let res = sqlx::query("DELETE FROM quiz_attempts WHERE article_id = ?1")
            .bind(article.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(res.rows_affected())
    }
}
