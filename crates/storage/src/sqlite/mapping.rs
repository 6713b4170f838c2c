use guide_core::model::ArticleId;
use sqlx::Row;

use crate::repository::{AttemptRecord, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn u64_from_i64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn i64_from_u64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} too large: {v}")))
}

pub(crate) fn article_id_from_str(raw: &str) -> Result<ArticleId, StorageError> {
    ArticleId::new(raw).map_err(ser)
}

pub(crate) fn map_attempt_row(row: &sqlx::sqlite::SqliteRow) -> Result<AttemptRecord, StorageError> {
    let article: String = row.try_get("article_id").map_err(ser)?;
    Ok(AttemptRecord {
        id: Some(row.try_get("id").map_err(ser)?),
        article_id: article_id_from_str(&article)?,
        points_earned: u64_from_i64(
            "points_earned",
            row.try_get::<i64, _>("points_earned").map_err(ser)?,
        )?,
        points_possible: u64_from_i64(
            "points_possible",
            row.try_get::<i64, _>("points_possible").map_err(ser)?,
        )?,
        submitted_at: row.try_get("submitted_at").map_err(ser)?,
    })
}

/// Converts a stored best percentage back into a 0..=100 score.
pub(crate) fn score_from_i64(v: i64) -> Result<u8, StorageError> {
    u8::try_from(v.clamp(0, 100)).map_err(ser)
}
