//! Shared error types for the services crate.

use thiserror::Error;

use guide_core::model::{ArticleId, CatalogError, IdError, QuizError};
use storage::content::ContentStoreError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error("article {0} does not exist")]
    UnknownArticle(ArticleId),
    #[error("article {0} has no quiz")]
    NoQuiz(ArticleId),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ScaffoldService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScaffoldError {
    #[error("display name cannot be empty")]
    EmptyDisplayName,
    #[error("registry already maps article {0}")]
    RegistryConflict(ArticleId),
    #[error(transparent)]
    Id(#[from] IdError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Content(#[from] ContentStoreError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Content(#[from] ContentStoreError),
}
