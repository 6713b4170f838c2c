use std::path::PathBuf;
use std::sync::Arc;

use storage::content::ContentStore;
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;

/// Progress tracking over one content directory and one tracking store.
#[derive(Clone)]
pub struct AppServices {
    progress: Arc<ProgressService>,
}

impl AppServices {
    /// Build services backed by `SQLite` progress tracking.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the catalog cannot be loaded or storage
    /// initialization fails.
    pub async fn new_sqlite(
        content_dir: impl Into<PathBuf>,
        db_url: &str,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::with_storage(content_dir, storage, clock)
    }

    /// Build services with an explicit storage backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Content` if the catalog cannot be loaded.
    pub fn with_storage(
        content_dir: impl Into<PathBuf>,
        storage: Storage,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let catalog = Arc::new(ContentStore::new(content_dir).load_catalog()?);
        let progress = Arc::new(ProgressService::new(clock, catalog, storage.attempts));
        Ok(Self { progress })
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }
}
