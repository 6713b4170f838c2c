//! Content directory on disk: `content.json`, `registry.json` and the
//! `articles/` stub bodies.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use guide_core::model::{ArticleId, Catalog, CatalogError, Registry};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub const CATALOG_FILE: &str = "content.json";
pub const REGISTRY_FILE: &str = "registry.json";
pub const ARTICLES_DIR: &str = "articles";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentStoreError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} already exists", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("{path} escapes the content directory")]
    OutsideRoot { path: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> ContentStoreError + '_ {
    move |source| ContentStoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// File-backed access to one content directory.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(CATALOG_FILE)
    }

    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.root.join(REGISTRY_FILE)
    }

    /// Registry-relative path of an article's stub body.
    #[must_use]
    pub fn stub_relative_path(article: &ArticleId) -> String {
        format!("{ARTICLES_DIR}/{article}.html")
    }

    /// Resolve a registry-relative path against the content root.
    ///
    /// # Errors
    ///
    /// Returns `ContentStoreError::OutsideRoot` for absolute paths and paths
    /// with `..` components.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, ContentStoreError> {
        let inside = !relative.is_empty()
            && Path::new(relative)
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !inside {
            return Err(ContentStoreError::OutsideRoot {
                path: relative.to_owned(),
            });
        }
        Ok(self.root.join(relative))
    }

    /// Create the directory layout with an empty catalog and registry.
    ///
    /// Existing files are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `ContentStoreError::Io` if directories or files cannot be created.
    pub fn init(&self) -> Result<(), ContentStoreError> {
        let articles = self.root.join(ARTICLES_DIR);
        fs::create_dir_all(&articles).map_err(io_err(&articles))?;
        if !self.catalog_path().exists() {
            self.save_catalog(&Catalog::default())?;
        }
        if !self.registry_path().exists() {
            self.save_registry(&Registry::new())?;
        }
        tracing::info!(root = %self.root.display(), "initialized content directory");
        Ok(())
    }

    /// Load and validate the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ContentStoreError` if the file is unreadable, is not valid JSON,
    /// or fails catalog validation.
    pub fn load_catalog(&self) -> Result<Catalog, ContentStoreError> {
        let catalog = self.read_catalog()?;
        catalog.validate()?;
        tracing::debug!(
            categories = catalog.categories.len(),
            articles = catalog.articles().count(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    /// Read the catalog without validating it, for tools that report problems
    /// instead of stopping at the first one.
    ///
    /// # Errors
    ///
    /// Returns `ContentStoreError` if the file is unreadable or not valid JSON.
    pub fn read_catalog(&self) -> Result<Catalog, ContentStoreError> {
        read_json(&self.catalog_path())
    }

    /// Persist the catalog as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns `ContentStoreError` if serialization or the write fails.
    pub fn save_catalog(&self, catalog: &Catalog) -> Result<(), ContentStoreError> {
        write_json(&self.catalog_path(), catalog)
    }

    /// Load the registry; a missing file is an empty registry.
    ///
    /// # Errors
    ///
    /// Returns `ContentStoreError` if the file exists but cannot be read or parsed.
    pub fn load_registry(&self) -> Result<Registry, ContentStoreError> {
        let path = self.registry_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "registry missing, using empty registry");
            return Ok(Registry::new());
        }
        read_json(&path)
    }

    /// Regenerate the registry file from the given mapping.
    ///
    /// # Errors
    ///
    /// Returns `ContentStoreError` if serialization or the write fails.
    pub fn save_registry(&self, registry: &Registry) -> Result<(), ContentStoreError> {
        write_json(&self.registry_path(), registry)
    }

    /// Whether a stub file exists; paths outside the root never do.
    #[must_use]
    pub fn stub_exists(&self, relative: &str) -> bool {
        self.resolve(relative).is_ok_and(|path| path.is_file())
    }

    /// Write a new stub body; refuses to overwrite.
    ///
    /// # Errors
    ///
    /// Returns `ContentStoreError::AlreadyExists` if the file is present,
    /// `OutsideRoot` for an escaping path, or `Io` if it cannot be written.
    pub fn write_stub(&self, relative: &str, body: &str) -> Result<PathBuf, ContentStoreError> {
        let path = self.resolve(relative)?;
        if path.exists() {
            return Err(ContentStoreError::AlreadyExists { path });
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }
        fs::write(&path, body).map_err(io_err(&path))?;
        Ok(path)
    }

    /// Read a stub body.
    ///
    /// # Errors
    ///
    /// Returns `ContentStoreError::OutsideRoot` for an escaping path, or `Io`
    /// if the file cannot be read.
    pub fn read_stub(&self, relative: &str) -> Result<String, ContentStoreError> {
        let path = self.resolve(relative)?;
        fs::read_to_string(&path).map_err(io_err(&path))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ContentStoreError> {
    let raw = fs::read_to_string(path).map_err(io_err(path))?;
    serde_json::from_str(&raw).map_err(|source| ContentStoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ContentStoreError> {
    let mut body = serde_json::to_string_pretty(value).map_err(|source| {
        ContentStoreError::Json {
            path: path.to_path_buf(),
            source,
        }
    })?;
    body.push('\n');
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    fs::write(path, body).map_err(io_err(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use guide_core::model::{Article, Category, CategoryId, Topic, TopicId};

    fn sample_catalog() -> Catalog {
        Catalog::new(vec![Category {
            id: CategoryId::new("backend").unwrap(),
            name: "Backend".into(),
            topics: vec![Topic {
                id: TopicId::new("reliability").unwrap(),
                name: "Reliability".into(),
                articles: vec![Article::stub(ArticleId::new("retries").unwrap(), "Retries")],
            }],
        }])
    }

    #[test]
    fn init_creates_layout_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        store.init().unwrap();
        assert!(store.catalog_path().is_file());
        assert!(store.registry_path().is_file());
        assert!(dir.path().join(ARTICLES_DIR).is_dir());

        store.save_catalog(&sample_catalog()).unwrap();
        store.init().unwrap();
        assert_eq!(store.load_catalog().unwrap(), sample_catalog());
    }

    #[test]
    fn catalog_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        store.save_catalog(&sample_catalog()).unwrap();
        let raw = fs::read_to_string(store.catalog_path()).unwrap();
        assert!(raw.ends_with('\n'));
        assert!(raw.contains("\"learningStatus\": \"not-started\""));
        assert_eq!(store.load_catalog().unwrap(), sample_catalog());
    }

    #[test]
    fn load_catalog_reports_invalid_json_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        fs::write(store.catalog_path(), "{ not json").unwrap();
        let err = store.load_catalog().unwrap_err();
        assert!(matches!(err, ContentStoreError::Json { .. }));
        assert!(err.to_string().contains(CATALOG_FILE));
    }

    #[test]
    fn load_catalog_rejects_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        let mut catalog = sample_catalog();
        catalog.categories[0].topics[0]
            .articles
            .push(Article::stub(ArticleId::new("retries").unwrap(), "Again"));
        store.save_catalog(&catalog).unwrap();
        assert!(matches!(
            store.load_catalog(),
            Err(ContentStoreError::Catalog(CatalogError::DuplicateArticle(_)))
        ));
    }

    #[test]
    fn missing_registry_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        assert!(store.load_registry().unwrap().is_empty());
    }

    #[test]
    fn write_stub_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        let id = ArticleId::new("retries").unwrap();
        let rel = ContentStore::stub_relative_path(&id);
        assert_eq!(rel, "articles/retries.html");

        store.write_stub(&rel, "<h1>Retries</h1>\n").unwrap();
        assert!(store.stub_exists(&rel));
        assert_eq!(store.read_stub(&rel).unwrap(), "<h1>Retries</h1>\n");
        assert!(matches!(
            store.write_stub(&rel, "again"),
            Err(ContentStoreError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn registry_paths_cannot_leave_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path().join("content"));
        fs::write(dir.path().join("secret.html"), "x").unwrap();

        for bad in ["../secret.html", "articles/../../secret.html", "/etc/passwd", ""] {
            assert!(
                matches!(
                    store.resolve(bad),
                    Err(ContentStoreError::OutsideRoot { .. })
                ),
                "{bad} should be rejected"
            );
            assert!(!store.stub_exists(bad));
        }
        assert!(matches!(
            store.read_stub("../secret.html"),
            Err(ContentStoreError::OutsideRoot { .. })
        ));
        assert_eq!(
            store.resolve("./articles/a.html").unwrap(),
            dir.path().join("content").join("./articles/a.html")
        );
    }
}
