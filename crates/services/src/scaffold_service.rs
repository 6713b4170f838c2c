use std::path::PathBuf;

use guide_core::model::{Article, ArticleId, TopicId};
use storage::content::ContentStore;

use crate::error::ScaffoldError;
use crate::html::escape_text;

/// Input for creating a new article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldRequest {
    pub topic_id: TopicId,
    pub article_id: ArticleId,
    pub display_name: String,
}

impl ScaffoldRequest {
    /// Build a request from raw command-line values.
    ///
    /// # Errors
    ///
    /// Returns `ScaffoldError::Id` for malformed ids and
    /// `ScaffoldError::EmptyDisplayName` for a blank name.
    pub fn parse(topic_id: &str, article_id: &str, display_name: &str) -> Result<Self, ScaffoldError> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(ScaffoldError::EmptyDisplayName);
        }
        Ok(Self {
            topic_id: TopicId::new(topic_id)?,
            article_id: ArticleId::new(article_id)?,
            display_name: display_name.to_owned(),
        })
    }
}

/// What scaffolding produced on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldOutcome {
    pub article_id: ArticleId,
    pub topic_id: TopicId,
    pub stub_path: PathBuf,
    pub registry_entries: usize,
}

/// Adds article entries plus rendering stubs to a content directory.
#[derive(Debug, Clone)]
pub struct ScaffoldService {
    store: ContentStore,
}

impl ScaffoldService {
    #[must_use]
    pub fn new(store: ContentStore) -> Self {
        Self { store }
    }

    /// Create the article entry, its stub body, and its registry mapping.
    ///
    /// All checks run before anything is written.
    ///
    /// # Errors
    ///
    /// Returns `ScaffoldError` if the topic is unknown, the article id is
    /// already taken in the catalog or registry, the stub already exists, or
    /// the content files cannot be read or written.
    pub fn scaffold_article(
        &self,
        request: ScaffoldRequest,
    ) -> Result<ScaffoldOutcome, ScaffoldError> {
        let ScaffoldRequest {
            topic_id,
            article_id,
            display_name,
        } = request;
        if display_name.trim().is_empty() {
            return Err(ScaffoldError::EmptyDisplayName);
        }

        let mut catalog = self.store.load_catalog()?;
        let mut registry = self.store.load_registry()?;
        if registry.contains(&article_id) {
            return Err(ScaffoldError::RegistryConflict(article_id));
        }
        catalog.insert_article(&topic_id, Article::stub(article_id.clone(), &display_name))?;

        let relative = ContentStore::stub_relative_path(&article_id);
        let stub_path = self
            .store
            .write_stub(&relative, &stub_body(&article_id, &display_name))?;
        self.store.save_catalog(&catalog)?;
        registry.insert(article_id.clone(), relative);
        self.store.save_registry(&registry)?;

        tracing::info!(
            article = %article_id,
            topic = %topic_id,
            path = %stub_path.display(),
            "scaffolded article"
        );
        Ok(ScaffoldOutcome {
            article_id,
            topic_id,
            stub_path,
            registry_entries: registry.len(),
        })
    }
}

fn stub_body(article: &ArticleId, display_name: &str) -> String {
    let title = escape_text(display_name);
    format!(
        "<article data-article-id=\"{article}\">\n  <h1>{title}</h1>\n  <p>Draft: this article has no content yet.</p>\n</article>\n"
    )
}
