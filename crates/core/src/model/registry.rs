use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::ids::ArticleId;

/// Maps article ids to the relative path of their rendering stub.
///
/// Kept sorted so that the serialized file is stable across rewrites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry(BTreeMap<ArticleId, String>);

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a mapping, returning the previous path if any.
    pub fn insert(&mut self, article: ArticleId, path: impl Into<String>) -> Option<String> {
        self.0.insert(article, path.into())
    }

    #[must_use]
    pub fn get(&self, article: &ArticleId) -> Option<&str> {
        self.0.get(article).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, article: &ArticleId) -> bool {
        self.0.contains_key(article)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArticleId, &str)> {
        self.0.iter().map(|(id, path)| (id, path.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
