use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use guide_core::model::{CategoryId, DEFAULT_TOTAL_POINTS};
use serde::Deserialize;
use services::ValidationConfig;

pub const DEFAULT_CONFIG_FILE: &str = "guide.toml";
pub const DEFAULT_CONTENT_DIR: &str = "content";
pub const DEFAULT_DB_URL: &str = "sqlite://guide.sqlite3";

/// On-disk `guide.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub content_dir: Option<PathBuf>,
    pub db_url: Option<String>,
    #[serde(default)]
    pub validate: ValidateSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidateSection {
    #[serde(default)]
    pub categories: Vec<String>,
    pub default_total_points: Option<u32>,
}

impl FileConfig {
    /// Load an explicit config file, or `./guide.toml` when it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !required && !path.exists() {
            tracing::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }
}

/// Settings after merging flags/env over the config file over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub content_dir: PathBuf,
    pub db_url: String,
    pub validate_categories: Vec<String>,
    pub default_total_points: u32,
}

impl Settings {
    pub fn resolve(
        file: FileConfig,
        content_dir: Option<PathBuf>,
        db_url: Option<String>,
    ) -> Self {
        Self {
            content_dir: content_dir
                .or(file.content_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_DIR)),
            db_url: db_url
                .or(file.db_url)
                .unwrap_or_else(|| DEFAULT_DB_URL.to_owned()),
            validate_categories: file.validate.categories,
            default_total_points: file
                .validate
                .default_total_points
                .unwrap_or(DEFAULT_TOTAL_POINTS),
        }
    }

    /// Validation scope; command-line values replace the file's.
    pub fn validation_config(
        &self,
        categories: Vec<String>,
        default_total_points: Option<u32>,
    ) -> Result<ValidationConfig> {
        let raw = if categories.is_empty() {
            self.validate_categories.clone()
        } else {
            categories
        };
        let categories = raw
            .iter()
            .map(|c| CategoryId::new(c).with_context(|| format!("invalid category id {c:?}")))
            .collect::<Result<Vec<_>>>()?;
        Ok(ValidationConfig {
            categories,
            default_total_points: default_total_points.unwrap_or(self.default_total_points),
        })
    }
}
