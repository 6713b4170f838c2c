use std::collections::HashSet;
use std::fmt;

use guide_core::model::{
    ArticleId, Catalog, CategoryId, DEFAULT_TOTAL_POINTS, Registry,
};
use storage::content::{ContentStore, ContentStoreError};

use crate::html::find_unescaped_quotes;

/// Which parts of the content a validation run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Categories whose articles must be registered; empty means every category.
    pub categories: Vec<CategoryId>,
    /// Point total assumed for quizzes that do not declare one.
    pub default_total_points: u32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            default_total_points: DEFAULT_TOTAL_POINTS,
        }
    }
}

/// A single content inconsistency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    InvalidCatalog {
        reason: String,
    },
    UnknownCategory {
        category: CategoryId,
    },
    MissingRegistryEntry {
        article: ArticleId,
    },
    OrphanedRegistryEntry {
        article: ArticleId,
    },
    MissingStub {
        article: ArticleId,
        path: String,
    },
    PathOutsideContent {
        article: ArticleId,
        path: String,
    },
    UnreadableStub {
        article: ArticleId,
        path: String,
        reason: String,
    },
    UnescapedQuote {
        article: ArticleId,
        path: String,
        line: usize,
        column: usize,
        quote: char,
    },
    PointTotalMismatch {
        article: ArticleId,
        declared: u32,
        actual: u64,
    },
    InvalidQuiz {
        article: ArticleId,
        reason: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCatalog { reason } => write!(f, "invalid catalog: {reason}"),
            Self::UnknownCategory { category } => {
                write!(f, "unknown category selected for validation: {category}")
            }
            Self::MissingRegistryEntry { article } => {
                write!(f, "article {article} has no registry entry")
            }
            Self::OrphanedRegistryEntry { article } => {
                write!(f, "registry entry {article} has no matching article")
            }
            Self::MissingStub { article, path } => {
                write!(f, "article {article} maps to missing file {path}")
            }
            Self::PathOutsideContent { article, path } => {
                write!(f, "article {article} maps to {path}, outside the content directory")
            }
            Self::UnreadableStub {
                article,
                path,
                reason,
            } => write!(f, "article {article}: cannot read {path}: {reason}"),
            Self::UnescapedQuote {
                article,
                path,
                line,
                column,
                quote,
            } => write!(
                f,
                "article {article}: unescaped {quote} in text at {path}:{line}:{column}"
            ),
            Self::PointTotalMismatch {
                article,
                declared,
                actual,
            } => write!(
                f,
                "article {article}: quiz points sum to {actual}, expected {declared}"
            ),
            Self::InvalidQuiz { article, reason } => {
                write!(f, "article {article}: invalid quiz: {reason}")
            }
        }
    }
}

/// Everything one validation run found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub checked_articles: usize,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Cross-checks the catalog, registry, and stub files of a content directory.
#[derive(Debug, Clone)]
pub struct ContentValidator {
    store: ContentStore,
    config: ValidationConfig,
}

impl ContentValidator {
    #[must_use]
    pub fn new(store: ContentStore, config: ValidationConfig) -> Self {
        Self { store, config }
    }

    /// Run every check and collect the issues.
    ///
    /// # Errors
    ///
    /// Returns `ContentStoreError` only when the catalog or registry cannot be
    /// read at all; content problems are reported as issues.
    pub fn run(&self) -> Result<ValidationReport, ContentStoreError> {
        let catalog = self.store.read_catalog()?;
        let registry = self.store.load_registry()?;
        let report = self.check(&catalog, &registry);
        if report.is_clean() {
            tracing::info!(articles = report.checked_articles, "content is consistent");
        } else {
            tracing::warn!(
                articles = report.checked_articles,
                issues = report.issues.len(),
                "content validation found issues"
            );
        }
        Ok(report)
    }

    /// Check an already-loaded catalog and registry.
    #[must_use]
    pub fn check(&self, catalog: &Catalog, registry: &Registry) -> ValidationReport {
        let mut report = ValidationReport::default();

        // Quiz problems are reported per article below.
        report.issues.extend(
            catalog
                .structure_errors()
                .into_iter()
                .map(|err| ValidationIssue::InvalidCatalog {
                    reason: err.to_string(),
                }),
        );

        for category in &self.config.categories {
            if catalog.category(category).is_none() {
                report.issues.push(ValidationIssue::UnknownCategory {
                    category: category.clone(),
                });
            }
        }

        let selected = catalog.categories.iter().filter(|c| {
            self.config.categories.is_empty() || self.config.categories.contains(&c.id)
        });
        for category in selected {
            for article in category.articles() {
                report.checked_articles += 1;

                match registry.get(&article.id) {
                    None => report.issues.push(ValidationIssue::MissingRegistryEntry {
                        article: article.id.clone(),
                    }),
                    Some(path) => self.check_stub(&article.id, path, &mut report),
                }

                if let Some(quiz) = &article.quiz {
                    if let Err(err) = quiz.validate() {
                        report.issues.push(ValidationIssue::InvalidQuiz {
                            article: article.id.clone(),
                            reason: err.to_string(),
                        });
                    }
                    let declared = quiz.total_points.unwrap_or(self.config.default_total_points);
                    let actual = quiz.points_sum();
                    if u64::from(declared) != actual {
                        report.issues.push(ValidationIssue::PointTotalMismatch {
                            article: article.id.clone(),
                            declared,
                            actual,
                        });
                    }
                }
            }
        }

        let known: HashSet<&ArticleId> = catalog.articles().map(|a| &a.id).collect();
        for (article, _) in registry.iter() {
            if !known.contains(article) {
                report.issues.push(ValidationIssue::OrphanedRegistryEntry {
                    article: article.clone(),
                });
            }
        }

        report
    }

    fn check_stub(&self, article: &ArticleId, path: &str, report: &mut ValidationReport) {
        if self.store.resolve(path).is_err() {
            report.issues.push(ValidationIssue::PathOutsideContent {
                article: article.clone(),
                path: path.to_owned(),
            });
            return;
        }
        if !self.store.stub_exists(path) {
            report.issues.push(ValidationIssue::MissingStub {
                article: article.clone(),
                path: path.to_owned(),
            });
            return;
        }
        let body = match self.store.read_stub(path) {
            Ok(body) => body,
            Err(err) => {
                report.issues.push(ValidationIssue::UnreadableStub {
                    article: article.clone(),
                    path: path.to_owned(),
                    reason: err.to_string(),
                });
                return;
            }
        };
        for hit in find_unescaped_quotes(&body) {
            report.issues.push(ValidationIssue::UnescapedQuote {
                article: article.clone(),
                path: path.to_owned(),
                line: hit.line,
                column: hit.column,
                quote: hit.quote,
            });
        }
    }
}
