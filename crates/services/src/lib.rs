#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod explanation_view;
pub mod html;
pub mod progress_service;
pub mod scaffold_service;
pub mod validation;

pub use guide_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, ProgressServiceError, ScaffoldError};
pub use explanation_view::{ExplanationView, explain_article};
pub use progress_service::{ProficiencyReport, ProgressService, QuizSubmission};
pub use scaffold_service::{ScaffoldOutcome, ScaffoldRequest, ScaffoldService};
pub use validation::{ContentValidator, ValidationConfig, ValidationIssue, ValidationReport};
