mod catalog;
mod ids;
pub mod quiz;
mod registry;

pub use catalog::{Article, Catalog, CatalogError, Category, LearningStatus, PriorityStatus, Topic};
pub use registry::Registry;
pub use ids::{ArticleId, CategoryId, IdError, QuestionId, TopicId};
pub use quiz::{
    DEFAULT_TOTAL_POINTS, GradedQuiz, QuestionKind, QuestionResult, Quiz, QuizAnswer, QuizError,
    QuizQuestion, SubmittedAnswer,
};
