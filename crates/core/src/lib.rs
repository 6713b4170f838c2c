#![forbid(unsafe_code)]

pub mod explanation;
pub mod model;
pub mod proficiency;
pub mod time;

pub use explanation::{ParsedExplanation, Section, parse_explanation};
pub use proficiency::{
    Proficiency, ScoreSource, article_proficiency, category_proficiency, topic_proficiency,
};
pub use time::Clock;
