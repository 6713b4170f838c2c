use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when an identifier is not a valid slug.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdError {
    #[error("identifier cannot be empty")]
    Empty,

    #[error("identifier `{0}` must be lowercase ascii, digits and inner dashes")]
    InvalidSlug(String),
}

/// Validates a content slug such as `idempotent-writes`.
fn validate_slug(raw: &str) -> Result<String, IdError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IdError::Empty);
    }
    let valid_chars = trimmed
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if !valid_chars || trimmed.starts_with('-') || trimmed.ends_with('-') {
        return Err(IdError::InvalidSlug(trimmed.to_owned()));
    }
    Ok(trimmed.to_owned())
}

macro_rules! slug_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a validated identifier.
            ///
            /// # Errors
            ///
            /// Returns `IdError` if the value is empty or not a slug.
            pub fn new(value: impl AsRef<str>) -> Result<Self, IdError> {
                validate_slug(value.as_ref()).map(Self)
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Self::new(&raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

slug_id!(
    /// Identifier of a top-level content category.
    CategoryId
);

slug_id!(
    /// Identifier of a topic inside a category.
    TopicId
);

slug_id!(
    /// Identifier of an article; also the key of the rendering registry.
    ArticleId
);

slug_id!(
    /// Identifier of a question, unique within its quiz.
    QuestionId
);
