use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

const NAME_PREFIX: &str = "optimized_";
const PDF_EXTENSION: &str = ".pdf";

/// Name of a rendered document in the output directory.
///
/// Generated names look like `optimized_1760827200000_3f2a9c1e.pdf`: creation time in
/// unix milliseconds plus a short random suffix so two renders in the same millisecond
/// never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DocumentHandle(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandleError {
    #[error("document name is empty")]
    Empty,
    #[error("document name contains unsupported characters")]
    InvalidCharacters,
    #[error("document name must end in .pdf")]
    WrongExtension,
}

impl DocumentHandle {
    pub fn generate() -> Self {
        Self::generate_at(Utc::now())
    }

    pub fn generate_at(created_at: DateTime<Utc>) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{NAME_PREFIX}{}_{}{PDF_EXTENSION}",
            created_at.timestamp_millis(),
            &suffix[..8]
        ))
    }

    /// Validates a caller-supplied name. Only flat names are accepted, so a handle can
    /// never point outside the output directory.
    pub fn parse(name: &str) -> Result<Self, HandleError> {
        if name.is_empty() {
            return Err(HandleError::Empty);
        }
        if name.starts_with('.')
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(HandleError::InvalidCharacters);
        }
        if name.len() <= PDF_EXTENSION.len() || !name.ends_with(PDF_EXTENSION) {
            return Err(HandleError::WrongExtension);
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
