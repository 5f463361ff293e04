// ⚠️ Error taxonomy
// Every failure is local to a single request or command - nothing here is fatal to the process

use std::fmt;
use thiserror::Error;

/// A single rejected field on an admin-add (or an empty guess)
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Error)]
pub enum PokedleError {
    /// No entries exist, so there is no daily secret
    #[error("catalog is empty")]
    EmptyCatalog,

    #[error("no entry named '{0}'")]
    NotFound(String),

    #[error("an entry named '{0}' already exists")]
    DuplicateName(String),

    #[error("invalid fields: {}", join_fields(.0))]
    InvalidField(Vec<FieldError>),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Seed/import file could not be read or parsed
    #[error("catalog file error: {0}")]
    Catalog(String),
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, PokedleError>;
