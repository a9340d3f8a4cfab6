//! Error types shared by the repositories.
//!
//! Writes and list queries return `Result<T, StoreError>`; single-row reads
//! return a [`Lookup`] so "no such row" is never confused with a failure.

use thiserror::Error;

/// Errors surfaced by the session and message repositories.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Input rejected before any statement was executed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A unique constraint rejected the insert.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// Any other storage or transport failure.
    #[error("{0}")]
    Other(String),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn duplicate(key: impl Into<String>) -> Self {
        Self::DuplicateKey(key.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StoreError::DuplicateKey(_))
    }
}

impl From<anyhow::Error> for StoreError {
    /// Classified errors raised inside a database task pass through as-is;
    /// everything else becomes `Other`.
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<StoreError>() {
            Ok(classified) => classified,
            // `{:#}` keeps the context chain on one line.
            Err(err) => StoreError::Other(format!("{err:#}")),
        }
    }
}

/// Outcome of a single-row read.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Failed(StoreError),
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::NotFound => Lookup::NotFound,
            Lookup::Failed(err) => Lookup::Failed(err),
        }
    }
}

impl<T> From<Result<Option<T>, StoreError>> for Lookup<T> {
    fn from(result: Result<Option<T>, StoreError>) -> Self {
        match result {
            Ok(Some(value)) => Lookup::Found(value),
            Ok(None) => Lookup::NotFound,
            Err(err) => Lookup::Failed(err),
        }
    }
}
