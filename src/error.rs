use thiserror::Error;

/// Failures surfaced while checking a sender address.
///
/// `RecordNotFound` and `ResolutionFailure` are kept apart: an empty answer is
/// a fact about the domain, a failed lookup says nothing about it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpoofCheckError {
    #[error("invalid email format: {0:?}")]
    InvalidEmailFormat(String),

    #[error("no matching TXT record published at {name}")]
    RecordNotFound { name: String },

    #[error("TXT lookup for {name} failed: {reason}")]
    ResolutionFailure { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, SpoofCheckError>;
