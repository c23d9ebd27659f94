use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Log document must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}
