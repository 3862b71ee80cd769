use crate::providers::ProviderError;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced to callers of the round engine. A failed operation leaves
/// the session untouched.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Wrong token, wrong phase, illegal actor or repeated action
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Provider failure: {0}")]
    Provider(#[from] ProviderError),
}

impl EngineError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Unauthorized(_) => "UNAUTHORIZED",
            EngineError::NotFound(_) => "NOT_FOUND",
            EngineError::Invalid(_) => "INVALID_INPUT",
            EngineError::Provider(_) => "PROVIDER_FAILED",
        }
    }
}
