use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    /// Recoverable: the index cannot evaluate a metadata filter.
    #[error("Metadata filter unsupported: {0}")]
    FilterUnsupported(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::RetrievalUnavailable(msg.into())
    }

    pub fn filter_unsupported(msg: impl Into<String>) -> Self {
        Self::FilterUnsupported(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable identifier used as the `kind` field in logs and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::RetrievalUnavailable(_) => "retrieval_unavailable",
            Self::FilterUnsupported(_) => "filter_unsupported",
            Self::Internal(_) => "internal",
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_stable() {
        assert_eq!(DomainError::invalid_argument("k").kind(), "invalid_argument");
        assert_eq!(DomainError::unavailable("down").kind(), "retrieval_unavailable");
        assert_eq!(DomainError::filter_unsupported("x").kind(), "filter_unsupported");
        assert_eq!(DomainError::internal("x").kind(), "internal");
    }

    #[test]
    fn test_only_invalid_argument_is_client_error() {
        assert!(DomainError::invalid_argument("k").is_client_error());
        assert!(!DomainError::unavailable("down").is_client_error());
        assert!(!DomainError::internal("x").is_client_error());
    }
}
