//! Cloud capability error types

use thiserror::Error;

/// Errors returned by the compute and network capabilities.
///
/// Implementations must report absent resources as [`CloudError::NotFound`]
/// regardless of how the underlying transport signals it; the lifecycle core
/// relies on [`CloudError::is_not_found`] and never inspects provider-specific
/// error shapes.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("More than one resource matches: {0}")]
    MultipleFound(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(CloudError::NotFound("server abc".into()).is_not_found());
        assert!(!CloudError::MultipleFound("image ubuntu".into()).is_not_found());
        assert!(!CloudError::Api("503".into()).is_not_found());
    }
}
