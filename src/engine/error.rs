//! Engine error types.

use thiserror::Error;

/// Errors reported by engine operations.
///
/// None of these are fatal; the engine stays usable and `reset()` always
/// brings it back to a fresh state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// `start()` was called in countdown mode without a positive duration.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl EngineError {
    /// Creates the error raised for a zero countdown duration.
    #[must_use]
    pub fn zero_duration() -> Self {
        Self::InvalidConfiguration("countdown duration must be greater than zero".to_string())
    }

    /// Returns true if the user can fix this by changing their input.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "please set a time first",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::zero_duration();
        assert!(err.to_string().contains("invalid configuration"));
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_is_user_error() {
        assert!(EngineError::zero_duration().is_user_error());
    }

    #[test]
    fn test_suggestion() {
        assert!(EngineError::zero_duration().suggestion().contains("set a time"));
    }
}
