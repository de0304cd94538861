//! Notification error types.

use thiserror::Error;

/// Errors that can occur while delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Writing the notification to its output failed.
    #[error("failed to write notification: {0}")]
    WriteFailed(String),

    /// The notifier cannot deliver notifications right now.
    #[error("notifications are not available")]
    NotAvailable,
}

impl NotifyError {
    /// Returns true if a later notification may succeed.
    ///
    /// Notification failures never stop the timer.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::WriteFailed(_))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::WriteFailed(_) => "check that the terminal is still attached",
            Self::NotAvailable => "run with notifications enabled",
        }
    }
}

impl From<std::io::Error> for NotifyError {
    fn from(err: std::io::Error) -> Self {
        Self::WriteFailed(err.to_string())
    }
}
