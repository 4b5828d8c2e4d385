use thiserror::Error;

use crate::coordination::state::{PendingOperation, Subordinate};

/// Main error type for the Io client
#[derive(Error, Debug)]
pub enum IoClientError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    // Lifecycle errors
    #[error("Operation pending: {0}")]
    Pending(#[from] PendingOperation),

    #[error("{component} init failed: {reason}")]
    SubordinateInit {
        component: Subordinate,
        reason: String,
    },

    #[error("{component} quit failed: {reason}")]
    SubordinateQuit {
        component: Subordinate,
        reason: String,
    },

    #[error("Relay initialization requires a messaging client")]
    MissingMessagingClient,

    // Event stream errors
    #[error("Message not ready: {0}")]
    MessageNotReady(String),

    #[error("Control channel closed")]
    ControlChannelClosed,

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl IoClientError {
    /// Wrap a failure raised by a subordinate's `init`
    pub fn subordinate_init(component: Subordinate, err: impl std::fmt::Display) -> Self {
        IoClientError::SubordinateInit {
            component,
            reason: err.to_string(),
        }
    }

    /// Wrap a failure raised by a subordinate's `quit`
    pub fn subordinate_quit(component: Subordinate, err: impl std::fmt::Display) -> Self {
        IoClientError::SubordinateQuit {
            component,
            reason: err.to_string(),
        }
    }

    /// Whether the caller may simply retry later
    pub fn is_pending(&self) -> bool {
        matches!(self, IoClientError::Pending(_))
    }
}

/// Result type alias for IoClientError
pub type Result<T> = std::result::Result<T, IoClientError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordination::state::{CurrentState, LifecycleOp};

    #[test]
    fn test_subordinate_error_messages() {
        let err = IoClientError::subordinate_init(Subordinate::Relay, "token rejected");
        assert_eq!(err.to_string(), "relay init failed: token rejected");

        let err = IoClientError::subordinate_quit(Subordinate::MessagingClient, "socket closed");
        assert_eq!(err.to_string(), "messaging client quit failed: socket closed");
    }

    #[test]
    fn test_pending_conversion() {
        let err: IoClientError = PendingOperation {
            op: LifecycleOp::Init,
            state: CurrentState::Connecting,
        }
        .into();
        assert!(err.is_pending());
        assert_eq!(
            err.to_string(),
            "Operation pending: init() rejected while connecting"
        );
        assert!(!IoClientError::MissingMessagingClient.is_pending());
    }
}
