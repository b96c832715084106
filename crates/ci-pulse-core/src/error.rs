//! Error taxonomy for a polling run
//!
//! Every variant of [`PulseError`] is fatal for the run that produced it. An
//! unrecognized provider status is deliberately not an error: it degrades to
//! [`StatusCode::Unknown`](crate::StatusCode::Unknown) for that one record.

use crate::config::ConfigError;
use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort a polling run
#[derive(Debug, Error)]
pub enum PulseError {
    /// Missing or malformed configuration
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A provider client could not be constructed (bad endpoint or token)
    #[error("client init failed: {message}")]
    ClientInit {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// A listing or lookup request failed in transit or with a non-auth status
    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// The provider rejected the access token (HTTP 401/403)
    #[error("authorization failed: {message}")]
    Auth { message: String },

    /// A spawned lookup task panicked or was aborted
    #[error("task failed: {message}")]
    Task {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl PulseError {
    pub(crate) fn transport(message: impl Into<String>, source: impl Into<BoxedSource>) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub(crate) fn client_init(message: impl Into<String>) -> Self {
        Self::ClientInit {
            message: message.into(),
            source: None,
        }
    }

    /// Whether this error came from the provider rejecting credentials
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_message() {
        let err = PulseError::Auth {
            message: "GET /user/repos returned 401".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "authorization failed: GET /user/repos returned 401"
        );
        assert!(err.is_auth());
    }

    #[test]
    fn test_config_error_converts() {
        let err: PulseError = ConfigError::NotFound.into();
        assert!(matches!(err, PulseError::Config(ConfigError::NotFound)));
        assert!(!err.is_auth());
    }

    #[test]
    fn test_transport_keeps_source() {
        let io = std::io::Error::other("connection reset");
        let err = PulseError::transport("GET /projects failed", io);
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("connection reset"));
    }
}
