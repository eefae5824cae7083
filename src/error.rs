//! Error types for kvcli
//!
//! Provides a unified error type for all client operations.
//!
//! Server-reported failures (`-ERR ...`, `NOT_FOUND`) are not errors at this
//! level: they decode into a [`Response`](crate::protocol::Response) whose
//! status is not `Ok`.

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for kvcli operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected welcome message: {0}")]
    Handshake(String),

    #[error("not connected to server")]
    NotConnected,

    #[error("connection already used; create a new client to reconnect")]
    AlreadyUsed,

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("transport error: {0}")]
    Transport(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("malformed response: {0}")]
    Protocol(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to parse config file: {0}")]
    TomlParse(#[from] toml::de::Error),

    // -------------------------------------------------------------------------
    // Output Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KvError {
    /// True when the error leaves the connection unusable
    ///
    /// Callers should close and replace the connection after any of these.
    pub fn is_transport(&self) -> bool {
        matches!(self, KvError::Transport(_))
    }

    /// True when the error happened while establishing the connection
    pub fn is_connect(&self) -> bool {
        matches!(self, KvError::Connect { .. } | KvError::Handshake(_))
    }

    /// True when the failure was a deadline expiry on the transport
    pub fn is_timeout(&self) -> bool {
        match self {
            KvError::Transport(e) | KvError::Connect { source: e, .. } => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }
}
