//! Error types for the KCP control block

use thiserror::Error;

/// Result type for KCP operations
pub type KcpResult<T> = std::result::Result<T, KcpError>;

/// Errors returned by the control block.
///
/// All of these are expected protocol conditions; none of them poison the
/// engine except [`KcpError::ConnectionLost`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KcpError {
    /// `recv` called with nothing queued
    #[error("Receive queue is empty")]
    RecvQueueEmpty,

    /// The head message still misses fragments
    #[error("Next message is incomplete")]
    IncompleteMessage,

    /// Destination cannot hold the message or segment
    #[error("Buffer error: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// Message would split into more fragments than a receiver can buffer
    #[error("Buffer error: message needs {count} fragments, limit is {limit}")]
    TooManyFragments { count: usize, limit: usize },

    /// Segment belongs to another conversation or session
    #[error("Protocol error: segment conv {conv} token {token} does not match this session")]
    ConversationMismatch { conv: u32, token: u32 },

    /// Declared payload length runs past the end of the datagram
    #[error("Protocol error: segment declares {declared} payload bytes, {available} remain")]
    Truncated { declared: usize, available: usize },

    /// Command byte outside the known set
    #[error("Protocol error: unknown command {0}")]
    UnknownCommand(u8),

    /// A segment hit the dead-link retransmission limit
    #[error("Connection lost")]
    ConnectionLost,

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl KcpError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        KcpError::Config {
            message: message.into(),
        }
    }

    /// Check if this is a fatal error that leaves the control block unusable
    pub fn is_fatal(&self) -> bool {
        matches!(self, KcpError::ConnectionLost)
    }

    /// Legacy negative return code of the C-style KCP API.
    ///
    /// Codes are only distinct within one operation: `recv` uses -1..-3,
    /// `send` uses -2, `input` uses -1..-3.
    pub fn code(&self) -> i32 {
        match self {
            KcpError::RecvQueueEmpty => -1,
            KcpError::IncompleteMessage => -2,
            KcpError::BufferTooSmall { .. } => -3,
            KcpError::TooManyFragments { .. } => -2,
            KcpError::ConversationMismatch { .. } => -1,
            KcpError::Truncated { .. } => -2,
            KcpError::UnknownCommand(_) => -3,
            KcpError::ConnectionLost => -4,
            KcpError::Config { .. } => -5,
        }
    }
}
