//! Error types for the chat server
//!
//! Defines adapter-level errors, protocol (validation) errors and mailbox
//! send errors. Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// Raised by the connection adapter and the process entry point. None of
/// these ever reach the dispatch worker.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error (fatal for the connection)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Channel send error (fatal - dispatch worker is gone)
    #[error("Channel send error")]
    ChannelSend,
}

/// Validation errors for a single protocol line
///
/// Reported to the originating client only; processing continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The line starts with a verb the server does not know
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Known verb with missing or malformed arguments
    #[error("Bad Syntax")]
    BadSyntax,

    /// Line exceeded the maximum accepted length and was dropped
    #[error("Line too long")]
    LineTooLong,
}

/// Message send errors
///
/// Occurs when attempting to send messages through closed channels.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}
