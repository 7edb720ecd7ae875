/*!
Common error types for the DWIN display protocol.
*/

use thiserror::Error;

/// Common result type used throughout the protocol library
pub type Result<T> = std::result::Result<T, DwinError>;

/// Comprehensive error type for all display operations
#[derive(Error, Debug)]
pub enum DwinError {
    /// Bad command argument, detected before anything was queued
    #[error("Invalid argument: {0}")]
    Validation(String),

    /// Operand outside the range its wire encoding can carry
    #[error("{operand} operand out of range: {value}")]
    Range { operand: &'static str, value: i128 },

    /// Send attempted before the handshake and setup completed
    #[error("Display session is not initialized")]
    NotReady,

    /// The underlying channel has been closed
    #[error("Serial channel is not open")]
    NotOpen,

    /// I/O errors from the serial channel
    #[error("Channel error: {0}")]
    Channel(#[source] std::io::Error),

    /// Write or flush did not complete before the channel timeout
    #[error("Channel write timed out")]
    Timeout,

    /// The device answered the handshake with unexpected bytes
    #[error("Handshake rejected, received {}", hex::encode(.0))]
    ProtocolRejected(Vec<u8>),

    /// No usable handshake reply before the deadline
    #[error("Handshake timed out after receiving {received} bytes")]
    HandshakeTimedOut { received: usize },

    /// Every handshake attempt failed
    #[error("Handshake failed after {attempts} attempts")]
    HandshakeExhausted { attempts: u32 },

    /// Baseline setup commands failed after a successful handshake
    #[error("Display setup failed: {0}")]
    Setup(String),

    /// Another thread panicked while holding the session lock
    #[error("Session lock poisoned")]
    LockPoisoned,
}

impl DwinError {
    /// Create a new validation error with a message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new range error for the named operand
    pub fn range(operand: &'static str, value: impl Into<i128>) -> Self {
        Self::Range {
            operand,
            value: value.into(),
        }
    }

    /// Create a new setup error
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup(msg.into())
    }

    /// True for errors raised by argument checks rather than the transport
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Range { .. })
    }
}

impl From<std::io::Error> for DwinError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => Self::Timeout,
            _ => Self::Channel(err),
        }
    }
}
