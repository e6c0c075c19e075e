//! Error types for shuntlib.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport and configuration errors are
//! both captured here.
//!
//! Note that malformed notification frames are *not* errors: the decoder
//! drops them silently and keeps the last good frame. Absence of data is
//! represented by an empty [`Sample`](crate::sample::Sample).

/// The error type for all shuntlib operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (BLE link, notification channel).
    #[error("transport error: {0}")]
    Transport(String),

    /// Timed out waiting for a notification from the meter.
    #[error("timeout waiting for notification")]
    Timeout,

    /// No backend supports the requested device or operation.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// An invalid parameter was passed to a builder or constructor.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A field table is inconsistent with its frame layout.
    ///
    /// Raised once, when a decoder is constructed, so that a misconfigured
    /// table can never produce an out-of-bounds read at decode time.
    #[error("invalid field table: {0}")]
    InvalidFieldTable(String),

    /// No connection to the meter has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the meter was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
