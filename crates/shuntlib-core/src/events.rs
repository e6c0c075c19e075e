//! Asynchronous meter event types.
//!
//! Events are emitted by meter drivers through a [`tokio::sync::broadcast`]
//! channel as notifications arrive. They are diagnostics: the measurement
//! values themselves are obtained by polling
//! [`Meter::sample()`](crate::meter::Meter::sample).

/// An event emitted by a meter driver.
///
/// Delivered best-effort through a bounded broadcast channel; slow
/// consumers may miss events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeterEvent {
    /// A notification passed validation and is now the retained frame.
    FrameAccepted {
        /// Frame length in bytes.
        len: usize,
    },

    /// A notification carried the frame marker but was too short to decode.
    FrameTooShort {
        /// Payload length in bytes.
        len: usize,
    },

    /// A notification without the frame marker was dropped.
    FrameDiscarded {
        /// Payload length in bytes.
        len: usize,
    },

    /// The notification listener started. Only the meter's first
    /// subscriber is guaranteed to receive it.
    Connected,

    /// The notification stream ended.
    Disconnected,
}
