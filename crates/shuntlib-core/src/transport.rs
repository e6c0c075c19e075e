//! Transport trait for meter notifications.
//!
//! The [`Transport`] trait abstracts over the BLE link to a meter. The
//! host's Bluetooth stack handles scanning, connecting, GATT discovery and
//! subscribing to the notify characteristic; a `Transport` only hands the
//! resulting notification payloads to shuntlib, one payload per call.
//!
//! `ChannelTransport` in `shuntlib-transport` bridges callback-style BLE
//! libraries to this trait, and `MockTransport` in `shuntlib-test-harness`
//! replays scripted payloads for tests.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous source of notification payloads from one meter.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Wait for the next notification payload.
    ///
    /// Returns [`Error::Timeout`](crate::error::Error::Timeout) if nothing
    /// arrives within `timeout`, and
    /// [`Error::NotConnected`](crate::error::Error::NotConnected) or
    /// [`Error::ConnectionLost`](crate::error::Error::ConnectionLost) once
    /// the link is gone.
    async fn receive(&mut self, timeout: Duration) -> Result<Bytes>;

    /// Close the transport.
    ///
    /// After calling `close()`, subsequent `receive()` calls should return
    /// [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}
