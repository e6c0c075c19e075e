//! Channel-backed transport for BLE notifications.
//!
//! Most Bluetooth stacks deliver GATT notifications through a callback or a
//! stream owned by the host application. [`channel()`] returns a
//! [`NotificationSender`] to hand to that callback and a
//! [`ChannelTransport`] to hand to a meter builder. Payloads pushed into the
//! sender come out of [`Transport::receive`] in order.
//!
//! # Example
//!
//! ```
//! use shuntlib_core::transport::Transport;
//! use shuntlib_transport::channel;
//! use std::time::Duration;
//!
//! # async fn example() -> shuntlib_core::Result<()> {
//! let (sender, mut transport) = channel(32);
//!
//! // Inside the BLE library's notification callback:
//! sender.try_notify(vec![0xFFu8, 0x55, 0x01, 0x02])?;
//!
//! let payload = transport.receive(Duration::from_secs(1)).await?;
//! assert_eq!(&payload[..], &[0xFF, 0x55, 0x01, 0x02]);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use shuntlib_core::error::{Error, Result};
use shuntlib_core::transport::Transport;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Suggested queue depth for [`channel()`].
///
/// Meters in this family notify about once per second; a few dozen slots
/// absorb scheduling hiccups without holding stale frames for long.
pub const DEFAULT_CAPACITY: usize = 32;

/// Create a connected sender/transport pair with a bounded queue.
pub fn channel(capacity: usize) -> (NotificationSender, ChannelTransport) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        NotificationSender { tx },
        ChannelTransport {
            rx: Some(rx),
            closed_by_peer: false,
        },
    )
}

/// Producer half: hand this to the BLE stack's notification callback.
#[derive(Debug, Clone)]
pub struct NotificationSender {
    tx: mpsc::Sender<Bytes>,
}

impl NotificationSender {
    /// Queue a payload from a synchronous callback.
    ///
    /// If the queue is full the payload is dropped and logged; frames in
    /// this protocol are self-contained snapshots, so losing one only delays
    /// the next update. Returns [`Error::NotConnected`] once the transport
    /// has been closed or dropped.
    pub fn try_notify(&self, payload: impl Into<Bytes>) -> Result<()> {
        match self.tx.try_send(payload.into()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(dropped)) => {
                tracing::warn!(len = dropped.len(), "notification queue full, dropping payload");
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(Error::NotConnected),
        }
    }

    /// Queue a payload, waiting for space if the queue is full.
    pub async fn notify(&self, payload: impl Into<Bytes>) -> Result<()> {
        self.tx
            .send(payload.into())
            .await
            .map_err(|_| Error::NotConnected)
    }

    /// Whether the receiving transport is gone.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half: a [`Transport`] fed by a [`NotificationSender`].
#[derive(Debug)]
pub struct ChannelTransport {
    /// `None` after `close()` is called.
    rx: Option<mpsc::Receiver<Bytes>>,
    /// Set when every sender has been dropped.
    closed_by_peer: bool,
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn receive(&mut self, timeout: Duration) -> Result<Bytes> {
        let rx = self.rx.as_mut().ok_or(Error::NotConnected)?;

        match tokio::time::timeout(timeout, rx.recv()).await {
            Ok(Some(payload)) => {
                tracing::trace!(len = payload.len(), "notification received");
                Ok(payload)
            }
            Ok(None) => {
                if !self.closed_by_peer {
                    tracing::debug!("all notification senders dropped");
                }
                self.closed_by_peer = true;
                Err(Error::ConnectionLost)
            }
            Err(_) => Err(Error::Timeout),
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut rx) = self.rx.take() {
            rx.close();
            tracing::debug!("notification channel closed");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.rx.is_some() && !self.closed_by_peer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_payloads_in_order() {
        let (sender, mut transport) = channel(4);
        sender.try_notify(vec![1u8, 2]).unwrap();
        sender.notify(vec![3u8]).await.unwrap();

        let first = transport.receive(Duration::from_millis(50)).await.unwrap();
        let second = transport.receive(Duration::from_millis(50)).await.unwrap();
        assert_eq!(&first[..], &[1, 2]);
        assert_eq!(&second[..], &[3]);
    }

    #[tokio::test]
    async fn empty_queue_times_out() {
        let (_sender, mut transport) = channel(4);
        let result = transport.receive(Duration::from_millis(10)).await;
        assert!(matches!(result.unwrap_err(), Error::Timeout));
        assert!(transport.is_connected());
    }

    #[tokio::test]
    async fn dropping_senders_reports_connection_lost() {
        let (sender, mut transport) = channel(4);
        sender.try_notify(vec![9u8]).unwrap();
        drop(sender);

        // Queued payloads are still delivered first.
        let payload = transport.receive(Duration::from_millis(50)).await.unwrap();
        assert_eq!(&payload[..], &[9]);

        let result = transport.receive(Duration::from_millis(50)).await;
        assert!(matches!(result.unwrap_err(), Error::ConnectionLost));
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn close_rejects_further_use() {
        let (sender, mut transport) = channel(4);
        transport.close().await.unwrap();
        assert!(!transport.is_connected());

        let result = transport.receive(Duration::from_millis(10)).await;
        assert!(matches!(result.unwrap_err(), Error::NotConnected));
        assert!(sender.is_closed());
        assert!(matches!(
            sender.try_notify(vec![1u8]).unwrap_err(),
            Error::NotConnected
        ));
    }

    #[tokio::test]
    async fn full_queue_drops_without_error() {
        let (sender, mut transport) = channel(1);
        sender.try_notify(vec![1u8]).unwrap();
        sender.try_notify(vec![2u8]).unwrap();

        let payload = transport.receive(Duration::from_millis(50)).await.unwrap();
        assert_eq!(&payload[..], &[1]);
        let result = transport.receive(Duration::from_millis(10)).await;
        assert!(matches!(result.unwrap_err(), Error::Timeout));
    }
}
