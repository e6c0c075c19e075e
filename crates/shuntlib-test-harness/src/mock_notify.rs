//! Mock transport for deterministic testing of meter drivers.
//!
//! [`MockTransport`] implements the [`Transport`] trait with a script of
//! notification payloads, timeouts, and disconnects. Steps can be queued
//! before the transport is handed to a driver, or afterwards through a
//! [`MockHandle`] so a test can observe the driver react to each payload.
//!
//! # Example
//!
//! ```
//! use shuntlib_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! let handle = mock.handle();
//! // Queued before the driver starts.
//! mock.push(&[0xFF, 0x55, 0x01, 0x02]);
//! // Queued later, e.g. after subscribing to driver events.
//! handle.push(&[0xFF, 0x55, 0x01, 0x03]);
//! handle.disconnect();
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use shuntlib_core::error::{Error, Result};
use shuntlib_core::transport::Transport;

/// One scripted transport behaviour.
#[derive(Debug, Clone)]
enum Step {
    /// Deliver a notification payload.
    Notify(Bytes),
    /// Report a timeout immediately.
    Timeout,
    /// Report that the link dropped.
    Disconnect,
}

#[derive(Debug, Default)]
struct Script {
    steps: VecDeque<Step>,
    delivered: usize,
}

/// Cloneable handle for queueing steps on a [`MockTransport`] that has
/// already been moved into a driver.
#[derive(Debug, Clone)]
pub struct MockHandle {
    script: Arc<Mutex<Script>>,
}

impl MockHandle {
    /// Queue a notification payload.
    pub fn push(&self, payload: &[u8]) {
        self.script
            .lock()
            .steps
            .push_back(Step::Notify(Bytes::copy_from_slice(payload)));
    }

    /// Queue an immediate timeout.
    pub fn push_timeout(&self) {
        self.script.lock().steps.push_back(Step::Timeout);
    }

    /// Queue a link drop. The transport reports
    /// [`Error::ConnectionLost`] when it reaches this step.
    pub fn disconnect(&self) {
        self.script.lock().steps.push_back(Step::Disconnect);
    }

    /// Number of payloads handed out so far.
    pub fn delivered(&self) -> usize {
        self.script.lock().delivered
    }

    /// Number of steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().steps.len()
    }
}

/// A mock [`Transport`] for testing meter drivers without hardware.
///
/// Steps are consumed in order. When the script is empty, `receive()` waits
/// out its timeout and returns [`Error::Timeout`], like an idle BLE link.
#[derive(Debug)]
pub struct MockTransport {
    script: Arc<Mutex<Script>>,
    /// Whether the transport is "connected".
    connected: bool,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            script: Arc::new(Mutex::new(Script::default())),
            connected: true,
        }
    }

    /// Create a mock preloaded with notification payloads.
    pub fn with_notifications<I, P>(payloads: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let mock = MockTransport::new();
        for payload in payloads {
            mock.push(payload.as_ref());
        }
        mock
    }

    /// A handle for queueing more steps later.
    pub fn handle(&self) -> MockHandle {
        MockHandle {
            script: Arc::clone(&self.script),
        }
    }

    /// Queue a notification payload.
    pub fn push(&self, payload: &[u8]) {
        self.handle().push(payload);
    }

    /// Queue an immediate timeout.
    pub fn push_timeout(&self) {
        self.handle().push_timeout();
    }

    /// Queue a link drop.
    pub fn disconnect(&self) {
        self.handle().disconnect();
    }

    /// Set the connected state of the mock transport.
    ///
    /// When set to `false`, subsequent `receive()` calls will return
    /// [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn receive(&mut self, timeout: Duration) -> Result<Bytes> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        let step = {
            let mut script = self.script.lock();
            let step = script.steps.pop_front();
            if matches!(step, Some(Step::Notify(_))) {
                script.delivered += 1;
            }
            step
        };

        match step {
            Some(Step::Notify(payload)) => Ok(payload),
            Some(Step::Timeout) => Err(Error::Timeout),
            Some(Step::Disconnect) => {
                self.connected = false;
                Err(Error::ConnectionLost)
            }
            None => {
                tokio::time::sleep(timeout).await;
                Err(Error::Timeout)
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.script.lock().steps.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn delivers_scripted_payloads_in_order() {
        let mut mock = MockTransport::with_notifications([&[1u8, 2][..], &[3u8][..]]);

        assert_eq!(&mock.receive(WAIT).await.unwrap()[..], &[1, 2]);
        assert_eq!(&mock.receive(WAIT).await.unwrap()[..], &[3]);
        assert_eq!(mock.handle().delivered(), 2);
    }

    #[tokio::test]
    async fn empty_script_times_out() {
        let mut mock = MockTransport::new();
        let result = mock.receive(WAIT).await;
        assert!(matches!(result.unwrap_err(), Error::Timeout));
    }

    #[tokio::test]
    async fn scripted_timeout_then_payload() {
        let mut mock = MockTransport::new();
        mock.push_timeout();
        mock.push(&[7]);

        assert!(matches!(mock.receive(WAIT).await.unwrap_err(), Error::Timeout));
        assert_eq!(&mock.receive(WAIT).await.unwrap()[..], &[7]);
    }

    #[tokio::test]
    async fn handle_pushes_after_move() {
        let mock = MockTransport::new();
        let handle = mock.handle();
        let mut moved: Box<dyn Transport> = Box::new(mock);

        handle.push(&[0xAA]);
        assert_eq!(handle.remaining(), 1);
        assert_eq!(&moved.receive(WAIT).await.unwrap()[..], &[0xAA]);
        assert_eq!(handle.remaining(), 0);
    }

    #[tokio::test]
    async fn disconnect_step_drops_link() {
        let mut mock = MockTransport::new();
        mock.disconnect();
        mock.push(&[1]);

        assert!(matches!(
            mock.receive(WAIT).await.unwrap_err(),
            Error::ConnectionLost
        ));
        assert!(!mock.is_connected());
        assert!(matches!(
            mock.receive(WAIT).await.unwrap_err(),
            Error::NotConnected
        ));
    }

    #[tokio::test]
    async fn close_clears_script() {
        let mut mock = MockTransport::new();
        mock.push(&[1]);
        mock.close().await.unwrap();

        assert!(!mock.is_connected());
        assert_eq!(mock.handle().remaining(), 0);
        assert!(matches!(
            mock.receive(WAIT).await.unwrap_err(),
            Error::NotConnected
        ));
    }

    #[tokio::test]
    async fn set_connected_false() {
        let mut mock = MockTransport::new();
        mock.push(&[1]);
        mock.set_connected(false);
        assert!(matches!(
            mock.receive(WAIT).await.unwrap_err(),
            Error::NotConnected
        ));
    }
}
