//! Background notification listener.
//!
//! ATORCH meters push a complete telemetry frame on every notification and
//! never expect a reply. The listener task owns the [`Transport`], hands each
//! payload to the shared [`FrameDecoder`], and reports what happened to it as
//! a [`MeterEvent`]. Decoding itself happens later, on the caller's thread,
//! when [`Meter::sample`](shuntlib_core::Meter::sample) is polled.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use shuntlib_core::decoder::FrameDecoder;
use shuntlib_core::error::{Error, Result};
use shuntlib_core::events::MeterEvent;
use shuntlib_core::frame::FrameStatus;
use shuntlib_core::transport::Transport;

/// Pause after an unexpected receive error so a failing transport cannot
/// turn the loop into a busy spin.
const ERROR_BACKOFF: Duration = Duration::from_millis(10);

/// Handle to the background listener task.
pub(crate) struct ListenerHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task_handle: JoinHandle<()>,
}

impl ListenerHandle {
    /// Whether the task has exited on its own (e.g. the link dropped).
    pub(crate) fn is_finished(&self) -> bool {
        self.task_handle.is_finished()
    }

    /// Ask the task to stop, then wait for it to close the transport.
    pub(crate) async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            // The task may already have exited; that is fine.
            let _ = tx.send(());
        }
        self.task_handle
            .await
            .map_err(|e| Error::Transport(format!("listener task failed: {e}")))
    }
}

/// Spawn the listener task.
///
/// The task runs until [`ListenerHandle::shutdown`] is called, the handle is
/// dropped, or the transport reports that the link is gone.
pub(crate) fn spawn_listener(
    transport: Box<dyn Transport>,
    decoder: Arc<FrameDecoder>,
    event_tx: broadcast::Sender<MeterEvent>,
    receive_timeout: Duration,
) -> ListenerHandle {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let task_handle = tokio::spawn(listener_loop(
        transport,
        decoder,
        event_tx,
        receive_timeout,
        shutdown_rx,
    ));
    ListenerHandle {
        shutdown_tx: Some(shutdown_tx),
        task_handle,
    }
}

async fn listener_loop(
    mut transport: Box<dyn Transport>,
    decoder: Arc<FrameDecoder>,
    event_tx: broadcast::Sender<MeterEvent>,
    receive_timeout: Duration,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    debug!("notification listener started");
    let _ = event_tx.send(MeterEvent::Connected);

    loop {
        tokio::select! {
            biased;

            // Fires on an explicit shutdown and when the handle is dropped.
            _ = &mut shutdown_rx => {
                debug!("notification listener stopping");
                break;
            }

            result = transport.receive(receive_timeout) => match result {
                Ok(payload) => handle_payload(&decoder, payload, &event_tx),
                Err(Error::Timeout) => trace!("no notification within receive timeout"),
                Err(Error::NotConnected | Error::ConnectionLost) => {
                    info!("notification stream ended");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "notification receive failed");
                    tokio::time::sleep(ERROR_BACKOFF).await;
                }
            },
        }
    }

    if let Err(e) = transport.close().await {
        debug!(error = %e, "error closing transport");
    }
    let _ = event_tx.send(MeterEvent::Disconnected);
}

/// Offer one payload to the decoder and report the outcome.
fn handle_payload(
    decoder: &FrameDecoder,
    payload: Bytes,
    event_tx: &broadcast::Sender<MeterEvent>,
) {
    let len = payload.len();
    let event = match decoder.accept(payload) {
        FrameStatus::Accepted => MeterEvent::FrameAccepted { len },
        FrameStatus::TooShort { len } => MeterEvent::FrameTooShort { len },
        FrameStatus::BadMarker { len } => MeterEvent::FrameDiscarded { len },
    };
    // No subscribers is not an error.
    let _ = event_tx.send(event);
}
