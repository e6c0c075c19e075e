//! AtorchMeter -- the [`Meter`] trait implementation for ATORCH meters.
//!
//! Ties the frame definitions in [`protocol`](crate::protocol) and
//! [`models`](crate::models) to a running notification listener. The
//! listener feeds the shared [`FrameDecoder`]; `sample()` decodes whatever
//! frame it retained last.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex as SyncMutex;
use tokio::sync::{Mutex, broadcast};
use tracing::debug;

use shuntlib_core::decoder::FrameDecoder;
use shuntlib_core::error::Result;
use shuntlib_core::events::MeterEvent;
use shuntlib_core::meter::Meter;
use shuntlib_core::sample::Sample;
use shuntlib_core::types::{Manufacturer, MeterInfo};

use crate::models::AtorchModel;
use crate::notify::ListenerHandle;

/// A connected ATORCH meter.
///
/// Constructed via [`AtorchBuilder`](crate::builder::AtorchBuilder).
pub struct AtorchMeter {
    model: AtorchModel,
    info: MeterInfo,
    calculated_values: Vec<&'static str>,
    decoder: Arc<FrameDecoder>,
    event_tx: broadcast::Sender<MeterEvent>,
    /// Receiver created before the listener started; handed to the first
    /// `subscribe()` so it sees `Connected`.
    first_rx: SyncMutex<Option<broadcast::Receiver<MeterEvent>>>,
    /// `None` once `disconnect()` has run.
    listener: Mutex<Option<ListenerHandle>>,
}

impl AtorchMeter {
    pub(crate) fn new(
        model: AtorchModel,
        decoder: Arc<FrameDecoder>,
        event_tx: broadcast::Sender<MeterEvent>,
        first_rx: broadcast::Receiver<MeterEvent>,
        listener: ListenerHandle,
    ) -> Self {
        let info = MeterInfo {
            manufacturer: Manufacturer::Atorch,
            model_name: model.name.to_string(),
            model_id: model.model_id.to_string(),
        };
        AtorchMeter {
            calculated_values: model.calculated_values(),
            model,
            info,
            decoder,
            event_tx,
            first_rx: SyncMutex::new(Some(first_rx)),
            listener: Mutex::new(Some(listener)),
        }
    }

    /// The model definition this meter was built from.
    pub fn model(&self) -> &AtorchModel {
        &self.model
    }

    /// Whether at least one valid frame has been received.
    pub fn has_frame(&self) -> bool {
        self.decoder.has_frame()
    }

    /// Whether the notification listener is still running.
    pub async fn is_listening(&self) -> bool {
        self.listener
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

#[async_trait]
impl Meter for AtorchMeter {
    fn info(&self) -> &MeterInfo {
        &self.info
    }

    fn calculated_values(&self) -> &[&'static str] {
        &self.calculated_values
    }

    async fn sample(&self) -> Result<Sample> {
        Ok(self.decoder.decode())
    }

    fn subscribe(&self) -> Result<broadcast::Receiver<MeterEvent>> {
        match self.first_rx.lock().take() {
            Some(rx) => Ok(rx),
            None => Ok(self.event_tx.subscribe()),
        }
    }

    async fn disconnect(&self) -> Result<()> {
        let handle = self.listener.lock().await.take();
        match handle {
            Some(handle) => {
                handle.shutdown().await?;
                debug!(model = self.model.model_id, "meter disconnected");
            }
            None => debug!("meter already disconnected"),
        }
        Ok(())
    }
}
