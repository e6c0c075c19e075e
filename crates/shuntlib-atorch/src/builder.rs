//! AtorchBuilder -- fluent builder for constructing [`AtorchMeter`] instances.
//!
//! # Example
//!
//! ```
//! use shuntlib_atorch::builder::AtorchBuilder;
//! use shuntlib_atorch::models::cw20;
//! use shuntlib_core::Meter;
//! use shuntlib_test_harness::MockTransport;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> shuntlib_core::Result<()> {
//! let meter = AtorchBuilder::new(cw20())
//!     .receive_timeout(Duration::from_millis(500))
//!     .build_with_transport(Box::new(MockTransport::new()))
//!     .await?;
//! assert!(meter.sample().await?.is_empty());
//! meter.disconnect().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::debug;

use shuntlib_core::decoder::FrameDecoder;
use shuntlib_core::derived::ComputedField;
use shuntlib_core::error::{Error, Result};
use shuntlib_core::field::FieldDescriptor;
use shuntlib_core::transport::Transport;

use crate::meter::AtorchMeter;
use crate::models::AtorchModel;
use crate::notify;

/// Default per-receive timeout of the notification listener.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(1);

/// Default depth of the event broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Fluent builder for [`AtorchMeter`].
pub struct AtorchBuilder {
    model: AtorchModel,
    receive_timeout: Duration,
    event_capacity: usize,
}

impl AtorchBuilder {
    /// Create a new builder for the given ATORCH model.
    pub fn new(model: AtorchModel) -> Self {
        AtorchBuilder {
            model,
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// How long a single receive waits before the listener loops again
    /// (default: 1s). Only affects how quickly an idle listener notices a
    /// shutdown request from a transport that ignores cancellation.
    pub fn receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = timeout;
        self
    }

    /// Set the depth of the event broadcast channel (default: 256).
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Replace the model's field table, e.g. for a firmware variant that
    /// moves a field. Checked against the layout at build time.
    pub fn fields(mut self, fields: &'static [FieldDescriptor]) -> Self {
        self.model.fields = fields;
        self
    }

    /// Replace the model's computed fields. The meter's calculated value
    /// names follow from them.
    pub fn computed(mut self, computed: &'static [ComputedField]) -> Self {
        self.model.computed = computed;
        self
    }

    /// Build an [`AtorchMeter`] that listens on a caller-provided transport.
    ///
    /// The transport is typically a `ChannelTransport` from
    /// `shuntlib-transport` fed by the host's BLE stack, or a
    /// `MockTransport` from `shuntlib-test-harness`.
    /// Fails with [`Error::InvalidFieldTable`] if the field table does not
    /// fit the frame layout.
    pub async fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<AtorchMeter> {
        if self.event_capacity == 0 {
            return Err(Error::InvalidParameter(
                "event capacity must be at least 1".into(),
            ));
        }
        if self.receive_timeout.is_zero() {
            return Err(Error::InvalidParameter(
                "receive timeout must be non-zero".into(),
            ));
        }
        let decoder: Arc<FrameDecoder> = Arc::new(self.model.decoder()?);
        let (event_tx, first_rx) = broadcast::channel(self.event_capacity);
        let listener = notify::spawn_listener(
            transport,
            Arc::clone(&decoder),
            event_tx.clone(),
            self.receive_timeout,
        );

        debug!(
            model = self.model.model_id,
            rx = %self.model.rx_uuid(),
            "ATORCH meter listening"
        );
        Ok(AtorchMeter::new(
            self.model, decoder, event_tx, first_rx, listener,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cw20;
    use shuntlib_core::derived::POWER;
    use shuntlib_core::events::MeterEvent;
    use shuntlib_core::field::Scale;
    use shuntlib_core::Meter;
    use shuntlib_test_harness::MockTransport;

    static OUT_OF_BOUNDS: [FieldDescriptor; 1] =
        [FieldDescriptor::new("voltage", 34, 3, false, Scale::Divide(10.0))];

    static VOLTAGE_ONLY: [FieldDescriptor; 1] =
        [FieldDescriptor::new("voltage", 4, 3, false, Scale::Divide(10.0))];

    static NO_COMPUTED: [ComputedField; 0] = [];

    static POWER_ONLY: [ComputedField; 1] = [POWER];

    #[test]
    fn builder_defaults() {
        let builder = AtorchBuilder::new(cw20());
        assert_eq!(builder.receive_timeout, DEFAULT_RECEIVE_TIMEOUT);
        assert_eq!(builder.event_capacity, DEFAULT_EVENT_CAPACITY);
        assert_eq!(builder.model.fields.len(), 5);
    }

    #[test]
    fn builder_fluent_chain() {
        let builder = AtorchBuilder::new(cw20())
            .receive_timeout(Duration::from_millis(250))
            .event_capacity(8);
        assert_eq!(builder.receive_timeout, Duration::from_millis(250));
        assert_eq!(builder.event_capacity, 8);
    }

    #[tokio::test]
    async fn zero_event_capacity_rejected() {
        let result = AtorchBuilder::new(cw20())
            .event_capacity(0)
            .build_with_transport(Box::new(MockTransport::new()))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn zero_receive_timeout_rejected() {
        let result = AtorchBuilder::new(cw20())
            .receive_timeout(Duration::ZERO)
            .build_with_transport(Box::new(MockTransport::new()))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn out_of_bounds_field_rejected() {
        let result = AtorchBuilder::new(cw20())
            .fields(&OUT_OF_BOUNDS)
            .computed(&NO_COMPUTED)
            .build_with_transport(Box::new(MockTransport::new()))
            .await;
        assert!(matches!(result, Err(Error::InvalidFieldTable(_))));
    }

    #[tokio::test]
    async fn calculated_values_follow_computed_fields() {
        let meter = AtorchBuilder::new(cw20())
            .computed(&POWER_ONLY)
            .build_with_transport(Box::new(MockTransport::new()))
            .await
            .unwrap();
        assert_eq!(meter.calculated_values(), ["power"]);
        meter.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn first_subscriber_sees_connected() {
        let meter = AtorchBuilder::new(cw20())
            .build_with_transport(Box::new(MockTransport::new()))
            .await
            .unwrap();
        let mut events = meter.subscribe().unwrap();
        let first = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first, MeterEvent::Connected);
        meter.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn reduced_table_omits_power() {
        let meter = AtorchBuilder::new(cw20())
            .fields(&VOLTAGE_ONLY)
            .computed(&NO_COMPUTED)
            .build_with_transport(Box::new(MockTransport::new()))
            .await
            .unwrap();
        assert!(meter.calculated_values().is_empty());
        assert_eq!(meter.model().fields.len(), 1);
        meter.disconnect().await.unwrap();
    }
}
