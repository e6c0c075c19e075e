//! The `Meter` trait -- unified interface for all meter backends.
//!
//! Applications (dashboards, battery monitors, home automation bridges)
//! program against `dyn Meter` without needing to know which vendor's frame
//! format is in use. Each vendor backend provides a concrete type that
//! implements this trait.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::Result;
use crate::events::MeterEvent;
use crate::sample::Sample;
use crate::types::MeterInfo;

/// Unified asynchronous interface to a connected meter.
///
/// Notifications are consumed in the background as they arrive; the host
/// polls [`sample()`](Meter::sample) on whatever cadence it likes to get the
/// latest decoded measurements.
#[async_trait]
pub trait Meter: Send + Sync {
    /// Return static information about the connected meter.
    fn info(&self) -> &MeterInfo;

    /// Names of the values this driver computes rather than reads from a
    /// frame (e.g. `["power"]`).
    fn calculated_values(&self) -> &[&'static str];

    /// Decode the most recent valid frame.
    ///
    /// Returns an empty [`Sample`] if no valid frame has arrived yet.
    /// Malformed notifications never cause an error here; they are simply
    /// not reflected in the result.
    async fn sample(&self) -> Result<Sample>;

    /// Subscribe to diagnostic events (frame accepted, frame too short,
    /// disconnect).
    ///
    /// The first call returns a receiver that existed before the listener
    /// started, so it also sees [`MeterEvent::Connected`]. Later receivers
    /// only see events sent after they subscribed.
    fn subscribe(&self) -> Result<broadcast::Receiver<MeterEvent>>;

    /// Stop consuming notifications and close the transport.
    ///
    /// The last decoded frame stays available through `sample()`.
    async fn disconnect(&self) -> Result<()>;
}
