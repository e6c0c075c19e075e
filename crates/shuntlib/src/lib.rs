//! # shuntlib -- BLE smart-shunt telemetry decoding
//!
//! `shuntlib` turns the notification payloads pushed by Bluetooth Low Energy
//! battery monitors and DC meters into named, scaled measurements. It does
//! not talk to a Bluetooth adapter itself: the host application owns
//! scanning and connections, identifies a meter from its advertisement with
//! [`find_meter`], and feeds its notifications into a [`Transport`].
//!
//! ## Quick Start
//!
//! ```
//! use shuntlib::{Advertisement, Meter, MeterEvent};
//! use shuntlib_transport::channel;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> shuntlib::Result<()> {
//! let adv = Advertisement::new("CW20_BLE", &["ffe0"], true);
//! let (sender, transport) = channel(32);
//! let meter = shuntlib::connect(&adv, Box::new(transport)).await?;
//! let mut events = meter.subscribe()?;
//!
//! // From the BLE stack's notification callback:
//! let frame = shuntlib::atorch::protocol::encode_frame(120, -2500, 0, 0, 25);
//! sender.try_notify(frame)?;
//!
//! while events.recv().await.ok() != Some(MeterEvent::FrameAccepted { len: 36 }) {}
//! let sample = meter.sample().await?;
//! assert_eq!(sample.get("power"), Some(-30.0));
//! meter.disconnect().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! | Crate                   | Purpose                                         |
//! |-------------------------|-------------------------------------------------|
//! | `shuntlib-core`         | Frame decoding model, [`Meter`] trait, errors   |
//! | `shuntlib-transport`    | Channel transport fed by a BLE callback         |
//! | `shuntlib-atorch`       | ATORCH (CW20) driver                            |
//! | **`shuntlib`**          | This facade crate -- registry and re-exports    |
//!
//! ## Feature Flags
//!
//! | Feature  | Enables                        | Default |
//! |----------|--------------------------------|---------|
//! | `atorch` | [`atorch`] module (CW20)       | yes     |
//!
//! ## Supported Meters
//!
//! - **ATORCH**: CW20 DC meter (`CW20_BLE`, `ATORCH-CW20`)

use tracing::debug;

pub use shuntlib_core::*;

/// ATORCH smart-shunt backend.
///
/// Provides [`AtorchMeter`](atorch::AtorchMeter) and
/// [`AtorchBuilder`](atorch::AtorchBuilder) for the CW20 family.
#[cfg(feature = "atorch")]
pub mod atorch {
    pub use shuntlib_atorch::*;
}

/// Returns all supported meter models across enabled backends.
///
/// # Example
///
/// ```
/// for meter in shuntlib::supported_meters() {
///     println!("{} {}", meter.manufacturer, meter.model_name);
/// }
/// ```
pub fn supported_meters() -> Vec<MeterDefinition> {
    let mut meters = Vec::new();

    #[cfg(feature = "atorch")]
    {
        meters.extend(
            atorch::models::all_atorch_models()
                .iter()
                .map(MeterDefinition::from),
        );
    }

    meters
}

/// Identify a meter from its BLE advertisement.
///
/// Returns the first supported model with a matcher that accepts the
/// advertisement, or `None` if no backend recognises the device.
pub fn find_meter(adv: &Advertisement) -> Option<MeterDefinition> {
    supported_meters().into_iter().find(|def| def.matches(adv))
}

/// Identify a meter from its advertisement and start decoding its
/// notifications from `transport`.
///
/// Fails with [`Error::Unsupported`] if no enabled backend recognises the
/// advertisement.
pub async fn connect(adv: &Advertisement, transport: Box<dyn Transport>) -> Result<Box<dyn Meter>> {
    let name = adv.local_name.as_deref().unwrap_or("<unnamed>");

    #[cfg(feature = "atorch")]
    {
        if let Some(model) = atorch::models::all_atorch_models()
            .into_iter()
            .find(|model| MeterDefinition::from(model).matches(adv))
        {
            debug!(name, model = model.model_id, "matched ATORCH meter");
            let meter = atorch::AtorchBuilder::new(model)
                .build_with_transport(transport)
                .await?;
            return Ok(Box::new(meter));
        }
    }

    debug!(name, "no backend matched advertisement");
    drop(transport);
    Err(Error::Unsupported(format!("no driver for device {name:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shuntlib_test_harness::{CW20_FRAMES, MockTransport};
    use std::time::Duration;

    #[test]
    fn supported_meters_lists_cw20() {
        let meters = supported_meters();
        assert!(meters.iter().any(|m| m.model_id == "CW20"));
        assert!(meters.iter().all(|m| !m.matchers.is_empty()));
    }

    #[test]
    fn find_meter_by_advertisement() {
        let adv = Advertisement::new(
            "ATORCH-CW20",
            &["0000fff0-0000-1000-8000-00805f9b34fb"],
            true,
        );
        let def = find_meter(&adv).expect("CW20 should match");
        assert_eq!(def.manufacturer, Manufacturer::Atorch);
        assert_eq!(def.model_name, "CW20 DC Meter");
        assert_eq!(def.calculated_values, ["power"]);
    }

    #[test]
    fn find_meter_rejects_unknown() {
        assert!(find_meter(&Advertisement::new("Shelly", &["ffe0"], true)).is_none());
        assert!(find_meter(&Advertisement::default()).is_none());
    }

    #[tokio::test]
    async fn connect_unknown_is_unsupported() {
        let adv = Advertisement::new("Shelly", &["ffe0"], true);
        let result = connect(&adv, Box::new(MockTransport::new())).await;
        assert!(matches!(result, Err(Error::Unsupported(_))));
    }

    #[tokio::test]
    async fn connect_decodes_notifications() {
        let adv = Advertisement::new("CW20_BLE", &["ffe0"], true);
        let mock = MockTransport::new();
        let script = mock.handle();
        let meter = connect(&adv, Box::new(mock)).await.unwrap();
        assert_eq!(meter.info().model_id, "CW20");
        assert_eq!(meter.calculated_values(), ["power"]);

        let mut events = meter.subscribe().unwrap();
        script.push(&CW20_FRAMES[3].bytes());
        tokio::time::timeout(Duration::from_secs(2), async {
            while events.recv().await.unwrap() != (MeterEvent::FrameAccepted { len: 36 }) {}
        })
        .await
        .unwrap();

        let sample = meter.sample().await.unwrap();
        assert_eq!(sample.get("voltage"), Some(51.2));
        assert_eq!(sample.get("temperature"), Some(40.0));
        meter.disconnect().await.unwrap();
    }
}
