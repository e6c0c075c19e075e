//! ATORCH model definitions.
//!
//! Each supported ATORCH meter is described by an [`AtorchModel`] that
//! captures how to recognise it from its BLE advertisement, which GATT
//! characteristic carries its notifications, and which frame layout and
//! field table decode them.
//!
//! Models are defined as factory functions (e.g. [`cw20()`]) that return a
//! fully populated [`AtorchModel`]. The following models are supported:
//!
//! | Model | Advertised names          | Services     | Notify | Frame |
//! |-------|---------------------------|--------------|--------|-------|
//! | CW20  | `CW20_BLE`, `ATORCH-CW20` | `ffe0`,`fff0`| `ffe1` | 36 B  |

use shuntlib_core::derived::{self, ComputedField};
use shuntlib_core::error::Result;
use shuntlib_core::field::FieldDescriptor;
use shuntlib_core::frame::FrameLayout;
use shuntlib_core::types::{Manufacturer, MatcherPattern, MeterDefinition, normalize_uuid};
use shuntlib_core::FrameDecoder;

use crate::protocol;

/// Static model definition for an ATORCH meter.
#[derive(Debug, Clone)]
pub struct AtorchModel {
    /// Short model identifier (e.g. "CW20").
    pub model_id: &'static str,
    /// Human-readable model name, as reported in device info.
    pub name: &'static str,
    /// Advertisement patterns that identify this model.
    pub matchers: &'static [MatcherPattern],
    /// GATT services the meter exposes, in short form.
    pub services: &'static [&'static str],
    /// Characteristic that carries telemetry notifications.
    pub rx_characteristic: &'static str,
    /// Frame marker and minimum length.
    pub layout: FrameLayout,
    /// Field table.
    pub fields: &'static [FieldDescriptor],
    /// Values computed from decoded fields.
    pub computed: &'static [ComputedField],
}

impl AtorchModel {
    /// Build a decoder for this model's frames.
    pub fn decoder(&self) -> Result<FrameDecoder> {
        FrameDecoder::new(self.layout, self.fields, self.computed)
    }

    /// GATT services in normalized 128-bit form.
    pub fn service_uuids(&self) -> Vec<String> {
        self.services.iter().map(|s| normalize_uuid(s)).collect()
    }

    /// Notify characteristic in normalized 128-bit form.
    pub fn rx_uuid(&self) -> String {
        normalize_uuid(self.rx_characteristic)
    }

    /// Names of the values computed rather than decoded.
    pub fn calculated_values(&self) -> Vec<&'static str> {
        derived::names(self.computed)
    }
}

impl From<&AtorchModel> for MeterDefinition {
    fn from(model: &AtorchModel) -> Self {
        MeterDefinition {
            manufacturer: Manufacturer::Atorch,
            model_id: model.model_id,
            model_name: model.name,
            matchers: model.matchers,
            calculated_values: model.calculated_values(),
        }
    }
}

const CW20_MATCHERS: &[MatcherPattern] = &[
    MatcherPattern {
        local_name: "CW20_BLE",
        service_uuid: "ffe0",
        connectable: true,
    },
    MatcherPattern {
        local_name: "ATORCH-CW20",
        service_uuid: "ffe0",
        connectable: true,
    },
    MatcherPattern {
        local_name: "CW20_BLE",
        service_uuid: "fff0",
        connectable: true,
    },
    MatcherPattern {
        local_name: "ATORCH-CW20",
        service_uuid: "fff0",
        connectable: true,
    },
];

/// CW20 model definition.
///
/// The ATORCH CW20 is a BLE DC meter / smart shunt that reports voltage,
/// current, accumulated capacity and energy, and temperature about once a
/// second. Firmware revisions advertise under either `CW20_BLE` or
/// `ATORCH-CW20`, with the UART-style service at `ffe0` or `fff0`.
/// Notifications arrive on `ffe1`. The meter has no command characteristic
/// and the driver never writes to it.
pub fn cw20() -> AtorchModel {
    AtorchModel {
        model_id: "CW20",
        name: "CW20 DC Meter",
        matchers: CW20_MATCHERS,
        services: &["ffe0", "fff0"],
        rx_characteristic: "ffe1",
        layout: protocol::CW20_LAYOUT,
        fields: &protocol::CW20_FIELDS,
        computed: &protocol::CW20_COMPUTED,
    }
}

/// Return all supported ATORCH models.
pub fn all_atorch_models() -> Vec<AtorchModel> {
    vec![cw20()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use shuntlib_core::types::Advertisement;

    #[test]
    fn cw20_basic_properties() {
        let model = cw20();
        assert_eq!(model.model_id, "CW20");
        assert_eq!(model.name, "CW20 DC Meter");
        assert_eq!(model.layout.min_len, 36);
        assert_eq!(model.fields.len(), 5);
        assert_eq!(model.calculated_values(), ["power"]);
    }

    #[test]
    fn cw20_uuids() {
        let model = cw20();
        assert_eq!(
            model.service_uuids(),
            [
                "0000ffe0-0000-1000-8000-00805f9b34fb",
                "0000fff0-0000-1000-8000-00805f9b34fb"
            ]
        );
        assert_eq!(model.rx_uuid(), "0000ffe1-0000-1000-8000-00805f9b34fb");
    }

    #[test]
    fn cw20_matches_both_names_and_services() {
        let def = MeterDefinition::from(&cw20());
        for name in ["CW20_BLE", "ATORCH-CW20"] {
            for service in ["ffe0", "fff0"] {
                let adv = Advertisement::new(name, &[service], true);
                assert!(def.matches(&adv), "{name} / {service}");
            }
        }
    }

    #[test]
    fn cw20_ignores_other_devices() {
        let def = MeterDefinition::from(&cw20());
        assert!(!def.matches(&Advertisement::new("JK-BMS", &["ffe0"], true)));
        assert!(!def.matches(&Advertisement::new("CW20_BLE", &["180f"], true)));
        assert!(!def.matches(&Advertisement::new("CW20_BLE", &["ffe0"], false)));
    }

    #[test]
    fn cw20_decoder_builds() {
        assert!(cw20().decoder().is_ok());
    }

    #[test]
    fn definition_from_model() {
        let def = MeterDefinition::from(&cw20());
        assert_eq!(def.manufacturer, Manufacturer::Atorch);
        assert_eq!(def.model_id, "CW20");
        assert_eq!(def.calculated_values, ["power"]);
    }

    #[test]
    fn all_models_listed() {
        let models = all_atorch_models();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].model_id, "CW20");
    }
}
