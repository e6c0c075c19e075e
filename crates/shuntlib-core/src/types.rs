//! Core identification types used throughout shuntlib.
//!
//! These describe *which* meter is on the other end of a BLE link: the
//! advertisement patterns a backend recognises, and the static information
//! it reports once connected.

use std::fmt;

/// Manufacturer of a supported meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Manufacturer {
    /// ATORCH (CW20 and related DC meters).
    Atorch,
}

impl fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Manufacturer::Atorch => write!(f, "ATORCH"),
        }
    }
}

/// Static information about a connected meter.
///
/// Returned by [`crate::meter::Meter::info()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeterInfo {
    /// The manufacturer of the meter.
    pub manufacturer: Manufacturer,
    /// Human-readable model name (e.g. "CW20 DC Meter").
    pub model_name: String,
    /// Short model identifier (e.g. "CW20").
    pub model_id: String,
}

/// Bluetooth base UUID suffix used to expand 16- and 32-bit short UUIDs.
const BLUETOOTH_BASE_SUFFIX: &str = "-0000-1000-8000-00805f9b34fb";

/// Normalize a UUID string to its lowercase 128-bit form.
///
/// 16-bit (`"ffe0"`) and 32-bit short forms are expanded with the Bluetooth
/// base UUID. Anything else is returned lowercased.
///
/// ```
/// use shuntlib_core::normalize_uuid;
///
/// assert_eq!(normalize_uuid("FFE0"), "0000ffe0-0000-1000-8000-00805f9b34fb");
/// ```
pub fn normalize_uuid(uuid: &str) -> String {
    let lower = uuid.trim().to_ascii_lowercase();
    let is_hex = !lower.is_empty() && lower.chars().all(|c| c.is_ascii_hexdigit());
    match lower.len() {
        4 if is_hex => format!("0000{lower}{BLUETOOTH_BASE_SUFFIX}"),
        8 if is_hex => format!("{lower}{BLUETOOTH_BASE_SUFFIX}"),
        _ => lower,
    }
}

/// What a host saw in one BLE advertisement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Advertisement {
    /// Advertised local name, if any.
    pub local_name: Option<String>,
    /// Advertised service UUIDs, in any supported form.
    pub service_uuids: Vec<String>,
    /// Whether the device accepts connections.
    pub connectable: bool,
}

impl Advertisement {
    /// Create an advertisement with a name and service list.
    pub fn new(local_name: &str, service_uuids: &[&str], connectable: bool) -> Self {
        Advertisement {
            local_name: Some(local_name.to_string()),
            service_uuids: service_uuids.iter().map(|s| s.to_string()).collect(),
            connectable,
        }
    }
}

/// One advertisement pattern a backend recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatcherPattern {
    /// Exact local name the device advertises.
    pub local_name: &'static str,
    /// Service UUID that must be advertised alongside the name.
    pub service_uuid: &'static str,
    /// Whether the device must be connectable.
    pub connectable: bool,
}

impl MatcherPattern {
    /// Check an advertisement against this pattern.
    pub fn matches(&self, adv: &Advertisement) -> bool {
        if adv.local_name.as_deref() != Some(self.local_name) {
            return false;
        }
        if self.connectable && !adv.connectable {
            return false;
        }
        let wanted = normalize_uuid(self.service_uuid);
        adv.service_uuids
            .iter()
            .any(|uuid| normalize_uuid(uuid) == wanted)
    }
}

/// A supported meter model with enough information to pick a backend.
///
/// Obtained via `shuntlib::supported_meters()` (facade crate) or by
/// converting a manufacturer-specific model type via its `From`
/// implementation.
#[derive(Debug, Clone)]
pub struct MeterDefinition {
    /// The manufacturer of the meter.
    pub manufacturer: Manufacturer,
    /// Short model identifier (e.g. "CW20").
    pub model_id: &'static str,
    /// Human-readable model name.
    pub model_name: &'static str,
    /// Advertisement patterns that identify this model.
    pub matchers: &'static [MatcherPattern],
    /// Names of values the driver computes rather than decodes.
    pub calculated_values: Vec<&'static str>,
}

impl MeterDefinition {
    /// Whether any of this model's patterns matches the advertisement.
    pub fn matches(&self, adv: &Advertisement) -> bool {
        self.matchers.iter().any(|m| m.matches(adv))
    }
}
