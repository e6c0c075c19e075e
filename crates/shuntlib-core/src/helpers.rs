//! Rounding and formatting helpers for meter readings.

/// Round `value` to `decimals` decimal places.
///
/// Rounds the exact binary value of `value`, not a rescaled copy, so
/// `10.1 * -18.25` (stored as -184.324999...) becomes -184.32. `{:.N}`
/// formatting is correctly rounded, which gives the same result as
/// Python's `round(x, n)`.
///
/// ```
/// use shuntlib_core::round_to;
///
/// assert_eq!(round_to(-30.004, 2), -30.0);
/// assert_eq!(round_to(12.345_6, 2), 12.35);
/// assert_eq!(round_to(2.675, 2), 2.67);
/// ```
pub fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

/// Display unit for a well-known measurement name, if any.
///
/// Returns `None` for names this crate does not know about; callers print
/// such values without a unit.
pub fn unit_for(name: &str) -> Option<&'static str> {
    match name {
        "voltage" => Some("V"),
        "current" => Some("A"),
        "capacity" => Some("Ah"),
        "energy" => Some("kWh"),
        "temperature" => Some("°C"),
        "power" => Some("W"),
        _ => None,
    }
}

/// Format one reading as `"name: value unit"`.
///
/// ```
/// use shuntlib_core::format_measurement;
///
/// assert_eq!(format_measurement("voltage", 12.0), "voltage: 12.000 V");
/// assert_eq!(format_measurement("cycles", 4.0), "cycles: 4.000");
/// ```
pub fn format_measurement(name: &str, value: f64) -> String {
    match unit_for(name) {
        Some(unit) => format!("{name}: {value:.3} {unit}"),
        None => format!("{name}: {value:.3}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_two_places() {
        assert_eq!(round_to(1.004, 2), 1.0);
        assert_eq!(round_to(1.006, 2), 1.01);
        assert_eq!(round_to(-2.5 * 12.0, 2), -30.0);
    }

    #[test]
    fn round_to_uses_exact_binary_value() {
        // Each literal sits just below the decimal half-way point.
        assert_eq!(round_to(2.675, 2), 2.67);
        assert_eq!(round_to(1.005, 2), 1.0);
        assert_eq!(round_to(10.1 * -18.25, 2), -184.32);
    }

    #[test]
    fn round_to_non_finite_passes_through() {
        assert!(round_to(f64::NAN, 2).is_nan());
        assert_eq!(round_to(f64::INFINITY, 2), f64::INFINITY);
    }

    #[test]
    fn round_to_zero_places() {
        assert_eq!(round_to(25.4, 0), 25.0);
    }

    #[test]
    fn units_for_known_fields() {
        assert_eq!(unit_for("current"), Some("A"));
        assert_eq!(unit_for("energy"), Some("kWh"));
        assert_eq!(unit_for("power"), Some("W"));
        assert_eq!(unit_for("unknown"), None);
    }

    #[test]
    fn format_negative_current() {
        assert_eq!(format_measurement("current", -2.5), "current: -2.500 A");
    }
}
