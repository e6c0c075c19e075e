//! Decoded measurement sets.

use std::collections::BTreeMap;
use std::fmt;

use crate::helpers::format_measurement;

/// Named, scaled measurements decoded from one frame.
///
/// Keys are the field names from the field table plus any computed fields.
/// A sample is empty when no valid frame has been received yet; absence of
/// data is a normal state, not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    values: BTreeMap<&'static str, f64>,
}

impl Sample {
    /// Create an empty sample.
    pub fn new() -> Self {
        Sample::default()
    }

    /// Look up a value by field name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Whether the sample has a value for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Insert or overwrite a value.
    pub fn insert(&mut self, name: &'static str, value: f64) {
        self.values.insert(name, value);
    }

    /// Number of values in the sample.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the sample holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.values.iter().map(|(name, value)| (*name, *value))
    }
}

impl FromIterator<(&'static str, f64)> for Sample {
    fn from_iter<I: IntoIterator<Item = (&'static str, f64)>>(iter: I) -> Self {
        Sample {
            values: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(no data)");
        }
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", format_measurement(name, value))?;
        }
        Ok(())
    }
}
