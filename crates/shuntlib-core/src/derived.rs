//! Computed fields derived from decoded measurements.
//!
//! A [`ComputedField`] names the sample entries it needs and a function that
//! combines them. It is only evaluated when every source is present; a
//! computed value is never produced from partial or default data.

use crate::helpers::round_to;
use crate::sample::Sample;

/// A sample entry computed from other entries rather than read from a frame.
#[derive(Debug, Clone, Copy)]
pub struct ComputedField {
    /// Name of the computed value.
    pub name: &'static str,
    /// Names of the entries it is computed from, in the order `combine`
    /// receives them.
    pub sources: &'static [&'static str],
    /// Combining function. Receives exactly one value per source.
    pub combine: fn(&[f64]) -> f64,
}

impl ComputedField {
    /// Evaluate against `sample` and insert the result.
    ///
    /// Returns `false` (and leaves the sample untouched) if any source is
    /// missing.
    pub fn apply(&self, sample: &mut Sample) -> bool {
        let values: Option<Vec<f64>> = self.sources.iter().map(|s| sample.get(s)).collect();
        match values {
            Some(values) => {
                sample.insert(self.name, (self.combine)(&values));
                true
            }
            None => false,
        }
    }
}

/// Apply each computed field in order.
pub fn apply_all(computed: &[ComputedField], sample: &mut Sample) {
    for field in computed {
        field.apply(sample);
    }
}

/// Names of `computed`, in evaluation order.
pub fn names(computed: &[ComputedField]) -> Vec<&'static str> {
    computed.iter().map(|c| c.name).collect()
}

fn rounded_product(values: &[f64]) -> f64 {
    round_to(values.iter().product(), 2)
}

/// `power = round(voltage * current, 2)`, in watts.
pub const POWER: ComputedField = ComputedField {
    name: "power",
    sources: &["voltage", "current"],
    combine: rounded_product,
};
