//! Declarative field tables.
//!
//! A [`FieldDescriptor`] says where one measurement lives in a frame and how
//! to turn its raw big-endian integer into a physical quantity. A backend's
//! field table is a `static` slice of descriptors; the generic
//! [`FrameDecoder`](crate::decoder::FrameDecoder) walks it in order.
//!
//! ```
//! use shuntlib_core::field::{FieldDescriptor, Scale};
//!
//! const VOLTAGE: FieldDescriptor =
//!     FieldDescriptor::new("voltage", 4, 3, false, Scale::Divide(10.0));
//!
//! let frame = [0xFF, 0x55, 0x01, 0x02, 0x00, 0x00, 0x78];
//! assert_eq!(VOLTAGE.read(&frame), Some(12.0));
//! ```

use crate::derived::ComputedField;
use crate::error::{Error, Result};
use crate::frame::FrameLayout;

/// Widest integer a descriptor may span.
pub const MAX_FIELD_LEN: usize = 8;

/// How a raw integer becomes a physical value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// Use the integer as-is.
    Raw,
    /// Divide by a constant, e.g. `Divide(1000.0)` for mA to A.
    Divide(f64),
    /// Any other mapping.
    Custom(fn(i64) -> f64),
}

impl Scale {
    /// Apply the scaling to a signed raw value.
    pub fn apply(&self, raw: i64) -> f64 {
        match self {
            Scale::Raw => raw as f64,
            Scale::Divide(divisor) => raw as f64 / divisor,
            Scale::Custom(f) => f(raw),
        }
    }

    /// Apply the scaling to an unsigned raw value.
    ///
    /// `Raw` and `Divide` work on the full `u64` range. `Custom` takes an
    /// `i64`, so values above `i64::MAX` yield `None`.
    pub fn apply_unsigned(&self, raw: u64) -> Option<f64> {
        match self {
            Scale::Raw => Some(raw as f64),
            Scale::Divide(divisor) => Some(raw as f64 / divisor),
            Scale::Custom(f) => i64::try_from(raw).ok().map(f),
        }
    }
}

/// Location and interpretation of one measurement within a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    /// Measurement name, used as the key in a [`Sample`](crate::sample::Sample).
    pub name: &'static str,
    /// Zero-based byte offset of the big-endian integer.
    pub offset: usize,
    /// Width of the integer in bytes.
    pub length: usize,
    /// Whether the integer is two's-complement signed.
    pub signed: bool,
    /// Raw-to-physical mapping.
    pub scale: Scale,
}

impl FieldDescriptor {
    /// Create a descriptor. Usable in `const` and `static` tables.
    pub const fn new(
        name: &'static str,
        offset: usize,
        length: usize,
        signed: bool,
        scale: Scale,
    ) -> Self {
        FieldDescriptor {
            name,
            offset,
            length,
            signed,
            scale,
        }
    }

    /// One past the last byte this field reads.
    pub const fn end(&self) -> usize {
        self.offset + self.length
    }

    /// The big-endian bytes of this field as an unsigned integer.
    fn read_bits(&self, frame: &[u8]) -> Option<u64> {
        if self.length == 0 || self.length > MAX_FIELD_LEN {
            return None;
        }
        let bytes = frame.get(self.offset..self.end())?;
        Some(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }

    /// Read the raw integer, sign-extended over exactly `length` bytes when
    /// the field is signed.
    ///
    /// Returns `None` if the frame is too short for this field, the
    /// descriptor width is outside `1..=MAX_FIELD_LEN`, or an unsigned
    /// 8-byte value does not fit in an `i64`.
    pub fn read_raw(&self, frame: &[u8]) -> Option<i64> {
        let bits = self.read_bits(frame)?;
        if self.signed {
            let shift = 64 - 8 * self.length as u32;
            Some(((bits << shift) as i64) >> shift)
        } else {
            i64::try_from(bits).ok()
        }
    }

    /// Read and scale the field. Unsigned fields never scale to a negative
    /// raw value.
    pub fn read(&self, frame: &[u8]) -> Option<f64> {
        if self.signed {
            self.read_raw(frame).map(|raw| self.scale.apply(raw))
        } else {
            self.scale.apply_unsigned(self.read_bits(frame)?)
        }
    }
}

/// Check a field table and its computed fields against a frame layout.
///
/// Every descriptor must fit inside `layout.min_len`, be 1 to
/// [`MAX_FIELD_LEN`] bytes wide, and not overlap any other descriptor.
/// Names must be unique across decoded and computed fields.
pub fn validate_table(
    layout: &FrameLayout,
    fields: &[FieldDescriptor],
    computed: &[ComputedField],
) -> Result<()> {
    if layout.marker.len() > layout.min_len {
        return Err(Error::InvalidFieldTable(format!(
            "marker is {} bytes but minimum frame length is {}",
            layout.marker.len(),
            layout.min_len
        )));
    }

    for (i, field) in fields.iter().enumerate() {
        if field.length == 0 || field.length > MAX_FIELD_LEN {
            return Err(Error::InvalidFieldTable(format!(
                "field \"{}\" is {} bytes wide, expected 1..={MAX_FIELD_LEN}",
                field.name, field.length
            )));
        }
        if field.length == MAX_FIELD_LEN
            && !field.signed
            && matches!(field.scale, Scale::Custom(_))
        {
            return Err(Error::InvalidFieldTable(format!(
                "field \"{}\" is an unsigned 8-byte value, too wide for a custom scale",
                field.name
            )));
        }
        if field.end() > layout.min_len {
            return Err(Error::InvalidFieldTable(format!(
                "field \"{}\" ends at byte {} but frames may be {} bytes",
                field.name,
                field.end(),
                layout.min_len
            )));
        }
        for other in &fields[..i] {
            if other.name == field.name {
                return Err(Error::InvalidFieldTable(format!(
                    "duplicate field \"{}\"",
                    field.name
                )));
            }
            if field.offset < other.end() && other.offset < field.end() {
                return Err(Error::InvalidFieldTable(format!(
                    "field \"{}\" overlaps \"{}\"",
                    field.name, other.name
                )));
            }
        }
    }

    for (i, derived) in computed.iter().enumerate() {
        let clashes_with_field = fields.iter().any(|f| f.name == derived.name);
        let clashes_with_computed = computed[..i].iter().any(|c| c.name == derived.name);
        if clashes_with_field || clashes_with_computed {
            return Err(Error::InvalidFieldTable(format!(
                "duplicate field \"{}\"",
                derived.name
            )));
        }
    }

    Ok(())
}
