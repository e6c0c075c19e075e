//! Frame layout and acceptance rules.
//!
//! Meters in this family push one self-contained telemetry snapshot per BLE
//! notification. There is no length prefix and no checksum: a payload is
//! considered a frame when it begins with the vendor's marker bytes and is
//! at least as long as the fixed layout requires.

/// Header marker and minimum length that a notification must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    /// Bytes every frame starts with.
    pub marker: &'static [u8],
    /// Minimum valid frame length in bytes, marker included.
    pub min_len: usize,
}

/// Outcome of checking a payload against a [`FrameLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// The payload is a usable frame.
    Accepted,
    /// The marker matched but the payload is shorter than `min_len`.
    TooShort {
        /// Payload length in bytes.
        len: usize,
    },
    /// The payload does not begin with the marker.
    BadMarker {
        /// Payload length in bytes.
        len: usize,
    },
}

impl FrameStatus {
    /// Whether the payload was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, FrameStatus::Accepted)
    }
}

impl FrameLayout {
    /// Create a layout from a marker and minimum length.
    pub const fn new(marker: &'static [u8], min_len: usize) -> Self {
        FrameLayout { marker, min_len }
    }

    /// Classify a payload.
    ///
    /// Never fails: empty and truncated payloads are reported as
    /// [`FrameStatus::BadMarker`] or [`FrameStatus::TooShort`].
    pub fn check(&self, payload: &[u8]) -> FrameStatus {
        if !payload.starts_with(self.marker) {
            return FrameStatus::BadMarker { len: payload.len() };
        }
        if payload.len() < self.min_len {
            return FrameStatus::TooShort { len: payload.len() };
        }
        FrameStatus::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: FrameLayout = FrameLayout::new(&[0xFF, 0x55], 8);

    #[test]
    fn accepts_marker_and_min_length() {
        let payload = [0xFF, 0x55, 0, 0, 0, 0, 0, 0];
        assert_eq!(LAYOUT.check(&payload), FrameStatus::Accepted);
    }

    #[test]
    fn accepts_longer_than_min_length() {
        let payload = [0xFF, 0x55, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(LAYOUT.check(&payload).is_accepted());
    }

    #[test]
    fn too_short_with_marker() {
        let payload = [0xFF, 0x55, 0x01];
        assert_eq!(LAYOUT.check(&payload), FrameStatus::TooShort { len: 3 });
    }

    #[test]
    fn wrong_marker() {
        let payload = [0x55, 0xFF, 0, 0, 0, 0, 0, 0];
        assert_eq!(LAYOUT.check(&payload), FrameStatus::BadMarker { len: 8 });
    }

    #[test]
    fn empty_and_partial_marker() {
        assert_eq!(LAYOUT.check(&[]), FrameStatus::BadMarker { len: 0 });
        assert_eq!(LAYOUT.check(&[0xFF]), FrameStatus::BadMarker { len: 1 });
    }
}
