//! The generic frame decoder.
//!
//! [`FrameDecoder`] owns the last valid frame received from one meter and
//! decodes it on demand against a field table. It is shared between the
//! notification listener (which calls [`accept`](FrameDecoder::accept)) and
//! whoever polls for samples (which calls [`decode`](FrameDecoder::decode)),
//! typically as an `Arc<FrameDecoder>`.
//!
//! The retained frame is an immutable [`Bytes`] handle. `accept` swaps the
//! handle under a write lock; `decode` clones it under a read lock and works
//! on that snapshot, so a decode never observes a half-replaced frame.

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::debug;

use crate::derived::{self, ComputedField};
use crate::error::Result;
use crate::field::{self, FieldDescriptor};
use crate::frame::{FrameLayout, FrameStatus};
use crate::sample::Sample;

/// Retains the last good frame and decodes it into [`Sample`]s.
#[derive(Debug)]
pub struct FrameDecoder {
    layout: FrameLayout,
    fields: &'static [FieldDescriptor],
    computed: &'static [ComputedField],
    retained: RwLock<Option<Bytes>>,
}

impl FrameDecoder {
    /// Build a decoder, validating the field table against the layout.
    ///
    /// Fails with [`Error::InvalidFieldTable`](crate::error::Error::InvalidFieldTable)
    /// if any descriptor could read past `layout.min_len`, descriptors
    /// overlap, or names collide.
    pub fn new(
        layout: FrameLayout,
        fields: &'static [FieldDescriptor],
        computed: &'static [ComputedField],
    ) -> Result<Self> {
        field::validate_table(&layout, fields, computed)?;
        Ok(FrameDecoder {
            layout,
            fields,
            computed,
            retained: RwLock::new(None),
        })
    }

    /// Offer a notification payload.
    ///
    /// If the payload starts with the layout's marker and is at least
    /// `min_len` bytes long it replaces the retained frame. Anything else is
    /// dropped and the retained frame is left as it was. Never fails.
    pub fn accept(&self, payload: impl Into<Bytes>) -> FrameStatus {
        let payload = payload.into();
        let status = self.layout.check(&payload);
        match status {
            FrameStatus::Accepted => {
                debug!(len = payload.len(), frame = %hex::encode(&payload), "RX frame");
                *self.retained.write() = Some(payload);
            }
            FrameStatus::TooShort { len } => {
                debug!(len, frame = %hex::encode(&payload), "RX frame too short");
            }
            FrameStatus::BadMarker { .. } => {}
        }
        status
    }

    /// Whether a frame has ever been accepted.
    pub fn has_frame(&self) -> bool {
        self.retained.read().is_some()
    }

    /// A copy of the retained frame handle, if any.
    pub fn retained(&self) -> Option<Bytes> {
        self.retained.read().clone()
    }

    /// Decode the retained frame.
    ///
    /// Returns an empty sample if no frame has been accepted. Otherwise
    /// every descriptor is read in order, then computed fields are applied.
    /// Calling this repeatedly without an intervening `accept` yields equal
    /// samples.
    pub fn decode(&self) -> Sample {
        let Some(frame) = self.retained() else {
            return Sample::new();
        };

        let mut sample = Sample::new();
        for field in self.fields {
            // validate_table guarantees every field fits in min_len.
            if let Some(value) = field.read(&frame) {
                sample.insert(field.name, value);
            }
        }
        derived::apply_all(self.computed, &mut sample);
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::POWER;
    use crate::error::Error;
    use crate::field::Scale;
    use proptest::prelude::*;

    const LAYOUT: FrameLayout = FrameLayout::new(&[0xFF, 0x55], 12);

    static FIELDS: [FieldDescriptor; 3] = [
        FieldDescriptor::new("voltage", 2, 3, false, Scale::Divide(10.0)),
        FieldDescriptor::new("current", 5, 3, true, Scale::Divide(1000.0)),
        FieldDescriptor::new("temperature", 10, 2, false, Scale::Raw),
    ];

    static COMPUTED: [ComputedField; 1] = [POWER];

    fn decoder() -> FrameDecoder {
        FrameDecoder::new(LAYOUT, &FIELDS, &COMPUTED).unwrap()
    }

    fn frame(voltage: u32, current: i32, temperature: u16) -> Vec<u8> {
        let mut f = vec![0xFF, 0x55];
        f.extend_from_slice(&voltage.to_be_bytes()[1..]);
        f.extend_from_slice(&current.to_be_bytes()[1..]);
        f.extend_from_slice(&[0, 0]);
        f.extend_from_slice(&temperature.to_be_bytes());
        f
    }

    #[test]
    fn empty_before_first_frame() {
        let d = decoder();
        assert!(!d.has_frame());
        assert!(d.decode().is_empty());
    }

    #[test]
    fn decodes_accepted_frame() {
        let d = decoder();
        assert_eq!(d.accept(frame(120, -2500, 25)), FrameStatus::Accepted);

        let sample = d.decode();
        assert_eq!(sample.get("voltage"), Some(12.0));
        assert_eq!(sample.get("current"), Some(-2.5));
        assert_eq!(sample.get("temperature"), Some(25.0));
        assert_eq!(sample.get("power"), Some(-30.0));
        assert_eq!(sample.len(), 4);
    }

    #[test]
    fn short_frame_keeps_previous() {
        let d = decoder();
        d.accept(frame(120, 1000, 20));
        let before = d.decode();

        let mut short = frame(999, 999, 99);
        short.truncate(11);
        assert_eq!(d.accept(short), FrameStatus::TooShort { len: 11 });
        assert_eq!(d.decode(), before);
    }

    #[test]
    fn new_frame_replaces_old() {
        let d = decoder();
        d.accept(frame(120, 1000, 20));
        d.accept(frame(131, -500, 21));
        let sample = d.decode();
        assert_eq!(sample.get("voltage"), Some(13.1));
        assert_eq!(sample.get("current"), Some(-0.5));
    }

    #[test]
    fn extra_trailing_bytes_are_ignored() {
        let d = decoder();
        let mut f = frame(120, 1000, 20);
        f.extend_from_slice(&[0xAA; 20]);
        assert!(d.accept(f).is_accepted());
        assert_eq!(d.decode().get("temperature"), Some(20.0));
    }

    #[test]
    fn rejects_misconfigured_table() {
        static BAD: [FieldDescriptor; 1] =
            [FieldDescriptor::new("energy", 10, 4, false, Scale::Raw)];
        let err = FrameDecoder::new(LAYOUT, &BAD, &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidFieldTable(_)));
    }

    #[test]
    fn concurrent_accept_and_decode_never_tear() {
        use std::sync::Arc;

        let d = Arc::new(decoder());
        let a = frame(100, 1000, 10);
        let b = frame(200, -2000, 20);
        d.accept(a.clone());

        let writer = {
            let d = Arc::clone(&d);
            std::thread::spawn(move || {
                for i in 0..2000 {
                    d.accept(if i % 2 == 0 { b.clone() } else { a.clone() });
                }
            })
        };

        for _ in 0..2000 {
            let s = d.decode();
            let pair = (s.get("voltage"), s.get("current"), s.get("temperature"));
            assert!(
                pair == (Some(10.0), Some(1.0), Some(10.0))
                    || pair == (Some(20.0), Some(-2.0), Some(20.0)),
                "torn frame: {pair:?}"
            );
        }
        writer.join().unwrap();
    }

    proptest! {
        #[test]
        fn non_marker_payloads_are_ignored(
            payload in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            prop_assume!(!payload.starts_with(&[0xFF, 0x55]));
            let d = decoder();
            d.accept(frame(120, 1000, 20));
            let before = d.decode();
            d.accept(payload);
            prop_assert_eq!(d.decode(), before);
        }

        #[test]
        fn short_marker_payloads_are_ignored(
            tail in proptest::collection::vec(any::<u8>(), 0..10),
        ) {
            let d = decoder();
            let mut payload = vec![0xFF, 0x55];
            payload.extend_from_slice(&tail);
            prop_assert!(!d.accept(payload).is_accepted());
            prop_assert!(d.decode().is_empty());
        }

        #[test]
        fn decode_is_idempotent(body in proptest::collection::vec(any::<u8>(), 10..40)) {
            let d = decoder();
            let mut payload = vec![0xFF, 0x55];
            payload.extend_from_slice(&body);
            d.accept(payload);
            prop_assert_eq!(d.decode(), d.decode());
        }

        #[test]
        fn power_tracks_voltage_and_current(
            v in 0u32..0x00FF_FFFF,
            c in -0x0080_0000i32..0x0080_0000,
        ) {
            let d = decoder();
            d.accept(frame(v, c, 0));
            let s = d.decode();
            let product = s.get("voltage").unwrap() * s.get("current").unwrap();
            let expected = crate::helpers::round_to(product, 2);
            prop_assert_eq!(s.get("power"), Some(expected));
        }
    }
}
