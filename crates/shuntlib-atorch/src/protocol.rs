//! ATORCH CW20 notification frame format.
//!
//! The CW20 pushes one complete telemetry snapshot per BLE notification on
//! characteristic `ffe1`. There is no length prefix and no usable checksum;
//! a payload is a frame when it starts with the `FF 55` marker and is at
//! least [`INFO_LEN`] bytes long. Every frame stands alone, so there is no
//! reassembly: each accepted frame replaces the previous one.
//!
//! # Frame layout
//!
//! ```text
//!  0    2    4          7          10         13             17       24    26         36
//! ┌────┬────┬──────────┬──────────┬──────────┬──────────────┬────────┬─────┬──────────┐
//! │FF55│type│ voltage  │ current  │ capacity │   energy     │  ...   │temp │   ...    │
//! │    │    │ u24 /10 V│i24 /1000A│u24/1000Ah│ u32 /100 kWh │        │u16°C│          │
//! └────┴────┴──────────┴──────────┴──────────┴──────────────┴────────┴─────┴──────────┘
//! ```
//!
//! All integers are big-endian. Current is two's-complement signed, negative
//! while the battery discharges.

use shuntlib_core::derived::{ComputedField, POWER};
use shuntlib_core::error::Result;
use shuntlib_core::field::{FieldDescriptor, Scale};
use shuntlib_core::frame::FrameLayout;
use shuntlib_core::FrameDecoder;

/// Marker every CW20 frame starts with.
pub const FRAME_MARKER: [u8; 2] = [0xFF, 0x55];

/// Minimum (and typical) CW20 frame length in bytes.
pub const INFO_LEN: usize = 36;

/// CW20 frame layout.
pub const CW20_LAYOUT: FrameLayout = FrameLayout::new(&FRAME_MARKER, INFO_LEN);

/// CW20 field table, in decode order.
pub static CW20_FIELDS: [FieldDescriptor; 5] = [
    // 0.1 V
    FieldDescriptor::new("voltage", 4, 3, false, Scale::Divide(10.0)),
    // 0.001 A
    FieldDescriptor::new("current", 7, 3, true, Scale::Divide(1000.0)),
    // 0.001 Ah
    FieldDescriptor::new("capacity", 10, 3, false, Scale::Divide(1000.0)),
    // 0.01 kWh
    FieldDescriptor::new("energy", 13, 4, false, Scale::Divide(100.0)),
    // °C
    FieldDescriptor::new("temperature", 24, 2, false, Scale::Raw),
];

/// Values the CW20 driver derives rather than decodes.
pub static CW20_COMPUTED: [ComputedField; 1] = [POWER];

/// Build a decoder for CW20 frames.
pub fn cw20_decoder() -> Result<FrameDecoder> {
    FrameDecoder::new(CW20_LAYOUT, &CW20_FIELDS, &CW20_COMPUTED)
}

/// Encode a CW20 frame from raw field values.
///
/// Bytes outside the decoded fields are zero apart from the marker and the
/// message type (`01 02`). Useful for simulators and tests; real meters fill
/// the remaining bytes with price, run time and backlight settings.
///
/// ```
/// use shuntlib_atorch::protocol::{encode_frame, INFO_LEN};
///
/// let frame = encode_frame(120, -2500, 0, 0, 25);
/// assert_eq!(frame.len(), INFO_LEN);
/// assert_eq!(&frame[..2], &[0xFF, 0x55]);
/// ```
pub fn encode_frame(
    voltage_raw: u32,
    current_raw: i32,
    capacity_raw: u32,
    energy_raw: u32,
    temperature_raw: u16,
) -> Vec<u8> {
    let mut frame = vec![0u8; INFO_LEN];
    frame[..2].copy_from_slice(&FRAME_MARKER);
    frame[2] = 0x01;
    frame[3] = 0x02;
    frame[4..7].copy_from_slice(&voltage_raw.to_be_bytes()[1..]);
    frame[7..10].copy_from_slice(&current_raw.to_be_bytes()[1..]);
    frame[10..13].copy_from_slice(&capacity_raw.to_be_bytes()[1..]);
    frame[13..17].copy_from_slice(&energy_raw.to_be_bytes());
    frame[24..26].copy_from_slice(&temperature_raw.to_be_bytes());
    frame
}
