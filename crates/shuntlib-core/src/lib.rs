//! shuntlib-core: Core traits, frame decoding model, and error definitions
//! for shuntlib.
//!
//! This crate defines the vendor-agnostic pieces that every shuntlib backend
//! builds on. Applications depend on these types without pulling in any
//! specific meter driver.
//!
//! # Key types
//!
//! - [`FieldDescriptor`] / [`Scale`] -- declarative description of where a
//!   measurement lives in a frame and how to scale it
//! - [`FrameLayout`] -- header marker and minimum length of a valid frame
//! - [`FrameDecoder`] -- retains the last good frame and decodes it to a
//!   [`Sample`]
//! - [`ComputedField`] -- values derived from decoded ones (e.g. power)
//! - [`Meter`] -- the unified trait for reading any meter
//! - [`Transport`] -- source of BLE notification payloads
//! - [`MeterEvent`] -- diagnostic notifications
//! - [`Error`] / [`Result`] -- error handling

pub mod decoder;
pub mod derived;
pub mod error;
pub mod events;
pub mod field;
pub mod frame;
pub mod helpers;
pub mod meter;
pub mod sample;
pub mod transport;
pub mod types;

// Re-export key types at crate root for ergonomic `use shuntlib_core::*`.
pub use decoder::FrameDecoder;
pub use derived::{ComputedField, POWER};
pub use error::{Error, Result};
pub use events::MeterEvent;
pub use field::{FieldDescriptor, Scale};
pub use frame::{FrameLayout, FrameStatus};
pub use helpers::{format_measurement, round_to, unit_for};
pub use meter::Meter;
pub use sample::Sample;
pub use transport::Transport;
pub use types::*;
