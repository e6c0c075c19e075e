//! ATORCH smart-shunt backend for shuntlib.
//!
//! This crate decodes the telemetry notifications pushed by ATORCH BLE DC
//! meters such as the CW20. It provides:
//!
//! - **Frame format** ([`protocol`]) -- the `FF 55` frame layout, the CW20
//!   field table, and an encoder for simulated frames.
//! - **Model definitions** ([`models`]) -- advertisement matchers, GATT
//!   characteristics, and decode tables for supported meters.
//! - **Meter driver** ([`meter`]) -- the [`Meter`](shuntlib_core::Meter)
//!   implementation, backed by a background notification listener.
//! - **Builder** ([`builder`]) -- fluent construction of [`AtorchMeter`]
//!   instances on top of any [`Transport`](shuntlib_core::Transport).
//!
//! # Example
//!
//! ```
//! use shuntlib_atorch::protocol::{cw20_decoder, encode_frame};
//!
//! let decoder = cw20_decoder().unwrap();
//! decoder.accept(encode_frame(120, -2500, 0, 0, 25));
//!
//! let sample = decoder.decode();
//! assert_eq!(sample.get("voltage"), Some(12.0));
//! assert_eq!(sample.get("current"), Some(-2.5));
//! assert_eq!(sample.get("power"), Some(-30.0));
//! ```

pub mod builder;
pub mod meter;
pub mod models;
mod notify;
pub mod protocol;

// Re-export the primary types for ergonomic `use shuntlib_atorch::*`.
pub use builder::AtorchBuilder;
pub use meter::AtorchMeter;
pub use models::AtorchModel;
