//! shuntlib-test-harness: Test utilities, mock transports, and labelled
//! captures for shuntlib.
//!
//! This crate provides [`MockTransport`] for deterministic unit testing of
//! meter drivers without real BLE hardware, and [`fixtures`] with captured
//! notification payloads and the values they decode to.

pub mod fixtures;
pub mod mock_notify;

pub use fixtures::{CW20_FRAMES, CW20_NOISE, LabeledFrame, TOLERANCE};
pub use mock_notify::{MockHandle, MockTransport};
