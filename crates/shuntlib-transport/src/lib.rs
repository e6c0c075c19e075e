//! Transport implementations for shuntlib.
//!
//! This crate provides concrete implementations of the
//! [`Transport`](shuntlib_core::Transport) trait from `shuntlib-core`.
//!
//! shuntlib does not bundle a Bluetooth stack. Hosts already own one
//! (BlueZ over D-Bus, CoreBluetooth, WinRT, an embedded controller), and it
//! is the host that scans, connects and subscribes to the meter's notify
//! characteristic. What shuntlib needs from it is the stream of notification
//! payloads, which [`ChannelTransport`] carries:
//!
//! ```no_run
//! use shuntlib_transport::channel;
//!
//! let (sender, transport) = channel(32);
//! // Give `sender` to the BLE notification callback and `transport` to a
//! // meter builder.
//! # drop((sender, transport));
//! ```

pub mod channel;

pub use channel::{ChannelTransport, DEFAULT_CAPACITY, NotificationSender, channel};
