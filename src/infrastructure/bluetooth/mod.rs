//! Bluetooth Module
//!
//! BLE central plumbing for the olfaction device.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    BluetoothService                      │
//! │   (Main coordinator - public API for the controller)     │
//! └─────────────────────┬───────────────────────────────────┘
//!                       │
//!         ┌─────────────┼─────────────┐
//!         │             │             │
//!         ▼             ▼             ▼
//! ┌───────────┐  ┌────────────┐  ┌──────────┐
//! │  Scanner  │  │ Connection │  │  Relay   │
//! │           │  │            │  │          │
//! │ - timed   │  │ - single   │  │ - write  │
//! │   sweep   │  │   slot     │  │   target │
//! │ - prefix  │  │ - teardown │  │ - GATT   │
//! │   filter  │  │            │  │   write  │
//! └───────────┘  └────────────┘  └──────────┘
//!         │             │             │
//!         └─────────────┼─────────────┘
//!                       ▼
//!            transport (trait seam)
//!            backend   (btleplug)
//! ```
//!
//! ## Modules
//!
//! - [`transport`] - radio trait seam, GATT profile types, fault taxonomy
//! - [`backend`] - btleplug implementation of the seam
//! - [`scanner`] - timed device discovery with name-prefix filtering
//! - [`connection`] - the single connection slot
//! - [`relay`] - command delivery to the first writable characteristic
//! - [`service`] - main service coordinator

pub mod backend;
pub mod connection;
pub mod relay;
pub mod scanner;
pub mod service;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

// Re-export main service for convenience
pub use service::BluetoothService;
