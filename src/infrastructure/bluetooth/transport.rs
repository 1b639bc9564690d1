//! BLE Transport Seam
//!
//! Narrow traits over the radio so the rest of the stack can be driven
//! against a scripted transport in tests and `btleplug` in production.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Faults surfaced by the transport layer.
#[derive(Debug, Clone, Error)]
pub enum BleError {
    #[error("no bluetooth adapter available")]
    NoAdapter,
    #[error("bluetooth adapter error: {0}")]
    Adapter(String),
    #[error("scan failed: {0}")]
    Scan(String),
    #[error("device {0} not found")]
    DeviceNotFound(String),
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("disconnect failed: {0}")]
    Disconnect(String),
    #[error("not connected")]
    NotConnected,
    #[error("no writable characteristic on the connected device")]
    NoWritableCharacteristic,
    #[error("gatt write failed: {0}")]
    Write(String),
    #[error("controller is not running")]
    ControllerStopped,
}

/// One advertisement heard during a scan sweep.
#[derive(Debug, Clone)]
pub struct Advertisement {
    pub name: Option<String>,
    pub address: String,
    pub rssi: Option<i16>,
}

/// A characteristic within a service, as discovered on the device.
#[derive(Debug, Clone)]
pub struct GattCharacteristic {
    pub uuid: Uuid,
    /// Declared properties include "write" (write-without-response alone
    /// does not count).
    pub writable: bool,
}

/// A GATT service and its characteristics, in enumeration order.
#[derive(Debug, Clone)]
pub struct GattService {
    pub uuid: Uuid,
    pub characteristics: Vec<GattCharacteristic>,
}

/// Central-role radio operations consumed by the controller.
#[async_trait]
pub trait BleTransport: Send + Sync {
    /// One bounded advertisement sweep.
    async fn scan(&self, duration: Duration) -> Result<Vec<Advertisement>, BleError>;

    /// Open a connection to the device at `address`.
    async fn open(&self, address: &str) -> Result<Box<dyn BleLink>, BleError>;
}

/// An open connection to a single device.
#[async_trait]
pub trait BleLink: Send + Sync {
    /// Enumerate services and their characteristics.
    async fn services(&self) -> Result<Vec<GattService>, BleError>;

    /// Write `payload` to the characteristic identified by `characteristic`.
    async fn write(&self, characteristic: Uuid, payload: &[u8]) -> Result<(), BleError>;

    /// Tear the link down.
    async fn close(&self) -> Result<(), BleError>;
}
