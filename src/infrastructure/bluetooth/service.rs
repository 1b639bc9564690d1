//! Bluetooth Service Module
//!
//! Main service that coordinates scanning, connection, and command relay
//! for the olfaction device.

use crate::domain::models::{ConnectionStatus, DeviceDescriptor, LinkSnapshot};
use crate::domain::settings::BleSettings;
use crate::infrastructure::bluetooth::connection::ConnectionManager;
use crate::infrastructure::bluetooth::relay::CommandRelay;
use crate::infrastructure::bluetooth::scanner::DeviceScanner;
use crate::infrastructure::bluetooth::transport::{BleError, BleTransport};
use std::sync::Arc;
use std::time::Duration;

/// Main Bluetooth service coordinating all BLE operations
pub struct BluetoothService {
    scanner: DeviceScanner,
    connection: ConnectionManager,
}

impl BluetoothService {
    pub fn new(transport: Arc<dyn BleTransport>, settings: &BleSettings) -> Self {
        let scanner = DeviceScanner::new(
            transport.clone(),
            Duration::from_secs(settings.scan_seconds),
            settings.device_name_prefix.clone(),
        );

        Self {
            scanner,
            connection: ConnectionManager::new(transport),
        }
    }

    /// One timed discovery sweep, filtered to olfaction devices.
    pub async fn discover_devices(&self) -> Result<Vec<DeviceDescriptor>, BleError> {
        self.scanner.discover().await
    }

    /// Connect to a device by address. A held connection is replaced.
    pub async fn connect(&mut self, address: &str, name: &str) -> Result<(), BleError> {
        self.connection.connect(address, name).await
    }

    /// Drop the current connection. Idempotent.
    pub async fn disconnect(&mut self) -> bool {
        self.connection.disconnect().await
    }

    /// Relay a command string to the device; faults collapse to `false`.
    pub async fn send_command(&mut self, command: &str) -> bool {
        CommandRelay::send(&mut self.connection, command).await
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn snapshot(&self) -> LinkSnapshot {
        LinkSnapshot {
            status: if self.is_connected() {
                ConnectionStatus::Connected
            } else {
                ConnectionStatus::Disconnected
            },
            device: self.connection.current_device().cloned(),
        }
    }
}
