//! BLE Scanner Module
//!
//! Handles device discovery for olfaction peripherals.

use crate::domain::models::DeviceDescriptor;
use crate::infrastructure::bluetooth::transport::{BleError, BleTransport};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// BLE scanner for discovering olfaction devices
pub struct DeviceScanner {
    transport: Arc<dyn BleTransport>,
    scan_duration: Duration,
    name_prefix: String,
}

impl DeviceScanner {
    pub fn new(
        transport: Arc<dyn BleTransport>,
        scan_duration: Duration,
        name_prefix: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            scan_duration,
            name_prefix: name_prefix.into(),
        }
    }

    /// Run one timed sweep and keep the devices whose advertised name,
    /// lower-cased, starts with the configured prefix.
    ///
    /// Devices that advertise no name are excluded. An empty result is not
    /// an error; scan faults propagate.
    pub async fn discover(&self) -> Result<Vec<DeviceDescriptor>, BleError> {
        info!(
            "Scanning for '{}' devices for {:?}...",
            self.name_prefix, self.scan_duration
        );

        let heard = self.transport.scan(self.scan_duration).await?;
        let prefix = self.name_prefix.to_lowercase();

        let mut devices = Vec::new();
        for advertisement in heard {
            let Some(name) = advertisement.name else {
                continue;
            };
            if !name.to_lowercase().starts_with(&prefix) {
                continue;
            }

            debug!(
                "Matched {} ({}), rssi {:?}",
                name, advertisement.address, advertisement.rssi
            );
            devices.push(DeviceDescriptor {
                name,
                address: advertisement.address,
            });
        }

        info!("Scan finished, {} device(s) matched", devices.len());
        Ok(devices)
    }
}
