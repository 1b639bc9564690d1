//! btleplug Backend
//!
//! Production implementation of the transport seam on the system Bluetooth
//! adapter.

use crate::infrastructure::bluetooth::transport::{
    Advertisement, BleError, BleLink, BleTransport, GattCharacteristic, GattService,
};
use async_trait::async_trait;
use btleplug::api::{Central, CharPropFlags, Manager as _, Peripheral as _, ScanFilter, WriteType};
use btleplug::platform::{Adapter, Manager, Peripheral};
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

/// How long to keep sweeping when a connect targets an address the adapter
/// has not seen yet.
const RESCUE_SCAN_TIMEOUT: Duration = Duration::from_secs(5);
const SCAN_POLL_INTERVAL: Duration = Duration::from_millis(300);

pub struct BtleplugTransport {
    adapter: Adapter,
}

impl BtleplugTransport {
    /// Bind to the first Bluetooth adapter on the system.
    pub async fn new() -> Result<Self, BleError> {
        let manager = Manager::new()
            .await
            .map_err(|e| BleError::Adapter(e.to_string()))?;
        let mut adapters = manager
            .adapters()
            .await
            .map_err(|e| BleError::Adapter(e.to_string()))?;
        if adapters.is_empty() {
            return Err(BleError::NoAdapter);
        }

        Ok(Self {
            adapter: adapters.remove(0),
        })
    }

    async fn lookup(&self, address: &str) -> Result<Option<Peripheral>, BleError> {
        let peripherals = self
            .adapter
            .peripherals()
            .await
            .map_err(|e| BleError::Connect(e.to_string()))?;
        Ok(peripherals
            .into_iter()
            .find(|p| p.id().to_string() == address))
    }

    /// Find a peripheral by address, sweeping briefly if the adapter has no
    /// cached entry for it (a connect that never went through discover).
    async fn find_peripheral(&self, address: &str) -> Result<Peripheral, BleError> {
        if let Some(peripheral) = self.lookup(address).await? {
            return Ok(peripheral);
        }

        debug!("Address {} not cached, sweeping for it", address);
        self.adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(|e| BleError::Connect(e.to_string()))?;

        let deadline = Instant::now() + RESCUE_SCAN_TIMEOUT;
        let mut found = None;
        while Instant::now() < deadline {
            tokio::time::sleep(SCAN_POLL_INTERVAL).await;
            if let Some(peripheral) = self.lookup(address).await? {
                found = Some(peripheral);
                break;
            }
        }
        let _ = self.adapter.stop_scan().await;

        found.ok_or_else(|| BleError::DeviceNotFound(address.to_string()))
    }
}

#[async_trait]
impl BleTransport for BtleplugTransport {
    async fn scan(&self, duration: Duration) -> Result<Vec<Advertisement>, BleError> {
        self.adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(|e| BleError::Scan(e.to_string()))?;

        tokio::time::sleep(duration).await;

        self.adapter
            .stop_scan()
            .await
            .map_err(|e| BleError::Scan(e.to_string()))?;

        let peripherals = self
            .adapter
            .peripherals()
            .await
            .map_err(|e| BleError::Scan(e.to_string()))?;

        let mut heard = Vec::new();
        for peripheral in peripherals {
            if let Ok(Some(properties)) = peripheral.properties().await {
                heard.push(Advertisement {
                    name: properties.local_name,
                    address: peripheral.id().to_string(),
                    rssi: properties.rssi,
                });
            }
        }

        Ok(heard)
    }

    async fn open(&self, address: &str) -> Result<Box<dyn BleLink>, BleError> {
        let peripheral = self.find_peripheral(address).await?;

        peripheral
            .connect()
            .await
            .map_err(|e| BleError::Connect(e.to_string()))?;
        peripheral
            .discover_services()
            .await
            .map_err(|e| BleError::Connect(e.to_string()))?;

        Ok(Box::new(BtleplugLink { peripheral }))
    }
}

struct BtleplugLink {
    peripheral: Peripheral,
}

#[async_trait]
impl BleLink for BtleplugLink {
    async fn services(&self) -> Result<Vec<GattService>, BleError> {
        let mut services = Vec::new();
        for service in self.peripheral.services() {
            let characteristics = service
                .characteristics
                .into_iter()
                .map(|c| GattCharacteristic {
                    uuid: c.uuid,
                    writable: c.properties.contains(CharPropFlags::WRITE),
                })
                .collect();

            services.push(GattService {
                uuid: service.uuid,
                characteristics,
            });
        }

        Ok(services)
    }

    async fn write(&self, characteristic: Uuid, payload: &[u8]) -> Result<(), BleError> {
        let target = self
            .peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == characteristic)
            .ok_or_else(|| BleError::Write(format!("characteristic {} is gone", characteristic)))?;

        self.peripheral
            .write(&target, payload, WriteType::WithResponse)
            .await
            .map_err(|e| BleError::Write(e.to_string()))
    }

    async fn close(&self) -> Result<(), BleError> {
        self.peripheral
            .disconnect()
            .await
            .map_err(|e| BleError::Disconnect(e.to_string()))
    }
}
