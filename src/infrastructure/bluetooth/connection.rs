//! BLE Connection Module
//!
//! Owns the single connection slot: at most one device link at a time.

use crate::domain::models::DeviceDescriptor;
use crate::infrastructure::bluetooth::transport::{BleError, BleLink, BleTransport};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// The active link plus everything resolved against it.
pub(crate) struct ActiveLink {
    pub(crate) link: Box<dyn BleLink>,
    pub(crate) device: DeviceDescriptor,
    /// Writable characteristic resolved on first send; dies with the link.
    pub(crate) write_target: Option<Uuid>,
}

pub struct ConnectionManager {
    transport: Arc<dyn BleTransport>,
    active: Option<ActiveLink>,
}

impl ConnectionManager {
    pub fn new(transport: Arc<dyn BleTransport>) -> Self {
        Self {
            transport,
            active: None,
        }
    }

    /// Open a connection to `address`.
    ///
    /// An existing link is torn down first, so the slot never holds two
    /// connections. On failure the slot is left empty.
    pub async fn connect(&mut self, address: &str, name: &str) -> Result<(), BleError> {
        if self.active.is_some() {
            info!("Already connected, tearing down the previous link first");
            self.disconnect().await;
        }

        let link = self.transport.open(address).await?;
        info!("Connected to {} ({})", name, address);

        self.active = Some(ActiveLink {
            link,
            device: DeviceDescriptor {
                name: name.to_string(),
                address: address.to_string(),
            },
            write_target: None,
        });
        Ok(())
    }

    /// Tear down the active link, if any. Always leaves the slot empty and
    /// always succeeds; transport faults during close are only logged.
    pub async fn disconnect(&mut self) -> bool {
        if let Some(active) = self.active.take() {
            if let Err(e) = active.link.close().await {
                warn!("Error while closing the link: {}", e);
            }
            info!("Disconnected from {}", active.device.name);
        }
        true
    }

    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    pub fn current_device(&self) -> Option<&DeviceDescriptor> {
        self.active.as_ref().map(|active| &active.device)
    }

    pub(crate) fn active_mut(&mut self) -> Option<&mut ActiveLink> {
        self.active.as_mut()
    }
}
