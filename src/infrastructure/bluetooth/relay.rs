//! Command Relay Module
//!
//! Delivers UTF-8 command payloads to the first writable characteristic on
//! the connected device.

use crate::infrastructure::bluetooth::connection::{ActiveLink, ConnectionManager};
use crate::infrastructure::bluetooth::transport::{BleError, GattService};
use tracing::{debug, warn};
use uuid::Uuid;

pub struct CommandRelay;

impl CommandRelay {
    /// Relay `command` over the active link.
    ///
    /// Every fault collapses to `false`: not connected (no transport call is
    /// made), no writable characteristic, enumeration or write errors. The
    /// fault detail goes to the log before it is collapsed.
    pub async fn send(connection: &mut ConnectionManager, command: &str) -> bool {
        let Some(active) = connection.active_mut() else {
            debug!("Command dropped: {}", BleError::NotConnected);
            return false;
        };

        match Self::write_command(active, command).await {
            Ok(()) => {
                debug!("Command relayed: {}", command);
                true
            }
            Err(e) => {
                warn!("Command relay failed: {}", e);
                false
            }
        }
    }

    async fn write_command(active: &mut ActiveLink, command: &str) -> Result<(), BleError> {
        let target = match active.write_target {
            Some(uuid) => uuid,
            None => {
                let services = active.link.services().await?;
                let uuid =
                    select_write_target(&services).ok_or(BleError::NoWritableCharacteristic)?;
                debug!("Resolved write target {}", uuid);
                active.write_target = Some(uuid);
                uuid
            }
        };

        active.link.write(target, command.as_bytes()).await
    }
}

/// First characteristic whose properties include "write", walking services in
/// enumeration order. The olfaction firmware depends on this exact rule; do
/// not change it.
fn select_write_target(services: &[GattService]) -> Option<Uuid> {
    for service in services {
        for characteristic in &service.characteristics {
            if characteristic.writable {
                return Some(characteristic.uuid);
            }
        }
    }
    None
}
