//! Controller worker.
//!
//! All BLE work runs on one dedicated thread driving a single-threaded tokio
//! runtime; requests arrive over a queue and are answered through per-request
//! reply channels. The worker is the only writer of the shared link snapshot,
//! so status queries never touch the radio.

use crate::domain::models::{ConnectionStatus, DeviceDescriptor, LinkSnapshot};
use crate::domain::settings::BleSettings;
use crate::infrastructure::bluetooth::backend::BtleplugTransport;
use crate::infrastructure::bluetooth::transport::{BleError, BleTransport};
use crate::infrastructure::bluetooth::BluetoothService;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

/// Requests accepted by the worker queue.
pub enum ControllerRequest {
    Discover {
        reply: oneshot::Sender<Result<Vec<DeviceDescriptor>, BleError>>,
    },
    Connect {
        address: String,
        name: String,
        reply: oneshot::Sender<Result<(), BleError>>,
    },
    Disconnect {
        reply: oneshot::Sender<bool>,
    },
    SendCommand {
        command: String,
        reply: oneshot::Sender<bool>,
    },
}

/// Cloneable handle to the controller worker.
#[derive(Clone)]
pub struct ControllerHandle {
    requests: mpsc::UnboundedSender<ControllerRequest>,
    link_state: Arc<Mutex<LinkSnapshot>>,
}

impl ControllerHandle {
    pub async fn discover_devices(&self) -> Result<Vec<DeviceDescriptor>, BleError> {
        let (reply, outcome) = oneshot::channel();
        self.requests
            .send(ControllerRequest::Discover { reply })
            .map_err(|_| BleError::ControllerStopped)?;
        outcome.await.map_err(|_| BleError::ControllerStopped)?
    }

    pub async fn connect(&self, address: String, name: String) -> Result<(), BleError> {
        let (reply, outcome) = oneshot::channel();
        self.requests
            .send(ControllerRequest::Connect {
                address,
                name,
                reply,
            })
            .map_err(|_| BleError::ControllerStopped)?;
        outcome.await.map_err(|_| BleError::ControllerStopped)?
    }

    pub async fn disconnect(&self) -> bool {
        let (reply, outcome) = oneshot::channel();
        if self
            .requests
            .send(ControllerRequest::Disconnect { reply })
            .is_err()
        {
            return false;
        }
        outcome.await.unwrap_or(false)
    }

    /// Queue a command for delivery and return immediately.
    ///
    /// The receiver reports whether the GATT write went through; dropping it
    /// makes the dispatch fire-and-forget.
    pub fn send_command(&self, command: String) -> oneshot::Receiver<bool> {
        let (reply, outcome) = oneshot::channel();
        let _ = self
            .requests
            .send(ControllerRequest::SendCommand { command, reply });
        outcome
    }

    /// Current connection snapshot, served without entering the queue.
    pub fn link_state(&self) -> LinkSnapshot {
        self.link_state.lock().unwrap().clone()
    }
}

pub struct Controller;

impl Controller {
    /// Spawn the worker with the production btleplug transport.
    pub fn spawn(settings: BleSettings) -> ControllerHandle {
        Self::spawn_with(settings, || async {
            BtleplugTransport::new()
                .await
                .map(|transport| Arc::new(transport) as Arc<dyn BleTransport>)
        })
    }

    /// Spawn the worker with a caller-supplied transport factory. The factory
    /// runs inside the worker runtime.
    pub(crate) fn spawn_with<F, Fut>(settings: BleSettings, transport: F) -> ControllerHandle
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Arc<dyn BleTransport>, BleError>>,
    {
        let (requests, queue) = mpsc::unbounded_channel();
        let link_state = Arc::new(Mutex::new(LinkSnapshot::default()));
        let shared = link_state.clone();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to create tokio runtime for Bluetooth");

            rt.block_on(run_worker(queue, shared, settings, transport));
        });

        ControllerHandle {
            requests,
            link_state,
        }
    }
}

async fn run_worker<F, Fut>(
    mut queue: mpsc::UnboundedReceiver<ControllerRequest>,
    link_state: Arc<Mutex<LinkSnapshot>>,
    settings: BleSettings,
    transport: F,
) where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Arc<dyn BleTransport>, BleError>>,
{
    let transport = match transport().await {
        Ok(transport) => transport,
        Err(e) => {
            error!("Bluetooth unavailable: {}", e);
            // Keep draining the queue so the gateway stays up and truthful.
            while let Some(request) = queue.recv().await {
                refuse(request, &e);
            }
            return;
        }
    };

    let mut bluetooth = BluetoothService::new(transport, &settings);
    info!("Bluetooth controller worker started");

    while let Some(request) = queue.recv().await {
        match request {
            ControllerRequest::Discover { reply } => {
                let _ = reply.send(bluetooth.discover_devices().await);
            }
            ControllerRequest::Connect {
                address,
                name,
                reply,
            } => {
                publish(
                    &link_state,
                    LinkSnapshot {
                        status: ConnectionStatus::Connecting,
                        device: None,
                    },
                );
                let result = bluetooth.connect(&address, &name).await;
                if let Err(e) = &result {
                    error!("Connection to {} failed: {}", address, e);
                }
                publish(&link_state, bluetooth.snapshot());
                let _ = reply.send(result);
            }
            ControllerRequest::Disconnect { reply } => {
                let done = bluetooth.disconnect().await;
                publish(&link_state, bluetooth.snapshot());
                let _ = reply.send(done);
            }
            ControllerRequest::SendCommand { command, reply } => {
                let _ = reply.send(bluetooth.send_command(&command).await);
            }
        }
    }

    info!("Bluetooth controller worker stopped");
}

/// Answer a request when no transport could be brought up. Disconnect keeps
/// its idempotent always-true contract; everything else fails.
fn refuse(request: ControllerRequest, cause: &BleError) {
    match request {
        ControllerRequest::Discover { reply } => {
            let _ = reply.send(Err(cause.clone()));
        }
        ControllerRequest::Connect { reply, .. } => {
            let _ = reply.send(Err(cause.clone()));
        }
        ControllerRequest::Disconnect { reply } => {
            let _ = reply.send(true);
        }
        ControllerRequest::SendCommand { reply, .. } => {
            let _ = reply.send(false);
        }
    }
}

fn publish(link_state: &Arc<Mutex<LinkSnapshot>>, snapshot: LinkSnapshot) {
    if let Ok(mut state) = link_state.lock() {
        *state = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::bluetooth::mock::{adv, service, write_char, MockTransport};
    use std::sync::atomic::Ordering;
    use uuid::Uuid;

    fn settings() -> BleSettings {
        BleSettings {
            scan_seconds: 1,
            device_name_prefix: "olfaction".to_string(),
        }
    }

    fn spawn_with_mock(transport: MockTransport) -> ControllerHandle {
        let transport = Arc::new(transport);
        Controller::spawn_with(settings(), move || async move {
            Ok(transport as Arc<dyn BleTransport>)
        })
    }

    fn connected_profile() -> MockTransport {
        MockTransport::new()
            .with_advertisements(vec![adv(Some("olfaction-1"), "AA:BB:CC:DD:EE:FF")])
            .with_profile(vec![service(
                Uuid::from_u128(0xA),
                vec![write_char(Uuid::from_u128(1))],
            )])
    }

    #[tokio::test]
    async fn test_discover_through_queue() {
        let handle = spawn_with_mock(connected_profile());

        let devices = handle.discover_devices().await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "olfaction-1");
    }

    #[tokio::test]
    async fn test_connect_publishes_snapshot() {
        let handle = spawn_with_mock(connected_profile());

        assert_eq!(handle.link_state().status, ConnectionStatus::Disconnected);

        handle
            .connect("AA:BB:CC:DD:EE:FF".to_string(), "olfaction-1".to_string())
            .await
            .unwrap();

        let link = handle.link_state();
        assert_eq!(link.status, ConnectionStatus::Connected);
        assert_eq!(
            link.device,
            Some(DeviceDescriptor {
                name: "olfaction-1".to_string(),
                address: "AA:BB:CC:DD:EE:FF".to_string(),
            })
        );

        assert!(handle.disconnect().await);
        let link = handle.link_state();
        assert_eq!(link.status, ConnectionStatus::Disconnected);
        assert!(link.device.is_none());
    }

    #[tokio::test]
    async fn test_failed_connect_leaves_disconnected_snapshot() {
        let handle = spawn_with_mock(MockTransport::new().failing_open());

        let result = handle
            .connect("AA:BB:CC:DD:EE:FF".to_string(), "olfaction-1".to_string())
            .await;

        assert!(matches!(result, Err(BleError::Connect(_))));
        assert_eq!(handle.link_state().status, ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_overlapping_sends_report_independently() {
        let transport = connected_profile();
        let counters = transport.counters.clone();
        let handle = spawn_with_mock(transport);

        handle
            .connect("AA:BB:CC:DD:EE:FF".to_string(), "olfaction-1".to_string())
            .await
            .unwrap();

        // Queue both before awaiting either outcome.
        let first = handle.send_command("pulse 1".to_string());
        let second = handle.send_command("pulse 2".to_string());

        assert!(first.await.unwrap());
        assert!(second.await.unwrap());
        assert_eq!(counters.write_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_send_while_disconnected_fails_without_transport_call() {
        let transport = connected_profile();
        let counters = transport.counters.clone();
        let handle = spawn_with_mock(transport);

        let outcome = handle.send_command("pulse".to_string());
        assert!(!outcome.await.unwrap());
        assert_eq!(counters.write_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_worker_without_adapter_refuses_requests() {
        let handle = Controller::spawn_with(settings(), || async { Err(BleError::NoAdapter) });

        let result = handle.discover_devices().await;
        assert!(matches!(result, Err(BleError::NoAdapter)));

        // Disconnect keeps its always-succeeds contract.
        assert!(handle.disconnect().await);
        assert!(!handle.send_command("pulse".to_string()).await.unwrap());
        assert_eq!(handle.link_state().status, ConnectionStatus::Disconnected);
    }
}
