use serde::Serialize;

/// A device produced by a discovery scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
    pub name: String,
    pub address: String,
}

/// Lifecycle of the single connection slot.
///
/// Transitions are monotonic within a session:
/// `Disconnected -> Connecting -> Connected -> Disconnected`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Read-only view of the connection slot.
///
/// Published by the controller worker (the only writer) so status queries
/// never have to enter the request queue.
#[derive(Debug, Clone, Default)]
pub struct LinkSnapshot {
    pub status: ConnectionStatus,
    pub device: Option<DeviceDescriptor>,
}
