use crate::controller::ControllerHandle;
use crate::domain::models::{ConnectionStatus, DeviceDescriptor};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Serialize)]
pub(crate) struct StatusResponse {
    status: &'static str,
    bluetooth_connected: bool,
    bluetooth_device: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiMessage {
    status: &'static str,
    message: String,
}

impl ApiMessage {
    fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConnectRequest {
    address: String,
    name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommandRequest {
    #[serde(default)]
    command: String,
}

pub(crate) async fn status(State(controller): State<ControllerHandle>) -> Json<StatusResponse> {
    let link = controller.link_state();
    Json(StatusResponse {
        status: "running",
        bluetooth_connected: link.status == ConnectionStatus::Connected,
        bluetooth_device: link.device.map(|device| device.name),
    })
}

pub(crate) async fn devices(
    State(controller): State<ControllerHandle>,
) -> Result<Json<Vec<DeviceDescriptor>>, (StatusCode, Json<ApiMessage>)> {
    match controller.discover_devices().await {
        Ok(devices) => Ok(Json(devices)),
        Err(e) => {
            warn!("Device discovery failed: {}", e);
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ApiMessage::error(e.to_string())),
            ))
        }
    }
}

pub(crate) async fn connect(
    State(controller): State<ControllerHandle>,
    Json(request): Json<ConnectRequest>,
) -> Json<ApiMessage> {
    match controller
        .connect(request.address, request.name.clone())
        .await
    {
        Ok(()) => Json(ApiMessage::success(format!(
            "Connected to {}",
            request.name
        ))),
        Err(e) => Json(ApiMessage::error(format!("Connection failed: {}", e))),
    }
}

pub(crate) async fn disconnect(State(controller): State<ControllerHandle>) -> Json<ApiMessage> {
    controller.disconnect().await;
    Json(ApiMessage::success("Disconnected"))
}

/// Accept a command and return before it reaches the radio.
///
/// The relay outcome is observed by a detached task and lands in the logs;
/// the HTTP caller only learns that the command was queued.
pub(crate) async fn command(
    State(controller): State<ControllerHandle>,
    Json(request): Json<CommandRequest>,
) -> (StatusCode, Json<ApiMessage>) {
    if request.command.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiMessage::error("No command provided")),
        );
    }

    let command = request.command;
    let accepted = format!("Command '{}' accepted for dispatch", command);

    let outcome = controller.send_command(command.clone());
    tokio::spawn(async move {
        match outcome.await {
            Ok(true) => info!("Command '{}' delivered", command),
            Ok(false) => warn!("Command '{}' was not delivered", command),
            Err(_) => warn!("Command '{}' was dropped by the controller", command),
        }
    });

    (StatusCode::OK, Json(ApiMessage::success(accepted)))
}
