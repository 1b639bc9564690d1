//! HTTP Gateway
//!
//! The only control surface of the running bridge: every controller
//! operation is reachable over HTTP. Command dispatch is fire-and-forget at
//! this boundary — a success response confirms queueing, not delivery.

mod routes;

use crate::controller::ControllerHandle;
use axum::routing::{get, post};
use axum::Router;

pub fn router(controller: ControllerHandle) -> Router {
    Router::new()
        .route("/", get(routes::status))
        .route("/status", get(routes::status))
        .route("/devices", get(routes::devices))
        .route("/connect", post(routes::connect))
        .route("/disconnect", post(routes::disconnect))
        .route("/command", post(routes::command))
        .with_state(controller)
}
