mod controller;
mod domain;
mod gateway;
mod infrastructure;

use anyhow::Context;
use controller::Controller;
use domain::settings::SettingsService;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings_service = SettingsService::new().context("Failed to load settings")?;
    let settings = settings_service.get().clone();

    let _logging_guard = infrastructure::logging::init_logger(&settings.log_settings)
        .context("Failed to initialize logging")?;

    info!("Starting olfaction bridge");

    let handle = Controller::spawn(settings.bluetooth.clone());
    let app = gateway::router(handle);

    let addr = format!("{}:{}", settings.http.host, settings.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP gateway listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
