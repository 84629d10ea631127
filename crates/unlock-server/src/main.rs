//! unlock-server HTTP binary.
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `GOOGLE_OAUTH_ACCESS_TOKEN` or `GOOGLE_APPLICATION_CREDENTIALS`: calendar access
//! - `UNLOCK_*`: schedule settings, as for the CLI
//! - `RUST_LOG`: Log filter (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;
use unlock_engine::Settings;
use unlock_gcal::GoogleCalendarClient;
use unlock_server::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let settings = Settings::from_env().context("Invalid configuration in environment")?;
    let client = GoogleCalendarClient::from_credentials(settings.credentials_file.as_deref(), settings.tz)
        .context("Failed to set up Google Calendar access")?;
    info!(
        calendar_id = %settings.calendar_id,
        tz = settings.tz.name(),
        optimize = settings.optimize,
        "calendar source ready"
    );

    let app = create_router(AppState::new(settings, Arc::new(client)));

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid HOST/PORT: {}:{}", host, port))?;

    info!("Server listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
