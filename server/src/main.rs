//! OneFarmer server: HTTP JSON API over the dose log plus the live
//! MQTT sensor feed.

mod config;
mod error;
mod mqtt;
mod routes;
mod state;

use anyhow::{Context, Result};
use chrono::Duration;
use clap::Parser;
use config::Config;
use onefarmer_core::{DoseService, FeedState, FileDoseEntryRepository};
use state::AppState;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Parser)]
#[command(name = "onefarmer")]
#[command(about = "Hydroponics dosing log and sensor feed server", long_about = None)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "onefarmer.toml")]
    config: PathBuf,

    /// Override the data directory (default: ~/.onefarmer)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the HTTP bind address
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config).context("Failed to load configuration")?;
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = Some(data_dir);
    }
    if let Some(bind) = cli.bind {
        config.server.bind_addr = bind;
    }

    let repo = FileDoseEntryRepository::with_max_entries(
        config.storage.data_dir.clone(),
        config.storage.max_dose_entries,
    )
    .context("Failed to open dose entry store")?;
    let doses = Arc::new(DoseService::new(repo));

    let feed = Arc::new(Mutex::new(FeedState::new(config.storage.feed_capacity)));

    let mqtt_handle = mqtt::spawn_subscriber(&config.mqtt, Arc::clone(&feed))
        .context("Failed to start MQTT subscriber")?;

    let app_state = AppState {
        doses,
        feed,
        stale_after: Duration::seconds(config.mqtt.stale_after_secs as i64),
    };

    let app = routes::api_router()
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    info!(addr = %config.server.bind_addr, "OneFarmer server listening");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result.context("HTTP server failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    mqtt_handle.abort();
    info!("OneFarmer server stopped");
    Ok(())
}
