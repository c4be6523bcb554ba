use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use rsvp_api::app::{create_app, AppState};
use rsvp_api::config::Config;
use rsvp_api::jobs::{JobScheduler, SendRemindersJob, TokenCleanupJob};
use rsvp_api::middleware::{init_metrics, logging::init_logging};

const USAGE: &str = "usage: rsvp [serve | send-reminders | due-reminders]";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    init_logging(&config.logging).context("failed to initialize logging")?;

    let command = std::env::args().nth(1).unwrap_or_else(|| "serve".to_string());
    info!(command = %command, "Starting rsvp v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&config.database.pool_config()).await?;
    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    let state = AppState::from_config(config.clone(), pool)?;

    match command.as_str() {
        "serve" => serve(config, state).await,
        "send-reminders" => {
            let report = state.reminders.send_game_reminders().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        "due-reminders" => {
            let due = state.reminders.preview().await?;
            println!("{}", serde_json::to_string_pretty(&due)?);
            Ok(())
        }
        other => bail!("unknown command {other:?}\n{USAGE}"),
    }
}

async fn serve(config: Config, state: AppState) -> Result<()> {
    if let Err(e) = init_metrics() {
        warn!(error = %e, "Prometheus recorder not installed");
    }

    let mut scheduler = JobScheduler::new();
    if config.reminders.schedule_minutes > 0 {
        scheduler.register(SendRemindersJob::new(
            state.reminders.clone(),
            config.reminders.schedule_minutes,
        ));
    }
    if config.tokens.cleanup_minutes > 0 {
        scheduler.register(TokenCleanupJob::new(
            state.identity.tokens().clone(),
            config.tokens.cleanup_minutes,
        ));
    }
    scheduler.start();

    let app = create_app(state);
    let addr = config.socket_addr()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(30)).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
