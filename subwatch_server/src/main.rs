//! # SubWatch Server
//!
//! Monitors a YouTube account's subscription list, detects additions and
//! removals between polls, and posts change notifications to a webhook.
//!
//! Provides:
//! - A background monitor task polling the subscription list on a fixed interval
//! - REST API (Axum) for status, the persisted snapshot, and a webhook test
//! - OAuth2 authorization flow (`/authorize` → Google → `/oauth2callback`)
//!
//! # Configuration
//!
//! Set `SUBWATCH_CONFIG` env var to a TOML config file path, or use defaults.
//! The server binds to the configured `host:port` (default `0.0.0.0:8370`).
//!
//! # CLI Usage
//!
//! ```bash
//! # Start with default config
//! subwatch_server
//!
//! # Start with a custom config file
//! subwatch_server --config subwatch.toml
//!
//! # Generate an example config file with inline documentation
//! subwatch_server --init-config
//!
//! # Override specific settings via env vars
//! SUBWATCH_MONITOR_POLL_INTERVAL_SECS=60 subwatch_server
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use subwatch_config::SubwatchConfig;
use subwatch_core::{Monitor, SnapshotStore, TokenStore, WebhookNotifier, YouTubeSource};
use subwatch_server::handlers;
use subwatch_server::state::AppState;

/// SubWatch subscription monitor.
#[derive(Parser, Debug)]
#[command(name = "subwatch_server")]
#[command(about = "SubWatch — YouTube subscription change monitor with webhook notifications")]
#[command(version)]
struct Cli {
    /// Path to subwatch.toml config file.
    /// Can also be set via SUBWATCH_CONFIG env var.
    #[arg(short, long, env = "SUBWATCH_CONFIG")]
    config: Option<String>,

    /// Generate an example subwatch.toml config file with documentation and exit.
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Handle --init-config: print example config and exit.
    if cli.init_config {
        print!("{}", SubwatchConfig::example_toml_commented());
        return Ok(());
    }

    // Load configuration from file or defaults, then apply env var overrides.
    let config = if let Some(path) = &cli.config {
        SubwatchConfig::from_file(path)?
    } else {
        let mut cfg = SubwatchConfig::default();
        cfg.apply_env_overrides();
        cfg.validate()?;
        cfg
    };

    // Initialize tracing. RUST_LOG takes precedence over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(
        "SubWatch starting on {}:{}",
        config.server.host,
        config.server.port
    );
    tracing::info!(
        "Poll interval: {}s, snapshot: {}, webhook configured: {}",
        config.monitor.poll_interval_secs,
        config.monitor.snapshot_path,
        config.webhook.url.is_some()
    );

    // One client per outbound concern, each with its own timeout: a hung
    // fetch or sink call must not stall the monitor past the configured bound.
    let api_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.monitor.request_timeout_secs))
        .build()?;
    let webhook_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.webhook.timeout_secs))
        .build()?;

    let tokens = Arc::new(TokenStore::new(
        &config.youtube.token_path,
        api_client.clone(),
        config.youtube.client_id.clone(),
        config.youtube.client_secret.clone(),
    ));
    let notifier = WebhookNotifier::new(webhook_client, config.webhook.url.clone());

    // Spawn the background monitor with its own store handle; handlers read
    // the snapshot file independently.
    let monitor = Monitor::new(
        YouTubeSource::new(api_client, tokens.clone()),
        notifier.clone(),
        SnapshotStore::new(&config.monitor.snapshot_path),
        Duration::from_secs(config.monitor.poll_interval_secs),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor_task = tokio::spawn(monitor.run(shutdown_rx));

    let state = Arc::new(AppState::new(
        config.clone(),
        SnapshotStore::new(&config.monitor.snapshot_path),
        notifier,
        tokens,
    ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the Axum router.
    let app = Router::new()
        .route("/", get(handlers::status_handler))
        .route("/subscriptions", get(handlers::subscriptions_handler))
        .route("/test-webhook", post(handlers::test_webhook_handler))
        .route("/authorize", get(handlers::authorize_handler))
        .route("/oauth2callback", get(handlers::oauth2callback_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // Bind and serve, stopping the monitor when the server stops.
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Signal the monitor and wait for it to finish its current cycle.
    let _ = shutdown_tx.send(true);
    let _ = monitor_task.await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolves when the process receives ctrl-c / SIGTERM-equivalent.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown signal handler: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
