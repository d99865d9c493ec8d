//! mcr-report - Missing contacts report service
//!
//! Serves `GET /generatePDF`: a PDF listing portfolio clients whose phone
//! number or email is missing, grouped by segmentation.
//!
//! Startup aborts when the access token or portfolio id is missing.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mcr_common::config::load_config;
use mcr_report::{build_router, AppState, AsanaClient, Credentials, ReportSettings};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for mcr-report
#[derive(Parser, Debug)]
#[command(name = "mcr-report")]
#[command(about = "Missing contacts PDF report service")]
#[command(version)]
struct Args {
    /// Personal access token for the upstream API
    #[arg(long, env = "ASANA_PAT", hide_env_values = true)]
    token: Option<String>,

    /// Portfolio whose clients are reported
    #[arg(long, env = "PORTFOLIO_ID")]
    portfolio: Option<String>,

    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "PORT")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0", env = "MCR_BIND")]
    bind: IpAddr,

    /// TOML configuration file (falls back to MCR_CONFIG, then the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "mcr_report={level},mcr_common={level},tower_http={level}"
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG wins; otherwise start at info and switch to the TOML level below
    let env_filter_set = std::env::var_os("RUST_LOG").is_some();
    let (filter, filter_handle) = reload::Layer::new(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter("info")),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting mcr-report v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let toml_config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if !env_filter_set {
        filter_handle
            .reload(default_filter(&toml_config.logging.level))
            .context("Failed to apply log level")?;
    }

    let credentials = Credentials::new(
        args.token.unwrap_or_default(),
        args.portfolio.unwrap_or_default(),
    )
    .context("Invalid upstream credentials")?;
    info!("Portfolio: {}", credentials.portfolio_id);
    info!(
        "Container source: {:?}, aggregation timeout {}s",
        toml_config.asana.container_source, toml_config.aggregation.timeout_secs
    );

    let client = AsanaClient::new(credentials.access_token.clone(), &toml_config.asana)
        .context("Failed to create upstream API client")?;

    let settings = ReportSettings::new(credentials.portfolio_id.clone(), &toml_config);
    let state = AppState::new(Arc::new(client), settings);
    let app = build_router(state);

    let addr = SocketAddr::new(args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("mcr-report listening on http://{}", addr);
    info!("Report: http://{}/generatePDF", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
