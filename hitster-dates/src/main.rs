//! hitster-dates - release-year reconciliation service and CLI

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hitster_common::config::TomlConfig;
use hitster_common::logging::init_tracing;
use hitster_common::track::{AlbumRef, ArtistRef};
use hitster_common::TrackRef;
use hitster_dates::{build_router, AppState, Reconciler};
use tokio::signal;
use tracing::info;

/// Command-line arguments for hitster-dates
#[derive(Parser, Debug)]
#[command(name = "hitster-dates")]
#[command(about = "Release-year reconciliation for hitster")]
#[command(version)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the reconciliation endpoint over HTTP
    Serve {
        /// Port to listen on (overrides the config file)
        #[arg(short, long, env = "HITSTER_DATES_PORT")]
        port: Option<u16>,
    },
    /// Reconcile a single track and print the result as JSON
    Lookup {
        /// Track title as listed by the platform
        #[arg(long)]
        title: String,

        /// Credited artist; repeat for several, primary first
        #[arg(long = "artist")]
        artists: Vec<String>,

        /// Platform release date (YYYY, YYYY-MM or YYYY-MM-DD)
        #[arg(long, default_value = "")]
        release_date: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TomlConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging).context("Failed to initialize logging")?;

    let reconciler =
        Arc::new(Reconciler::from_config(&config).context("Failed to build reconciler")?);

    match cli.command {
        Command::Serve { port } => serve(&config, reconciler, port).await,
        Command::Lookup {
            title,
            artists,
            release_date,
        } => lookup(&reconciler, title, artists, release_date).await,
    }
}

async fn serve(config: &TomlConfig, reconciler: Arc<Reconciler>, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", config.server.host, port)
        .parse()
        .context("Invalid listen address")?;

    info!("Starting hitster-dates v{}", env!("CARGO_PKG_VERSION"));

    let app = build_router(AppState::new(reconciler));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn lookup(
    reconciler: &Reconciler,
    title: String,
    artists: Vec<String>,
    release_date: String,
) -> Result<()> {
    let track = TrackRef {
        id: "cli".to_string(),
        name: title,
        is_playable: true,
        is_local: false,
        artists: artists.into_iter().map(|name| ArtistRef { name }).collect(),
        album: AlbumRef {
            name: String::new(),
            release_date,
            images: vec![],
        },
    };

    let dates = reconciler.track_dates(&track).await?;
    println!("{}", serde_json::to_string_pretty(&dates)?);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
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
