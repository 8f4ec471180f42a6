mod chat;
mod config;

use clap::{Parser, Subcommand, ValueEnum};
use config::ParcelConfig;
use parcel_dialogue::DialogueEngine;
use parcel_gateway::{AppState, GatewayServer};
use parcel_oracle::{OracleClient, OracleConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "parcel", about = "Parcel: package-tracking support assistant")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "parcel.toml")]
    config: PathBuf,

    /// Log output format (default: json for serve, pretty for chat)
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Chat with the assistant in the terminal
    Chat,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

async fn build_oracle(config: &OracleConfig) -> OracleClient {
    let client = OracleClient::new(config);
    if !client.is_available() || !config.verify_on_startup {
        return client;
    }
    info!(model = %config.model_id, "Testing oracle connection");
    client.verified().await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env is fine
    let dotenv = dotenvy::dotenv();
    let log_format = cli.log_format.unwrap_or(match cli.command {
        Commands::Serve { .. } => LogFormat::Json,
        Commands::Chat => LogFormat::Pretty,
    });
    init_tracing(log_format);
    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!(error = %e, "Failed to load .env file");
        }
    }

    let config = ParcelConfig::load(&cli.config).await?;
    let oracle = Arc::new(build_oracle(&config.oracle).await);
    if !oracle.is_available() {
        warn!("Oracle unavailable, replies will use fallback text");
    }
    let engine = Arc::new(DialogueEngine::new(oracle, config.dialogue));

    match cli.command {
        Commands::Serve { host, port } => {
            let mut server = config.server;
            if let Some(host) = host {
                server.host = host;
            }
            if let Some(port) = port {
                server.port = port;
            }

            let state = Arc::new(AppState::new(engine, config.bot, &server));
            let sweeper = state.sessions.clone().start_sweeper(SESSION_SWEEP_INTERVAL);
            let app = GatewayServer::build(state);

            let addr = server.bind_addr();
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("Parcel gateway listening on {addr}");

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            sweeper.abort();
            info!("Server shut down");
        }
        Commands::Chat => {
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = tokio::io::stdout();
            chat::run(&engine, stdin, &mut stdout).await?;
        }
    }

    Ok(())
}
