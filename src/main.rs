use std::path::PathBuf;

use anyhow::Result;
use browser_connector::{Config, ConnectorServer};
use clap::{Parser, ValueEnum};

mod servers;
use servers::{run_http_server, run_stdio_server};

#[derive(Parser)]
#[command(name = "browser-connector")]
#[command(about = "Browser connector - bridges screenshot and element tools to a browser extension")]
#[command(version)]
struct Cli {
    /// Server transport mode
    #[arg(short, long, default_value = "http")]
    transport: TransportMode,

    /// Connector bind host (overrides CONNECTOR_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Connector port (overrides CONNECTOR_PORT)
    #[arg(long)]
    connector_port: Option<u16>,

    /// Screenshot directory (overrides SCREENSHOT_PATH)
    #[arg(long)]
    screenshot_path: Option<PathBuf>,

    /// Capture reply timeout in milliseconds (overrides CAPTURE_TIMEOUT_MS)
    #[arg(long)]
    capture_timeout_ms: Option<u64>,
}

#[derive(Clone, ValueEnum)]
enum TransportMode {
    /// HTTP connector only (default)
    Http,
    /// HTTP connector plus MCP tools on standard I/O
    Stdio,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let mut config = Config::from_env();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.connector_port {
        config.port = port;
    }
    if let Some(path) = cli.screenshot_path {
        config.screenshot_path = path;
    }
    if let Some(timeout) = cli.capture_timeout_ms {
        config.capture_timeout_ms = timeout;
    }

    config.validate().map_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    let connector = ConnectorServer::bind(&config).await.inspect_err(|e| {
        tracing::error!("Failed to bind {}: {}", config.bind_address(), e);
    })?;
    tracing::info!(
        "Saving screenshots to {}",
        config.screenshot_path.display()
    );

    match cli.transport {
        TransportMode::Http => run_http_server(connector).await,
        TransportMode::Stdio => run_stdio_server(connector).await,
    }
}
