//! nim-relay
//!
//! OpenAI-compatible front for NVIDIA NIM.
//!
//! ```text
//!     Client Request        ┌──────────────────────────────────────────┐
//!     ──────────────────────┼─▶ http server ─▶ handlers ─▶ translate   │
//!                           │                                  │       │
//!                           │                                  ▼       │
//!     Client Response       │                              upstream ───┼──▶ NVIDIA NIM
//!     ◀─────────────────────┼── JSON reply / event-stream relay ◀──────┼───
//!                           └──────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use nim_relay::config::{resolve_config, ConfigOverrides};
use nim_relay::lifecycle::{signals, Shutdown};
use nim_relay::observability::{logging, metrics};
use nim_relay::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "nim-relay", version, about = "OpenAI-compatible relay for NVIDIA NIM")]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Upstream bearer credential.
    #[arg(long, env = "NVIDIA_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Upstream base URL.
    #[arg(long, env = "NVIDIA_BASE_URL")]
    base_url: Option<String>,

    /// Port to listen on.
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            port: self.port,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(cli.config.as_deref(), cli.overrides())?;

    logging::init_logging(&config.observability)?;

    tracing::info!("nim-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        upstream = %config.upstream.base_url,
        api_key_configured = config.upstream.credential().is_some(),
        "Configuration loaded"
    );
    if config.upstream.credential().is_none() {
        tracing::warn!("NVIDIA_API_KEY is not set; chat completions will be rejected");
    }

    if config.observability.metrics_enabled {
        // Validation already checked the address parses.
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
