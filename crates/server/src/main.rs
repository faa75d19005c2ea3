use anyhow::Result;
use clap::Parser;
use courtlistener_mcp::{McpServer, StdioTransport};
use std::path::PathBuf;
use std::sync::Arc;

mod api;
mod config;

use config::{LoggingConfig, Overrides, ServerConfig, TransportKind};

#[derive(Parser, Debug)]
#[command(name = "courtlistener-mcp")]
#[command(about = "MCP server for the CourtListener legal database and eCFR", long_about = None)]
struct Args {
    /// Path to a TOML configuration file (default: ./courtlistener.toml if present)
    #[arg(short, long, env = "COURTLISTENER_CONFIG")]
    config: Option<PathBuf>,

    /// CourtListener API root
    #[arg(long, env = "COURTLISTENER_BASE_URL")]
    base_url: Option<String>,

    /// CourtListener API token
    #[arg(long, env = "COURTLISTENER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long, env = "COURTLISTENER_TIMEOUT")]
    timeout: Option<u64>,

    /// eCFR API root
    #[arg(long, env = "ECFR_BASE_URL")]
    ecfr_base_url: Option<String>,

    /// Requests per minute allowed to each upstream API
    #[arg(long, env = "RATE_LIMIT_PER_MINUTE")]
    rate_limit_per_minute: Option<u32>,

    /// Requests allowed back to back before the per-minute limit applies
    #[arg(long, env = "RATE_LIMIT_BURST")]
    rate_limit_burst: Option<u32>,

    /// Host to bind to (http transport)
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port to listen on (http transport)
    #[arg(short, long, env = "MCP_PORT")]
    port: Option<u16>,

    /// Message transport
    #[arg(short, long, env = "MCP_TRANSPORT", value_enum)]
    transport: Option<TransportKind>,

    /// Deployment environment reported by the status tool
    #[arg(long, env = "ENVIRONMENT")]
    environment: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "COURTLISTENER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Force debug logging
    #[arg(long, env = "COURTLISTENER_DEBUG")]
    debug: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Args {
    fn overrides(self) -> Overrides {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("COURT_LISTENER_API_KEY").ok());
        Overrides {
            courtlistener_base_url: self.base_url,
            api_key,
            timeout_secs: self.timeout,
            ecfr_base_url: self.ecfr_base_url,
            rate_limit_per_minute: self.rate_limit_per_minute,
            rate_limit_burst: self.rate_limit_burst,
            host: self.host,
            port: self.port,
            transport: self.transport,
            environment: self.environment,
            log_level: self.log_level,
            debug: self.debug,
            log_json: self.log_json,
        }
    }
}

/// Logs go to stderr; stdout belongs to the stdio transport.
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter().into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let mut args = Args::parse();
    let config_path = args.config.take();
    let config = ServerConfig::load(config_path.as_deref())?.apply(args.overrides());

    init_tracing(&config.logging);
    tracing::info!("Starting CourtListener MCP server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("CourtListener API: {}", config.courtlistener.base_url);
    tracing::info!("eCFR API: {}", config.ecfr.base_url);
    if config.courtlistener.api_key.is_none() {
        tracing::warn!("COURTLISTENER_API_KEY is not set; CourtListener tools will fail");
    }

    let context = Arc::new(config.build_context()?);
    let server = Arc::new(McpServer::new(context));
    tracing::info!("Registered {} tools", server.registry().len());

    match config.server.transport {
        TransportKind::Stdio => {
            let mut transport = StdioTransport::new();
            server.run(&mut transport).await?;
        }
        TransportKind::Http => {
            let addr = config.bind_addr();
            api::serve(&addr, server).await?;
        }
    }

    Ok(())
}
