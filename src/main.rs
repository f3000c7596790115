use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use datadog_mcp_server::config::{AppConfig, CliConfig, FileConfig, Transport};
use datadog_mcp_server::server::{self, run_metrics_server, run_server, DEFAULT_PORT};
use datadog_mcp_server::{run_stdio, DatadogClient, Dispatcher, RequestsLoggingLevel, ToolRegistry};

#[derive(Parser, Debug)]
#[command(version, about = "Datadog metrics tools for AI assistants, over stdio or HTTP")]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// How clients connect.
    #[clap(long, value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// The port to listen on (http transport).
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping). 0 disables it.
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The address to bind the HTTP listeners to.
    #[clap(long, default_value = "0.0.0.0")]
    pub bind_address: String,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Tracing filter directive (e.g. "debug"). Defaults to LOG_LEVEL, then info.
    #[clap(long)]
    pub log_level: Option<String>,

    /// Datadog site, e.g. datadoghq.com or datadoghq.eu.
    #[clap(long, env = "DD_SITE", default_value = "datadoghq.com")]
    pub dd_site: String,

    /// Datadog API key.
    #[clap(long, env = "DD_API_KEY", hide_env_values = true)]
    pub dd_api_key: Option<String>,

    /// Datadog application key.
    #[clap(long, env = "DD_APP_KEY", hide_env_values = true)]
    pub dd_app_key: Option<String>,

    /// Datadog API root, overriding the one derived from the site.
    #[clap(long)]
    pub dd_base_url: Option<String>,

    /// Timeout in seconds for Datadog requests. 0 disables the timeout.
    #[clap(long, default_value_t = 30)]
    pub backend_timeout_sec: u64,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            transport: self.transport,
            port: self.port,
            metrics_port: self.metrics_port,
            bind_address: self.bind_address.clone(),
            logging_level: self.logging_level.clone(),
            log_level: self.log_level.clone(),
            dd_site: self.dd_site.clone(),
            dd_api_key: self.dd_api_key.clone(),
            dd_app_key: self.dd_app_key.clone(),
            dd_base_url: self.dd_base_url.clone(),
            backend_timeout_sec: self.backend_timeout_sec,
        }
    }
}

fn init_tracing(log_level: Option<&str>) -> Result<()> {
    let builder = EnvFilter::builder().with_default_directive(LevelFilter::INFO.into());
    let filter = match log_level {
        Some(directives) => builder.parse_lossy(directives),
        None => builder.with_env_var("LOG_LEVEL").from_env_lossy(),
    };

    // stdout carries the stdio protocol
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .context("Failed to initialize tracing")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for ctrl-c: {}", e);
        return;
    }
    info!("Shutting down...");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    init_tracing(config.log_level.as_deref())?;
    info!("Starting with {:?}", config);

    let client = DatadogClient::new(
        config.datadog.base_url.clone(),
        config.datadog.api_key.clone(),
        config.datadog.app_key.clone(),
        config.datadog.timeout_sec,
    )?;
    info!("Datadog API at {}", client.base_url());

    let registry = ToolRegistry::builtin()?;
    info!("Registered {} tools", registry.tool_count());

    let dispatcher = Dispatcher::new(Arc::new(registry), Arc::new(client));

    server::metrics::init_metrics();

    match config.transport {
        Transport::Stdio => {
            run_stdio(dispatcher, tokio::io::stdin(), tokio::io::stdout()).await;
            Ok(())
        }
        Transport::Http => {
            if config.metrics_port > 0 {
                let bind_address = config.bind_address.clone();
                let metrics_port = config.metrics_port;
                tokio::spawn(async move {
                    if let Err(e) = run_metrics_server(bind_address, metrics_port).await {
                        error!("{:#}", e);
                    }
                });
            }

            run_server(config.server_config(), dispatcher, shutdown_signal()).await
        }
    }
}
