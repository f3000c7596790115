mod file_config;

pub use file_config::{DatadogFileConfig, FileConfig};

use crate::backend::DatadogClient;
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{anyhow, Result};
use clap::ValueEnum;

/// How the server talks to its client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    #[default]
    Stdio,
    Http,
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub transport: Transport,
    pub port: u16,
    pub metrics_port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,
    pub log_level: Option<String>,
    pub dd_site: String,
    pub dd_api_key: Option<String>,
    pub dd_app_key: Option<String>,
    pub dd_base_url: Option<String>,
    pub backend_timeout_sec: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub transport: Transport,
    pub port: u16,
    /// 0 disables the metrics server
    pub metrics_port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,
    /// Tracing filter directive, e.g. `debug` or `datadog_mcp_server=trace`
    pub log_level: Option<String>,
    pub datadog: DatadogSettings,
}

#[derive(Clone)]
pub struct DatadogSettings {
    pub site: String,
    pub api_key: String,
    pub app_key: String,
    pub base_url: String,
    /// 0 means no timeout
    pub timeout_sec: u64,
}

impl std::fmt::Debug for DatadogSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatadogSettings")
            .field("site", &self.site)
            .field("api_key", &"<redacted>")
            .field("app_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_sec", &self.timeout_sec)
            .finish()
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let transport = match file.transport {
            Some(s) => parse_transport(&s)
                .ok_or_else(|| anyhow!("Invalid transport in config file: {}", s))?,
            None => cli.transport,
        };

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        let bind_address = file
            .bind_address
            .unwrap_or_else(|| cli.bind_address.clone());

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let log_level = file.log_level.or_else(|| cli.log_level.clone());

        let dd_file = file.datadog.unwrap_or_default();

        let site = dd_file.site.unwrap_or_else(|| cli.dd_site.clone());

        let api_key = dd_file
            .api_key
            .or_else(|| cli.dd_api_key.clone())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                anyhow!("Datadog API key must be specified via --dd-api-key, DD_API_KEY or in config file")
            })?;

        let app_key = dd_file
            .app_key
            .or_else(|| cli.dd_app_key.clone())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                anyhow!("Datadog application key must be specified via --dd-app-key, DD_APP_KEY or in config file")
            })?;

        let base_url = dd_file
            .base_url
            .or_else(|| cli.dd_base_url.clone())
            .unwrap_or_else(|| DatadogClient::site_url(&site));

        let timeout_sec = dd_file.timeout_sec.unwrap_or(cli.backend_timeout_sec);

        Ok(Self {
            transport,
            port,
            metrics_port,
            bind_address,
            logging_level,
            log_level,
            datadog: DatadogSettings {
                site,
                api_key,
                app_key,
                base_url,
                timeout_sec,
            },
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            bind_address: self.bind_address.clone(),
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

fn parse_transport(s: &str) -> Option<Transport> {
    Transport::from_str(s, true).ok()
}
