use std::path::PathBuf;

use clap::Parser;
use metabolic_monitor_data::{ClientConfig, ConfigError};
use metabolic_monitor_domain::services::SubmitPolicy;

/// Command line of the dashboard binary
///
/// Backend settings given here override `API_URL`, `API_TIMEOUT_SECONDS`
/// and `PUSH_RECONNECT_SECONDS` from the environment.
#[derive(Parser, Debug, Clone)]
#[command(name = "metabolic-monitor")]
#[command(about = "Terminal dashboard for the Metabolic Health Monitor")]
#[command(version)]
pub struct Cli {
    /// Run against an in-process backend with sample data (no server required)
    #[arg(long, short)]
    pub demo: bool,

    /// Backend base URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Seconds to wait before reconnecting the push channel
    #[arg(long)]
    pub reconnect_seconds: Option<u64>,

    /// When the reading form resets: `await` or `fire-and-forget`
    #[arg(long, env = "FORM_SUBMIT_MODE", default_value = "await")]
    pub submit_mode: SubmitPolicy,

    /// Directory for the rolling log file
    #[arg(long, env = "LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,
}

/// Resolved dashboard settings
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub client: ClientConfig,
    pub submit_policy: SubmitPolicy,
    pub log_dir: PathBuf,
    pub demo: bool,
}

impl DashboardConfig {
    /// Combine the environment with command-line overrides
    pub fn load(cli: Cli) -> Result<Self, ConfigError> {
        Self::from_parts(ClientConfig::from_env()?, cli)
    }

    /// Apply command-line overrides to a base client configuration
    pub fn from_parts(mut client: ClientConfig, cli: Cli) -> Result<Self, ConfigError> {
        if let Some(api_url) = cli.api_url {
            client = client.with_base_url(api_url);
        }
        if cli.timeout_seconds.is_some() {
            client = client.with_timeout_seconds(cli.timeout_seconds);
        }
        if let Some(reconnect_seconds) = cli.reconnect_seconds {
            client = client.with_reconnect_seconds(reconnect_seconds);
        }

        Ok(Self {
            client: client.validated()?,
            submit_policy: cli.submit_mode,
            log_dir: cli.log_dir,
            demo: cli.demo,
        })
    }
}
