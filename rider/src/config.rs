use clap::Parser;
use common::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_PLATFORM, DEFAULT_STORE_PATH, TIMEOUT_SECONDS,
};
use common::network::GatewayConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Command line of the rider client. Every option can also come from the
/// environment.
#[derive(Debug, Parser)]
#[command(name = "rider", about = "Terminal client for delivery riders")]
pub struct Args {
    /// Base URL of the rider API
    #[arg(long, env = "RIDER_API_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_url: String,

    /// File holding the session between runs
    #[arg(long, env = "RIDER_STORE_PATH", default_value = DEFAULT_STORE_PATH)]
    pub store_path: PathBuf,

    /// Value of the platform header sent with every request
    #[arg(long, env = "RIDER_PLATFORM", default_value = DEFAULT_PLATFORM)]
    pub platform: String,

    /// HTTP request timeout, in seconds
    #[arg(long, env = "RIDER_TIMEOUT_SECS", default_value_t = TIMEOUT_SECONDS)]
    pub timeout_secs: u64,

    /// Print debug lines
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.api_url.clone(),
            platform: self.platform.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}
