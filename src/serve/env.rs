use std::{sync::LazyLock, time::Duration};

use reqwest::Url;
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};

use crate::env::{deserialize_urls, get_app_config, Network, ToApiUrl};

#[serde_as]
#[derive(Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Log every SQL statement.
    #[serde(default)]
    pub debug: bool,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "default_network")]
    pub tron_network: Network,
    /// Overrides the public endpoint of `tron_network`.
    #[serde(default, deserialize_with = "deserialize_urls")]
    pub tron_nodes: Vec<Url>,
    pub tron_api_key: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub tron_request_timeout_secs: u64,
}

fn default_port() -> u16 {
    8000
}

fn default_database_url() -> String {
    "sqlite://tron.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_network() -> Network {
    Network::Shasta
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl AppConfig {
    pub fn tron_nodes(&self) -> Vec<Url> {
        if self.tron_nodes.is_empty() {
            vec![self.tron_network.to_api_url()]
        } else {
            self.tron_nodes.clone()
        }
    }

    pub fn tron_request_timeout(&self) -> Duration {
        Duration::from_secs(self.tron_request_timeout_secs)
    }
}

pub static APP_CONFIG: LazyLock<AppConfig> = LazyLock::new(get_app_config);
