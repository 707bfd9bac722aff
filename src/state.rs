// src/state.rs
use std::sync::Arc;

use crate::config::RelayConfig;
use crate::services::upstream::UpstreamClient;

pub type SharedState = Arc<AppState>;

#[derive(Debug)]
pub struct AppState {
    pub config: RelayConfig,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: RelayConfig) -> reqwest::Result<Self> {
        let upstream = UpstreamClient::from_config(&config)?;
        Ok(Self { config, upstream })
    }
}
