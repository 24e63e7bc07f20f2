use std::sync::Arc;

use crate::api::{ApiClient, QuizBackend};
use crate::clock::Ticker;
use crate::config::Config;

pub mod attempt_service;
pub mod quiz_board;

pub struct AppState {
    pub config: Config,
    pub api: ApiClient,
    pub backend: Arc<dyn QuizBackend>,
    pub ticker: Arc<Ticker>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let api = ApiClient::from_config(&config)?;
        tracing::info!("API client ready for {}", api.base_url());

        Ok(Self::with_backend(config, api.clone(), Arc::new(api)))
    }

    /// Build state around an existing backend, e.g. an in-memory fake
    pub fn with_backend(config: Config, api: ApiClient, backend: Arc<dyn QuizBackend>) -> Self {
        Self {
            config,
            api,
            backend,
            ticker: Arc::new(Ticker::system()),
        }
    }

    pub fn attempts(&self) -> attempt_service::AttemptService {
        attempt_service::AttemptService::new(self.backend.clone(), self.config.routes.clone())
    }
}
