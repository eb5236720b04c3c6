use crate::backend::{HttpSheetsBackend, SheetsBackend};
use crate::config::ServerConfig;
use anyhow::Result;
use std::sync::Arc;

/// Process-wide handles shared by every handler. Built once at startup and
/// never mutated afterwards.
pub struct AppState {
    config: Arc<ServerConfig>,
    backend: Arc<dyn SheetsBackend>,
}

impl AppState {
    pub fn new(config: Arc<ServerConfig>) -> Result<Self> {
        let missing = config.credentials.missing();
        if !missing.is_empty() {
            tracing::warn!(
                missing = %missing.join(", "),
                "missing credential environment variables; remote calls will fail to authenticate"
            );
        }

        let backend = HttpSheetsBackend::with_endpoints(
            &config.api_base_url,
            &config.token_url,
            config.credentials.clone(),
        )?;
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    pub fn with_backend(config: Arc<ServerConfig>, backend: Arc<dyn SheetsBackend>) -> Self {
        tracing::debug!(backend = backend.name(), "sheets backend ready");
        Self { config, backend }
    }

    pub fn config(&self) -> Arc<ServerConfig> {
        self.config.clone()
    }

    pub fn backend(&self) -> &dyn SheetsBackend {
        self.backend.as_ref()
    }
}
