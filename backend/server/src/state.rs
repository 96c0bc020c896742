use std::sync::Arc;

use bank::{Backend, memory::MemoryBank, remote::RemoteBank};
use tracing::info;

use super::{
    config::{BackendMode, Config, ConfigError},
    error::AppError,
    session::SessionStore,
};

pub struct AppState {
    pub config: Config,
    pub backend: Arc<dyn Backend>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>, AppError> {
        let backend: Arc<dyn Backend> = match config.backend_mode {
            BackendMode::Remote => {
                let url = config
                    .backend_url
                    .as_deref()
                    .ok_or(ConfigError::Missing("BACKEND_URL"))?;
                let key = config
                    .backend_key
                    .as_deref()
                    .ok_or(ConfigError::Missing("BACKEND_ANON_KEY"))?;

                info!("Using hosted backend at {url}");
                Arc::new(RemoteBank::new(url, key)?)
            }
            BackendMode::Memory => {
                info!("Using in-memory backend, nothing will be persisted");

                let bank = MemoryBank::seeded();
                match &config.admin {
                    Some((email, password)) => Arc::new(bank.with_admin(email, password)),
                    None => Arc::new(bank),
                }
            }
        };

        Ok(Self::with_backend(config, backend))
    }

    pub fn with_backend(config: Config, backend: Arc<dyn Backend>) -> Arc<Self> {
        let sessions = SessionStore::new(config.session_ttl, config.cookie_secure);

        Arc::new(Self {
            config,
            backend,
            sessions,
        })
    }
}
