//! Per-invocation wiring: configuration, stored session, remote services.

use std::sync::Arc;

use taskpad_core::default_client::{DEFAULT_ORIGINATOR, create_client};
use taskpad_core::{Config, ConfigLoader, Dashboard, GateDecision, Route, Services};
use taskpad_login::{AuthClient, SessionManager, SessionStorage};

pub(crate) const NOT_SIGNED_IN: &str = "Not signed in. Run `taskpad login` first.";

pub struct AppContext {
    pub sessions: Arc<SessionManager>,
    pub services: Services,
}

impl AppContext {
    /// Loads configuration once and builds every client on one HTTP pool.
    pub fn load() -> Result<Self, String> {
        let config = ConfigLoader::new().load().map_err(|e| e.to_string())?;
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: Config) -> Self {
        let http = create_client(DEFAULT_ORIGINATOR);
        let auth = AuthClient::new(http.clone(), Arc::new(config.backend.clone()));
        let sessions = Arc::new(SessionManager::new(
            auth,
            SessionStorage::new(&config.home),
        ));
        let services = Services::with_client(http, config.backend.clone(), sessions.clone());
        tracing::debug!("using backend {}", config.backend.url);
        Self { sessions, services }
    }

    /// Mounts the protected dashboard: refuses without a session, otherwise
    /// returns it with tasks and subtasks loaded.
    pub async fn dashboard(&self) -> Result<Dashboard, String> {
        if let GateDecision::Redirect(_) = self.services.gate().mount(Route::Dashboard).await {
            return Err(NOT_SIGNED_IN.to_string());
        }
        let mut dashboard = self.services.dashboard();
        dashboard.load().await?;
        Ok(dashboard)
    }
}
