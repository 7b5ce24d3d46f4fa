//! Wiring of the remote clients behind one shared HTTP client.

use std::sync::Arc;

use crate::config::BackendConfig;
use crate::dashboard::Dashboard;
use crate::default_client::{DEFAULT_ORIGINATOR, create_client};
use crate::functions::{Augmentation, FunctionsClient};
use crate::object_store::Bucket;
use crate::profile::ProfileService;
use crate::rest::RestClient;
use crate::session::{SessionGate, SessionProvider};
use crate::subtasks::{RemoteSubtaskStore, SubtaskRepository};
use crate::tasks::{RemoteTaskStore, TaskRepository};

/// Every remote service, sharing one connection pool and one session source.
#[derive(Clone)]
pub struct Services {
    pub tasks: Arc<dyn TaskRepository>,
    pub subtasks: Arc<dyn SubtaskRepository>,
    pub augmentation: Arc<dyn Augmentation>,
    pub profiles: Arc<ProfileService>,
    pub sessions: Arc<dyn SessionProvider>,
}

impl Services {
    pub fn connect(backend: BackendConfig, sessions: Arc<dyn SessionProvider>) -> Self {
        Self::with_client(create_client(DEFAULT_ORIGINATOR), backend, sessions)
    }

    pub fn with_client(
        http: reqwest::Client,
        backend: BackendConfig,
        sessions: Arc<dyn SessionProvider>,
    ) -> Self {
        let backend = Arc::new(backend);
        let rest = RestClient::new(http.clone(), Arc::clone(&backend));
        let bucket = Bucket::new(
            http.clone(),
            Arc::clone(&backend),
            backend.picture_bucket.clone(),
        );
        Self {
            tasks: Arc::new(RemoteTaskStore::new(rest.clone(), Arc::clone(&sessions))),
            subtasks: Arc::new(RemoteSubtaskStore::new(rest.clone(), Arc::clone(&sessions))),
            augmentation: Arc::new(FunctionsClient::new(http, backend, Arc::clone(&sessions))),
            profiles: Arc::new(ProfileService::new(rest, bucket, Arc::clone(&sessions))),
            sessions,
        }
    }

    pub fn gate(&self) -> SessionGate {
        SessionGate::new(Arc::clone(&self.sessions))
    }

    /// A fresh dashboard; call [`Dashboard::load`] before reading it.
    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(
            Arc::clone(&self.tasks),
            Arc::clone(&self.subtasks),
            Arc::clone(&self.augmentation),
        )
    }
}
