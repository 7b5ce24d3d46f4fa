//! Session lookup and the route gate built on top of it.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Result, TaskpadError};
use crate::models::Session;

/// Source of the current session.
///
/// Implementations must never fail: a lookup that cannot complete is reported
/// as `None`, which every caller treats exactly like "signed out".
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_session(&self) -> Option<Session>;
}

#[async_trait]
impl<T: SessionProvider + ?Sized> SessionProvider for Arc<T> {
    async fn current_session(&self) -> Option<Session> {
        (**self).current_session().await
    }
}

/// Fetches the session immediately before an authenticated call.
pub async fn require_session(provider: &dyn SessionProvider) -> Result<Session> {
    provider
        .current_session()
        .await
        .ok_or(TaskpadError::NotAuthenticated)
}

/// Client-visible views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Marketing/landing view at the root.
    Landing,
    Login,
    /// Placeholder; sign-up performs no request.
    Signup,
    /// Protected task dashboard.
    Dashboard,
}

impl Route {
    pub fn requires_session(self) -> bool {
        matches!(self, Route::Dashboard)
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Dashboard => "/dashboard",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of mounting a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Render the requested route. Carries the session when one exists.
    Allow(Option<Session>),
    /// Send the viewer elsewhere.
    Redirect(Route),
}

/// Decides whether a viewer may see a route.
pub struct SessionGate {
    sessions: Arc<dyn SessionProvider>,
}

impl SessionGate {
    pub fn new(sessions: Arc<dyn SessionProvider>) -> Self {
        Self { sessions }
    }

    /// Queries the session once; no retry, no timeout.
    pub async fn mount(&self, route: Route) -> GateDecision {
        let session = self.sessions.current_session().await;
        match (route.requires_session(), session) {
            (true, None) => {
                tracing::debug!("no session, redirecting {route} to {}", Route::Login);
                GateDecision::Redirect(Route::Login)
            }
            (_, session) => GateDecision::Allow(session),
        }
    }
}
