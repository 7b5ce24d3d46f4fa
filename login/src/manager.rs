//! The process-wide session: loaded from disk, refreshed when it is about to
//! expire, and handed to every authenticated call.

use async_trait::async_trait;
use taskpad_core::SessionProvider;
use taskpad_core::models::Session;
use tokio::sync::Mutex;

use crate::auth_client::{AuthClient, LoginError};
use crate::session_storage::SessionStorage;

/// Seconds before `expires_at` at which a session counts as expired.
pub const REFRESH_SKEW_SECS: i64 = 60;

pub struct SessionManager {
    auth: AuthClient,
    storage: SessionStorage,
    cached: Mutex<Option<Session>>,
}

impl SessionManager {
    pub fn new(auth: AuthClient, storage: SessionStorage) -> Self {
        Self {
            auth,
            storage,
            cached: Mutex::new(None),
        }
    }

    pub fn storage(&self) -> &SessionStorage {
        &self.storage
    }

    /// Signs in and persists the new session.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, LoginError> {
        let session = self.auth.sign_in_with_password(email, password).await?;
        self.storage.save(&session)?;
        *self.cached.lock().await = Some(session.clone());
        Ok(session)
    }

    /// Forgets the local session. Server-side revocation is best effort.
    /// Returns whether a session was present.
    pub async fn logout(&self) -> Result<bool, LoginError> {
        let mut cached = self.cached.lock().await;
        let session = match cached.take() {
            Some(session) => Some(session),
            None => self.storage.load().unwrap_or_else(|e| {
                tracing::warn!("ignoring unreadable session file: {e}");
                None
            }),
        };
        if let Some(session) = &session
            && let Err(e) = self.auth.sign_out(&session.access_token).await
        {
            tracing::warn!("server-side sign out failed: {e}");
        }
        self.storage.clear()?;
        Ok(session.is_some())
    }

    /// Resolves the current session, refreshing it if needed.
    async fn resolve(&self) -> Result<Option<Session>, LoginError> {
        let mut cached = self.cached.lock().await;
        let session = match cached.clone() {
            Some(session) => session,
            None => match self.storage.load()? {
                Some(session) => session,
                None => return Ok(None),
            },
        };

        if !session.is_expired(REFRESH_SKEW_SECS) {
            *cached = Some(session.clone());
            return Ok(Some(session));
        }

        let Some(refresh_token) = session.refresh_token.as_deref() else {
            tracing::info!("session expired and cannot be refreshed");
            *cached = None;
            self.storage.clear()?;
            return Ok(None);
        };

        match self.auth.refresh(refresh_token).await {
            Ok(fresh) => {
                tracing::debug!("refreshed session for {}", fresh.user.id);
                self.storage.save(&fresh)?;
                *cached = Some(fresh.clone());
                Ok(Some(fresh))
            }
            Err(LoginError::Rejected { status, message }) => {
                tracing::info!("refresh rejected ({status}): {message}");
                *cached = None;
                self.storage.clear()?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl SessionProvider for SessionManager {
    async fn current_session(&self) -> Option<Session> {
        match self.resolve().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("session lookup failed: {e}");
                None
            }
        }
    }
}
