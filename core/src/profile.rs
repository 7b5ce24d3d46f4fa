//! Profile row management and profile-picture upload.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Result, TaskpadError};
use crate::models::{Profile, Session};
use crate::object_store::{Bucket, key_from_public_url};
use crate::rest::RestClient;
use crate::session::{SessionProvider, require_session};

pub const PROFILES_TABLE: &str = "profiles";

/// Message shown when the chosen file is not an image.
pub const NOT_AN_IMAGE: &str = "Please select an image file";

#[derive(Serialize)]
struct PicturePatch<'a> {
    profile_picture_url: &'a str,
    updated_at: DateTime<Utc>,
}

/// A file chosen for upload.
#[derive(Debug, Clone)]
pub struct PictureFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PictureFile {
    /// Reads `path`, guessing the content type from its extension.
    pub async fn read(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Text after the last `.`, or the whole name when there is none.
    pub fn extension(&self) -> &str {
        self.file_name
            .rsplit('.')
            .next()
            .unwrap_or(self.file_name.as_str())
    }
}

/// Object key for a new picture: `<user-id>/<unix-millis>.<extension>`.
pub fn picture_key(user_id: &str, millis: i64, extension: &str) -> String {
    format!("{user_id}/{millis}.{extension}")
}

pub struct ProfileService {
    rest: RestClient,
    bucket: Bucket,
    sessions: Arc<dyn SessionProvider>,
}

impl ProfileService {
    pub fn new(rest: RestClient, bucket: Bucket, sessions: Arc<dyn SessionProvider>) -> Self {
        Self {
            rest,
            bucket,
            sessions,
        }
    }

    /// Returns the user's profile, creating it first if it does not exist.
    ///
    /// Creation is a single insert-if-absent, so concurrent first loads both
    /// succeed and observe the same row.
    pub async fn ensure(&self) -> Result<Profile> {
        let session = require_session(self.sessions.as_ref()).await?;
        let fresh = Profile {
            id: session.user_id().to_string(),
            email: session.user.email.clone(),
            profile_picture_url: None,
            updated_at: None,
        };
        let inserted: Option<Profile> = self
            .rest
            .from(PROFILES_TABLE)
            .insert_if_absent(&fresh, "id", &session)
            .await?;
        if let Some(profile) = inserted {
            tracing::info!("created profile for {}", profile.id);
            return Ok(profile);
        }
        self.fetch(&session)
            .await?
            .ok_or_else(|| TaskpadError::Parse("profile row missing after upsert".to_string()))
    }

    async fn fetch(&self, session: &Session) -> Result<Option<Profile>> {
        self.rest
            .from(PROFILES_TABLE)
            .eq("id", session.user_id())
            .maybe_single(session)
            .await
    }

    /// Replaces the profile picture with `file` and returns the new profile.
    ///
    /// The previous picture, if any, is removed first; whether that removal
    /// succeeds does not affect the upload.
    pub async fn upload_picture(&self, current: &Profile, file: PictureFile) -> Result<Profile> {
        if !file.is_image() {
            return Err(TaskpadError::Invalid(NOT_AN_IMAGE.to_string()));
        }
        let session = require_session(self.sessions.as_ref()).await?;
        let key = picture_key(
            session.user_id(),
            Utc::now().timestamp_millis(),
            file.extension(),
        );

        if let Some(old_key) = current
            .profile_picture_url
            .as_deref()
            .and_then(key_from_public_url)
            && let Err(e) = self.bucket.remove(&[old_key.clone()], &session).await
        {
            tracing::warn!("could not remove previous picture {old_key}: {e}");
        }

        self.bucket
            .upload(&key, file.bytes, &file.content_type, &session)
            .await?;
        let public_url = self.bucket.public_url(&key);

        let patch = PicturePatch {
            profile_picture_url: &public_url,
            updated_at: Utc::now(),
        };
        let mut rows: Vec<Profile> = self
            .rest
            .from(PROFILES_TABLE)
            .eq("id", session.user_id())
            .update(&patch, &session)
            .await?;

        Ok(rows.pop().unwrap_or_else(|| Profile {
            profile_picture_url: Some(public_url),
            ..current.clone()
        }))
    }
}
