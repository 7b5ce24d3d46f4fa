//! Layered configuration for the backend connection.
//!
//! Precedence (later layers override earlier ones):
//! 1. Defaults
//! 2. `config.toml` in the taskpad home (`$TASKPAD_HOME`, else `~/.taskpad`)
//! 3. Environment (`TASKPAD_URL` / `TASKPAD_ANON_KEY`, with `SUPABASE_URL` /
//!    `SUPABASE_ANON_KEY` accepted as fallbacks)
//!
//! Configuration is read once at startup; nothing reloads it afterwards.
//!
//! ```no_run
//! use taskpad_core::config::ConfigLoader;
//!
//! let config = ConfigLoader::new().load()?;
//! println!("{}", config.backend.url);
//! # Ok::<(), taskpad_core::config::ConfigError>(())
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Name of the configuration file inside the taskpad home.
pub const CONFIG_FILE: &str = "config.toml";

/// Default home directory name under the user's home.
const DEFAULT_HOME_DIR: &str = ".taskpad";

/// Storage bucket that holds profile pictures.
pub const DEFAULT_PICTURE_BUCKET: &str = "profile-pictures";

const ENV_HOME: &str = "TASKPAD_HOME";

/// Errors raised while assembling the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error loading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Missing required setting '{field}' (set it in {file} or via ${env})")]
    Missing {
        field: &'static str,
        file: String,
        env: &'static str,
    },

    #[error("Invalid backend URL '{value}': {source}")]
    InvalidUrl {
        value: String,
        source: url::ParseError,
    },

    #[error("Cannot determine home directory")]
    NoHome,
}

/// Where the hosted backend lives and how to identify this client to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL of the platform, e.g. `https://abc.supabase.co`.
    pub url: Url,
    /// Public (anon) API key sent as `apikey` on every request.
    pub anon_key: String,
    /// Bucket for profile pictures.
    pub picture_bucket: String,
}

impl BackendConfig {
    pub fn new(url: Url, anon_key: impl Into<String>) -> Self {
        Self {
            url,
            anon_key: anon_key.into(),
            picture_bucket: DEFAULT_PICTURE_BUCKET.to_string(),
        }
    }

    /// Joins `path` onto the base URL without dropping any base path segment.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    /// Directory holding `config.toml` and the stored session.
    pub home: PathBuf,
}

/// Shape of `config.toml`. Every field is optional so the file can hold a
/// partial layer.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    url: Option<String>,
    anon_key: Option<String>,
    picture_bucket: Option<String>,
}

/// Builder for layered configuration loading.
pub struct ConfigLoader {
    home: Option<PathBuf>,
    env: Option<HashMap<String, String>>,
    skip_file: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            home: None,
            env: None,
            skip_file: false,
        }
    }

    /// Use `path` as the taskpad home instead of auto-detecting it.
    pub fn with_home(mut self, path: PathBuf) -> Self {
        self.home = Some(path);
        self
    }

    /// Read overrides from `vars` instead of the process environment.
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Skip `config.toml` (defaults + environment only).
    pub fn skip_file_layer(mut self) -> Self {
        self.skip_file = true;
        self
    }

    pub fn load(self) -> Result<Config, ConfigError> {
        let home = self.resolve_home()?;

        let mut layer = FileConfig::default();
        if !self.skip_file {
            layer = Self::load_from_file(&home)?;
        }

        if let Some(url) = self.var("TASKPAD_URL").or_else(|| self.var("SUPABASE_URL")) {
            layer.url = Some(url);
        }
        if let Some(key) = self
            .var("TASKPAD_ANON_KEY")
            .or_else(|| self.var("SUPABASE_ANON_KEY"))
        {
            layer.anon_key = Some(key);
        }
        if let Some(bucket) = self.var("TASKPAD_PICTURE_BUCKET") {
            layer.picture_bucket = Some(bucket);
        }

        let file_display = home.join(CONFIG_FILE).display().to_string();
        let raw_url = layer.url.ok_or_else(|| ConfigError::Missing {
            field: "url",
            file: file_display.clone(),
            env: "TASKPAD_URL",
        })?;
        let anon_key = layer.anon_key.ok_or(ConfigError::Missing {
            field: "anon_key",
            file: file_display,
            env: "TASKPAD_ANON_KEY",
        })?;
        let url = Url::parse(raw_url.trim()).map_err(|source| ConfigError::InvalidUrl {
            value: raw_url.clone(),
            source,
        })?;

        let mut backend = BackendConfig::new(url, anon_key);
        if let Some(bucket) = layer.picture_bucket {
            backend.picture_bucket = bucket;
        }

        Ok(Config { backend, home })
    }

    /// Reads `config.toml`; a missing file is an empty layer.
    fn load_from_file(home: &Path) -> Result<FileConfig, ConfigError> {
        let path = home.join(CONFIG_FILE);
        let contents = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("{} not found, using environment only", path.display());
                return Ok(FileConfig::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };
        Ok(toml::from_str(&contents)?)
    }

    fn resolve_home(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.home {
            return Ok(path.clone());
        }
        if let Some(path) = self.var(ENV_HOME) {
            return Ok(PathBuf::from(path));
        }
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_HOME_DIR))
            .ok_or(ConfigError::NoHome)
    }

    fn var(&self, key: &str) -> Option<String> {
        let value = match &self.env {
            Some(env) => env.get(key).cloned(),
            None => std::env::var(key).ok(),
        };
        value.filter(|v| !v.trim().is_empty())
    }
}
