use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use axum_extra::extract::cookie::Key;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use platform_store::{FileStore, StoreSettings};
use tracing::warn;

const MIN_SECRET_BYTES: usize = 64;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreSettings,
    /// Overrides the `HR_DATA_DIR` lookup when set from the command line.
    pub data_dir: Option<PathBuf>,
    pub cookie_key: Key,
    pub cors_allowed_origins: Vec<String>,
    pub secure_cookies: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let cookie_key = match lookup("COOKIE_SECRET_BASE64") {
            Some(secret) => cookie_key_from_base64(&secret)?,
            None => {
                warn!("COOKIE_SECRET_BASE64 not set; sessions end when the server stops");
                Key::generate()
            }
        };

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();

        let secure_cookies = lookup("COOKIE_SECURE")
            .map(|val| matches!(val.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            store: StoreSettings::from_env(),
            data_dir: None,
            cookie_key,
            cors_allowed_origins,
            secure_cookies,
        })
    }

    pub fn with_data_dir(mut self, dir: Option<PathBuf>) -> Self {
        if dir.is_some() {
            self.data_dir = dir;
        }
        self
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| self.store.data_dir())
    }

    pub fn open_store(&self) -> FileStore {
        FileStore::new(self.data_dir())
    }
}

fn cookie_key_from_base64(secret: &str) -> Result<Key> {
    let bytes = STANDARD
        .decode(secret.trim())
        .context("invalid COOKIE_SECRET_BASE64")?;
    if bytes.len() < MIN_SECRET_BYTES {
        return Err(anyhow!(
            "COOKIE_SECRET_BASE64 must decode to at least {MIN_SECRET_BYTES} bytes"
        ));
    }
    Key::try_from(&bytes[..]).map_err(|err| anyhow!("invalid cookie key: {err}"))
}
