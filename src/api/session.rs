use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

const SESSION_FILE: &str = "session.json";

/// Everything a request needs to reach the API: base url plus an optional
/// bearer token. Passed explicitly into [ApiClient](super::client::ApiClient)
/// so multiple sessions can coexist, e.g. in tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub api_url: String,
    pub token: Option<String>,
}

impl Session {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Loads the persisted session from `dir`, or starts a fresh anonymous one
    /// pointed at `api_url`. A present `api_url` always wins over the stored one
    /// so that `--api-url` can redirect an existing session.
    pub fn load(dir: &Path, api_url: Option<String>) -> Self {
        let stored = std::fs::read(Self::file_path(dir))
            .ok()
            .and_then(|raw| serde_json::from_slice::<Session>(&raw).ok());

        match (stored, api_url) {
            (Some(mut session), Some(url)) => {
                if session.api_url != url {
                    // a token issued by one server is meaningless for another
                    session.token = None;
                    session.api_url = url;
                }
                session
            }
            (Some(session), None) => session,
            (None, Some(url)) => Session::new(url),
            (None, None) => Session::new(DEFAULT_API_URL),
        }
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = Self::file_path(dir);
        debug!("Saving session to {path:?}");
        let raw = serde_json::to_vec_pretty(self)?;
        std::fs::write(&path, raw).with_context(|| format!("Can't write session to {path:?}"))?;
        Ok(())
    }

    pub fn delete(dir: &Path) -> Result<()> {
        let path = Self::file_path(dir);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Can't remove session at {path:?}")),
        }
    }

    fn file_path(dir: &Path) -> PathBuf {
        dir.join(SESSION_FILE)
    }
}
