//! Signed-in session
//!
//! Holds the bearer token and user identity returned by `POST /auth/login`.
//! Persisted as JSON in the XDG data directory (~/.local/share/localdir/) so
//! the CLI stays signed in between runs. Nothing is read or written until the
//! caller asks.

use crate::config::Config;
use crate::constants::cache::SESSION_FILE;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Identity of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Persisted session contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<User>,
}

/// Session store
#[derive(Debug, Clone)]
pub struct Session {
    data: SessionData,
    path: Option<PathBuf>,
}

impl Session {
    /// A signed-out session that is never written to disk
    pub fn anonymous() -> Self {
        Self {
            data: SessionData::default(),
            path: None,
        }
    }

    /// Get the session file path
    pub fn session_path() -> Result<PathBuf> {
        Ok(Config::data_dir()?.join(SESSION_FILE))
    }

    /// Load the session from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(Self::session_path()?)
    }

    /// Load the session from a specific path; a missing file is signed out
    pub fn load_from(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Session(format!("Failed to read session file: {}", e)))?;
            serde_json::from_str(&content)
                .map_err(|e| Error::Session(format!("Failed to parse session file: {}", e)))?
        } else {
            SessionData::default()
        };

        debug!(path = %path.display(), signed_in = data.token.is_some(), "loaded session");
        Ok(Self {
            data,
            path: Some(path),
        })
    }

    /// Save the session; a no-op for anonymous sessions
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Session(format!("Failed to create data directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(&self.data)?;
        fs::write(path, content)
            .map_err(|e| Error::Session(format!("Failed to write session file: {}", e)))?;
        Ok(())
    }

    /// Record a successful sign-in
    pub fn sign_in(&mut self, token: impl Into<String>, user: Option<User>) {
        self.data.token = Some(token.into());
        self.data.user = user;
    }

    /// Forget the token and user, removing the file if there is one
    pub fn clear(&mut self) -> Result<()> {
        self.data = SessionData::default();
        if let Some(path) = &self.path {
            if path.exists() {
                fs::remove_file(path).map_err(|e| {
                    Error::Session(format!("Failed to remove session file: {}", e))
                })?;
            }
        }
        Ok(())
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.data.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn user(&self) -> Option<&User> {
        self.data.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.bearer_token().is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
