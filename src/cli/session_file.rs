use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Saved CLI session: which server we talked to and the token we got.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFile {
    pub server: String,
    pub email: String,
    pub token: String,
    pub saved_at: DateTime<Utc>,
}

impl SessionFile {
    pub fn new(server: String, email: String, token: String) -> Self {
        Self {
            server,
            email,
            token,
            saved_at: Utc::now(),
        }
    }
}

fn session_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("could not determine the user config directory")?;
    Ok(base.join("designhub").join("session.json"))
}

pub fn load() -> Result<Option<SessionFile>> {
    let path = session_path()?;
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let session = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(session))
}

pub fn save(session: &SessionFile) -> Result<()> {
    let path = session_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let raw = serde_json::to_string_pretty(session)?;
    fs::write(&path, raw).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

pub fn delete() -> Result<()> {
    let path = session_path()?;
    if path.exists() {
        fs::remove_file(&path).with_context(|| format!("failed to remove {}", path.display()))?;
    }
    Ok(())
}
