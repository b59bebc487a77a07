use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credential file name inside the app config directory
const CREDENTIAL_FILE: &str = "session.json";

/// Application name used for the config directory path
const APP_NAME: &str = "medzy-portal";

/// The in-memory credential: opaque bearer token plus the session id the
/// server issued with it. Immutable once issued; replaced wholesale by
/// the next login. Carries no client-side expiry - validity is judged by
/// timeouts and server-side checks, never by decoding the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub session_id: String,
}

/// Persisted form of the credential.
///
/// `created_at` is diagnostic metadata only and is never consulted when
/// deciding whether the credential is still usable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredential {
    pub token: String,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
}

impl StoredCredential {
    pub fn new(token: String, session_id: String) -> Self {
        Self {
            token,
            session_id,
            created_at: Utc::now(),
        }
    }
}

impl From<StoredCredential> for Credential {
    fn from(stored: StoredCredential) -> Self {
        Self {
            token: stored.token,
            session_id: stored.session_id,
        }
    }
}

/// Single-slot credential storage backed by a JSON file.
///
/// The presence of a stored credential alone is what selects the
/// `LoggedOut -> Initializing` transition on the next cold start.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default storage location: `<config_dir>/medzy-portal/session.json`.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CREDENTIAL_FILE))
    }

    /// Load the stored credential, if any.
    pub fn load(&self) -> Result<Option<StoredCredential>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .context("Failed to read credential file")?;
        let stored: StoredCredential =
            serde_json::from_str(&contents).context("Failed to parse credential file")?;
        Ok(Some(stored))
    }

    /// Save a credential, replacing any previous one.
    pub fn save(&self, credential: &StoredCredential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(credential)?;
        std::fs::write(&self.path, contents).context("Failed to write credential file")?;
        Ok(())
    }

    /// Remove the stored credential.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove credential file")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("session.json"))
    }

    #[test]
    fn load_returns_none_when_missing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let stored = StoredCredential::new("tok-abc".to_string(), "sess-1".to_string());
        store.save(&stored).unwrap();

        let loaded = store.load().unwrap().expect("credential should exist");
        assert_eq!(loaded.token, "tok-abc");
        assert_eq!(loaded.session_id, "sess-1");
    }

    #[test]
    fn clear_removes_the_slot() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let stored = StoredCredential::new("tok-abc".to_string(), "sess-1".to_string());
        store.save(&stored).unwrap();
        store.clear().unwrap();

        assert!(store.load().unwrap().is_none());
        // Clearing an already-empty slot is fine
        store.clear().unwrap();
    }

    #[test]
    fn stored_converts_to_in_memory_credential() {
        let stored = StoredCredential::new("tok-abc".to_string(), "sess-1".to_string());
        let credential: Credential = stored.into();
        assert_eq!(credential.token, "tok-abc");
        assert_eq!(credential.session_id, "sess-1");
    }
}
