//! Credential persistence in a local JSON file
//!
//! Used on hosts without a keyring service (containers, CI, headless
//! servers). The default location is `credentials-<profile>.json` inside the
//! platform data directory; on unix the file is created with mode `0600`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;

use crate::credentials::CredentialStore;
use crate::error::{LearnmapError, Result};
use crate::models::CredentialPair;

/// File-backed [`CredentialStore`].
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store using the file at `path`.
    ///
    /// # Examples
    ///
    /// ```
    /// use learnmap::credentials::{CredentialStore, FileCredentialStore};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = FileCredentialStore::new(dir.path().join("creds.json"));
    /// assert!(store.read().is_none());
    /// ```
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform data directory for `profile`.
    pub fn default_location(profile: &str) -> Result<Self> {
        let proj_dirs = ProjectDirs::from("dev", "learnmap", "learnmap").ok_or_else(|| {
            LearnmapError::CredentialStore("Could not determine data directory".into())
        })?;
        Ok(Self::new(
            proj_dirs
                .data_dir()
                .join(format!("credentials-{}.json", profile)),
        ))
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Option<CredentialPair>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let pair = serde_json::from_str(&contents)
            .with_context(|| format!("Malformed credential file {}", self.path.display()))?;
        Ok(Some(pair))
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, pair: &CredentialPair) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create credential directory")
                .map_err(|e| LearnmapError::CredentialStore(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(pair)?;
        write_private(&self.path, json.as_bytes())
            .map_err(|e| LearnmapError::CredentialStore(e.to_string()))?;
        tracing::debug!("Saved credential to {}", self.path.display());
        Ok(())
    }

    fn read(&self) -> Option<CredentialPair> {
        match self.load() {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!("Credential file not readable: {:#}", e);
                None
            }
        }
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LearnmapError::Io(e).into()),
        }
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, contents)
}
