//! Credential persistence
//!
//! The [`CredentialStore`] trait is the single owner of the user's token
//! pair. Login and signup write it, logout clears it, and the request
//! gateway reads it before every authenticated call.
//!
//! # Module Layout
//!
//! - [`keyring`] -- OS keyring, one entry per token slot
//! - [`file`]    -- JSON file in the user data directory
//! - [`MemoryCredentialStore`] -- in-process store for tests and embedding
//!
//! `read` is infallible by contract: a store whose backing storage is not
//! available reports "no credential" instead of an error.

use std::sync::{Arc, RwLock};

use crate::config::{CredentialBackend, CredentialConfig};
use crate::error::Result;
use crate::models::CredentialPair;

pub mod file;
pub mod keyring;

pub use self::file::FileCredentialStore;
pub use self::keyring::KeyringCredentialStore;

/// Storage for the current [`CredentialPair`].
pub trait CredentialStore: Send + Sync + std::fmt::Debug {
    /// Persist `pair`, replacing any previous credential.
    fn save(&self, pair: &CredentialPair) -> Result<()>;

    /// Current credential, or `None` when absent or unreadable.
    fn read(&self) -> Option<CredentialPair>;

    /// Remove the stored credential. Clearing an empty store succeeds.
    fn clear(&self) -> Result<()>;
}

/// Build the store selected by configuration.
///
/// # Errors
///
/// Returns an error when the file backend has no configured path and the
/// user data directory cannot be determined.
pub fn from_config(config: &CredentialConfig) -> Result<Arc<dyn CredentialStore>> {
    let store: Arc<dyn CredentialStore> = match config.backend {
        CredentialBackend::Keyring => Arc::new(KeyringCredentialStore::new(&config.profile)),
        CredentialBackend::File => match &config.file {
            Some(path) => Arc::new(FileCredentialStore::new(path)),
            None => Arc::new(FileCredentialStore::default_location(&config.profile)?),
        },
        CredentialBackend::Memory => Arc::new(MemoryCredentialStore::new()),
    };
    tracing::debug!("Using {:?} credential store", config.backend);
    Ok(store)
}

/// Credential store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    pair: RwLock<Option<CredentialPair>>,
}

impl MemoryCredentialStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `pair`.
    ///
    /// # Examples
    ///
    /// ```
    /// use learnmap::credentials::{CredentialStore, MemoryCredentialStore};
    /// use learnmap::models::CredentialPair;
    ///
    /// let store = MemoryCredentialStore::with_pair(CredentialPair {
    ///     access_token: "abc".into(),
    ///     refresh_token: None,
    ///     token_type: "bearer".into(),
    /// });
    /// assert!(store.read().is_some());
    /// ```
    pub fn with_pair(pair: CredentialPair) -> Self {
        Self {
            pair: RwLock::new(Some(pair)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, pair: &CredentialPair) -> Result<()> {
        let mut guard = self
            .pair
            .write()
            .map_err(|_| anyhow::anyhow!("credential lock poisoned"))?;
        *guard = Some(pair.clone());
        Ok(())
    }

    fn read(&self) -> Option<CredentialPair> {
        match self.pair.read() {
            Ok(guard) => guard.clone(),
            Err(_) => {
                tracing::warn!("Credential lock poisoned; treating as logged out");
                None
            }
        }
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .pair
            .write()
            .map_err(|_| anyhow::anyhow!("credential lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}
