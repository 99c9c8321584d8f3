//! Credential persistence via OS keyring
//!
//! The token pair is stored in the operating system's native credential
//! store (Keychain on macOS, Secret Service on Linux, Windows Credential
//! Manager on Windows) as three separate entries, one per slot:
//! `access_token`, `refresh_token` and `token_type`. All three share the
//! service name `learnmap-<profile>`.
//!
//! On hosts without a keyring service, reads degrade to "no credential".

use crate::credentials::CredentialStore;
use crate::error::{LearnmapError, Result};
use crate::models::CredentialPair;

const ACCESS_TOKEN_SLOT: &str = "access_token";
const REFRESH_TOKEN_SLOT: &str = "refresh_token";
const TOKEN_TYPE_SLOT: &str = "token_type";

/// Keyring-backed [`CredentialStore`].
///
/// # Examples
///
/// ```no_run
/// use learnmap::credentials::{CredentialStore, KeyringCredentialStore};
/// use learnmap::models::CredentialPair;
///
/// let store = KeyringCredentialStore::new("default");
/// store.save(&CredentialPair {
///     access_token: "access".into(),
///     refresh_token: Some("refresh".into()),
///     token_type: "bearer".into(),
/// }).unwrap();
/// assert!(store.read().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct KeyringCredentialStore {
    service: String,
}

impl KeyringCredentialStore {
    /// Store scoped to the given profile name.
    pub fn new(profile: &str) -> Self {
        Self {
            service: Self::service_name(profile),
        }
    }

    /// Builds the keyring service name for a profile.
    fn service_name(profile: &str) -> String {
        format!("learnmap-{}", profile)
    }

    fn entry(&self, slot: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, slot).map_err(|e| LearnmapError::Keyring(e).into())
    }

    fn get_slot(&self, slot: &str) -> Result<Option<String>> {
        match self.entry(slot)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(LearnmapError::Keyring(e).into()),
        }
    }

    fn set_slot(&self, slot: &str, value: &str) -> Result<()> {
        self.entry(slot)?
            .set_password(value)
            .map_err(|e| LearnmapError::Keyring(e).into())
    }

    fn delete_slot(&self, slot: &str) -> Result<()> {
        match self.entry(slot)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(LearnmapError::Keyring(e).into()),
        }
    }

    fn load(&self) -> Result<Option<CredentialPair>> {
        let access_token = match self.get_slot(ACCESS_TOKEN_SLOT)? {
            Some(token) => token,
            None => return Ok(None),
        };
        let refresh_token = self.get_slot(REFRESH_TOKEN_SLOT)?;
        let token_type = self
            .get_slot(TOKEN_TYPE_SLOT)?
            .unwrap_or_else(|| "bearer".to_string());

        Ok(Some(CredentialPair {
            access_token,
            refresh_token,
            token_type,
        }))
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn save(&self, pair: &CredentialPair) -> Result<()> {
        self.set_slot(ACCESS_TOKEN_SLOT, &pair.access_token)?;
        match &pair.refresh_token {
            Some(refresh) => self.set_slot(REFRESH_TOKEN_SLOT, refresh)?,
            // A stale refresh token from an earlier login must not survive.
            None => self.delete_slot(REFRESH_TOKEN_SLOT)?,
        }
        self.set_slot(TOKEN_TYPE_SLOT, &pair.token_type)?;
        tracing::debug!("Saved credential to keyring service {}", self.service);
        Ok(())
    }

    fn read(&self) -> Option<CredentialPair> {
        match self.load() {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!("Keyring not available while reading credential: {}", e);
                None
            }
        }
    }

    fn clear(&self) -> Result<()> {
        // Attempt every slot even if one fails, then report the first error.
        let mut first_error = None;
        for slot in [ACCESS_TOKEN_SLOT, REFRESH_TOKEN_SLOT, TOKEN_TYPE_SLOT] {
            if let Err(e) = self.delete_slot(slot) {
                tracing::warn!("Failed to clear keyring slot {}: {}", slot, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
