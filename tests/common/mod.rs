use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use learnmap::credentials::{CredentialStore, MemoryCredentialStore};
use learnmap::models::CredentialPair;
use learnmap::Gateway;

/// Credential pair with both tokens set.
#[allow(dead_code)]
pub fn pair(access: &str, refresh: Option<&str>) -> CredentialPair {
    CredentialPair {
        access_token: access.to_string(),
        refresh_token: refresh.map(str::to_string),
        token_type: "bearer".to_string(),
    }
}

/// Gateway against `base_url` backed by an in-memory store.
#[allow(dead_code)]
pub fn memory_gateway(
    base_url: &str,
    stored: Option<CredentialPair>,
) -> (Gateway, Arc<MemoryCredentialStore>) {
    let store = Arc::new(match stored {
        Some(p) => MemoryCredentialStore::with_pair(p),
        None => MemoryCredentialStore::new(),
    });
    let creds: Arc<dyn CredentialStore> = store.clone();
    let gateway = Gateway::new(
        url::Url::parse(base_url).expect("valid url"),
        creds,
        Duration::from_secs(5),
    )
    .expect("gateway");
    (gateway, store)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
