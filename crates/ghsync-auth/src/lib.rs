use std::collections::HashMap;
use std::sync::Mutex;

use ghsync_core::error::GhSyncError;
use ghsync_core::models::service::Service;

/// Where `ghsync auth set` puts tokens and where [`resolve_token`] falls
/// back to when the config has none. Stores are keyed by [`Service`].
pub trait CredentialStore: Send + Sync {
    fn store(&self, service: Service, token: &str) -> Result<(), GhSyncError>;

    /// `Ok(None)` when nothing is stored for `service`.
    fn get(&self, service: Service) -> Result<Option<String>, GhSyncError>;

    /// Removing a token that was never stored is not an error.
    fn delete(&self, service: Service) -> Result<(), GhSyncError>;
}

fn credential_error(e: keyring::Error) -> GhSyncError {
    GhSyncError::Credential {
        message: e.to_string(),
    }
}

/// OS keychain entries named `ghsync:<service>` under the `ghsync` service.
#[derive(Default)]
pub struct KeyringStore;

impl KeyringStore {
    const KEYCHAIN_SERVICE: &'static str = "ghsync";

    pub fn new() -> Self {
        Self
    }

    fn entry(service: Service) -> Result<keyring::Entry, GhSyncError> {
        keyring::Entry::new(Self::KEYCHAIN_SERVICE, &service.credential_key())
            .map_err(credential_error)
    }
}

impl CredentialStore for KeyringStore {
    fn store(&self, service: Service, token: &str) -> Result<(), GhSyncError> {
        Self::entry(service)?
            .set_password(token)
            .map_err(credential_error)
    }

    fn get(&self, service: Service) -> Result<Option<String>, GhSyncError> {
        match Self::entry(service)?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(credential_error(e)),
        }
    }

    fn delete(&self, service: Service) -> Result<(), GhSyncError> {
        match Self::entry(service)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(credential_error(e)),
        }
    }
}

/// Keychain stand-in for tests.
#[derive(Default)]
pub struct MemoryStore {
    tokens: Mutex<HashMap<Service, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a token, as if `ghsync auth set` had been run.
    pub fn with(self, service: Service, token: &str) -> Self {
        self.lock().insert(service, token.to_string());
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Service, String>> {
        self.tokens.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for MemoryStore {
    fn store(&self, service: Service, token: &str) -> Result<(), GhSyncError> {
        self.lock().insert(service, token.to_string());
        Ok(())
    }

    fn get(&self, service: Service) -> Result<Option<String>, GhSyncError> {
        Ok(self.lock().get(&service).cloned())
    }

    fn delete(&self, service: Service) -> Result<(), GhSyncError> {
        self.lock().remove(&service);
        Ok(())
    }
}

/// Pick the token for `service`: the configured value (file or environment)
/// wins, the keychain is the fallback.
pub fn resolve_token(
    configured: Option<&str>,
    store: &dyn CredentialStore,
    service: Service,
) -> Result<String, GhSyncError> {
    if let Some(token) = configured.filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }
    match store.get(service)? {
        Some(token) if !token.is_empty() => {
            tracing::debug!(
                "using {service} token from keychain entry '{}'",
                service.credential_key()
            );
            Ok(token)
        }
        _ => Err(GhSyncError::Credential {
            message: format!(
                "no {service} token configured; set it in the config file, the environment, or run `ghsync auth set {service}`"
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_crud() {
        let store = MemoryStore::new();
        assert_eq!(store.get(Service::GitHub).unwrap(), None);
        store.store(Service::GitHub, "secret-token").unwrap();
        assert_eq!(store.get(Service::GitHub).unwrap(), Some("secret-token".to_string()));
        assert_eq!(store.get(Service::GitLab).unwrap(), None);
        store.delete(Service::GitHub).unwrap();
        assert_eq!(store.get(Service::GitHub).unwrap(), None);
    }

    #[test]
    fn test_memory_store_delete_nonexistent() {
        MemoryStore::new().delete(Service::GitLab).unwrap();
    }

    #[test]
    fn test_stored_token_is_replaced() {
        let store = MemoryStore::new().with(Service::GitLab, "glpat-old");
        store.store(Service::GitLab, "glpat-new").unwrap();
        assert_eq!(resolve_token(None, &store, Service::GitLab).unwrap(), "glpat-new");
    }

    #[test]
    fn test_configured_token_wins() {
        let store = MemoryStore::new().with(Service::GitHub, "from-keychain");
        let token = resolve_token(Some("from-config"), &store, Service::GitHub).unwrap();
        assert_eq!(token, "from-config");
    }

    #[test]
    fn test_keychain_fallback() {
        let store = MemoryStore::new().with(Service::GitLab, "glpat-xyz");
        assert_eq!(
            resolve_token(None, &store, Service::GitLab).unwrap(),
            "glpat-xyz"
        );
        assert_eq!(
            resolve_token(Some(""), &store, Service::GitLab).unwrap(),
            "glpat-xyz"
        );
    }

    #[test]
    fn test_no_token_anywhere() {
        let store = MemoryStore::new();
        let err = resolve_token(None, &store, Service::GitHub).unwrap_err();
        assert!(matches!(err, GhSyncError::Credential { .. }));
        assert!(err.to_string().contains("ghsync auth set github"));
    }
}
