//! Secret resolution for profile values
//!
//! Profile values are either stored in plaintext or as a `keyring:<key>`
//! reference. References are only resolvable when the `secure-storage`
//! feature is compiled in.

use super::error::{ConfigError, Result};

/// Prefix that marks a value as stored in the OS keyring
const KEYRING_PREFIX: &str = "keyring:";

/// Keyring service name
#[cfg(feature = "secure-storage")]
const SERVICE_NAME: &str = "dbctl";

/// Where secrets get written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretBackend {
    #[cfg(feature = "secure-storage")]
    Keyring,
    Plaintext,
}

/// Reads and writes profile secrets
#[derive(Debug, Clone)]
pub struct SecretStore {
    backend: SecretBackend,
}

impl Default for SecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore {
    /// Pick the keyring when it is compiled in and reachable, plaintext otherwise
    pub fn new() -> Self {
        #[cfg(feature = "secure-storage")]
        {
            if Self::keyring_available() {
                return Self {
                    backend: SecretBackend::Keyring,
                };
            }
        }
        Self::plaintext()
    }

    /// A store that never touches the keyring
    pub fn plaintext() -> Self {
        Self {
            backend: SecretBackend::Plaintext,
        }
    }

    #[cfg(feature = "secure-storage")]
    fn keyring_available() -> bool {
        match keyring::Entry::new(SERVICE_NAME, "__availability__") {
            Ok(entry) => {
                let _ = entry.get_password();
                true
            }
            Err(_) => false,
        }
    }

    pub fn backend(&self) -> SecretBackend {
        self.backend
    }

    /// Persist a secret, returning the string to write into the profile.
    ///
    /// With the keyring backend this is a `keyring:<key>` reference; with
    /// plaintext it is the value itself.
    pub fn store(&self, key: &str, value: &str) -> Result<String> {
        match self.backend {
            #[cfg(feature = "secure-storage")]
            SecretBackend::Keyring => {
                let entry = keyring::Entry::new(SERVICE_NAME, key)
                    .map_err(|e| ConfigError::KeyringError(e.to_string()))?;
                entry.set_password(value).map_err(|e| {
                    ConfigError::KeyringError(format!("Failed to store '{}' in keyring: {}", key, e))
                })?;
                Ok(format!("{}{}", KEYRING_PREFIX, key))
            }
            SecretBackend::Plaintext => {
                let _ = key;
                Ok(value.to_string())
            }
        }
    }

    /// Resolve a stored value: keyring references are looked up, anything
    /// else is returned as-is
    pub fn resolve(&self, value: &str) -> Result<String> {
        let Some(key) = value.strip_prefix(KEYRING_PREFIX) else {
            return Ok(value.to_string());
        };

        #[cfg(feature = "secure-storage")]
        {
            let entry = keyring::Entry::new(SERVICE_NAME, key)
                .map_err(|e| ConfigError::KeyringError(e.to_string()))?;
            entry.get_password().map_err(|e| {
                ConfigError::KeyringError(format!("Failed to read '{}' from keyring: {}", key, e))
            })
        }
        #[cfg(not(feature = "secure-storage"))]
        {
            Err(ConfigError::CredentialError(format!(
                "'{}' is stored in the keyring but this build lacks the secure-storage feature",
                key
            )))
        }
    }

    /// Remove a keyring entry; a no-op for plaintext values
    pub fn delete(&self, value: &str) -> Result<()> {
        let Some(key) = value.strip_prefix(KEYRING_PREFIX) else {
            return Ok(());
        };

        #[cfg(feature = "secure-storage")]
        {
            let entry = keyring::Entry::new(SERVICE_NAME, key)
                .map_err(|e| ConfigError::KeyringError(e.to_string()))?;
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(ConfigError::KeyringError(format!(
                    "Failed to delete '{}' from keyring: {}",
                    key, e
                ))),
            }
        }
        #[cfg(not(feature = "secure-storage"))]
        {
            let _ = key;
            Ok(())
        }
    }

    pub fn is_keyring_reference(value: &str) -> bool {
        value.starts_with(KEYRING_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plaintext_values_pass_through() {
        let store = SecretStore::plaintext();
        assert_eq!(store.resolve("tok-123").unwrap(), "tok-123");
        assert_eq!(store.store("token", "tok-123").unwrap(), "tok-123");
        assert_eq!(store.backend(), SecretBackend::Plaintext);
    }

    #[test]
    fn test_keyring_reference_detection() {
        assert!(SecretStore::is_keyring_reference("keyring:prod-token"));
        assert!(!SecretStore::is_keyring_reference("prod-token"));
        assert!(!SecretStore::is_keyring_reference(""));
    }

    #[test]
    fn test_delete_plaintext_is_noop() {
        assert!(SecretStore::plaintext().delete("plain").is_ok());
    }

    #[cfg(not(feature = "secure-storage"))]
    #[test]
    fn test_keyring_reference_without_feature_errors() {
        let err = SecretStore::plaintext()
            .resolve("keyring:prod-token")
            .unwrap_err();
        assert!(err.to_string().contains("secure-storage"));
    }
}
