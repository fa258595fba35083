use crate::domain::error::{AppError, Result};
use keyring::Entry;

/// Thin wrapper over the platform credential store, scoped to one service name.
pub struct KeyringManager {
    service: String,
}

impl KeyringManager {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key)
            .map_err(|e| AppError::SecurityError(format!("Failed to create entry: {}", e)))
    }

    pub fn set_secret(&self, key: &str, secret: &str) -> Result<()> {
        self.entry(key)?
            .set_password(secret)
            .map_err(|e| AppError::SecurityError(format!("Failed to store {}: {}", key, e)))
    }

    pub fn get_secret(&self, key: &str) -> Result<String> {
        self.entry(key)?.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => {
                AppError::NotFound(format!("{} is not stored in the keyring", key))
            }
            other => AppError::SecurityError(format!("Failed to read {}: {}", key, other)),
        })
    }

    pub fn delete_secret(&self, key: &str) -> Result<()> {
        self.entry(key)?.delete_credential().map_err(|e| match e {
            keyring::Error::NoEntry => {
                AppError::NotFound(format!("{} is not stored in the keyring", key))
            }
            other => AppError::SecurityError(format!("Failed to delete {}: {}", key, other)),
        })
    }
}
