use crate::infrastructure::security::keyring::KeyringManager;
use figment::providers::{Format, Toml};
use figment::Figment;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::KEYRING_SERVICE;

pub const API_KEY_NAME: &str = "GEMINI_API_KEY";

const SECRETS_DIR: &str = ".review-analyzer";
const SECRETS_FILE: &str = "secrets.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    AppSecrets(PathBuf),
    GlobalSecrets(PathBuf),
    Environment(String),
    Keyring,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::AppSecrets(path) => write!(f, "secrets.toml ({})", path.display()),
            CredentialSource::GlobalSecrets(path) => {
                write!(f, "global secrets.toml ({})", path.display())
            }
            CredentialSource::Environment(var) => write!(f, "environment variable {}", var),
            CredentialSource::Keyring => write!(f, "OS keyring"),
        }
    }
}

#[derive(Clone)]
pub struct ResolvedCredential {
    pub api_key: String,
    pub source: CredentialSource,
}

impl fmt::Debug for ResolvedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredential")
            .field("api_key", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Walks the credential chain once: app-local secrets file, global secrets
/// file, environment variable, OS keyring. First non-empty key wins.
pub struct CredentialResolver {
    app_secrets: PathBuf,
    global_secrets: Option<PathBuf>,
    env_var: String,
    keyring: Option<KeyringManager>,
}

impl CredentialResolver {
    pub fn new() -> Self {
        Self {
            app_secrets: PathBuf::from(SECRETS_DIR).join(SECRETS_FILE),
            global_secrets: dirs::home_dir().map(|home| home.join(SECRETS_DIR).join(SECRETS_FILE)),
            env_var: API_KEY_NAME.to_string(),
            keyring: Some(KeyringManager::new(KEYRING_SERVICE)),
        }
    }

    pub fn with_app_secrets(mut self, path: impl Into<PathBuf>) -> Self {
        self.app_secrets = path.into();
        self
    }

    pub fn with_global_secrets(mut self, path: Option<PathBuf>) -> Self {
        self.global_secrets = path;
        self
    }

    pub fn with_env_var(mut self, name: &str) -> Self {
        self.env_var = name.to_string();
        self
    }

    pub fn without_keyring(mut self) -> Self {
        self.keyring = None;
        self
    }

    pub fn resolve(&self) -> Option<ResolvedCredential> {
        if let Some(api_key) = read_secrets_file(&self.app_secrets) {
            return Some(ResolvedCredential {
                api_key,
                source: CredentialSource::AppSecrets(self.app_secrets.clone()),
            });
        }

        if let Some(path) = &self.global_secrets {
            if let Some(api_key) = read_secrets_file(path) {
                return Some(ResolvedCredential {
                    api_key,
                    source: CredentialSource::GlobalSecrets(path.clone()),
                });
            }
        }

        if let Some(api_key) = std::env::var(&self.env_var)
            .ok()
            .filter(|value| !value.trim().is_empty())
        {
            return Some(ResolvedCredential {
                api_key: api_key.trim().to_string(),
                source: CredentialSource::Environment(self.env_var.clone()),
            });
        }

        let keyring = self.keyring.as_ref()?;
        match keyring.get_secret(API_KEY_NAME) {
            Ok(api_key) if !api_key.trim().is_empty() => Some(ResolvedCredential {
                api_key: api_key.trim().to_string(),
                source: CredentialSource::Keyring,
            }),
            Ok(_) => None,
            Err(err) => {
                debug!(error = %err, "No API key in OS keyring");
                None
            }
        }
    }
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn read_secrets_file(path: &Path) -> Option<String> {
    if !path.exists() {
        return None;
    }

    match Figment::from(Toml::file(path)).extract_inner::<String>(API_KEY_NAME) {
        Ok(key) if !key.trim().is_empty() => Some(key.trim().to_string()),
        Ok(_) => None,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Secrets file has no usable API key");
            None
        }
    }
}
