mod credentials;

pub use credentials::{CredentialResolver, CredentialSource, ResolvedCredential, API_KEY_NAME};

use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::infrastructure::security::keyring::KeyringManager;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "review-analyzer.toml";
pub const ENV_PREFIX: &str = "REVIEW_ANALYZER_";
pub const KEYRING_SERVICE: &str = "ReviewAnalyzer";
pub const DEFAULT_OUTPUT_FILE: &str = "myntra_review_analysis.csv";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Pause after every row, success or failure
    pub request_delay_ms: u64,
    /// Refuse uploads with more rows than this. `None` means unbounded.
    pub max_rows: Option<usize>,
    pub output_file_name: String,
}

impl AnalysisConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 500,
            max_rows: None,
            output_file_name: DEFAULT_OUTPUT_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LLMConfig,
    pub analysis: AnalysisConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Defaults, then the TOML settings file, then `REVIEW_ANALYZER_*` variables
    /// (`__` separates sections, e.g. `REVIEW_ANALYZER_ANALYSIS__REQUEST_DELAY_MS`).
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let config: AppConfig = Self::figment(&path)
            .extract()
            .map_err(|e| AppError::ConfigError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.llm.model.trim().is_empty() {
            return Err(AppError::ConfigError("llm.model must not be empty".to_string()));
        }
        url::Url::parse(&self.llm.base_url).map_err(|e| {
            AppError::ConfigError(format!("llm.base_url '{}' is invalid: {}", self.llm.base_url, e))
        })?;
        if self.llm.timeout_secs == 0 {
            return Err(AppError::ConfigError("llm.timeout_secs must be > 0".to_string()));
        }
        if self.analysis.request_delay_ms > 60_000 {
            return Err(AppError::ConfigError(
                "analysis.request_delay_ms must be at most 60000".to_string(),
            ));
        }
        if self.analysis.max_rows == Some(0) {
            return Err(AppError::ConfigError("analysis.max_rows must be > 0".to_string()));
        }
        if self.analysis.output_file_name.trim().is_empty() {
            return Err(AppError::ConfigError(
                "analysis.output_file_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Stores the API key in the OS keyring, the last link of the credential chain.
pub struct ConfigService {
    keyring: KeyringManager,
}

impl ConfigService {
    pub fn new() -> Self {
        Self {
            keyring: KeyringManager::new(KEYRING_SERVICE),
        }
    }

    pub fn save_api_key(&self, key: &str) -> Result<()> {
        if key.trim().is_empty() {
            return Err(AppError::ValidationError("API key must not be empty".to_string()));
        }
        self.keyring.set_secret(API_KEY_NAME, key.trim())
    }

    pub fn get_api_key(&self) -> Result<String> {
        self.keyring.get_secret(API_KEY_NAME)
    }

    pub fn delete_api_key(&self) -> Result<()> {
        self.keyring.delete_secret(API_KEY_NAME)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}
