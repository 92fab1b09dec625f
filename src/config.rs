//! Ares Travel configuration management
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment overrides. Secrets (the provider API key, the globe
//! token) are never stored in the file; the config only names the
//! environment variables that hold them.

use crate::assistant::replies::{
    default_fallback_replies, default_mock_replies, default_system_prompt, ReplyTable,
};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main Ares Travel configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AresConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Real-time session configuration
    pub session: SessionConfig,

    /// Chat assistant configuration
    pub assistant: AssistantConfig,

    /// Data file configuration
    pub storage: StorageConfig,

    /// Globe (map provider) configuration
    pub globe: GlobeConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed CORS origins (empty = any)
    pub cors_origins: Vec<String>,

    /// Directory holding `index.html`
    pub public_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: Vec::new(),
            public_dir: PathBuf::from("public"),
        }
    }
}

/// Real-time session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle interval after which the server sends a keep-alive ping
    pub keepalive_secs: u64,
}

impl SessionConfig {
    pub fn keepalive(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { keepalive_secs: 60 }
    }
}

/// Chat assistant configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Use the live completion provider instead of mock replies
    pub use_openai: bool,

    /// Environment variable holding the provider API key
    pub api_key_env: String,

    /// Provider base URL (without `/v1/...`)
    pub base_url: String,

    /// Completion model
    pub model: String,

    pub max_tokens: u32,
    pub temperature: f32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,

    /// Deadline for one provider call
    pub timeout_secs: u64,

    /// Latency above which the provider diagnostic reports failure
    pub slow_threshold_ms: u64,

    /// Persona prompt sent with every live completion
    pub system_prompt: String,

    /// Replies used in mock mode
    pub mock_replies: ReplyTable,

    /// Replies used when the provider fails
    pub fallback_replies: ReplyTable,
}

impl AssistantConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read the API key from the environment.
    ///
    /// Tries the configured name, then its UPPER_CASE form. Blank values
    /// count as missing.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .or_else(|_| std::env::var(self.api_key_env.to_uppercase()))
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            use_openai: false,
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 300,
            temperature: 0.6,
            presence_penalty: 0.3,
            frequency_penalty: 0.1,
            timeout_secs: 10,
            slow_threshold_ms: 1500,
            system_prompt: default_system_prompt(),
            mock_replies: default_mock_replies(),
            fallback_replies: default_fallback_replies(),
        }
    }
}

/// Data file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Writable location, tried first on load and always used for saves
    pub scratch_file: PathBuf,

    /// Read-only seed document
    pub seed_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            scratch_file: std::env::temp_dir().join("data.json"),
            seed_file: PathBuf::from("data.json"),
        }
    }
}

/// Globe (map provider) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    /// Environment variable holding the display token
    pub token_env: String,
}

impl GlobeConfig {
    /// Display token, empty when unset
    pub fn token(&self) -> String {
        std::env::var(&self.token_env).unwrap_or_default()
    }
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            token_env: "CESIUM_TOKEN".to_string(),
        }
    }
}

impl AresConfig {
    /// Load from an optional TOML file, then apply process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(flag) = lookup("USE_OPENAI") {
            self.assistant.use_openai = flag.trim().eq_ignore_ascii_case("true");
        }
        if let Some(port) = lookup("PORT") {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid PORT"),
            }
        }
        if let Some(host) = lookup("ARES_HOST") {
            self.server.host = host;
        }
        if let Some(seed) = lookup("ARES_DATA_FILE") {
            self.storage.seed_file = PathBuf::from(seed);
        }
        if let Some(scratch) = lookup("ARES_SCRATCH_FILE") {
            self.storage.scratch_file = PathBuf::from(scratch);
        }
    }
}
