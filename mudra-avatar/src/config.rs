//! Configuration for avatar orchestration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Avatar orchestration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    /// Engine bootstrap asset locations
    pub assets: AssetConfig,

    /// One-time engine initialization payload
    pub engine: EngineInitConfig,

    /// Remote translation service settings
    pub translator: TranslatorConfig,

    /// Settle delays, poll cadence and playback pacing
    pub timing: TimingConfig,
}

/// Locations of the rendering engine's bootstrap assets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Base URL of the static asset host
    pub base_url: String,

    /// Stylesheet resource, relative to the base URL
    pub stylesheet_path: String,

    /// Engine executable resource, relative to the base URL
    pub script_path: String,

    /// Directory of per-token animation files, relative to the base URL
    pub sign_dir: String,

    /// Timeout for asset fetches in seconds
    pub fetch_timeout_secs: u64,
}

/// Payload for the engine's one-time init entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineInitConfig {
    /// Engine configuration file path, as the engine expects it
    pub cfg_file_path: String,

    /// Avatars to load
    pub avatar_list: Vec<String>,

    /// Avatar shown at startup
    pub initial_avatar: String,

    /// Viewport width in pixels
    pub width: u32,

    /// Viewport height in pixels
    pub height: u32,
}

/// Remote translation service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Translation service endpoint URL
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Settle delays, poll cadence and playback pacing
///
/// The settle fields are heuristic waits: the engine exposes no
/// completion signal for script self-registration or avatar-model
/// loading, so fixed delays stand in for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Wait after the engine script loads before the first
    /// registration check, in milliseconds
    pub script_settle_ms: u64,

    /// Interval between engine registration checks, in milliseconds
    pub register_poll_interval_ms: u64,

    /// Maximum number of registration checks before giving up
    pub register_poll_max_attempts: u32,

    /// Wait after init before reporting ready, covering the engine's
    /// internal avatar-model load, in milliseconds
    pub ready_settle_ms: u64,

    /// Pause between consecutive sign animations, in milliseconds
    pub sign_gap_ms: u64,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            assets: AssetConfig::default(),
            engine: EngineInitConfig::default(),
            translator: TranslatorConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001/static".to_string(),
            stylesheet_path: "css/cwasa.css".to_string(),
            script_path: "js/allcsa.js".to_string(),
            sign_dir: "SignFiles".to_string(),
            fetch_timeout_secs: 30,
        }
    }
}

impl Default for EngineInitConfig {
    fn default() -> Self {
        Self {
            cfg_file_path: "/cwacfg.json".to_string(),
            avatar_list: vec!["marc".to_string()],
            initial_avatar: "marc".to_string(),
            width: 600,
            height: 500,
        }
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5001/".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            script_settle_ms: 1000,
            register_poll_interval_ms: 500,
            register_poll_max_attempts: 60,
            ready_settle_ms: 3000,
            sign_gap_ms: 2000,
        }
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{} cannot be empty", field));
    }

    let parsed = Url::parse(value).map_err(|e| format!("{} is not a valid URL: {}", field, e))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(format!("{} must use http or https", field));
    }

    Ok(())
}

fn validate_relative_path(field: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{} cannot be empty", field));
    }

    if value.contains("..") {
        return Err(format!("{} cannot contain '..'", field));
    }

    if value.starts_with('/') {
        return Err(format!("{} must be relative to the base URL", field));
    }

    Ok(())
}

impl AssetConfig {
    /// Validate asset configuration
    pub fn validate(&self) -> Result<(), String> {
        validate_http_url("asset base_url", &self.base_url)?;
        validate_relative_path("stylesheet_path", &self.stylesheet_path)?;
        validate_relative_path("script_path", &self.script_path)?;
        validate_relative_path("sign_dir", &self.sign_dir)?;

        if self.fetch_timeout_secs == 0 {
            return Err("fetch_timeout_secs must be greater than 0".to_string());
        }

        if self.fetch_timeout_secs > 300 {
            return Err("fetch_timeout_secs too large (max 300 seconds)".to_string());
        }

        Ok(())
    }

    /// Resolve a path relative to the base URL
    pub fn resolve(&self, path: &str) -> Result<Url, String> {
        let base = if self.base_url.ends_with('/') {
            self.base_url.clone()
        } else {
            format!("{}/", self.base_url)
        };

        let base = Url::parse(&base).map_err(|e| format!("invalid base URL: {}", e))?;
        base.join(path)
            .map_err(|e| format!("cannot resolve '{}': {}", path, e))
    }
}

impl EngineInitConfig {
    /// Validate the init payload
    pub fn validate(&self) -> Result<(), String> {
        if self.cfg_file_path.is_empty() {
            return Err("cfg_file_path cannot be empty".to_string());
        }

        if self.avatar_list.is_empty() {
            return Err("avatar_list cannot be empty".to_string());
        }

        if self.avatar_list.iter().any(|a| a.is_empty()) {
            return Err("avatar_list cannot contain empty names".to_string());
        }

        if !self.avatar_list.contains(&self.initial_avatar) {
            return Err(format!(
                "initial_avatar '{}' is not in avatar_list",
                self.initial_avatar
            ));
        }

        if self.width == 0 || self.width > 4096 {
            return Err("width must be between 1 and 4096".to_string());
        }

        if self.height == 0 || self.height > 4096 {
            return Err("height must be between 1 and 4096".to_string());
        }

        Ok(())
    }
}

impl TranslatorConfig {
    /// Validate translator settings
    pub fn validate(&self) -> Result<(), String> {
        validate_http_url("translator endpoint", &self.endpoint)?;

        if self.timeout_secs == 0 {
            return Err("translator timeout must be greater than 0".to_string());
        }

        if self.timeout_secs > 300 {
            return Err("translator timeout too large (max 300 seconds)".to_string());
        }

        Ok(())
    }
}

impl TimingConfig {
    /// Validate timing settings
    pub fn validate(&self) -> Result<(), String> {
        if self.register_poll_interval_ms == 0 {
            return Err("register_poll_interval_ms must be greater than 0".to_string());
        }

        if self.register_poll_max_attempts == 0 {
            return Err("register_poll_max_attempts must be greater than 0".to_string());
        }

        if self.register_poll_max_attempts > 10_000 {
            return Err("register_poll_max_attempts too large (max 10000)".to_string());
        }

        if self.script_settle_ms > 60_000 {
            return Err("script_settle_ms too large (max 60000 ms)".to_string());
        }

        if self.ready_settle_ms > 60_000 {
            return Err("ready_settle_ms too large (max 60000 ms)".to_string());
        }

        if self.sign_gap_ms > 60_000 {
            return Err("sign_gap_ms too large (max 60000 ms)".to_string());
        }

        Ok(())
    }

    pub fn script_settle(&self) -> Duration {
        Duration::from_millis(self.script_settle_ms)
    }

    pub fn register_poll_interval(&self) -> Duration {
        Duration::from_millis(self.register_poll_interval_ms)
    }

    pub fn ready_settle(&self) -> Duration {
        Duration::from_millis(self.ready_settle_ms)
    }

    pub fn sign_gap(&self) -> Duration {
        Duration::from_millis(self.sign_gap_ms)
    }
}

impl AvatarConfig {
    /// Validate the whole configuration
    pub fn validate(&self) -> Result<(), String> {
        self.assets.validate()?;
        self.engine.validate()?;
        self.translator.validate()?;
        self.timing.validate()?;
        Ok(())
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MudraConfig {
    /// Avatar orchestration settings
    pub avatar: AvatarConfig,

    /// Log level for the tracing subscriber
    pub log_level: String,
}

impl Default for MudraConfig {
    fn default() -> Self {
        Self {
            avatar: AvatarConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl MudraConfig {
    /// Load configuration from a string, trying JSON then TOML
    pub fn from_str(content: &str) -> mudra_core::Result<Self> {
        if let Ok(config) = serde_json::from_str::<MudraConfig>(content) {
            return Ok(config);
        }

        if let Ok(config) = toml::from_str::<MudraConfig>(content) {
            return Ok(config);
        }

        Err(mudra_core::Error::Configuration(
            "config is neither valid JSON nor valid TOML".to_string(),
        ))
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> mudra_core::Result<Self> {
        if path.contains("..") {
            return Err(mudra_core::Error::Configuration(format!(
                "path traversal detected: '{}'",
                path
            )));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load defaults with environment variable overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(endpoint) = std::env::var("MUDRA_TRANSLATOR_ENDPOINT") {
            config.avatar.translator.endpoint = endpoint;
        }

        if let Ok(base_url) = std::env::var("MUDRA_ASSET_BASE_URL") {
            config.avatar.assets.base_url = base_url;
        }

        if let Ok(log_level) = std::env::var("MUDRA_LOG_LEVEL") {
            config.log_level = log_level;
        }

        config
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        self.avatar.validate()
    }
}
