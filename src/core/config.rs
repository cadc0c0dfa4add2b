//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.sneaker-bot/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//!
//! The API credential is the exception: it is never read from or written to
//! the config file. It comes from `OPENROUTER_API_KEY` or is typed into the UI.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Model;
use crate::inference::Credential;
use crate::inference::providers::openrouter::DEFAULT_BASE_URL;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BotConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub model: Option<Model>,
    pub temperature: Option<f32>,
    pub max_retries: Option<u8>,
    pub topic_filter: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OpenRouterConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PacingConfig {
    pub retry_backoff_ms: Option<u64>,
    pub reveal_delay_ms: Option<u64>,
}

// ============================================================================
// Defaults and bounds
// ============================================================================

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 1.0;
pub const DEFAULT_MAX_RETRIES: u8 = 2;
pub const MIN_RETRIES: u8 = 1;
pub const MAX_RETRIES: u8 = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;
pub const DEFAULT_REVEAL_DELAY_MS: u64 = 30;

// ============================================================================
// Per-session request settings
// ============================================================================

/// Settings the user controls from the sidebar, read by every request.
///
/// Setters clamp into range, so a `RequestConfig` is always valid.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub model: Model,
    temperature: f32,
    max_retries: u8,
    credential: Credential,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self::new(
            Model::default(),
            DEFAULT_TEMPERATURE,
            DEFAULT_MAX_RETRIES,
            Credential::default(),
        )
    }
}

impl RequestConfig {
    pub fn new(model: Model, temperature: f32, max_retries: u8, credential: Credential) -> Self {
        let mut config = Self {
            model,
            temperature: DEFAULT_TEMPERATURE,
            max_retries: DEFAULT_MAX_RETRIES,
            credential,
        };
        config.set_temperature(temperature);
        config.set_max_retries(max_retries);
        config
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_retries(&self) -> u8 {
        self.max_retries
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn set_temperature(&mut self, temperature: f32) {
        self.temperature = if temperature.is_nan() {
            DEFAULT_TEMPERATURE
        } else {
            temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE)
        };
    }

    /// Moves the temperature by `steps` tenths, snapping to one decimal.
    pub fn adjust_temperature(&mut self, steps: i8) {
        let tenths = (self.temperature * 10.0).round() + f32::from(steps);
        self.set_temperature(tenths / 10.0);
    }

    pub fn set_max_retries(&mut self, max_retries: u8) {
        self.max_retries = max_retries.clamp(MIN_RETRIES, MAX_RETRIES);
    }

    pub fn adjust_max_retries(&mut self, delta: i8) {
        let next = i16::from(self.max_retries) + i16::from(delta);
        let clamped = next.clamp(i16::from(MIN_RETRIES), i16::from(MAX_RETRIES));
        self.max_retries = u8::try_from(clamped).unwrap_or(DEFAULT_MAX_RETRIES);
    }

    pub fn set_credential(&mut self, credential: Credential) {
        self.credential = credential;
    }
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub model: Model,
    pub temperature: f32,
    pub max_retries: u8,
    pub topic_filter: bool,
    pub credential: Credential,
    pub base_url: String,
    pub request_timeout: Duration,
    pub retry_backoff: Duration,
    pub reveal_delay: Duration,
}

impl ResolvedConfig {
    /// Initial sidebar settings for a new session.
    pub fn request_config(&self) -> RequestConfig {
        RequestConfig::new(
            self.model,
            self.temperature,
            self.max_retries,
            self.credential.clone(),
        )
    }
}

/// Values given on the command line. `None` means "not specified".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub model: Option<Model>,
    pub temperature: Option<f32>,
    pub max_retries: Option<u8>,
    pub topic_filter: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.sneaker-bot/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".sneaker-bot").join("config.toml"))
}

/// Load config from `~/.sneaker-bot/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `BotConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<BotConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(BotConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(BotConfig::default());
    }

    load_config_from(&path)
}

fn load_config_from(path: &Path) -> Result<BotConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: BotConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Sneaker Bot Configuration
# All settings are optional. Defaults apply to anything left out.
# Override hierarchy: defaults → this file → env vars → CLI flags.
# The API key is never stored here: set OPENROUTER_API_KEY or enter it in the app.

# [general]
# model = "google/palm-2-chat-bison"
# temperature = 0.7                  # 0.0 - 1.0
# max_retries = 2                    # 1 - 5
# topic_filter = false               # refuse questions that aren't about sneakers

# [openrouter]
# base_url = "https://openrouter.ai/api/v1"
# timeout_secs = 15

# [pacing]
# retry_backoff_ms = 500
# reveal_delay_ms = 30
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &BotConfig, cli: &CliOverrides) -> ResolvedConfig {
    let model = cli
        .model
        .or(config.general.model)
        .unwrap_or_default();

    let temperature = cli
        .temperature
        .or(config.general.temperature)
        .unwrap_or(DEFAULT_TEMPERATURE);

    let max_retries = cli
        .max_retries
        .or(config.general.max_retries)
        .unwrap_or(DEFAULT_MAX_RETRIES);

    // Topic filter: a CLI flag can only switch it on
    let topic_filter = cli.topic_filter || config.general.topic_filter.unwrap_or(false);

    // Credential: env only
    let credential = std::env::var("OPENROUTER_API_KEY")
        .map(Credential::new)
        .unwrap_or_default();

    // Base URL: env → config → default
    let base_url = std::env::var("OPENROUTER_BASE_URL")
        .ok()
        .or_else(|| config.openrouter.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let timeout_secs = config
        .openrouter
        .timeout_secs
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
        .max(1);

    ResolvedConfig {
        model,
        temperature: temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE),
        max_retries: max_retries.clamp(MIN_RETRIES, MAX_RETRIES),
        topic_filter,
        credential,
        base_url,
        request_timeout: Duration::from_secs(timeout_secs),
        retry_backoff: Duration::from_millis(
            config
                .pacing
                .retry_backoff_ms
                .unwrap_or(DEFAULT_RETRY_BACKOFF_MS),
        ),
        reveal_delay: Duration::from_millis(
            config
                .pacing
                .reveal_delay_ms
                .unwrap_or(DEFAULT_REVEAL_DELAY_MS),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = BotConfig::default();
        assert!(config.general.model.is_none());
        assert!(config.openrouter.base_url.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve(&BotConfig::default(), &CliOverrides::default());
        assert_eq!(resolved.model, Model::PalmTwoChatBison);
        assert_eq!(resolved.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(resolved.max_retries, DEFAULT_MAX_RETRIES);
        assert!(!resolved.topic_filter);
        assert_eq!(resolved.request_timeout, Duration::from_secs(15));
        assert_eq!(resolved.retry_backoff, Duration::from_millis(500));
        assert_eq!(resolved.reveal_delay, Duration::from_millis(30));
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = BotConfig {
            general: GeneralConfig {
                model: Some(Model::PalmTwoChatBison),
                temperature: Some(0.2),
                max_retries: Some(4),
                topic_filter: Some(true),
            },
            openrouter: OpenRouterConfig {
                base_url: None,
                timeout_secs: Some(30),
            },
            pacing: PacingConfig {
                retry_backoff_ms: Some(100),
                reveal_delay_ms: Some(0),
            },
        };
        let resolved = resolve(&config, &CliOverrides::default());
        assert_eq!(resolved.temperature, 0.2);
        assert_eq!(resolved.max_retries, 4);
        assert!(resolved.topic_filter);
        assert_eq!(resolved.request_timeout, Duration::from_secs(30));
        assert_eq!(resolved.retry_backoff, Duration::from_millis(100));
        assert_eq!(resolved.reveal_delay, Duration::ZERO);
    }

    #[test]
    fn test_resolve_cli_wins() {
        let config = BotConfig {
            general: GeneralConfig {
                temperature: Some(0.2),
                max_retries: Some(4),
                ..Default::default()
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            temperature: Some(0.9),
            max_retries: Some(1),
            topic_filter: true,
            ..Default::default()
        };
        let resolved = resolve(&config, &cli);
        assert_eq!(resolved.temperature, 0.9);
        assert_eq!(resolved.max_retries, 1);
        assert!(resolved.topic_filter);
    }

    #[test]
    fn test_resolve_clamps_out_of_range_values() {
        let config = BotConfig {
            general: GeneralConfig {
                temperature: Some(3.5),
                max_retries: Some(42),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve(&config, &CliOverrides::default());
        assert_eq!(resolved.temperature, MAX_TEMPERATURE);
        assert_eq!(resolved.max_retries, MAX_RETRIES);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[general]
model = "google/palm-2-chat-bison"
temperature = 0.4
max_retries = 3
topic_filter = true

[openrouter]
base_url = "http://localhost:8080/api/v1"
timeout_secs = 20

[pacing]
retry_backoff_ms = 250
"#;
        let config: BotConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.model, Some(Model::PalmTwoChatBison));
        assert_eq!(config.general.temperature, Some(0.4));
        assert_eq!(config.general.max_retries, Some(3));
        assert_eq!(config.general.topic_filter, Some(true));
        assert_eq!(
            config.openrouter.base_url.as_deref(),
            Some("http://localhost:8080/api/v1")
        );
        assert_eq!(config.pacing.retry_backoff_ms, Some(250));
        assert_eq!(config.pacing.reveal_delay_ms, None);
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing; everything else stays default
        let toml_str = r#"
[pacing]
reveal_delay_ms = 10
"#;
        let config: BotConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.pacing.reveal_delay_ms, Some(10));
        assert!(config.general.temperature.is_none());
        assert!(config.openrouter.timeout_secs.is_none());
    }

    #[test]
    fn test_api_key_in_file_is_ignored() {
        let toml_str = r#"
[openrouter]
api_key = "sk-should-not-be-read"
"#;
        let config: BotConfig = toml::from_str(toml_str).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-should-not-be-read"));
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        let toml_str = r#"
[general]
model = "openai/gpt-4o"
"#;
        assert!(toml::from_str::<BotConfig>(toml_str).is_err());
    }

    #[test]
    fn test_load_config_from_reports_parse_errors() {
        let dir = std::env::temp_dir().join(format!("sneaker-bot-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "[general\ntemperature = ").unwrap();

        let result = load_config_from(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_generate_default_config_is_all_comments() {
        let dir = std::env::temp_dir().join(format!("sneaker-bot-default-{}", std::process::id()));
        let path = dir.join("config.toml");

        generate_default_config(&path);
        let config = load_config_from(&path).unwrap();
        assert!(config.general.temperature.is_none());
        assert!(config.pacing.retry_backoff_ms.is_none());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_request_config_clamps() {
        let mut config = RequestConfig::new(Model::default(), -1.0, 0, Credential::default());
        assert_eq!(config.temperature(), MIN_TEMPERATURE);
        assert_eq!(config.max_retries(), MIN_RETRIES);

        config.set_temperature(f32::NAN);
        assert_eq!(config.temperature(), DEFAULT_TEMPERATURE);

        config.set_max_retries(9);
        assert_eq!(config.max_retries(), MAX_RETRIES);
    }

    #[test]
    fn test_request_config_adjust_temperature_snaps_to_tenths() {
        let mut config = RequestConfig::default();
        config.adjust_temperature(1);
        assert!((config.temperature() - 0.8).abs() < f32::EPSILON);
        config.adjust_temperature(5);
        assert_eq!(config.temperature(), MAX_TEMPERATURE);
        config.adjust_temperature(-12);
        assert_eq!(config.temperature(), MIN_TEMPERATURE);
    }

    #[test]
    fn test_request_config_adjust_retries_stays_in_bounds() {
        let mut config = RequestConfig::default();
        config.adjust_max_retries(1);
        assert_eq!(config.max_retries(), 3);
        config.adjust_max_retries(10);
        assert_eq!(config.max_retries(), MAX_RETRIES);
        config.adjust_max_retries(-10);
        assert_eq!(config.max_retries(), MIN_RETRIES);
    }
}
