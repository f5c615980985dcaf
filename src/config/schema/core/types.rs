use super::super::{GuardrailsConfig, WeatherConfig};
use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Hard ceiling for model round trips in a single agent turn.
pub const MAX_ITERATIONS_LIMIT: u32 = 25;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    /// LLM provider key
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub guardrails: GuardrailsConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub reliability: ReliabilityConfig,
}

fn default_model() -> String {
    "gemini-2.0-flash".into()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_iterations() -> u32 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

fn default_provider_timeout_secs() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            timeout_secs: default_provider_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReliabilityConfig {
    /// Total tries per model call, including the first.
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_exp_base")]
    pub exp_base: u32,
    #[serde(default = "default_retry_status_codes")]
    pub retry_status_codes: Vec<u16>,
}

fn default_attempts() -> u32 {
    5
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_exp_base() -> u32 {
    7
}

fn default_retry_status_codes() -> Vec<u16> {
    vec![429, 500, 503, 504]
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            exp_base: default_exp_base(),
            retry_status_codes: default_retry_status_codes(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());

        Self {
            config_path: home.join(".weathervane").join("config.toml"),
            api_key: None,
            default_model: default_model(),
            default_temperature: default_temperature(),
            max_iterations: default_max_iterations(),
            weather: WeatherConfig::default(),
            guardrails: GuardrailsConfig::default(),
            provider: ProviderConfig::default(),
            reliability: ReliabilityConfig::default(),
        }
    }
}

impl Config {
    /// Iteration budget actually used by the runner.
    pub fn effective_max_iterations(&self) -> u32 {
        self.max_iterations.clamp(1, MAX_ITERATIONS_LIMIT)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature.is_nan() || !(0.0..=2.0).contains(&self.default_temperature)
        {
            return Err(ConfigError::Validation(
                "default_temperature must be in [0.0, 2.0]".into(),
            ));
        }
        if self.default_model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "default_model must not be empty".into(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::Validation(
                "max_iterations must be >= 1".into(),
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "provider.timeout_secs must be >= 1".into(),
            ));
        }
        if self.reliability.attempts == 0 {
            return Err(ConfigError::Validation(
                "reliability.attempts must be >= 1".into(),
            ));
        }
        self.weather.validate()?;
        self.guardrails.validate()?;
        Ok(())
    }
}
