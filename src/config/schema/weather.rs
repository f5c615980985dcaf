use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// OpenWeatherMap settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// `None` leaves the weather tool registered but every lookup fails with
    /// an authentication error from the API.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    #[serde(default = "default_weather_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".into()
}

fn default_weather_timeout_secs() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_secs: default_weather_timeout_secs(),
        }
    }
}

impl WeatherConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "weather.timeout_secs must be >= 1".into(),
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "weather.base_url must not be empty".into(),
            ));
        }
        Ok(())
    }
}
