use super::traits::{StatusResult, Tool};
use crate::config::WeatherConfig;
use crate::core::http::build_http_client;
use crate::core::session::{InvocationContext, SessionState, keys};
use crate::utils::capitalize;
use serde_json::{Value, json};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub const WEATHER_TOOL_NAME: &str = "get_weather_real";

/// Temperature unit, chosen from the session's stored preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureUnit {
    Fahrenheit,
    Celsius,
}

impl TemperatureUnit {
    /// Absent or non-string preferences mean Fahrenheit; any other string that
    /// does not name Fahrenheit means Celsius.
    pub fn from_preference(preference: Option<&Value>) -> Self {
        match preference.and_then(Value::as_str) {
            None => Self::Fahrenheit,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "fahrenheit" | "imperial" | "f" => Self::Fahrenheit,
                _ => Self::Celsius,
            },
        }
    }

    /// Value for the provider's `units` query parameter.
    pub fn api_units(self) -> &'static str {
        match self {
            Self::Fahrenheit => "imperial",
            Self::Celsius => "metric",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Fahrenheit => "°F",
            Self::Celsius => "°C",
        }
    }
}

/// Current conditions from OpenWeatherMap.
pub struct WeatherTool {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl WeatherTool {
    pub fn new(config: &WeatherConfig) -> Self {
        let api_key = config.api_key.clone().unwrap_or_default();
        if api_key.trim().is_empty() {
            tracing::warn!("OPENWEATHERMAP_API_KEY is not set; weather lookups will fail");
        }
        Self {
            api_key,
            base_url: config.base_url.clone(),
            client: build_http_client(Duration::from_secs(config.timeout_secs)),
        }
    }

    /// Look up `city` once. Every failure comes back as an error result.
    pub async fn fetch(&self, city: &str, state: &SessionState) -> StatusResult {
        let unit = TemperatureUnit::from_preference(state.get(keys::TEMPERATURE_UNIT).as_ref());
        tracing::info!(city, units = unit.api_units(), "fetching current weather");

        let response = match self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", city),
                ("limit", "1"),
                ("appid", self.api_key.as_str()),
                ("units", unit.api_units()),
            ])
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                // The request URL carries the key.
                let err = err.without_url();
                tracing::warn!(city, error = %err, "weather request failed");
                return StatusResult::error(format!(
                    "A network error occurred while fetching weather: {err}"
                ));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = provider_message(&body)
                .map_or_else(|| status.to_string(), |message| format!("{status}: {message}"));
            tracing::warn!(city, status = status.as_u16(), "weather API returned an error");
            return StatusResult::error(format!(
                "Weather API error for '{city}': {detail}. Check the city name."
            ));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                let err = err.without_url();
                return StatusResult::error(format!(
                    "A network error occurred while fetching weather: {err}"
                ));
            }
        };

        let Some((temp, condition)) = parse_conditions(&body) else {
            tracing::warn!(city, "unexpected weather response shape");
            return StatusResult::error(format!(
                "Could not parse weather data for {city}. Response structure was unexpected."
            ));
        };

        state.set(keys::LAST_CITY_CHECKED, json!(city));
        StatusResult::success(format!(
            "The weather in {} is **{}** with a temperature of **{temp:.1}{}**.",
            capitalize(city),
            capitalize(condition.as_str()),
            unit.symbol()
        ))
    }
}

/// `main.temp` and `weather[0].description`, if both are present.
fn parse_conditions(body: &str) -> Option<(f64, String)> {
    let data: Value = serde_json::from_str(body).ok()?;
    let temp = data.get("main")?.get("temp")?.as_f64()?;
    let condition = data
        .get("weather")?
        .as_array()?
        .first()?
        .get("description")?
        .as_str()?
        .to_string();
    Some((temp, condition))
}

fn provider_message(body: &str) -> Option<String> {
    let data: Value = serde_json::from_str(body).ok()?;
    data.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

impl Tool for WeatherTool {
    fn name(&self) -> &str {
        WEATHER_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Retrieves the current weather report for a specified city, using the \
         temperature unit stored in session state."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "The name of the city (e.g., \"New York\", \"London\", \"Tokyo\")."
                }
            },
            "required": ["city"]
        })
    }

    fn execute<'a>(
        &'a self,
        args: Value,
        ctx: &'a InvocationContext,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Value>> + Send + 'a>> {
        Box::pin(async move {
            let city = args
                .get("city")
                .and_then(Value::as_str)
                .map(str::trim)
                .unwrap_or("");
            if city.is_empty() {
                return Ok(StatusResult::error("A city name is required.").to_value());
            }
            Ok(self.fetch(city, &ctx.state).await.to_value())
        })
    }
}
