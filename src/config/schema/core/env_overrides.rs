use super::Config;

/// LLM key variables, highest priority first.
const LLM_KEY_VARS: [&str; 3] = ["WEATHERVANE_API_KEY", "GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// First variable in `names` that is set to a non-blank value.
fn first_non_empty(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()))
}

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Some(key) = first_non_empty(&LLM_KEY_VARS) {
            self.api_key = Some(key);
        }

        if let Ok(key) = std::env::var("OPENWEATHERMAP_API_KEY")
            && !key.is_empty()
        {
            self.weather.api_key = Some(key);
        }

        if let Ok(model) = std::env::var("WEATHERVANE_MODEL")
            && !model.is_empty()
        {
            self.default_model = model;
        }

        if let Ok(temp_str) = std::env::var("WEATHERVANE_TEMPERATURE")
            && let Ok(temp) = temp_str.parse::<f64>()
            && (0.0..=2.0).contains(&temp)
        {
            self.default_temperature = temp;
        }
    }
}
