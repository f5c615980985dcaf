mod core;
mod guardrails;
mod weather;

pub use self::core::{Config, MAX_ITERATIONS_LIMIT, ProviderConfig, ReliabilityConfig};
pub use guardrails::GuardrailsConfig;
pub use weather::WeatherConfig;
