pub mod schema;

pub use schema::{
    Config, GuardrailsConfig, MAX_ITERATIONS_LIMIT, ProviderConfig, ReliabilityConfig,
    WeatherConfig,
};
