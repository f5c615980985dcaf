pub mod gemini;
mod gemini_types;
pub mod reliable;
pub mod response;
pub mod traits;

pub use gemini::GeminiProvider;
pub use reliable::ReliableProvider;
pub use response::{
    BuiltinTool, Content, FunctionCall, ModelRequest, ModelResponse, Part, Role, Usage,
};
pub use traits::Provider;

use crate::config::Config;
use crate::error::ConfigError;

/// Build the configured provider stack: Gemini wrapped in the retry layer.
pub fn create_provider(config: &Config) -> Result<Box<dyn Provider>, ConfigError> {
    let api_key = config
        .api_key
        .as_deref()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            ConfigError::MissingCredential(
                "LLM API key not found; set GOOGLE_API_KEY (or GEMINI_API_KEY) or api_key in config.toml"
                    .to_string(),
            )
        })?;

    let gemini = GeminiProvider::new(api_key, &config.provider);
    Ok(Box::new(ReliableProvider::new(
        Box::new(gemini),
        config.reliability.clone(),
    )))
}
