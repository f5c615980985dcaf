use super::{CountPapersTool, SayGoodbyeTool, SayHelloTool, Tool, ToolRegistry, WeatherTool};
use crate::config::Config;
use crate::error::ToolError;

/// Every tool the built-in agents can reference.
pub fn default_tools(config: &Config) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(WeatherTool::new(&config.weather)),
        Box::new(SayHelloTool),
        Box::new(SayGoodbyeTool),
        Box::new(CountPapersTool),
    ]
}

/// Create the default tool registry
pub fn default_registry(config: &Config) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    for tool in default_tools(config) {
        registry.register(tool)?;
    }
    Ok(registry)
}
