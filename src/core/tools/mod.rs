pub mod count;
pub mod factory;
pub mod greeting;
pub mod registry;
pub mod traits;
pub mod weather;

pub use count::{CountPapersTool, count_items};
pub use factory::{default_registry, default_tools};
pub use greeting::{SayGoodbyeTool, SayHelloTool, farewell, greet};
pub use registry::{TRANSFER_TOOL_NAME, ToolRegistry};
pub use traits::{StatusResult, Tool, ToolSpec};
pub use weather::{TemperatureUnit, WEATHER_TOOL_NAME, WeatherTool};
