pub mod definition;
pub mod presets;
pub mod runner;
pub mod template;

pub use definition::{AgentDefinition, AgentGraph, AgentKind, LlmAgent};
pub use presets::Preset;
pub use runner::{EventKind, RunEvent, RunOutcome, Runner};
pub use template::render_instruction;
