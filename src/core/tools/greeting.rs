use super::traits::Tool;
use crate::core::session::InvocationContext;
use serde_json::{Value, json};
use std::future::Future;
use std::pin::Pin;

/// `"Hello, <name>!"`, or `"Hello there!"` without a usable name.
pub fn greet(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => format!("Hello, {name}!"),
        _ => "Hello there!".to_string(),
    }
}

pub fn farewell() -> &'static str {
    "Goodbye! Have a great day."
}

pub struct SayHelloTool;

impl Tool for SayHelloTool {
    fn name(&self) -> &str {
        "say_hello"
    }

    fn description(&self) -> &str {
        "Provides a simple greeting. If a name is provided, it will be used."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "The name of the person to greet."
                }
            }
        })
    }

    fn execute<'a>(
        &'a self,
        args: Value,
        ctx: &'a InvocationContext,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Value>> + Send + 'a>> {
        Box::pin(async move {
            let name = args.get("name").and_then(Value::as_str);
            tracing::debug!(agent = ctx.agent_name.as_str(), ?name, "say_hello");
            Ok(Value::String(greet(name)))
        })
    }
}

pub struct SayGoodbyeTool;

impl Tool for SayGoodbyeTool {
    fn name(&self) -> &str {
        "say_goodbye"
    }

    fn description(&self) -> &str {
        "Provides a simple farewell message to conclude the conversation."
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    fn execute<'a>(
        &'a self,
        _args: Value,
        _ctx: &'a InvocationContext,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Value>> + Send + 'a>> {
        Box::pin(async move { Ok(Value::String(farewell().to_string())) })
    }
}
