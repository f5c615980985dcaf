use super::traits::{StatusResult, Tool, ToolSpec};
use crate::core::guardrails::{Decision, ToolGuardChain, ToolInvocation};
use crate::core::session::InvocationContext;
use crate::error::ToolError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Longest name accepted for a function declaration.
pub const MAX_TOOL_NAME_LEN: usize = 64;

/// Reserved for agent-to-agent delegation.
pub const TRANSFER_TOOL_NAME: &str = "transfer_to_agent";

/// Central registry mapping tool names to handlers.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names must be unique and usable as a function name.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), ToolError> {
        let tool: Arc<dyn Tool> = Arc::from(tool);
        let name = tool.name().to_string();
        validate_tool_name(&name)?;
        if self.tools.contains_key(&name) {
            return Err(ToolError::Duplicate { name });
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Return sorted list of registered tool names.
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Specs for `names`, in the given order.
    pub fn specs_for(&self, names: &[String]) -> Result<Vec<ToolSpec>, ToolError> {
        names
            .iter()
            .map(|name| {
                self.tools
                    .get(name)
                    .map(|tool| tool.spec())
                    .ok_or_else(|| ToolError::NotFound { name: name.clone() })
            })
            .collect()
    }

    /// Execute a tool behind the guard chain.
    ///
    /// An unknown tool or a guard short-circuit produces a result value, not
    /// an error; `Err` only carries unexpected tool failures.
    pub async fn execute(
        &self,
        name: &str,
        args: Value,
        ctx: &InvocationContext,
        guards: &ToolGuardChain,
    ) -> anyhow::Result<Value> {
        let Some(tool) = self.tools.get(name) else {
            tracing::warn!(tool = name, "model requested an unknown tool");
            return Ok(StatusResult::error(format!("Tool not found: {name}")).to_value());
        };

        let invocation = ToolInvocation {
            tool_name: name,
            args: &args,
            agent_name: &ctx.agent_name,
        };
        if let Decision::ShortCircuit(result) = guards.run(&invocation, ctx) {
            return Ok(result);
        }

        tracing::debug!(tool = name, agent = ctx.agent_name.as_str(), "executing tool");
        tool.execute(args, ctx).await
    }
}

pub(crate) fn validate_tool_name(name: &str) -> Result<(), ToolError> {
    let invalid = |reason: &str| ToolError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.len() > MAX_TOOL_NAME_LEN {
        return Err(invalid("name is longer than 64 characters"));
    }
    if !name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    {
        return Err(invalid("name must start with a letter or underscore"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(invalid(
            "only ASCII letters, digits, '_' and '-' are allowed",
        ));
    }
    if name == TRANSFER_TOOL_NAME {
        return Err(invalid("name is reserved for agent transfer"));
    }
    Ok(())
}
