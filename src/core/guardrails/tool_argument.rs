use super::{Decision, ToolGuard, ToolInvocation};
use crate::core::session::{InvocationContext, keys};
use crate::core::tools::{StatusResult, WEATHER_TOOL_NAME};
use crate::utils::capitalize;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Blocks one tool when a string argument matches a deny-list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolArgumentRule {
    /// Tool the rule applies to.
    pub tool: String,
    /// Argument name to inspect.
    pub argument: String,
    /// Values refused after lower-casing both sides.
    #[serde(default)]
    pub blocked_values: Vec<String>,
}

impl Default for ToolArgumentRule {
    fn default() -> Self {
        Self {
            tool: "get_weather_real".into(),
            argument: "city".into(),
            blocked_values: vec!["paris".into()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolArgumentGuard {
    rule: ToolArgumentRule,
}

impl ToolArgumentGuard {
    pub fn new(mut rule: ToolArgumentRule) -> Self {
        rule.blocked_values = rule
            .blocked_values
            .iter()
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty())
            .collect();
        Self { rule }
    }

    pub fn rule(&self) -> &ToolArgumentRule {
        &self.rule
    }

    /// Refusal text for a blocked `value`, naming the guarded tool.
    pub fn policy_message(&self, value: &str) -> String {
        if self.rule.tool == WEATHER_TOOL_NAME {
            format!(
                "Policy restriction: Weather checks for '{}' are currently disabled by a tool guardrail.",
                capitalize(value)
            )
        } else {
            format!(
                "Policy restriction: '{}' calls with {} '{}' are currently disabled by a tool guardrail.",
                self.rule.tool,
                self.rule.argument,
                capitalize(value)
            )
        }
    }

    /// The inspected argument, trimmed the way tools read it.
    fn argument<'v>(&self, args: &'v Value) -> &'v str {
        args.get(&self.rule.argument)
            .and_then(Value::as_str)
            .map_or("", str::trim)
    }
}

impl ToolGuard for ToolArgumentGuard {
    fn name(&self) -> &str {
        "tool_argument"
    }

    fn before_tool(
        &self,
        invocation: &ToolInvocation<'_>,
        ctx: &InvocationContext,
    ) -> Decision<Value> {
        if invocation.tool_name != self.rule.tool {
            return Decision::Continue;
        }

        let value = self.argument(invocation.args);
        if value.is_empty() {
            return Decision::Continue;
        }

        let lowered = value.to_lowercase();
        if !self.rule.blocked_values.iter().any(|blocked| *blocked == lowered) {
            return Decision::Continue;
        }

        tracing::warn!(
            tool = invocation.tool_name,
            argument = self.rule.argument.as_str(),
            value,
            "tool argument blocked by policy"
        );
        ctx.state.set_flag(keys::TOOL_BLOCK_TRIGGERED);

        Decision::ShortCircuit(StatusResult::error(self.policy_message(value)).to_value())
    }
}
