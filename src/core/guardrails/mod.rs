//! Pre-model and pre-tool guardrails.
//!
//! A guardrail inspects an in-flight model request or tool call and either
//! lets it continue or short-circuits it with a substitute result. Guards are
//! grouped into ordered chains; the first short-circuit wins and later guards
//! never run.

pub mod keyword;
pub mod tool_argument;

pub use keyword::BlockedKeywordGuard;
pub use tool_argument::{ToolArgumentGuard, ToolArgumentRule};

use crate::config::GuardrailsConfig;
use crate::core::providers::{ModelRequest, ModelResponse};
use crate::core::session::InvocationContext;
use serde_json::Value;
use std::sync::Arc;

/// Outcome of a guardrail check.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision<T> {
    /// Let the request or call proceed unchanged.
    Continue,
    /// Skip the real work and use this value instead.
    ShortCircuit(T),
}

impl<T> Decision<T> {
    pub fn is_short_circuit(&self) -> bool {
        matches!(self, Self::ShortCircuit(_))
    }
}

/// A tool call about to run. Borrowed for one guardrail check.
#[derive(Debug, Clone, Copy)]
pub struct ToolInvocation<'a> {
    pub tool_name: &'a str,
    pub args: &'a Value,
    pub agent_name: &'a str,
}

/// Hook run before a request is sent to the model.
pub trait ModelGuard: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    fn before_model(
        &self,
        ctx: &InvocationContext,
        request: &ModelRequest,
    ) -> Decision<ModelResponse>;
}

/// Hook run before a tool executes. A short-circuit value becomes the tool
/// result.
pub trait ToolGuard: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    fn before_tool(
        &self,
        invocation: &ToolInvocation<'_>,
        ctx: &InvocationContext,
    ) -> Decision<Value>;
}

#[derive(Debug, Clone, Default)]
pub struct ModelGuardChain {
    guards: Vec<Arc<dyn ModelGuard>>,
}

impl ModelGuardChain {
    pub fn new(guards: Vec<Arc<dyn ModelGuard>>) -> Self {
        Self { guards }
    }

    pub fn push(&mut self, guard: Arc<dyn ModelGuard>) {
        self.guards.push(guard);
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    pub fn run(&self, ctx: &InvocationContext, request: &ModelRequest) -> Decision<ModelResponse> {
        for guard in &self.guards {
            if let Decision::ShortCircuit(response) = guard.before_model(ctx, request) {
                tracing::info!(
                    guard = guard.name(),
                    agent = ctx.agent_name.as_str(),
                    "model call short-circuited"
                );
                return Decision::ShortCircuit(response);
            }
        }
        Decision::Continue
    }
}

#[derive(Debug, Clone, Default)]
pub struct ToolGuardChain {
    guards: Vec<Arc<dyn ToolGuard>>,
}

impl ToolGuardChain {
    pub fn new(guards: Vec<Arc<dyn ToolGuard>>) -> Self {
        Self { guards }
    }

    pub fn push(&mut self, guard: Arc<dyn ToolGuard>) {
        self.guards.push(guard);
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    pub fn run(&self, invocation: &ToolInvocation<'_>, ctx: &InvocationContext) -> Decision<Value> {
        for guard in &self.guards {
            if let Decision::ShortCircuit(result) = guard.before_tool(invocation, ctx) {
                tracing::info!(
                    guard = guard.name(),
                    tool = invocation.tool_name,
                    agent = invocation.agent_name,
                    "tool call short-circuited"
                );
                return Decision::ShortCircuit(result);
            }
        }
        Decision::Continue
    }
}

/// Model guard chain built from config: one keyword guard when any
/// keywords are configured.
pub fn model_guards_from_config(config: &GuardrailsConfig) -> ModelGuardChain {
    let mut chain = ModelGuardChain::default();
    if !config.blocked_keywords.is_empty() {
        chain.push(Arc::new(BlockedKeywordGuard::new(
            config.blocked_keywords.clone(),
        )));
    }
    chain
}

/// Tool guard chain built from config: one argument guard per rule.
pub fn tool_guards_from_config(config: &GuardrailsConfig) -> ToolGuardChain {
    ToolGuardChain::new(
        config
            .tool_rules
            .iter()
            .cloned()
            .map(|rule| Arc::new(ToolArgumentGuard::new(rule)) as Arc<dyn ToolGuard>)
            .collect(),
    )
}
