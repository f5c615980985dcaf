use super::definition::{AgentDefinition, AgentGraph, AgentKind, LlmAgent};
use super::template::render_instruction;
use crate::config::MAX_ITERATIONS_LIMIT;
use crate::core::guardrails::Decision;
use crate::core::providers::{Content, FunctionCall, ModelRequest, Part, Provider, Role};
use crate::core::session::{InvocationContext, SessionState};
use crate::core::tools::{StatusResult, TRANSFER_TOOL_NAME, ToolRegistry, ToolSpec};
use crate::error::AgentError;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt::Write;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

const DEFAULT_MAX_ITERATIONS: u32 = 10;

const TRANSFER_PREAMBLE: &str = "\n\nYou can hand the conversation to one of these agents with \
     `transfer_to_agent` when the request matches its description:";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    Text { text: String },
    ToolCall { name: String, args: Value },
    ToolResult { name: String, response: Value },
    Transfer { target: String },
    /// A model guard answered instead of the model.
    Blocked { text: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunEvent {
    pub author: String,
    #[serde(flatten)]
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
}

impl RunEvent {
    fn new(author: &str, kind: EventKind) -> Self {
        Self {
            author: author.to_string(),
            kind,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub final_text: String,
    /// Agent that produced the final text.
    pub final_agent: String,
    pub events: Vec<RunEvent>,
}

/// Mutable state of one `run` call.
struct Turn<'s> {
    contents: Vec<Content>,
    events: Vec<RunEvent>,
    state: &'s SessionState,
    invocation_id: String,
}

impl Turn<'_> {
    fn ctx(&self, agent_name: &str) -> InvocationContext {
        InvocationContext {
            agent_name: agent_name.to_string(),
            invocation_id: self.invocation_id.clone(),
            state: self.state.clone(),
        }
    }

    fn record(&mut self, author: &str, kind: EventKind) {
        self.events.push(RunEvent::new(author, kind));
    }
}

/// Resolves to `(agent name, final text)`.
type AgentFuture<'a> =
    Pin<Box<dyn Future<Output = anyhow::Result<(String, String)>> + Send + 'a>>;

/// Drives an agent graph against a model provider.
pub struct Runner {
    graph: AgentGraph,
    registry: Arc<ToolRegistry>,
    provider: Arc<dyn Provider>,
    temperature: f64,
    max_iterations: u32,
}

impl Runner {
    pub fn new(
        graph: AgentGraph,
        registry: Arc<ToolRegistry>,
        provider: Arc<dyn Provider>,
    ) -> Self {
        Self {
            graph,
            registry,
            provider,
            temperature: 0.7,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Model turns allowed per agent activation, capped at the hard limit.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations.clamp(1, MAX_ITERATIONS_LIMIT);
        self
    }

    pub fn graph(&self) -> &AgentGraph {
        &self.graph
    }

    /// Send `query` to the root agent and run until an agent answers in text.
    pub async fn run(&self, state: &SessionState, query: &str) -> anyhow::Result<RunOutcome> {
        let mut turn = Turn {
            contents: vec![Content::user(query)],
            events: Vec::new(),
            state,
            invocation_id: uuid::Uuid::new_v4().to_string(),
        };
        tracing::info!(
            agent = self.graph.root().name.as_str(),
            session = state.session_id(),
            "starting run"
        );

        let (final_agent, final_text) = self.run_agent(self.graph.root(), &mut turn).await?;
        Ok(RunOutcome {
            final_text,
            final_agent,
            events: turn.events,
        })
    }

    fn run_agent<'a, 's: 'a>(
        &'a self,
        agent: &'a AgentDefinition,
        turn: &'a mut Turn<'s>,
    ) -> AgentFuture<'a> {
        Box::pin(async move {
            match &agent.kind {
                AgentKind::Llm(_) => self.run_llm(agent, turn).await,
                AgentKind::Sequential { sub_agents } => {
                    let mut last = (agent.name.clone(), String::new());
                    for step in sub_agents {
                        tracing::debug!(
                            workflow = agent.name.as_str(),
                            step = step.name.as_str(),
                            "running step"
                        );
                        last = self.run_agent(step, turn).await?;
                    }
                    Ok(last)
                }
            }
        })
    }

    async fn run_llm<'a>(
        &'a self,
        agent: &'a AgentDefinition,
        turn: &mut Turn<'_>,
    ) -> anyhow::Result<(String, String)> {
        let mut current = agent;
        let mut iterations = 0_u32;

        loop {
            let Some(llm) = current.as_llm() else {
                return self.run_agent(current, turn).await;
            };

            iterations += 1;
            if iterations > self.max_iterations {
                return Err(AgentError::IterationLimit {
                    agent: current.name.clone(),
                    limit: self.max_iterations,
                }
                .into());
            }

            let ctx = turn.ctx(&current.name);
            let request = self.build_request(current, llm, turn)?;

            let (response, blocked) = match llm.before_model.run(&ctx, &request) {
                Decision::ShortCircuit(response) => (response, true),
                Decision::Continue => {
                    let response = self
                        .provider
                        .generate(&request)
                        .await
                        .with_context(|| format!("model call failed for agent {}", current.name))?;
                    (response, false)
                }
            };

            let mut content = response.content.clone();
            content.role = Role::Model;
            turn.contents.push(content);

            let text = response.text();
            let calls = response.function_calls();
            if blocked {
                turn.record(&current.name, EventKind::Blocked { text: text.clone() });
            } else if !text.is_empty() {
                turn.record(&current.name, EventKind::Text { text: text.clone() });
            }

            if calls.is_empty() {
                if let Some(key) = &llm.output_key {
                    turn.state.set(key, Value::String(text.clone()));
                }
                return Ok((current.name.clone(), text));
            }

            let mut transfer: Option<&AgentDefinition> = None;
            let mut parts = Vec::with_capacity(calls.len());
            for call in calls {
                turn.record(
                    &current.name,
                    EventKind::ToolCall {
                        name: call.name.clone(),
                        args: call.args.clone(),
                    },
                );

                let result = if call.name == TRANSFER_TOOL_NAME {
                    let target_name = call
                        .args
                        .get("agent_name")
                        .and_then(Value::as_str)
                        .unwrap_or("");
                    match current.sub_agent(target_name) {
                        Some(target) => {
                            transfer = Some(target);
                            json!({"result": format!("Transferred to {target_name}.")})
                        }
                        None => StatusResult::error(format!("Unknown agent: '{target_name}'"))
                            .to_value(),
                    }
                } else if let Some(agent_tool) = current.agent_tool(&call.name) {
                    self.run_agent_tool(agent_tool, &call, turn).await?
                } else {
                    self.call_tool(&call, llm, &ctx).await
                };

                turn.record(
                    &current.name,
                    EventKind::ToolResult {
                        name: call.name.clone(),
                        response: result.clone(),
                    },
                );
                parts.push(Part::FunctionResponse {
                    id: call.id,
                    name: call.name,
                    response: result,
                });
            }
            turn.contents.push(Content {
                role: Role::Tool,
                parts,
            });

            if let Some(target) = transfer {
                tracing::info!(
                    from = current.name.as_str(),
                    to = target.name.as_str(),
                    "transferring conversation"
                );
                turn.record(
                    &current.name,
                    EventKind::Transfer {
                        target: target.name.clone(),
                    },
                );
                current = target;
                iterations = 0;
            }
        }
    }

    async fn call_tool(
        &self,
        call: &FunctionCall,
        llm: &LlmAgent,
        ctx: &InvocationContext,
    ) -> Value {
        match self
            .registry
            .execute(&call.name, call.args.clone(), ctx, &llm.before_tool)
            .await
        {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(tool = call.name.as_str(), error = %err, "tool failed");
                StatusResult::error(format!("Tool '{}' failed: {err}", call.name)).to_value()
            }
        }
    }

    /// Run `agent` on its own conversation seeded with the call's `request`.
    async fn run_agent_tool(
        &self,
        agent: &AgentDefinition,
        call: &FunctionCall,
        turn: &mut Turn<'_>,
    ) -> anyhow::Result<Value> {
        let request = call
            .args
            .get("request")
            .and_then(Value::as_str)
            .map_or_else(|| call.args.to_string(), str::to_string);

        let mut nested = Turn {
            contents: vec![Content::user(request)],
            events: Vec::new(),
            state: turn.state,
            invocation_id: turn.invocation_id.clone(),
        };
        let (_, text) = self.run_agent(agent, &mut nested).await?;
        turn.events.append(&mut nested.events);
        Ok(json!({"result": text}))
    }

    fn build_request(
        &self,
        agent: &AgentDefinition,
        llm: &LlmAgent,
        turn: &Turn<'_>,
    ) -> anyhow::Result<ModelRequest> {
        let mut instruction = render_instruction(&llm.instruction, turn.state);
        let mut tools = self.registry.specs_for(&llm.tools)?;
        tools.extend(llm.agent_tools.iter().map(agent_tool_spec));

        if !llm.sub_agents.is_empty() {
            tools.push(transfer_spec(&llm.sub_agents));
            instruction.push_str(TRANSFER_PREAMBLE);
            for target in &llm.sub_agents {
                let _ = write!(instruction, "\n- {}: {}", target.name, target.description);
            }
        }

        let mut request = ModelRequest::new(llm.model.clone(), turn.contents.clone());
        request.system_instruction = Some(instruction).filter(|text| !text.trim().is_empty());
        request.tools = tools;
        request.builtin_tools = llm.builtin_tools.clone();
        request.temperature = self.temperature;
        tracing::debug!(
            agent = agent.name.as_str(),
            tools = request.tools.len(),
            "built model request"
        );
        Ok(request)
    }
}

fn agent_tool_spec(agent: &AgentDefinition) -> ToolSpec {
    ToolSpec {
        name: agent.name.clone(),
        description: agent.description.clone(),
        parameters: json!({
            "type": "object",
            "properties": {
                "request": {"type": "string"}
            },
            "required": ["request"]
        }),
    }
}

fn transfer_spec(targets: &[AgentDefinition]) -> ToolSpec {
    let names: Vec<&str> = targets.iter().map(|agent| agent.name.as_str()).collect();
    ToolSpec {
        name: TRANSFER_TOOL_NAME.to_string(),
        description: "Transfer the question to another agent.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "agent_name": {
                    "type": "string",
                    "enum": names
                }
            },
            "required": ["agent_name"]
        }),
    }
}
