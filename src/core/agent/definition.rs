use crate::core::guardrails::{ModelGuardChain, ToolGuardChain};
use crate::core::providers::BuiltinTool;
use crate::core::tools::ToolRegistry;
use crate::core::tools::registry::validate_tool_name;
use crate::error::{AgentError, ToolError};
use std::collections::HashSet;

/// A model-driven agent.
#[derive(Debug, Clone, Default)]
pub struct LlmAgent {
    pub model: String,
    /// System instruction; `{key}` placeholders are filled from session state.
    pub instruction: String,
    /// Registered tools this agent may call.
    pub tools: Vec<String>,
    /// Agents exposed as callable tools. Each runs a nested conversation.
    pub agent_tools: Vec<AgentDefinition>,
    pub builtin_tools: Vec<BuiltinTool>,
    /// Agents this one may hand the conversation to.
    pub sub_agents: Vec<AgentDefinition>,
    /// Session key that receives the agent's final text.
    pub output_key: Option<String>,
    pub before_model: ModelGuardChain,
    pub before_tool: ToolGuardChain,
}

#[derive(Debug, Clone)]
pub enum AgentKind {
    Llm(Box<LlmAgent>),
    /// Runs each sub-agent in order over the shared conversation.
    Sequential { sub_agents: Vec<AgentDefinition> },
}

#[derive(Debug, Clone)]
pub struct AgentDefinition {
    pub name: String,
    pub description: String,
    pub kind: AgentKind,
}

impl AgentDefinition {
    pub fn llm(
        name: impl Into<String>,
        model: impl Into<String>,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind: AgentKind::Llm(Box::new(LlmAgent {
                model: model.into(),
                instruction: instruction.into(),
                ..LlmAgent::default()
            })),
        }
    }

    pub fn sequential(name: impl Into<String>, sub_agents: Vec<AgentDefinition>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind: AgentKind::Sequential { sub_agents },
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn as_llm(&self) -> Option<&LlmAgent> {
        match &self.kind {
            AgentKind::Llm(llm) => Some(llm),
            AgentKind::Sequential { .. } => None,
        }
    }

    /// Apply `update` to the LLM settings. No-op for workflow agents.
    #[must_use]
    pub fn configure(mut self, update: impl FnOnce(&mut LlmAgent)) -> Self {
        if let AgentKind::Llm(llm) = &mut self.kind {
            update(llm);
        }
        self
    }

    /// Direct transfer target named `name`.
    pub fn sub_agent(&self, name: &str) -> Option<&AgentDefinition> {
        self.as_llm()?
            .sub_agents
            .iter()
            .find(|agent| agent.name == name)
    }

    pub fn agent_tool(&self, name: &str) -> Option<&AgentDefinition> {
        self.as_llm()?
            .agent_tools
            .iter()
            .find(|agent| agent.name == name)
    }

    fn children(&self) -> Box<dyn Iterator<Item = &AgentDefinition> + '_> {
        match &self.kind {
            AgentKind::Llm(llm) => Box::new(llm.sub_agents.iter().chain(&llm.agent_tools)),
            AgentKind::Sequential { sub_agents } => Box::new(sub_agents.iter()),
        }
    }
}

/// A validated agent tree.
#[derive(Debug, Clone)]
pub struct AgentGraph {
    root: AgentDefinition,
}

impl AgentGraph {
    pub fn new(root: AgentDefinition, registry: &ToolRegistry) -> Result<Self, AgentError> {
        let mut seen = HashSet::new();
        validate_agent(&root, registry, &mut seen)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &AgentDefinition {
        &self.root
    }

    /// Every agent name in the tree, depth first.
    pub fn agent_names(&self) -> Vec<&str> {
        fn walk<'a>(agent: &'a AgentDefinition, out: &mut Vec<&'a str>) {
            out.push(&agent.name);
            for child in agent.children() {
                walk(child, out);
            }
        }
        let mut names = Vec::new();
        walk(&self.root, &mut names);
        names
    }
}

fn invalid_name(err: ToolError) -> AgentError {
    match err {
        ToolError::InvalidName { name, reason } => AgentError::InvalidName { name, reason },
        other => AgentError::InvalidName {
            name: String::new(),
            reason: other.to_string(),
        },
    }
}

fn validate_agent<'a>(
    agent: &'a AgentDefinition,
    registry: &ToolRegistry,
    seen: &mut HashSet<&'a str>,
) -> Result<(), AgentError> {
    // Agent names double as function names for transfer and agent tools.
    validate_tool_name(&agent.name).map_err(invalid_name)?;
    if !seen.insert(agent.name.as_str()) {
        return Err(AgentError::DuplicateName(agent.name.clone()));
    }

    match &agent.kind {
        AgentKind::Sequential { sub_agents } => {
            if sub_agents.is_empty() {
                return Err(AgentError::EmptyWorkflow(agent.name.clone()));
            }
        }
        AgentKind::Llm(llm) => {
            for tool in &llm.tools {
                if !registry.contains(tool) {
                    return Err(AgentError::UnknownTool {
                        agent: agent.name.clone(),
                        tool: tool.clone(),
                    });
                }
            }
            for agent_tool in &llm.agent_tools {
                if llm.tools.contains(&agent_tool.name) {
                    return Err(AgentError::DuplicateName(agent_tool.name.clone()));
                }
            }
            for target in &llm.sub_agents {
                if target.as_llm().is_none() {
                    return Err(AgentError::UnknownTransferTarget {
                        agent: agent.name.clone(),
                        target: target.name.clone(),
                    });
                }
            }
        }
    }

    for child in agent.children() {
        validate_agent(child, registry, seen)?;
    }
    Ok(())
}
