use super::state::SessionState;

/// Who is acting, and on which session.
///
/// Handed to guardrails and tools for the duration of one call. Cloning is
/// cheap: the session state is a shared handle.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub agent_name: String,
    pub invocation_id: String,
    pub state: SessionState,
}

impl InvocationContext {
    pub fn new(agent_name: impl Into<String>, state: SessionState) -> Self {
        Self {
            agent_name: agent_name.into(),
            invocation_id: uuid::Uuid::new_v4().to_string(),
            state,
        }
    }
}

#[cfg(test)]
impl InvocationContext {
    pub fn test_default() -> Self {
        Self::new("test_agent", SessionState::with_id("test:session"))
    }
}
