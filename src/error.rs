use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `Weathervane`.
///
/// Tool failures and guardrail blocks are *not* errors: they travel as tagged
/// result values so the model sees a uniform shape. These variants cover the
/// things that genuinely stop a run: bad configuration, an invalid agent
/// graph, or a provider that cannot be reached.
#[derive(Debug, Error)]
pub enum VaneError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Tools ───────────────────────────────────────────────────────────
    #[error("tool: {0}")]
    Tool(#[from] ToolError),

    // ── Agent graph / runner ────────────────────────────────────────────
    #[error("agent: {0}")]
    Agent(#[from] AgentError),

    // ── LLM / Provider ──────────────────────────────────────────────────
    #[error("provider: {0}")]
    Provider(#[from] ProviderError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("missing credential: {0}")]
    MissingCredential(String),
}

// ─── Tool errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool {name} not found")]
    NotFound { name: String },

    #[error("tool {name} is already registered")]
    Duplicate { name: String },

    #[error("invalid tool name '{name}': {reason}")]
    InvalidName { name: String, reason: String },
}

// ─── Agent graph / runner errors ────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent name '{0}' is used more than once")]
    DuplicateName(String),

    #[error("agent {agent} references unregistered tool {tool}")]
    UnknownTool { agent: String, tool: String },

    #[error("agent {agent} cannot transfer to {target}")]
    UnknownTransferTarget { agent: String, target: String },

    #[error("workflow agent {0} has no sub-agents")]
    EmptyWorkflow(String),

    #[error("invalid agent name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("agent {agent} exceeded {limit} model turns")]
    IterationLimit { agent: String, limit: u32 },
}

// ─── LLM / Provider errors ──────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider {provider} returned HTTP {status}: {message}")]
    Http {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("provider {provider} authentication missing")]
    MissingApiKey { provider: String },

    #[error("provider {provider} returned no candidates")]
    EmptyResponse { provider: String },
}

impl ProviderError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::MissingApiKey { .. } | Self::EmptyResponse { .. } => None,
        }
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, VaneError>;
