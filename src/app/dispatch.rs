use crate::cli::commands::Cli;
use anyhow::{Result, bail};
use std::sync::Arc;
use tracing::{debug, info};
use weathervane::Config;
use weathervane::core::agent::{AgentGraph, Preset, Runner};
use weathervane::core::providers::create_provider;
use weathervane::core::session::SessionState;
use weathervane::core::tools::default_registry;

/// Run one query through the selected agent graph and print the answer.
///
/// 1. Applies CLI overrides on top of the loaded config.
/// 2. Creates the Gemini provider (fails without an LLM key).
/// 3. Builds the tool registry and validates the preset graph against it.
/// 4. Runs the graph on a fresh session and prints the final text.
pub async fn dispatch(cli: Cli, mut config: Config) -> Result<()> {
    if let Some(model) = cli.model.as_deref().filter(|m| !m.trim().is_empty()) {
        config.default_model = model.to_string();
    }
    if let Some(temperature) = cli.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            bail!("--temperature must be between 0.0 and 2.0");
        }
        config.default_temperature = temperature;
    }
    config.validate()?;

    let preset = Preset::from(cli.agent);
    let query = cli.query_text().unwrap_or_else(|| {
        info!(agent = %preset, "no query given; using the default query");
        preset.default_query().to_string()
    });

    let provider = create_provider(&config)?;
    let registry = Arc::new(default_registry(&config)?);
    let root = preset.build(&config.default_model, &config.guardrails);
    let graph = AgentGraph::new(root, &registry)?;

    let runner = Runner::new(graph, registry, Arc::from(provider))
        .with_temperature(config.default_temperature)
        .with_max_iterations(config.effective_max_iterations());

    let state = SessionState::new();
    info!(
        agent = %preset,
        model = config.default_model.as_str(),
        session = state.session_id(),
        "running query"
    );
    let outcome = runner.run(&state, &query).await?;

    for event in &outcome.events {
        debug!(
            author = event.author.as_str(),
            at = %event.timestamp,
            event = ?event.kind,
            "run event"
        );
    }
    debug!(state = ?state.snapshot(), "final session state");

    println!("{}", outcome.final_text);
    Ok(())
}
