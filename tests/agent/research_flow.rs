use std::sync::Arc;

use serde_json::json;
use weathervane::Config;
use weathervane::core::agent::presets::{blog_pipeline, research_paper_finder, research_summary};
use weathervane::core::agent::{AgentDefinition, AgentGraph, EventKind, Runner};
use weathervane::core::providers::BuiltinTool;
use weathervane::core::session::SessionState;
use weathervane::core::tools::default_registry;

use super::scripted_provider::{ScriptedProvider, call, function_response, text};

fn runner(root: AgentDefinition, provider: Arc<ScriptedProvider>) -> Runner {
    let registry = Arc::new(default_registry(&Config::default()).unwrap());
    let graph = AgentGraph::new(root, &registry).unwrap();
    Runner::new(graph, registry, provider)
}

#[tokio::test]
async fn paper_finder_searches_through_agent_tool_then_counts() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        call(
            "s1",
            "google_search_agent",
            json!({"request": "large language model safety papers"}),
        ),
        text("1. Constitutional AI\n2. Red Teaming Language Models"),
        call(
            "c1",
            "count_papers",
            json!({"papers": ["Constitutional AI", "Red Teaming Language Models"]}),
        ),
        text("Found 2 papers: Constitutional AI and Red Teaming Language Models."),
    ]));

    let outcome = runner(research_paper_finder("gemini-2.0-flash"), provider.clone())
        .run(&SessionState::new(), "Find papers on LLM safety and count them.")
        .await
        .unwrap();

    assert_eq!(outcome.final_agent, "research_paper_finder_agent");
    assert!(outcome.final_text.starts_with("Found 2 papers"));
    assert_eq!(provider.remaining(), 0);

    let requests = provider.requests();
    assert_eq!(requests.len(), 4);

    // The nested search agent sees only the request it was handed.
    let search = &requests[1];
    assert_eq!(search.builtin_tools, [BuiltinTool::GoogleSearch]);
    assert_eq!(search.contents.len(), 1);
    assert_eq!(
        search.contents[0].first_text(),
        Some("large language model safety papers")
    );

    assert_eq!(
        function_response(&requests[2].contents, "s1"),
        Some(json!({"result": "1. Constitutional AI\n2. Red Teaming Language Models"}))
    );
    assert_eq!(function_response(&requests[3].contents, "c1"), Some(json!(2)));

    let authors: Vec<_> = outcome
        .events
        .iter()
        .filter(|event| matches!(event.kind, EventKind::Text { .. }))
        .map(|event| event.author.as_str())
        .collect();
    assert_eq!(
        authors,
        ["google_search_agent", "research_paper_finder_agent"]
    );
}

#[tokio::test]
async fn summary_pipeline_feeds_findings_into_the_summarizer() {
    let findings = "- Error-corrected logical qubits [1]\n- Room-temperature qubits [2]";
    let provider = Arc::new(ScriptedProvider::new(vec![
        text(findings),
        text("* Logical qubits are now error corrected."),
    ]));
    let state = SessionState::new();

    let outcome = runner(research_summary("gemini-2.0-flash"), provider.clone())
        .run(&state, "Recent advances in quantum computing")
        .await
        .unwrap();

    assert_eq!(outcome.final_agent, "SummarizerAgent");
    assert_eq!(outcome.final_text, "* Logical qubits are now error corrected.");
    assert_eq!(state.get("research_findings"), Some(json!(findings)));
    assert_eq!(
        state.get("final_summary"),
        Some(json!("* Logical qubits are now error corrected."))
    );

    let requests = provider.requests();
    assert_eq!(requests[0].builtin_tools, [BuiltinTool::GoogleSearch]);
    let summarizer_instruction = requests[1].system_instruction.as_deref().unwrap();
    assert!(summarizer_instruction.contains(findings));
    assert!(!summarizer_instruction.contains("{research_findings}"));
}

#[tokio::test]
async fn blog_pipeline_passes_each_draft_forward() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        text("# Why Rust\n1. Safety\n2. Speed"),
        text("Rust is safe and fast. Draft."),
        text("Rust is safe and fast."),
    ]));
    let state = SessionState::new();

    let outcome = runner(blog_pipeline("gemini-2.0-flash"), provider.clone())
        .run(&state, "Why learn Rust")
        .await
        .unwrap();

    assert_eq!(outcome.final_agent, "EditorAgent");
    assert_eq!(outcome.final_text, "Rust is safe and fast.");
    assert_eq!(state.get("final_blog"), Some(json!("Rust is safe and fast.")));

    let requests = provider.requests();
    assert_eq!(requests.len(), 3);
    let writer = requests[1].system_instruction.as_deref().unwrap();
    assert!(writer.contains("# Why Rust\n1. Safety\n2. Speed"));
    let editor = requests[2].system_instruction.as_deref().unwrap();
    assert!(editor.contains("Rust is safe and fast. Draft."));
}

#[tokio::test]
async fn provider_failure_aborts_the_run() {
    let provider = Arc::new(ScriptedProvider::new(vec![]));

    let err = runner(research_paper_finder("gemini-2.0-flash"), provider)
        .run(&SessionState::new(), "anything")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("research_paper_finder_agent"));
}
