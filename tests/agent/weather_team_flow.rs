use std::sync::Arc;

use serde_json::json;
use weathervane::Config;
use weathervane::core::agent::presets::{WEATHER_ROOT_AGENT, weather_team};
use weathervane::core::agent::{AgentGraph, EventKind, RunOutcome, Runner};
use weathervane::core::session::{SessionState, keys};
use weathervane::core::tools::default_registry;
use weathervane::error::AgentError;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::scripted_provider::{ScriptedProvider, call, function_response, text};

fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.weather.api_key = Some("owm-test".into());
    config.weather.base_url = format!("{}/data/2.5/weather", server.uri());
    config
}

fn runner(config: &Config, provider: Arc<ScriptedProvider>) -> Runner {
    let registry = Arc::new(default_registry(config).unwrap());
    let root = weather_team(&config.default_model, &config.guardrails);
    let graph = AgentGraph::new(root, &registry).unwrap();
    Runner::new(graph, registry, provider).with_max_iterations(config.max_iterations)
}

fn has_event(outcome: &RunOutcome, predicate: impl Fn(&EventKind) -> bool) -> bool {
    outcome.events.iter().any(|event| predicate(&event.kind))
}

#[tokio::test]
async fn tokyo_lookup_reports_fahrenheit_and_records_city() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "Tokyo"))
        .and(query_param("units", "imperial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "main": {"temp": 64.4},
            "weather": [{"description": "light rain"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let provider = Arc::new(ScriptedProvider::new(vec![
        call("c1", "get_weather_real", json!({"city": "Tokyo"})),
        text("It's 64.4°F with light rain in Tokyo."),
    ]));
    let state = SessionState::new();

    let outcome = runner(&config, provider.clone())
        .run(&state, "What's the weather in Tokyo?")
        .await
        .unwrap();

    assert_eq!(outcome.final_text, "It's 64.4°F with light rain in Tokyo.");
    assert_eq!(outcome.final_agent, WEATHER_ROOT_AGENT);
    assert_eq!(state.get(keys::LAST_CITY_CHECKED), Some(json!("Tokyo")));
    assert_eq!(
        state.get(keys::LAST_WEATHER_REPORT),
        Some(json!("It's 64.4°F with light rain in Tokyo."))
    );

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    let tool_names: Vec<_> = requests[0].tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tool_names, ["get_weather_real", "transfer_to_agent"]);
    assert_eq!(
        function_response(&requests[1].contents, "c1"),
        Some(json!({
            "status": "success",
            "report": "The weather in Tokyo is **Light rain** with a temperature of **64.4°F**."
        }))
    );
}

#[tokio::test]
async fn paris_is_blocked_before_any_http_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let provider = Arc::new(ScriptedProvider::new(vec![
        call("c1", "get_weather_real", json!({"city": "Paris"})),
        text("Sorry, weather checks for Paris are disabled."),
    ]));
    let state = SessionState::new();

    runner(&config, provider.clone())
        .run(&state, "How about Paris?")
        .await
        .unwrap();

    assert!(state.is_flag_set(keys::TOOL_BLOCK_TRIGGERED));
    assert!(!state.contains_key(keys::LAST_CITY_CHECKED));
    assert_eq!(
        function_response(&provider.requests()[1].contents, "c1"),
        Some(json!({
            "status": "error",
            "error_message": "Policy restriction: Weather checks for 'Paris' are currently disabled by a tool guardrail."
        }))
    );
}

#[tokio::test]
async fn padded_paris_is_blocked_before_any_http_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let provider = Arc::new(ScriptedProvider::new(vec![
        call("c1", "get_weather_real", json!({"city": " Paris "})),
        text("Paris is off limits."),
    ]));
    let state = SessionState::new();

    runner(&config, provider.clone())
        .run(&state, "Weather for Paris please")
        .await
        .unwrap();

    assert!(state.is_flag_set(keys::TOOL_BLOCK_TRIGGERED));
    let response = function_response(&provider.requests()[1].contents, "c1").unwrap();
    assert_eq!(response["status"], "error");
}

#[tokio::test]
async fn blocked_keyword_never_reaches_the_model() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    let provider = Arc::new(ScriptedProvider::new(vec![]));
    let state = SessionState::new();

    let outcome = runner(&config, provider.clone())
        .run(&state, "BLOCK the request for weather in Tokyo")
        .await
        .unwrap();

    let refusal = "I cannot process this request because it contains the blocked keyword 'BLOCK'.";
    assert_eq!(outcome.final_text, refusal);
    assert!(provider.requests().is_empty());
    assert!(state.is_flag_set(keys::KEYWORD_BLOCK_TRIGGERED));
    assert!(has_event(&outcome, |kind| matches!(kind, EventKind::Blocked { .. })));
}

#[tokio::test]
async fn greeting_is_transferred_to_the_greeting_agent() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    let provider = Arc::new(ScriptedProvider::new(vec![
        call("t1", "transfer_to_agent", json!({"agent_name": "greeting_agent"})),
        call("h1", "say_hello", json!({"name": "Alice"})),
        text("Hello, Alice!"),
    ]));
    let state = SessionState::new();

    let outcome = runner(&config, provider.clone())
        .run(&state, "Hi, I'm Alice")
        .await
        .unwrap();

    assert_eq!(outcome.final_agent, "greeting_agent");
    assert_eq!(outcome.final_text, "Hello, Alice!");
    assert!(has_event(&outcome, |kind| matches!(
        kind,
        EventKind::Transfer { target } if target == "greeting_agent"
    )));
    // The root agent's output key only receives the root agent's own answer.
    assert!(!state.contains_key(keys::LAST_WEATHER_REPORT));

    let requests = provider.requests();
    let greeting_instruction = requests[1].system_instruction.as_deref().unwrap();
    assert!(greeting_instruction.starts_with("You are the Greeting Agent."));
    assert_eq!(
        function_response(&requests[2].contents, "h1"),
        Some(json!("Hello, Alice!"))
    );
}

#[tokio::test]
async fn unknown_transfer_target_is_reported_to_the_model() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    let provider = Arc::new(ScriptedProvider::new(vec![
        call("t1", "transfer_to_agent", json!({"agent_name": "travel_agent"})),
        text("I can only help with weather."),
    ]));

    let outcome = runner(&config, provider.clone())
        .run(&SessionState::new(), "Book me a flight")
        .await
        .unwrap();

    assert_eq!(outcome.final_agent, WEATHER_ROOT_AGENT);
    let response = function_response(&provider.requests()[1].contents, "t1").unwrap();
    assert_eq!(response["status"], "error");
}

#[tokio::test]
async fn endless_tool_calls_hit_the_iteration_limit() {
    let server = MockServer::start().await;
    let mut config = config_for(&server);
    config.max_iterations = 3;
    let looping: Vec<_> = (0..5)
        .map(|i| call(&format!("c{i}"), "get_weather_real", json!({"city": "Paris"})))
        .collect();
    let provider = Arc::new(ScriptedProvider::new(looping));

    let err = runner(&config, provider.clone())
        .run(&SessionState::new(), "Paris?")
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<AgentError>(),
        Some(AgentError::IterationLimit { limit: 3, .. })
    ));
    assert_eq!(provider.requests().len(), 3);
}
