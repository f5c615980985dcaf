//! Built-in agent graphs.

use super::definition::AgentDefinition;
use crate::config::GuardrailsConfig;
use crate::core::guardrails::{model_guards_from_config, tool_guards_from_config};
use crate::core::providers::BuiltinTool;
use crate::core::session::keys;
use crate::core::tools::WEATHER_TOOL_NAME;
use strum::{Display, EnumIter, EnumString};

pub const WEATHER_ROOT_AGENT: &str = "weather_agent_v6_tool_guardrail";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Preset {
    /// Guarded weather agent with greeting and farewell delegates.
    Weather,
    /// Finds papers with a search agent and counts them.
    Research,
    /// Single search-backed assistant.
    Assistant,
    /// Research then summary, run in sequence.
    Summary,
    /// Outline, draft, then edit a blog post.
    Blog,
}

impl Preset {
    pub fn default_query(self) -> &'static str {
        match self {
            Self::Weather => "What's the weather in Tokyo?",
            Self::Research => {
                "Find recent papers on large language model safety and count them."
            }
            Self::Assistant => "What is the latest news about renewable energy?",
            Self::Summary => "Recent advances in quantum computing",
            Self::Blog => "The benefits of learning Rust in 2025",
        }
    }

    pub fn build(self, model: &str, guardrails: &GuardrailsConfig) -> AgentDefinition {
        match self {
            Self::Weather => weather_team(model, guardrails),
            Self::Research => research_paper_finder(model),
            Self::Assistant => helpful_assistant(model),
            Self::Summary => research_summary(model),
            Self::Blog => blog_pipeline(model),
        }
    }
}

pub fn greeting_agent(model: &str) -> AgentDefinition {
    AgentDefinition::llm(
        "greeting_agent",
        model,
        "You are the Greeting Agent. Your ONLY task is to provide a friendly greeting \
         using the 'say_hello' tool. Do nothing else.",
    )
    .with_description("Handles simple greetings and hellos using the 'say_hello' tool.")
    .configure(|llm| llm.tools = vec!["say_hello".into()])
}

pub fn farewell_agent(model: &str) -> AgentDefinition {
    AgentDefinition::llm(
        "farewell_agent",
        model,
        "You are the Farewell Agent. Your ONLY task is to provide a polite goodbye \
         message using the 'say_goodbye' tool. Do not perform any other actions.",
    )
    .with_description("Handles simple farewells and goodbyes using the 'say_goodbye' tool.")
    .configure(|llm| llm.tools = vec!["say_goodbye".into()])
}

/// Root weather agent with both guardrails and the two delegates.
pub fn weather_team(model: &str, guardrails: &GuardrailsConfig) -> AgentDefinition {
    AgentDefinition::llm(
        WEATHER_ROOT_AGENT,
        model,
        "You are the main Weather Agent. Provide weather using 'get_weather_real'. \
         Delegate greetings to 'greeting_agent' and farewells to 'farewell_agent'. \
         Handle only weather, greetings, and farewells.",
    )
    .with_description("Main agent: Handles weather, delegates, includes input AND tool guardrails.")
    .configure(|llm| {
        llm.tools = vec![WEATHER_TOOL_NAME.into()];
        llm.sub_agents = vec![greeting_agent(model), farewell_agent(model)];
        llm.output_key = Some(keys::LAST_WEATHER_REPORT.into());
        llm.before_model = model_guards_from_config(guardrails);
        llm.before_tool = tool_guards_from_config(guardrails);
    })
}

pub fn google_search_agent(model: &str) -> AgentDefinition {
    AgentDefinition::llm(
        "google_search_agent",
        model,
        "Use the google_search tool to find information on the given topic. \
         Return the raw search results.",
    )
    .with_description("Searches for information using Google search")
    .configure(|llm| llm.builtin_tools = vec![BuiltinTool::GoogleSearch])
}

pub fn research_paper_finder(model: &str) -> AgentDefinition {
    AgentDefinition::llm(
        "research_paper_finder_agent",
        model,
        "Your task is to find research papers and count them.\n\n\
         You must follow these steps:\n\
         1) Find research papers on the user provided topic using the 'google_search_agent'.\n\
         2) Then, pass the papers to 'count_papers' tool to count the number of papers returned.\n\
         3) Return both the list of research papers and the total number of papers.",
    )
    .configure(|llm| {
        llm.tools = vec!["count_papers".into()];
        llm.agent_tools = vec![google_search_agent(model)];
    })
}

pub fn helpful_assistant(model: &str) -> AgentDefinition {
    AgentDefinition::llm(
        "helpful_assistant",
        model,
        "You are a helpful assistant. Use Google Search for current info or if unsure.",
    )
    .with_description("A simple agent that can answer general questions.")
    .configure(|llm| llm.builtin_tools = vec![BuiltinTool::GoogleSearch])
}

/// Research agent writes `research_findings`; the summarizer reads it.
pub fn research_summary(model: &str) -> AgentDefinition {
    let researcher = AgentDefinition::llm(
        "ResearchAgent",
        model,
        "You are a specialized research agent. Your only job is to use the google_search \
         tool to find 2-3 pieces of relevant information on the given topic and present \
         the findings with citations.",
    )
    .configure(|llm| {
        llm.builtin_tools = vec![BuiltinTool::GoogleSearch];
        llm.output_key = Some("research_findings".into());
    });

    let summarizer = AgentDefinition::llm(
        "SummarizerAgent",
        model,
        "Read the provided research findings: {research_findings}\n\
         Create a concise summary as a bulleted list with 3-5 key points.",
    )
    .configure(|llm| llm.output_key = Some("final_summary".into()));

    AgentDefinition::sequential("ResearchPipeline", vec![researcher, summarizer])
        .with_description("Researches a topic, then summarizes the findings.")
}

/// Outline, writer and editor run in order, each reading the previous
/// step's output from session state.
pub fn blog_pipeline(model: &str) -> AgentDefinition {
    let outline = AgentDefinition::llm(
        "OutlineAgent",
        model,
        "Create a blog post outline for the topic the user gives. Return a title, \
         an introduction hook, 3-5 section headings with one-line notes, and a \
         conclusion.",
    )
    .configure(|llm| llm.output_key = Some("blog_outline".into()));

    let writer = AgentDefinition::llm(
        "WriterAgent",
        model,
        "Write a complete blog post of 400-600 words following this outline:\n\
         {blog_outline}\n\
         Keep an engaging, informative tone.",
    )
    .configure(|llm| llm.output_key = Some("blog_draft".into()));

    let editor = AgentDefinition::llm(
        "EditorAgent",
        model,
        "Edit this blog draft for grammar, flow and clarity:\n\
         {blog_draft}\n\
         Return only the final polished post.",
    )
    .configure(|llm| llm.output_key = Some("final_blog".into()));

    AgentDefinition::sequential("BlogPipeline", vec![outline, writer, editor])
        .with_description("Outlines, writes, then edits a blog post.")
}
