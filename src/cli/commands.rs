use clap::{ArgAction, Parser, ValueEnum};
use weathervane::core::agent::Preset;

/// `Weathervane` - guarded weather agent team backed by Gemini.
#[derive(Parser, Debug)]
#[command(name = "weathervane")]
#[command(version = "0.1.0")]
#[command(about = "Ask a guarded agent team about the weather, papers, or anything else.", long_about = None)]
pub struct Cli {
    /// Question for the agent; words are joined with spaces
    pub query: Vec<String>,

    /// Agent graph to run
    #[arg(short, long, value_enum, default_value_t = AgentChoice::Weather)]
    pub agent: AgentChoice,

    /// Model to use (defaults to `default_model` from config)
    #[arg(long)]
    pub model: Option<String>,

    /// Temperature (0.0 - 2.0)
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentChoice {
    /// Weather agent with greeting/farewell delegates and guardrails
    Weather,
    /// Research paper finder
    Research,
    /// General assistant with web search
    Assistant,
    /// Research followed by a summary
    Summary,
    /// Outline, write, then edit a blog post
    Blog,
}

impl From<AgentChoice> for Preset {
    fn from(choice: AgentChoice) -> Self {
        match choice {
            AgentChoice::Weather => Preset::Weather,
            AgentChoice::Research => Preset::Research,
            AgentChoice::Assistant => Preset::Assistant,
            AgentChoice::Summary => Preset::Summary,
            AgentChoice::Blog => Preset::Blog,
        }
    }
}

impl Cli {
    /// The query text, or `None` when no words were given.
    pub fn query_text(&self) -> Option<String> {
        let joined = self.query.join(" ");
        let trimmed = joined.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn query_words_are_joined() {
        let cli = Cli::parse_from(["weathervane", "weather", "in", "London?"]);
        assert_eq!(cli.query_text().as_deref(), Some("weather in London?"));
        assert_eq!(cli.agent, AgentChoice::Weather);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn empty_query_is_none() {
        let cli = Cli::parse_from(["weathervane", "--agent", "research", "-vv"]);
        assert_eq!(cli.query_text(), None);
        assert_eq!(Preset::from(cli.agent), Preset::Research);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn blog_agent_is_selectable() {
        let cli = Cli::parse_from(["weathervane", "-a", "blog", "async", "Rust"]);
        assert_eq!(Preset::from(cli.agent), Preset::Blog);
    }

    #[test]
    fn unknown_agent_is_rejected() {
        assert!(Cli::try_parse_from(["weathervane", "--agent", "parallel"]).is_err());
    }
}
