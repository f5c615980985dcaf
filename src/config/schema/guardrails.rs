use crate::core::guardrails::ToolArgumentRule;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailsConfig {
    /// Case-insensitive keywords that refuse a model call outright.
    #[serde(default = "default_blocked_keywords")]
    pub blocked_keywords: Vec<String>,
    #[serde(default = "default_tool_rules")]
    pub tool_rules: Vec<ToolArgumentRule>,
}

fn default_blocked_keywords() -> Vec<String> {
    vec!["BLOCK".into()]
}

fn default_tool_rules() -> Vec<ToolArgumentRule> {
    vec![ToolArgumentRule::default()]
}

impl Default for GuardrailsConfig {
    fn default() -> Self {
        Self {
            blocked_keywords: default_blocked_keywords(),
            tool_rules: default_tool_rules(),
        }
    }
}

impl GuardrailsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blocked_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "guardrails.blocked_keywords must not contain empty entries".into(),
            ));
        }
        for (index, rule) in self.tool_rules.iter().enumerate() {
            if rule.tool.trim().is_empty() || rule.argument.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "guardrails.tool_rules[{index}] needs both tool and argument"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_blocks_keyword_and_paris() {
        let config = GuardrailsConfig::default();
        assert_eq!(config.blocked_keywords, ["BLOCK"]);
        assert_eq!(config.tool_rules.len(), 1);
        assert_eq!(config.tool_rules[0].tool, "get_weather_real");
        assert_eq!(config.tool_rules[0].argument, "city");
        assert_eq!(config.tool_rules[0].blocked_values, ["paris"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_keyword_is_rejected() {
        let config = GuardrailsConfig {
            blocked_keywords: vec!["  ".into()],
            tool_rules: vec![],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rule_without_argument_is_rejected() {
        let config = GuardrailsConfig {
            blocked_keywords: vec![],
            tool_rules: vec![ToolArgumentRule {
                tool: "get_weather_real".into(),
                argument: String::new(),
                blocked_values: vec!["paris".into()],
            }],
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tool_rules[0]"));
    }

    #[test]
    fn rules_parse_from_toml_tables() {
        let config: GuardrailsConfig = toml::from_str(
            r#"
blocked_keywords = ["BLOCK", "SECRET"]

[[tool_rules]]
tool = "get_weather_real"
argument = "city"
blocked_values = ["paris", "berlin"]
"#,
        )
        .unwrap();
        assert_eq!(config.blocked_keywords.len(), 2);
        assert_eq!(config.tool_rules[0].blocked_values, ["paris", "berlin"]);
    }
}
