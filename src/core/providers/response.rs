use crate::core::tools::traits::ToolSpec;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
    /// Function responses fed back to the model.
    Tool,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    Text {
        text: String,
    },
    FunctionCall {
        id: String,
        name: String,
        args: Value,
    },
    FunctionResponse {
        id: String,
        name: String,
        response: Value,
    },
    Data {
        mime_type: String,
        data: String,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::FunctionCall { .. } | Self::FunctionResponse { .. } | Self::Data { .. } => None,
        }
    }
}

/// One message of a conversation: a role plus one or more parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::text(text)],
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::text(text)],
        }
    }

    pub fn function_response(
        id: impl Into<String>,
        name: impl Into<String>,
        response: Value,
    ) -> Self {
        Self {
            role: Role::Tool,
            parts: vec![Part::FunctionResponse {
                id: id.into(),
                name: name.into(),
                response,
            }],
        }
    }

    /// First text part, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.parts.iter().find_map(Part::as_text)
    }

    /// All text parts joined with newlines.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(Part::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Provider-native tools that are not backed by a local handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinTool {
    GoogleSearch,
}

/// Everything the model sees for one turn.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    pub contents: Vec<Content>,
    pub tools: Vec<ToolSpec>,
    pub builtin_tools: Vec<BuiltinTool>,
    pub temperature: f64,
}

impl ModelRequest {
    pub fn new(model: impl Into<String>, contents: Vec<Content>) -> Self {
        Self {
            model: model.into(),
            system_instruction: None,
            contents,
            tools: Vec::new(),
            builtin_tools: Vec::new(),
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub content: Content,
    pub usage: Option<Usage>,
}

/// A function call extracted from a model response.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub id: String,
    pub name: String,
    pub args: Value,
}

impl ModelResponse {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            content: Content::model(text),
            usage: None,
        }
    }

    pub fn text(&self) -> String {
        self.content.text()
    }

    pub fn function_calls(&self) -> Vec<FunctionCall> {
        self.content
            .parts
            .iter()
            .filter_map(|part| match part {
                Part::FunctionCall { id, name, args } => Some(FunctionCall {
                    id: id.clone(),
                    name: name.clone(),
                    args: args.clone(),
                }),
                Part::Text { .. } | Part::FunctionResponse { .. } | Part::Data { .. } => None,
            })
            .collect()
    }
}
