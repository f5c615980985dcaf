//! Google Gemini provider over the `generateContent` REST endpoint.
//!
//! Function declarations come from the registry's [`ToolSpec`]s; function
//! responses travel back with the `user` role as the API requires.

use super::gemini_types::{
    EmptyObject, GeminiContent, GeminiFunctionCall, GeminiFunctionDeclaration,
    GeminiFunctionResponse, GeminiInlineData, GeminiPart, GeminiTool, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, ResponsePart,
};
use super::response::{
    BuiltinTool, Content, ModelRequest, ModelResponse, Part, Role, Usage,
};
use super::traits::Provider;
use crate::config::ProviderConfig;
use crate::core::http::build_http_client;
use crate::core::tools::traits::ToolSpec;
use crate::error::ProviderError;
use crate::utils::truncate_with_ellipsis;
use reqwest::Client;
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

const PROVIDER_NAME: &str = "gemini";
const MAX_OUTPUT_TOKENS: u32 = 8192;
const MAX_ERROR_BODY_CHARS: usize = 500;

pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    client: Client,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, config: &ProviderConfig) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: build_http_client(Duration::from_secs(config.timeout_secs)),
        }
    }

    fn model_name(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        }
    }

    fn map_role(role: Role) -> &'static str {
        match role {
            Role::Model => "model",
            Role::User | Role::Tool | Role::System => "user",
        }
    }

    fn map_part(part: &Part) -> GeminiPart {
        match part {
            Part::Text { text } => GeminiPart {
                text: Some(text.clone()),
                ..GeminiPart::default()
            },
            Part::FunctionCall { id, name, args } => GeminiPart {
                function_call: Some(GeminiFunctionCall {
                    name: name.clone(),
                    args: args.clone(),
                    id: Some(id.clone()),
                }),
                ..GeminiPart::default()
            },
            Part::FunctionResponse { id, name, response } => GeminiPart {
                function_response: Some(GeminiFunctionResponse {
                    id: Some(id.clone()),
                    name: name.clone(),
                    response: wrap_object(response.clone(), "result"),
                }),
                ..GeminiPart::default()
            },
            Part::Data { mime_type, data } => GeminiPart {
                inline_data: Some(GeminiInlineData {
                    mime_type: mime_type.clone(),
                    data: data.clone(),
                }),
                ..GeminiPart::default()
            },
        }
    }

    fn map_content(content: &Content) -> GeminiContent {
        GeminiContent {
            role: Some(Self::map_role(content.role).to_string()),
            parts: content.parts.iter().map(Self::map_part).collect(),
        }
    }

    fn build_tools(tools: &[ToolSpec], builtin: &[BuiltinTool]) -> Vec<GeminiTool> {
        let mut mapped = Vec::new();
        if !tools.is_empty() {
            mapped.push(GeminiTool::Functions {
                function_declarations: tools
                    .iter()
                    .map(|tool| GeminiFunctionDeclaration {
                        name: tool.name.clone(),
                        description: tool.description.clone(),
                        parameters: tool.parameters.clone(),
                    })
                    .collect(),
            });
        }
        for tool in builtin {
            match tool {
                BuiltinTool::GoogleSearch => mapped.push(GeminiTool::GoogleSearch {
                    google_search: EmptyObject::default(),
                }),
            }
        }
        mapped
    }

    fn build_request(request: &ModelRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: request.contents.iter().map(Self::map_content).collect(),
            system_instruction: request.system_instruction.as_ref().map(|system| {
                GeminiContent {
                    role: None,
                    parts: vec![GeminiPart {
                        text: Some(system.clone()),
                        ..GeminiPart::default()
                    }],
                }
            }),
            tools: Self::build_tools(&request.tools, &request.builtin_tools),
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        }
    }

    fn parse_parts(parts: Vec<ResponsePart>) -> Vec<Part> {
        let mut mapped = Vec::new();
        for part in parts {
            if let Some(text) = part.text
                && !text.is_empty()
            {
                mapped.push(Part::Text { text });
            }
            if let Some(call) = part.function_call {
                let id = call.id.unwrap_or_else(|| {
                    format!("gemini_call_{}", uuid::Uuid::new_v4().simple())
                });
                mapped.push(Part::FunctionCall {
                    id,
                    name: call.name,
                    args: wrap_object(call.args, "input"),
                });
            }
        }
        mapped
    }

    fn parse_response(body: GenerateContentResponse) -> anyhow::Result<ModelResponse> {
        if let Some(error) = body.error {
            return Err(ProviderError::Http {
                provider: PROVIDER_NAME.to_string(),
                status: 200,
                message: error.message,
            }
            .into());
        }

        let parts = body
            .candidates
            .and_then(|candidates| candidates.into_iter().next())
            .and_then(|candidate| candidate.content)
            .map(|content| Self::parse_parts(content.parts))
            .ok_or_else(|| ProviderError::EmptyResponse {
                provider: PROVIDER_NAME.to_string(),
            })?;

        Ok(ModelResponse {
            content: Content {
                role: Role::Model,
                parts,
            },
            usage: body.usage_metadata.map(|usage| Usage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            }),
        })
    }

    async fn call_api(&self, request: &ModelRequest) -> anyhow::Result<ModelResponse> {
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingApiKey {
                provider: PROVIDER_NAME.to_string(),
            }
            .into());
        }

        let url = format!(
            "{}/{}:generateContent",
            self.base_url,
            Self::model_name(&request.model)
        );
        let body = Self::build_request(request);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                provider: PROVIDER_NAME.to_string(),
                status: status.as_u16(),
                message: truncate_with_ellipsis(&error_text, MAX_ERROR_BODY_CHARS),
            }
            .into());
        }

        let parsed: GenerateContentResponse = response.json().await?;
        Self::parse_response(parsed)
    }
}

/// Gemini requires object-shaped `args`/`response`; wrap anything else.
fn wrap_object(value: Value, key: &str) -> Value {
    if value.is_object() {
        value
    } else {
        let mut wrapped = Map::new();
        wrapped.insert(key.to_string(), value);
        Value::Object(wrapped)
    }
}

impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn generate<'a>(
        &'a self,
        request: &'a ModelRequest,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ModelResponse>> + Send + 'a>> {
        Box::pin(async move {
            tracing::debug!(
                model = request.model.as_str(),
                messages = request.contents.len(),
                tools = request.tools.len(),
                "sending generateContent request"
            );
            self.call_api(request).await
        })
    }
}
