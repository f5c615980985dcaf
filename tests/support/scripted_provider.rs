#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use weathervane::core::providers::{
    Content, ModelRequest, ModelResponse, Part, Provider, Role,
};

/// Replays canned responses in order and records every request it receives.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<ModelResponse>>,
    seen: Mutex<Vec<ModelRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn generate<'a>(
        &'a self,
        request: &'a ModelRequest,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ModelResponse>> + Send + 'a>> {
        Box::pin(async move {
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(request.clone());
            self.responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("script exhausted"))
        })
    }
}

pub fn text(text: &str) -> ModelResponse {
    ModelResponse::text_only(text)
}

pub fn call(id: &str, name: &str, args: Value) -> ModelResponse {
    ModelResponse {
        content: Content {
            role: Role::Model,
            parts: vec![Part::FunctionCall {
                id: id.to_string(),
                name: name.to_string(),
                args,
            }],
        },
        usage: None,
    }
}

/// The function response answering call `id`, searched across `contents`.
pub fn function_response(contents: &[Content], id: &str) -> Option<Value> {
    contents.iter().flat_map(|c| &c.parts).find_map(|part| match part {
        Part::FunctionResponse {
            id: response_id,
            response,
            ..
        } if response_id == id => Some(response.clone()),
        _ => None,
    })
}
