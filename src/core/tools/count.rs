use super::traits::Tool;
use crate::core::session::InvocationContext;
use serde_json::{Value, json};
use std::future::Future;
use std::pin::Pin;

pub fn count_items<T>(items: &[T]) -> usize {
    items.len()
}

/// Counts the papers a search returned.
pub struct CountPapersTool;

impl Tool for CountPapersTool {
    fn name(&self) -> &str {
        "count_papers"
    }

    fn description(&self) -> &str {
        "Counts the number of papers in a list of paper titles or links."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "papers": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "A list of paper titles or links."
                }
            },
            "required": ["papers"]
        })
    }

    fn execute<'a>(
        &'a self,
        args: Value,
        _ctx: &'a InvocationContext,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Value>> + Send + 'a>> {
        Box::pin(async move {
            let count = args
                .get("papers")
                .and_then(Value::as_array)
                .map_or(0, |papers| count_items(papers));
            Ok(json!(count))
        })
    }
}
