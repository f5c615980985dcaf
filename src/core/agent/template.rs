use crate::core::session::SessionState;
use serde_json::Value;

/// Replace `{key}` placeholders with session state values.
///
/// Only identifier-shaped keys are substituted, so literal braces (JSON
/// snippets in an instruction) pass through. String values are inserted
/// verbatim, other values as JSON. A missing key becomes an empty string.
pub fn render_instruction(template: &str, state: &SessionState) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_state_key(&after[..close]) => {
                let key = &after[..close];
                match state.get(key) {
                    Some(Value::String(text)) => out.push_str(&text),
                    Some(value) => out.push_str(&value.to_string()),
                    None => {
                        tracing::warn!(key, "instruction placeholder has no session value");
                    }
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_state_key(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
