use super::{Decision, ModelGuard};
use crate::core::providers::{Content, ModelRequest, ModelResponse, Role};
use crate::core::session::{InvocationContext, keys};
use crate::utils::truncate_with_ellipsis;

const LOG_PREVIEW_CHARS: usize = 100;

/// Refuses a model call when the latest user message contains a blocked
/// keyword, compared case-insensitively.
#[derive(Debug, Clone)]
pub struct BlockedKeywordGuard {
    /// Upper-cased, non-empty keywords in configured order.
    keywords: Vec<String>,
}

impl BlockedKeywordGuard {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_uppercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// First matching keyword in `text`, if any.
    pub fn find_keyword(&self, text: &str) -> Option<&str> {
        let upper = text.to_uppercase();
        self.keywords
            .iter()
            .find(|keyword| upper.contains(keyword.as_str()))
            .map(String::as_str)
    }

    pub fn refusal_message(keyword: &str) -> String {
        format!("I cannot process this request because it contains the blocked keyword '{keyword}'.")
    }
}

/// Text of the most recent user-authored message.
///
/// Only the newest `user` message counts; its first text part is used, and a
/// message without text yields `""`. No user message at all also yields `""`.
pub fn latest_user_text(contents: &[Content]) -> &str {
    contents
        .iter()
        .rev()
        .find(|content| content.role == Role::User)
        .and_then(Content::first_text)
        .unwrap_or("")
}

impl ModelGuard for BlockedKeywordGuard {
    fn name(&self) -> &str {
        "blocked_keyword"
    }

    fn before_model(
        &self,
        ctx: &InvocationContext,
        request: &ModelRequest,
    ) -> Decision<ModelResponse> {
        let text = latest_user_text(&request.contents);
        tracing::debug!(
            agent = ctx.agent_name.as_str(),
            message = %truncate_with_ellipsis(text, LOG_PREVIEW_CHARS),
            "inspecting latest user message"
        );

        let Some(keyword) = self.find_keyword(text) else {
            return Decision::Continue;
        };

        tracing::warn!(
            agent = ctx.agent_name.as_str(),
            keyword,
            "blocked keyword found; refusing model call"
        );
        ctx.state.set_flag(keys::KEYWORD_BLOCK_TRIGGERED);

        Decision::ShortCircuit(ModelResponse::text_only(Self::refusal_message(keyword)))
    }
}
