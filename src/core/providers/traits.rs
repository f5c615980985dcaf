use super::response::{ModelRequest, ModelResponse};
use std::future::Future;
use std::pin::Pin;

/// A model backend able to answer one request.
///
/// The runner owns the conversation; a provider only maps a single
/// [`ModelRequest`] to a [`ModelResponse`] and reports transport or API
/// failures as errors.
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    fn generate<'a>(
        &'a self,
        request: &'a ModelRequest,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ModelResponse>> + Send + 'a>>;
}
