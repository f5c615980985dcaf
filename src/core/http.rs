use reqwest::Client;
use std::time::Duration;

const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client shared by the model provider and the weather tool.
///
/// `timeout` bounds the whole request; connecting never waits longer than
/// ten seconds (or `timeout`, if shorter).
pub fn build_http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_else(|error| {
            tracing::warn!(%error, "falling back to default HTTP client");
            Client::new()
        })
}
