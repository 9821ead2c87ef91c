use crate::config::Config;
use anyhow::{anyhow, Result};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::time::Duration;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Delay before the subscriber task re-opens a failed stream. Matches the
/// reconnect cadence browsers use for event streams; the controller itself
/// never retries anything.
pub const RETRY_DELAY: Duration = Duration::from_secs(3);

/// Long-lived connection to the dev server's status event stream.
#[derive(Clone)]
pub struct StatusClient {
    http: reqwest::Client,
    endpoint: String,
}

impl StatusClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint_url.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Open one streaming request. The returned stream yields raw chunks;
    /// frame reassembly happens in [`super::FrameParser`].
    pub async fn connect(&self) -> Result<ByteStream> {
        let response = self
            .http
            .get(&self.endpoint)
            .header("accept", "text/event-stream")
            .send()
            .await
            .map_err(|error| map_stream_error(error, &self.endpoint))?
            .error_for_status()
            .map_err(|error| map_stream_error(error, &self.endpoint))?;

        let endpoint = self.endpoint.clone();
        let stream = response
            .bytes_stream()
            .map(move |item| item.map_err(|error| map_stream_error(error, &endpoint)));
        Ok(Box::pin(stream))
    }
}

fn map_stream_error(error: reqwest::Error, endpoint: &str) -> anyhow::Error {
    if error.is_connect() {
        return anyhow!(
            "cannot reach dev server '{}': {}. Is it running?",
            endpoint,
            error
        );
    }
    if error.is_timeout() {
        return anyhow!("status stream from '{}' timed out: {}", endpoint, error);
    }
    if let Some(status) = error.status() {
        return anyhow!("dev server '{}' returned HTTP {}: {}", endpoint, status, error);
    }
    anyhow!("status stream from '{}' failed: {}", endpoint, error)
}
