use super::sink::{DispatchPayload, FeedbackSink, SinkError};
use std::time::Duration;

pub const DEFAULT_SINK_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts payloads as JSON to an automation webhook (n8n, Zapier and friends).
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: reqwest::blocking::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SinkError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SinkError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl FeedbackSink for WebhookSink {
    fn post(&self, payload: &DispatchPayload) -> Result<u16, SinkError> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .map_err(classify_error)?;

        Ok(response.status().as_u16())
    }
}

fn classify_error(err: reqwest::Error) -> SinkError {
    if err.is_timeout() {
        SinkError::Timeout(err.to_string())
    } else if err.is_connect() {
        SinkError::Connect(err.to_string())
    } else {
        SinkError::Transport(err.to_string())
    }
}
