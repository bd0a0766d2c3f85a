use crate::candidate::Candidate;
use crate::failure::ProviderFailure;
use crate::types::message::ChatMessage;
use crate::types::openai::{ChatCompletionRequest, ChatCompletionResponse};
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::{ACCEPT, USER_AGENT};
use std::time::{Duration, Instant};

const USER_AGENT_VALUE: &str = concat!("Xinyu/", env!("CARGO_PKG_VERSION"));

/// Seam between the fallback chain and the network.
#[async_trait]
pub trait ChatCompletionProvider: Send + Sync {
    /// Run one completion against `candidate`. Never panics and never
    /// outlives `timeout`; every problem comes back as a [`ProviderFailure`].
    async fn complete(
        &self,
        candidate: &Candidate,
        messages: &[ChatMessage],
        timeout: Duration,
    ) -> Result<String, ProviderFailure>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            max_tokens: 800,
            temperature: 0.7,
        }
    }
}

/// Production provider: POSTs to an OpenAI-compatible endpoint with reqwest.
#[derive(Debug, Clone)]
pub struct HttpChatProvider {
    client: reqwest::Client,
    options: CompletionOptions,
}

impl HttpChatProvider {
    pub fn new(options: CompletionOptions) -> Self {
        Self::with_client(reqwest::Client::new(), options)
    }

    pub fn with_client(client: reqwest::Client, options: CompletionOptions) -> Self {
        Self { client, options }
    }

    async fn send(
        &self,
        candidate: &Candidate,
        messages: &[ChatMessage],
        timeout: Duration,
    ) -> Result<String, ProviderFailure> {
        let body = ChatCompletionRequest {
            model: candidate.model(),
            messages,
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
            stream: false,
        };

        let response = self
            .client
            .post(candidate.endpoint())
            .bearer_auth(candidate.credential().expose())
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, USER_AGENT_VALUE)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderFailure::from_transport(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            debug!(
                target: "ai",
                "Provider error body: candidate={}, status={}, body={}",
                candidate,
                status.as_u16(),
                error_body
            );
            return Err(ProviderFailure::from_error_response(
                status.as_u16(),
                &error_body,
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderFailure::from_transport(e, timeout))?;
        let parsed: ChatCompletionResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ProviderFailure::MalformedResponse(e.to_string()))?;

        if let Some(usage) = parsed.usage() {
            debug!(
                target: "ai",
                "Provider usage: candidate={}, prompt_tokens={:?}, completion_tokens={:?}",
                candidate,
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        parsed.into_first_content().ok_or_else(|| {
            ProviderFailure::MalformedResponse(
                "missing choices[0].message.content".to_string(),
            )
        })
    }
}

#[async_trait]
impl ChatCompletionProvider for HttpChatProvider {
    async fn complete(
        &self,
        candidate: &Candidate,
        messages: &[ChatMessage],
        timeout: Duration,
    ) -> Result<String, ProviderFailure> {
        let started = Instant::now();
        // Dropping the future on expiry aborts the in-flight request.
        let outcome = match tokio::time::timeout(timeout, self.send(candidate, messages, timeout)).await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderFailure::Timeout(timeout)),
        };
        let latency_ms = started.elapsed().as_millis();

        match &outcome {
            Ok(text) => info!(
                target: "ai",
                "Provider attempt succeeded: candidate={}, endpoint={}, latency_ms={}, reply_chars={}",
                candidate,
                candidate.endpoint(),
                latency_ms,
                text.chars().count()
            ),
            Err(failure) => warn!(
                target: "ai",
                "Provider attempt failed: candidate={}, endpoint={}, kind={}, latency_ms={}, error={}",
                candidate,
                candidate.endpoint(),
                failure.kind(),
                latency_ms,
                failure
            ),
        }

        outcome
    }
}
