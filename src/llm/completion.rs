// src/llm/completion.rs
// Chat completion client (OpenAI-compatible, non-streaming, single attempt)

use super::logging::{log_completion, log_usage};
use super::types::{ChatBody, ChatResponse, CompletionRequest, CompletionResult};
use crate::config::CompletionSettings;
use crate::error::{MuseoError, Result, Service};
use crate::http::endpoint;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Anything that can turn a CompletionRequest into text
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult>;
}

/// Client for POST {base_url}/chat/completions
pub struct CompletionClient {
    http: Client,
    url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl CompletionClient {
    pub fn new(http: Client, settings: &CompletionSettings, api_key: Option<String>) -> Self {
        Self {
            http,
            url: endpoint(&settings.base_url, "chat/completions"),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout: settings.timeout(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Pull the first choice's text out of a raw response body
    fn first_choice(body: &str) -> Result<String> {
        let parsed: ChatResponse = serde_json::from_str(body).map_err(|e| {
            MuseoError::remote(
                Service::Completion,
                None,
                format!("unparseable response: {e}"),
            )
        })?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                MuseoError::remote(Service::Completion, None, "response contained no choices")
            })
    }
}

#[async_trait]
impl Completer for CompletionClient {
    #[instrument(skip(self, request), fields(request_id, model = %request.model()))]
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            MuseoError::Configuration("OPENAI_API_KEY is not set".to_string())
        })?;

        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let body = ChatBody {
            model: request.model(),
            messages: request.messages(),
        };
        debug!(
            request_id = %request_id,
            system_len = request.system_instruction().len(),
            user_len = request.user_instruction().len(),
            "sending completion request"
        );

        let started = Instant::now();
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| MuseoError::remote(Service::Completion, None, e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| MuseoError::remote(Service::Completion, Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            warn!(request_id = %request_id, status = %status, "completion request rejected");
            return Err(MuseoError::remote(
                Service::Completion,
                Some(status.as_u16()),
                text,
            ));
        }

        if let Ok(ChatResponse {
            usage: Some(ref usage),
            ..
        }) = serde_json::from_str::<ChatResponse>(&text)
        {
            log_usage(&request_id, usage);
        }

        let content = Self::first_choice(&text)?;
        log_completion(
            &request_id,
            request.model(),
            started.elapsed().as_millis() as u64,
            content.len(),
        );

        Ok(CompletionResult { text: content })
    }
}
