use super::{traits::BlurbGenerator, Transport};
use crate::{
    config::OpenAiConfig,
    error::{GenerationError, Result},
    models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, GenerationRequest},
    retry::RetryPolicy,
};
use async_trait::async_trait;

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

#[derive(Clone)]
pub struct TextClient {
    transport: Transport,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

impl TextClient {
    pub(crate) fn new(transport: Transport, config: &OpenAiConfig) -> Self {
        Self {
            transport,
            endpoint: config.completions_url.clone(),
            model: config.text_model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.transport.retry = Some(policy);
        self
    }

    /// Asks the chat-completion endpoint for a blurb. A failure is written
    /// to the diagnostic log once before it is returned; rate-limited calls
    /// are retried only when a policy was set with [`TextClient::with_retry`].
    pub async fn generate_blurb(&self, request: &GenerationRequest) -> Result<String> {
        self.transport
            .run("text_client", || self.request_blurb(request))
            .await
    }

    async fn request_blurb(&self, request: &GenerationRequest) -> Result<String> {
        let payload = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(request.instruction()),
            ],
            max_tokens: self.max_tokens,
        };

        log::info!(
            "Requesting blurb for '{}' ({}) from model {}",
            request.title(),
            request.theme(),
            self.model
        );

        let response: ChatCompletionResponse =
            self.transport.post_json(&self.endpoint, &payload).await?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            GenerationError::MalformedResponse("completion response contains no choices".into())
        })?;

        if let Some(reason) = &choice.finish_reason {
            log::debug!("Completion finish reason: {}", reason);
        }

        let content = choice.message.content.ok_or_else(|| {
            GenerationError::MalformedResponse("completion choice has no message content".into())
        })?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl BlurbGenerator for TextClient {
    async fn generate_blurb(&self, request: &GenerationRequest) -> Result<String> {
        TextClient::generate_blurb(self, request).await
    }
}
