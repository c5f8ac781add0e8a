pub mod image_client;
pub mod text_client;
pub mod traits;

use crate::{
    config::OpenAiConfig,
    credential::Credential,
    diagnostics::{DiagnosticLog, LoggerDiagnostics},
    error::{GenerationError, Result},
    retry::{retry_on_rate_limit, RetryPolicy},
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;

pub use image_client::ImageClient;
pub use text_client::TextClient;
pub use traits::{BlurbGenerator, CoverGenerator};

/// Both generation clients, sharing one HTTP connection pool and credential.
#[derive(Clone)]
pub struct OpenAiClient {
    text_client: TextClient,
    image_client: ImageClient,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig, credential: Credential) -> Result<Self> {
        Self::with_diagnostics(config, credential, Arc::new(LoggerDiagnostics))
    }

    pub fn with_diagnostics(
        config: OpenAiConfig,
        credential: Credential,
        diagnostics: Arc<dyn DiagnosticLog>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| GenerationError::Config(format!("failed to build HTTP client: {}", e)))?;

        let transport = Transport {
            http,
            credential,
            diagnostics,
            retry: None,
        };

        Ok(Self {
            text_client: TextClient::new(transport.clone(), &config),
            image_client: ImageClient::new(transport, &config),
        })
    }

    /// Retries rate-limited calls on both clients. Only the final outcome of
    /// a call reaches the diagnostic log.
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.text_client = self.text_client.with_retry(policy);
        self.image_client = self.image_client.with_retry(policy);
        self
    }

    pub fn text(&self) -> &TextClient {
        &self.text_client
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }
}

/// Authorized JSON POSTs plus the diagnostic channel failures are written to.
#[derive(Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    credential: Credential,
    diagnostics: Arc<dyn DiagnosticLog>,
    retry: Option<RetryPolicy>,
}

impl Transport {
    /// Runs `call` under the retry policy, if any, and writes a failure to
    /// the diagnostic log once, after the last attempt.
    pub(crate) async fn run<T, F, Fut>(&self, source: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let outcome = match &self.retry {
            Some(policy) => retry_on_rate_limit(policy, source, call).await,
            None => call().await,
        };
        outcome.map_err(|e| self.report(source, e))
    }

    pub(crate) async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let request_json = serde_json::to_string(body)
            .map_err(|e| GenerationError::Serialization(e.to_string()))?;

        log::debug!("POST {} payload: {}", url, request_json);

        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, self.credential.bearer())
            .body(request_json)
            .send()
            .await
            .map_err(|e| GenerationError::remote(None, format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            return Err(GenerationError::remote(
                Some(status.as_u16()),
                format!("{} returned {}: {}", url, status, error_body.trim()),
            ));
        }

        let response_body = response.text().await.map_err(|e| {
            GenerationError::MalformedResponse(format!("failed to read body from {}: {}", url, e))
        })?;

        serde_json::from_str(&response_body).map_err(|e| {
            GenerationError::MalformedResponse(format!(
                "unexpected response from {}: {} - body: {}",
                url, e, response_body
            ))
        })
    }

    fn report(&self, source: &str, error: GenerationError) -> GenerationError {
        self.diagnostics.error(source, &error.to_string());
        error
    }
}
