use super::{traits::CoverGenerator, Transport};
use crate::{
    config::OpenAiConfig,
    error::{GenerationError, Result},
    models::{CoverImageReference, ImageGenerationRequest, ImageGenerationResponse},
    retry::RetryPolicy,
};
use async_trait::async_trait;

#[derive(Clone)]
pub struct ImageClient {
    transport: Transport,
    endpoint: String,
    model: String,
    size: String,
}

impl ImageClient {
    pub(crate) fn new(transport: Transport, config: &OpenAiConfig) -> Self {
        Self {
            transport,
            endpoint: config.images_url.clone(),
            model: config.image_model.clone(),
            size: config.image_size.clone(),
        }
    }

    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.transport.retry = Some(policy);
        self
    }

    pub async fn generate_cover_image(&self, prompt: &str) -> Result<CoverImageReference> {
        self.transport
            .run("image_client", || self.request_image(prompt))
            .await
    }

    async fn request_image(&self, prompt: &str) -> Result<CoverImageReference> {
        let payload = ImageGenerationRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: self.size.clone(),
            response_format: "url".to_string(),
        };

        log::info!("Generating {} cover image with model: {}", self.size, self.model);

        let response: ImageGenerationResponse =
            self.transport.post_json(&self.endpoint, &payload).await?;

        let image = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::MalformedResponse("No images generated".into()))?;

        Ok(CoverImageReference { url: image.url })
    }
}

#[async_trait]
impl CoverGenerator for ImageClient {
    async fn generate_cover_image(&self, prompt: &str) -> Result<CoverImageReference> {
        ImageClient::generate_cover_image(self, prompt).await
    }
}
