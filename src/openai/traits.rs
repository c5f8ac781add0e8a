use crate::{
    error::Result,
    models::{CoverImageReference, GenerationRequest},
};
use async_trait::async_trait;

/// Produces the blurb for a title and theme.
#[async_trait]
pub trait BlurbGenerator: Send + Sync {
    async fn generate_blurb(&self, request: &GenerationRequest) -> Result<String>;
}

/// Produces a cover image for a prompt.
#[async_trait]
pub trait CoverGenerator: Send + Sync {
    async fn generate_cover_image(&self, prompt: &str) -> Result<CoverImageReference>;
}
