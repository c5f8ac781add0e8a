use crate::{
    error::{GenerationError, Result},
    retry::RetryPolicy,
};
use std::env;
use std::time::Duration;

pub const DEFAULT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_IMAGES_URL: &str = "https://api.openai.com/v1/images/generations";
pub const DEFAULT_TEXT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_IMAGE_MODEL: &str = "image-alpha-001";
pub const DEFAULT_MAX_TOKENS: u32 = 150;
pub const DEFAULT_IMAGE_SIZE: &str = "256x256";

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiConfig {
    pub completions_url: String,
    pub images_url: String,
    pub text_model: String,
    pub image_model: String,
    pub max_tokens: u32,
    pub image_size: String,
    /// No timeout unless configured; a hung request keeps the run busy.
    pub request_timeout: Option<Duration>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        OpenAiConfig {
            completions_url: DEFAULT_COMPLETIONS_URL.to_string(),
            images_url: DEFAULT_IMAGES_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            image_size: DEFAULT_IMAGE_SIZE.to_string(),
            request_timeout: None,
        }
    }
}

impl OpenAiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let max_tokens = match env::var("MANGAGEN_MAX_TOKENS") {
            Ok(raw) => parse_var("MANGAGEN_MAX_TOKENS", &raw)?,
            Err(_) => defaults.max_tokens,
        };
        let request_timeout = match env::var("MANGAGEN_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => match parse_var::<u64>("MANGAGEN_REQUEST_TIMEOUT_SECS", &raw)? {
                0 => {
                    return Err(GenerationError::Config(
                        "MANGAGEN_REQUEST_TIMEOUT_SECS must be greater than zero".into(),
                    ))
                }
                secs => Some(Duration::from_secs(secs)),
            },
            Err(_) => None,
        };

        Ok(OpenAiConfig {
            completions_url: env::var("OPENAI_COMPLETIONS_URL")
                .unwrap_or(defaults.completions_url),
            images_url: env::var("OPENAI_IMAGES_URL").unwrap_or(defaults.images_url),
            text_model: env::var("OPENAI_TEXT_MODEL").unwrap_or(defaults.text_model),
            image_model: env::var("OPENAI_IMAGE_MODEL").unwrap_or(defaults.image_model),
            max_tokens,
            image_size: env::var("MANGAGEN_IMAGE_SIZE").unwrap_or(defaults.image_size),
            request_timeout,
        })
    }

    pub fn with_endpoints(
        mut self,
        completions_url: impl Into<String>,
        images_url: impl Into<String>,
    ) -> Self {
        self.completions_url = completions_url.into();
        self.images_url = images_url.into();
        self
    }

    pub fn with_models(
        mut self,
        text_model: impl Into<String>,
        image_model: impl Into<String>,
    ) -> Self {
        self.text_model = text_model.into();
        self.image_model = image_model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_image_size(mut self, size: impl Into<String>) -> Self {
        self.image_size = size.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub openai: OpenAiConfig,
    pub retry: Option<RetryPolicy>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        let use_retry = env::var("MANGAGEN_RETRY")
            .ok()
            .map_or(false, |val| val == "true");

        Ok(Config {
            openai: OpenAiConfig::from_env()?,
            retry: use_retry.then(RetryPolicy::default),
        })
    }

    pub fn with_openai(mut self, config: OpenAiConfig) -> Self {
        self.openai = config;
        self
    }

    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| GenerationError::Config(format!("{} has an invalid value: {:?}", name, raw)))
}
