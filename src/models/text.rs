use crate::error::{GenerationError, Result};
use serde::{Deserialize, Serialize};

/// Title and theme collected from the user, trimmed and checked for presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    title: String,
    theme: String,
}

impl GenerationRequest {
    pub fn new(title: &str, theme: &str) -> Result<Self> {
        let title = title.trim();
        let theme = theme.trim();

        if title.is_empty() || theme.is_empty() {
            return Err(GenerationError::Validation(
                "both title and theme are required".into(),
            ));
        }

        Ok(Self {
            title: title.to_string(),
            theme: theme.to_string(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn instruction(&self) -> String {
        format!(
            "Create a manga blurb with the title \"{}\" and theme \"{}\"",
            self.title, self.theme
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    pub content: Option<String>,
}
