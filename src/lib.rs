//! Generate a manga blurb from a title and a theme, then a cover image for
//! that blurb, using the OpenAI chat-completion and image-generation APIs.

pub mod config;
pub mod credential;
pub mod diagnostics;
pub mod error;
pub mod logger;
pub mod models;
pub mod openai;
pub mod retry;
pub mod terminal;
pub mod workflow;

pub use config::{Config, OpenAiConfig};
pub use credential::{
    load_credential, Credential, CredentialStore, EnvCredentialStore, MemoryCredentialStore,
    CREDENTIAL_KEY,
};
pub use diagnostics::{DiagnosticLog, LoggerDiagnostics, MemoryDiagnostics};
pub use error::{GenerationError, Result};
pub use models::*;
pub use openai::{BlurbGenerator, CoverGenerator, ImageClient, OpenAiClient, TextClient};
pub use retry::{retry_on_rate_limit, RetryPolicy};
pub use terminal::TerminalView;
pub use workflow::{RunOutcome, Workflow, WorkflowView, FAILURE_MESSAGE, VALIDATION_MESSAGE};
