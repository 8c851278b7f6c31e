//! Code generation over a remote chat-completion service
//!
//! - `client`: HTTP client for an OpenAI-compatible completions endpoint
//! - `pipeline`: the enhance-then-generate pipeline
//! - `prompts`: fixed system instructions for both stages

pub mod client;
pub mod pipeline;
pub mod prompts;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AppResult;

pub use client::{HttpCompletionClient, ResponseShape};
pub use pipeline::Pipeline;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A single role-tagged message sent to the completion service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A remote text-completion capability.
///
/// Implementations own the model choice, sampling temperature and output
/// bound; callers only supply the conversation. Each call is a single
/// attempt: implementations must not retry.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Returns the text of the single best completion.
    async fn complete(&self, messages: &[ChatMessage]) -> AppResult<String>;
}
