use std::sync::Arc;

use super::{prompts, ChatMessage, CompletionBackend, HttpCompletionClient};
use crate::config::CompletionConfig;
use crate::error::{AppError, AppResult};

/// Enhance-then-generate code pipeline.
///
/// Both stages go to the same backend. The composite [`Pipeline::run`] never
/// calls the generation stage after a failed enhancement, so a bad first call
/// costs exactly one request.
#[derive(Clone)]
pub struct Pipeline {
    backend: Arc<dyn CompletionBackend>,
    enhance: bool,
}

impl Pipeline {
    /// Pipeline with the enhancement stage enabled.
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend, enhance: true }
    }

    /// Pipeline over the HTTP completion client described by `config`.
    pub fn from_config(config: &CompletionConfig) -> AppResult<Self> {
        let client = HttpCompletionClient::new(config)?;
        Ok(Self::new(Arc::new(client)).with_enhancement(config.enhance))
    }

    pub fn with_enhancement(mut self, enabled: bool) -> Self {
        self.enhance = enabled;
        self
    }

    async fn ask(&self, system: &str, user_text: &str) -> AppResult<String> {
        let messages = [ChatMessage::system(system), ChatMessage::user(user_text)];
        let text = self.backend.complete(&messages).await?;
        if text.trim().is_empty() {
            return Err(AppError::EmptyResponse);
        }
        Ok(text)
    }

    /// Rewrites a task description into a detailed engineering task.
    pub async fn enhance(&self, task_text: &str) -> AppResult<String> {
        log::info!("Enhancing task ({} chars)", task_text.chars().count());
        self.ask(prompts::PROMPT_ENHANCER, task_text).await
    }

    /// Generates source code for a task specification.
    pub async fn generate_code(&self, spec_text: &str) -> AppResult<String> {
        log::info!("Generating code for spec ({} chars)", spec_text.chars().count());
        self.ask(prompts::CODE_GENERATOR, spec_text).await
    }

    /// Runs the full pipeline and returns the generated code.
    pub async fn run(&self, task_text: &str) -> AppResult<String> {
        let spec = if self.enhance {
            match self.enhance(task_text).await {
                Ok(spec) => spec,
                Err(e) => {
                    log::warn!("Enhancement failed, skipping generation: {}", e);
                    return Err(e);
                }
            }
        } else {
            task_text.to_string()
        };

        let code = self.generate_code(&spec).await?;
        log::info!("Generated {} chars of code", code.chars().count());
        Ok(code)
    }
}
