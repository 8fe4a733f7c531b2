//! Model Backend Collaborator
//!
//! Real text generation lives behind the sdk `ModelBackend` trait. The engine
//! only ships `StubBackend`, which fabricates a reply in the style of the
//! routed model so the rest of the pipeline can be exercised end to end. The
//! `router` submodule decides which model configuration a prompt goes to.

use async_trait::async_trait;
use sdk::{EngineError, GenerationContext, ModelBackend, ModelConfig};

use crate::identity::IdentityProfile;

pub mod router;

/// Offline backend that simulates a response per model style
#[derive(Debug, Clone)]
pub struct StubBackend {
    assistant_name: String,
    creator: String,
}

impl StubBackend {
    pub fn new(profile: &IdentityProfile) -> Self {
        Self {
            assistant_name: profile.name.clone(),
            creator: profile.creator.clone(),
        }
    }

    /// Build the context a backend call is made with
    pub fn context_for(profile: &IdentityProfile, history: Vec<String>) -> GenerationContext {
        GenerationContext {
            system_prompt: profile.system_prompt(),
            history,
        }
    }

    fn style_marker(model: &ModelConfig) -> &'static str {
        match model.internal_model.as_str() {
            "google/gemini-pro" => "[web]",
            "openai/gpt-4-turbo" => "[code]",
            "mistralai/mixtral-8x7b-instruct" => "[creative]",
            "anthropic/claude-3-haiku" => "[fast]",
            _ => "[adaptive]",
        }
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new(&IdentityProfile::default())
    }
}

#[async_trait]
impl ModelBackend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate(
        &self,
        prompt: &str,
        model: &ModelConfig,
        context: &GenerationContext,
    ) -> Result<String, EngineError> {
        tracing::debug!(
            "Stub generation with {} ({} history entries)",
            model.internal_model,
            context.history.len()
        );

        Ok(format!(
            "{} I'm {}, and I'll help you with \"{}\". {}\n\n\
             This response is powered by my {} configuration, which excels at {}.\n\n\
             As an assistant created by {}, I aim to give complete answers while staying \
             true to my values.",
            Self::style_marker(model),
            self.assistant_name,
            prompt,
            model.description,
            model.display_name,
            model.strength_tags.join(", ").to_lowercase(),
            self.creator
        ))
    }
}
