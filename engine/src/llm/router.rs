//! Model Router
//!
//! Selects which model configuration should answer a prompt. An explicit,
//! known choice always wins. Otherwise the prompt is matched against four
//! keyword families in a fixed priority order (web, code, creative, brief)
//! and the first family that matches decides. Prompts that match nothing go
//! to the web configuration: an unclassified question is treated as one that
//! may need current information.

use sdk::{GenerationContext, ModelBackend, ModelConfig};
use std::sync::OnceLock;

/// Sentinel id meaning "let the router decide"
pub const AUTO_MODEL_ID: &str = "auto";

/// Model used for web-intent prompts and as the fallback
pub const WEB_MODEL_ID: &str = "web";

/// Model used for code-intent prompts
pub const CODE_MODEL_ID: &str = "code";

/// Model used for creative-intent prompts
pub const CREATIVE_MODEL_ID: &str = "creative";

/// Model used for brief prompts
pub const FAST_MODEL_ID: &str = "fast";

/// Default short-prompt threshold in characters
pub const DEFAULT_SHORT_PROMPT_THRESHOLD: usize = 50;

/// Reply used when the backend fails during `process`
const BACKEND_FALLBACK: &str =
    "I'm having trouble reaching my language model right now. Please try again in a moment.";

const WEB_KEYWORDS: &[&str] = &[
    "search",
    "find",
    "look up",
    "what is",
    "who is",
    "when did",
    "where is",
    "latest",
    "current",
    "recent",
    "news",
    "price",
    "weather",
    "stock",
    "today",
    "now",
    "real-time",
    "live",
    "update",
];

const CODE_KEYWORDS: &[&str] = &[
    "code",
    "function",
    "class",
    "component",
    "algorithm",
    "implement",
    "debug",
    "fix",
    "optimize",
    "refactor",
    "typescript",
    "javascript",
    "react",
    "python",
    "rust",
    "api",
    "database",
    "sql",
    "html",
    "css",
    "programming",
    "development",
    "software",
];

const CREATIVE_KEYWORDS: &[&str] = &[
    "write",
    "poem",
    "story",
    "creative",
    "lyrics",
    "song",
    "art",
    "imagine",
    "create",
    "design",
    "brainstorm",
    "idea",
    "inspiration",
    "poetry",
    "narrative",
    "fiction",
    "character",
];

const BRIEF_KEYWORDS: &[&str] = &[
    "quick",
    "fast",
    "brief",
    "short",
    "summary",
    "tldr",
    "simple",
    "yes",
    "no",
    "true",
    "false",
    "define",
    "explain briefly",
];

/// Which keyword family decided a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteCategory {
    Web,
    Code,
    Creative,
    Brief,
    /// Nothing matched; routed to the web model anyway
    Fallback,
}

impl RouteCategory {
    /// Model id this category routes to
    pub fn model_id(&self) -> &'static str {
        match self {
            RouteCategory::Web | RouteCategory::Fallback => WEB_MODEL_ID,
            RouteCategory::Code => CODE_MODEL_ID,
            RouteCategory::Creative => CREATIVE_MODEL_ID,
            RouteCategory::Brief => FAST_MODEL_ID,
        }
    }
}

/// Result of routing a prompt and asking the backend for a reply
#[derive(Debug, Clone)]
pub struct RoutedResponse {
    pub response: String,
    pub model_used: ModelConfig,
    pub reasoning: String,
}

/// Routes prompts to one of the built-in model configurations
#[derive(Debug, Clone)]
pub struct ModelRouter {
    short_prompt_threshold: usize,
}

impl ModelRouter {
    /// Create a router with the given short-prompt threshold
    pub fn new(short_prompt_threshold: usize) -> Self {
        Self {
            short_prompt_threshold,
        }
    }

    /// The static model table, in display order
    pub fn builtin_models() -> &'static [ModelConfig] {
        static MODELS: OnceLock<Vec<ModelConfig>> = OnceLock::new();
        MODELS.get_or_init(|| {
            vec![
                model(
                    AUTO_MODEL_ID,
                    "Parley (Adaptive)",
                    "parley-core",
                    "auto-route",
                    &["Adaptive routing", "Task optimization", "Best performance"],
                    "Automatically selects the best model for each task",
                ),
                model(
                    WEB_MODEL_ID,
                    "Parley (Web Focus)",
                    "openrouter",
                    "google/gemini-pro",
                    &["Web search", "Real-time data", "Current events"],
                    "Optimized for web browsing and real-time information",
                ),
                model(
                    CODE_MODEL_ID,
                    "Parley (Code Expert)",
                    "openrouter",
                    "openai/gpt-4-turbo",
                    &["Code generation", "Debugging", "Technical analysis"],
                    "Specialized in programming and technical tasks",
                ),
                model(
                    CREATIVE_MODEL_ID,
                    "Parley (Creative)",
                    "openrouter",
                    "mistralai/mixtral-8x7b-instruct",
                    &["Creative writing", "Poetry", "Storytelling"],
                    "Enhanced for creative and artistic tasks",
                ),
                model(
                    FAST_MODEL_ID,
                    "Parley (Lightning)",
                    "openrouter",
                    "anthropic/claude-3-haiku",
                    &["Fast responses", "Quick analysis", "Efficient processing"],
                    "Optimized for speed and efficiency",
                ),
            ]
        })
    }

    /// Look up a model in the static table
    pub fn builtin_model(id: &str) -> Option<&'static ModelConfig> {
        Self::builtin_models().iter().find(|m| m.id == id)
    }

    /// All available model configurations
    pub fn available_models(&self) -> &'static [ModelConfig] {
        Self::builtin_models()
    }

    /// Details for one model id, if known
    pub fn model_info(&self, id: &str) -> Option<&'static ModelConfig> {
        Self::builtin_model(id)
    }

    /// Pick a model configuration for `prompt`
    ///
    /// An explicit choice other than "auto" that names a known model is
    /// returned unchanged. Unknown ids are ignored and the prompt is
    /// classified instead.
    pub fn route(&self, prompt: &str, explicit_choice: Option<&str>) -> &'static ModelConfig {
        if let Some(choice) = explicit_choice.filter(|c| *c != AUTO_MODEL_ID) {
            if let Some(config) = Self::builtin_model(choice) {
                return config;
            }
            tracing::debug!("Unknown model '{}', falling back to classification", choice);
        }

        let category = self.classify(prompt);
        tracing::debug!("Routed prompt as {:?}", category);

        Self::builtin_model(category.model_id())
            .unwrap_or_else(|| &Self::builtin_models()[1])
    }

    /// Classify a prompt into the first matching keyword family
    pub fn classify(&self, prompt: &str) -> RouteCategory {
        let prompt = prompt.to_lowercase();

        if contains_any(&prompt, WEB_KEYWORDS) {
            RouteCategory::Web
        } else if contains_any(&prompt, CODE_KEYWORDS) {
            RouteCategory::Code
        } else if contains_any(&prompt, CREATIVE_KEYWORDS) {
            RouteCategory::Creative
        } else if contains_any(&prompt, BRIEF_KEYWORDS)
            || prompt.chars().count() < self.short_prompt_threshold
        {
            RouteCategory::Brief
        } else {
            RouteCategory::Fallback
        }
    }

    /// Route a prompt and ask `backend` for a reply
    ///
    /// Backend failures never escape: they are logged and replaced with a
    /// fixed fallback reply.
    pub async fn process(
        &self,
        prompt: &str,
        explicit_choice: Option<&str>,
        backend: &dyn ModelBackend,
        context: &GenerationContext,
    ) -> RoutedResponse {
        let model_used = self.route(prompt, explicit_choice).clone();
        let reasoning = format!(
            "Selected {} because: {}",
            model_used.display_name,
            model_used.strength_tags.join(", ")
        );

        let response = match backend.generate(prompt, &model_used, context).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Backend {} failed: {}", backend.name(), e);
                BACKEND_FALLBACK.to_string()
            }
        };

        RoutedResponse {
            response,
            model_used,
            reasoning,
        }
    }
}

impl Default for ModelRouter {
    fn default() -> Self {
        Self::new(DEFAULT_SHORT_PROMPT_THRESHOLD)
    }
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

fn model(
    id: &str,
    display_name: &str,
    provider_id: &str,
    internal_model: &str,
    strengths: &[&str],
    description: &str,
) -> ModelConfig {
    ModelConfig {
        id: id.to_string(),
        display_name: display_name.to_string(),
        provider_id: provider_id.to_string(),
        internal_model: internal_model.to_string(),
        strength_tags: strengths.iter().map(|s| s.to_string()).collect(),
        description: description.to_string(),
    }
}
