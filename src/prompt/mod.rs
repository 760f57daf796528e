//! Context-aware prompt assembly.
//!
//! Generators hand the assembler a [`PromptTemplate`] pair and an optional
//! knowledge-base namespace. The assembler owns the whole fallback decision:
//! retrieval disabled, namespace omitted, retrieval empty, or retrieval
//! failed all degrade to the plain base prompt, so generation never fails
//! merely because the knowledge base produced nothing.

pub mod templates;

use crate::config::Config;
use crate::retrieval::{ContextProvider, NoopContextProvider};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Slot in augmented templates replaced with retrieved context.
pub const KNOWLEDGE_SLOT: &str = "{{knowledge_context}}";

/// A generation prompt in two variants: plain and knowledge-augmented.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Prompt used when no retrieval context is available.
    pub base: String,
    /// Prompt with a `{{knowledge_context}}` slot for retrieved context.
    pub augmented: String,
}

impl PromptTemplate {
    /// Build a template pair.
    pub fn new(base: impl Into<String>, augmented: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            augmented: augmented.into(),
        }
    }
}

/// Fill `{{name}}` slots in a prompt template.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (name, value) in vars {
        rendered = rendered.replace(&format!("{{{{{name}}}}}"), value);
    }
    rendered
}

/// Errors raised by LLM completion backends.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Provider was unable to produce a completion.
    #[error("completion failed: {0}")]
    Failed(String),
}

/// Interface to the external LLM completion collaborator.
///
/// Story, act, quest, and NPC generators assemble their prompt and hand it to
/// an implementation of this trait; the providers themselves live outside
/// this crate.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Produce a completion for the finished prompt.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Merges retrieved knowledge into generation prompts.
pub struct PromptAssembler {
    provider: Arc<dyn ContextProvider>,
}

impl PromptAssembler {
    /// Build an assembler, selecting the context source from configuration.
    ///
    /// With retrieval disabled the real provider is replaced by a no-op at
    /// construction time, so [`PromptAssembler::assemble`] never branches on
    /// an enabled flag.
    pub fn new(config: &Config, provider: Arc<dyn ContextProvider>) -> Self {
        let provider: Arc<dyn ContextProvider> = if config.rag_enabled {
            provider
        } else {
            tracing::debug!("Retrieval augmentation disabled; using no-op context provider");
            Arc::new(NoopContextProvider)
        };
        Self { provider }
    }

    /// Produce the prompt for a generation step.
    ///
    /// Returns the augmented template with retrieved context spliced into its
    /// knowledge slot when a namespace is supplied and retrieval yields
    /// something; in every other case the base template is returned
    /// unmodified.
    pub async fn assemble(
        &self,
        template: &PromptTemplate,
        namespace: Option<&str>,
        query: &str,
    ) -> String {
        let Some(namespace) = namespace else {
            return template.base.clone();
        };

        let context = match self.provider.retrieve(query, namespace).await {
            Ok(context) => context,
            Err(error) => {
                tracing::warn!(namespace, error = %error, "Context retrieval failed; falling back");
                String::new()
            }
        };

        if context.is_empty() {
            return template.base.clone();
        }

        template.augmented.replace(KNOWLEDGE_SLOT, &context)
    }
}
