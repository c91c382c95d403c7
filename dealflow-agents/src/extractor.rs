//! Extraction Agent
//!
//! Turns raw news items into validated article records.
//! - Input: news items for one topic
//! - Output: [`ExtractedArticle`]s ready for the store

use tracing::{debug, info};

use dealflow_core::{parse_article_list, ExtractedArticle};
use dealflow_news::NewsItem;

use crate::{AgentError, PersonaRegistry, SharedBackend};

/// Extraction agent - structures news with a language model
pub struct ExtractionAgent {
    backend: SharedBackend,
    system_prompt: String,
}

impl ExtractionAgent {
    pub fn new(backend: SharedBackend, personas: &PersonaRegistry) -> Result<Self, AgentError> {
        let persona = personas
            .get("extractor")
            .ok_or_else(|| AgentError::MissingPersona("extractor".to_string()))?;
        Ok(Self {
            backend,
            system_prompt: persona.system_prompt(),
        })
    }

    /// Extract one article record per news item.
    ///
    /// A reply that fails to parse or validate rejects the whole batch.
    pub async fn extract(&self, items: &[NewsItem]) -> Result<Vec<ExtractedArticle>, AgentError> {
        if items.is_empty() {
            return Err(AgentError::NoWork);
        }

        let input = format!("The provided data is {}", serde_json::to_string(items)?);

        let reply = self
            .backend
            .generate(&self.system_prompt, &input)
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))?;
        debug!("Extraction reply: {} chars", reply.len());

        let articles = parse_article_list(&reply)?;
        info!(
            "Extracted {} articles from {} news items via {}",
            articles.len(),
            items.len(),
            self.backend.model_name()
        );
        Ok(articles)
    }
}
