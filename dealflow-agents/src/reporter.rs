//! Report Agent
//!
//! Writes the deal-flow report from the ranked analysis payload.

use tracing::info;

use dealflow_analysis::ReportPayload;

use crate::{AgentError, PersonaRegistry, SharedBackend};

/// Render the payload as the report model's input
pub fn build_report_input(payload: &ReportPayload) -> Result<String, serde_json::Error> {
    Ok(format!(
        "Relevant_Articles : {}\n\nRelevant_Sectors : {}\n\nRelevant_Companies : {}",
        payload.articles_json()?,
        payload.sectors_json()?,
        payload.companies_json()?
    ))
}

/// Report agent - turns ranked records into Markdown prose
pub struct ReportAgent {
    backend: SharedBackend,
    system_prompt: String,
}

impl ReportAgent {
    pub fn new(backend: SharedBackend, personas: &PersonaRegistry) -> Result<Self, AgentError> {
        let persona = personas
            .get("reporter")
            .ok_or_else(|| AgentError::MissingPersona("reporter".to_string()))?;
        Ok(Self {
            backend,
            system_prompt: persona.system_prompt(),
        })
    }

    /// Generate the Markdown report
    pub async fn generate(&self, payload: &ReportPayload) -> Result<String, AgentError> {
        if payload.is_empty() {
            return Err(AgentError::NoWork);
        }

        let input = build_report_input(payload)?;
        let report = self
            .backend
            .generate(&self.system_prompt, &input)
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))?;

        info!(
            "Report generated by {} ({} chars)",
            self.backend.model_name(),
            report.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LlmBackend, LlmError};
    use async_trait::async_trait;
    use dealflow_analysis::{ArticleRecord, EntityRecord};
    use std::sync::{Arc, Mutex};

    struct EchoBackend {
        last_input: Mutex<Option<String>>,
    }

    #[async_trait]
    impl LlmBackend for EchoBackend {
        async fn generate(&self, _system: &str, user: &str) -> Result<String, LlmError> {
            *self.last_input.lock().unwrap() = Some(user.to_string());
            Ok("# UK Deal Flow\n\n* Retail consolidation".to_string())
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    fn payload() -> ReportPayload {
        ReportPayload {
            articles: vec![ArticleRecord {
                summary: "Grocer explores sale".to_string(),
                relevance: 9,
                url: Some("https://news.example/grocer".to_string()),
            }],
            sectors: vec![EntityRecord {
                name: "Retail".to_string(),
                avg_relevance: 8.0,
                article_count: 3,
                weighted_score: 8.0 * 4f64.ln(),
                eigen_centrality_norm: 1.0,
            }],
            companies: Vec::new(),
        }
    }

    #[test]
    fn test_report_input_sections() {
        let input = build_report_input(&payload()).unwrap();
        assert!(input.starts_with("Relevant_Articles : [{\"summary\":\"Grocer explores sale\""));
        assert!(input.contains("Relevant_Sectors : [{\"name\":\"Retail\""));
        assert!(input.ends_with("Relevant_Companies : []"));
    }

    #[tokio::test]
    async fn test_generate_report() {
        let backend = Arc::new(EchoBackend {
            last_input: Mutex::new(None),
        });
        let agent = ReportAgent::new(backend.clone(), &PersonaRegistry::load_embedded()).unwrap();

        let report = agent.generate(&payload()).await.unwrap();
        assert!(report.starts_with("# UK Deal Flow"));
        let input = backend.last_input.lock().unwrap().clone().unwrap();
        assert!(input.contains("eigen_centrality_norm"));
    }

    #[tokio::test]
    async fn test_empty_payload_is_no_work() {
        let backend = Arc::new(EchoBackend {
            last_input: Mutex::new(None),
        });
        let agent = ReportAgent::new(backend, &PersonaRegistry::load_embedded()).unwrap();
        assert!(matches!(
            agent.generate(&ReportPayload::default()).await,
            Err(AgentError::NoWork)
        ));
    }
}
