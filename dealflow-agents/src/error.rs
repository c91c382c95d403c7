//! Errors from agent operations

use dealflow_core::ExtractionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Persona not found: {0}")]
    MissingPersona(String),

    #[error("No work available")]
    NoWork,
}
