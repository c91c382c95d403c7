//! Boundary validation for records entering the analysis core
//!
//! Nothing downstream coerces bad values: an out-of-range relevance or a
//! missing field is rejected here and never averaged over.

use thiserror::Error;

use crate::{EntityKind, MAX_RELEVANCE, MIN_RELEVANCE};

/// Malformed input rejected at the data boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataValidationError {
    #[error("{article}: relevance {relevance} outside [1, 10]")]
    RelevanceOutOfRange { article: String, relevance: i64 },

    #[error("{article}: missing required field `{field}`")]
    MissingField { article: String, field: &'static str },

    #[error("{kind} name is empty")]
    EmptyName { kind: EntityKind },

    #[error("duplicate {kind} name: {name}")]
    DuplicateName { kind: EntityKind, name: String },

    #[error("duplicate {kind} id: {id}")]
    DuplicateEntityId { kind: EntityKind, id: i64 },

    #[error("duplicate article id: {0}")]
    DuplicateArticleId(i64),

    #[error("{kind} association references unknown article {article_id}")]
    UnknownArticle { kind: EntityKind, article_id: i64 },

    #[error("association references unknown {kind} {entity_id}")]
    UnknownEntity { kind: EntityKind, entity_id: i64 },

    #[error("duplicate association between article {article_id} and {kind} {entity_id}")]
    DuplicateAssociation {
        kind: EntityKind,
        article_id: i64,
        entity_id: i64,
    },
}

/// Check a relevance score against the 1-10 scale
pub fn validate_relevance(article: &str, relevance: i64) -> Result<i64, DataValidationError> {
    if (MIN_RELEVANCE..=MAX_RELEVANCE).contains(&relevance) {
        Ok(relevance)
    } else {
        Err(DataValidationError::RelevanceOutOfRange {
            article: article.to_string(),
            relevance,
        })
    }
}

/// Require a non-blank summary
pub fn validate_summary(article: &str, summary: &str) -> Result<(), DataValidationError> {
    if summary.trim().is_empty() {
        return Err(DataValidationError::MissingField {
            article: article.to_string(),
            field: "summary",
        });
    }
    Ok(())
}

/// Trim an entity name, rejecting blanks
pub fn normalize_name(kind: EntityKind, name: &str) -> Result<String, DataValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DataValidationError::EmptyName { kind });
    }
    Ok(trimmed.to_string())
}
