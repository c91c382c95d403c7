//! Parsing of language-model extraction output
//!
//! The model is asked for a JSON array of articles. Replies arrive with
//! code fences, entity names as bare strings or `{"name": ...}` objects,
//! and sometimes keys the store has no column for, which are ignored.
//! Parsing is done in two phases:
//! 1. Deserialize into loosely typed [`RawArticle`] records
//! 2. Validate each into an [`ExtractedArticle`]; any failure rejects the
//!    whole reply

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;

use crate::{normalize_name, validate_relevance, validate_summary, DataValidationError, EntityKind};

/// Errors from parsing a model reply
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("reply is not a JSON article list: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] DataValidationError),
}

static FENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```(?:json)?").unwrap());

/// An entity as the model writes it
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawEntity {
    Name(String),
    Object { name: String },
}

impl RawEntity {
    fn name(&self) -> &str {
        match self {
            RawEntity::Name(name) => name,
            RawEntity::Object { name } => name,
        }
    }
}

/// First-phase article record, before validation
#[derive(Debug, Clone, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub companies: Vec<RawEntity>,
    #[serde(default)]
    pub sectors: Vec<RawEntity>,
    pub summary: Option<String>,
    pub relevance: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A validated article ready for insertion into the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedArticle {
    pub companies: Vec<String>,
    pub sectors: Vec<String>,
    pub summary: String,
    pub relevance: i64,
    pub url: Option<String>,
}

impl RawArticle {
    /// Second phase: check required fields and ranges
    pub fn validate(self, label: &str) -> Result<ExtractedArticle, DataValidationError> {
        let summary = self.summary.ok_or_else(|| DataValidationError::MissingField {
            article: label.to_string(),
            field: "summary",
        })?;
        validate_summary(label, &summary)?;

        let relevance = self.relevance.ok_or_else(|| DataValidationError::MissingField {
            article: label.to_string(),
            field: "relevance",
        })?;
        validate_relevance(label, relevance)?;

        Ok(ExtractedArticle {
            companies: collect_names(EntityKind::Company, &self.companies)?,
            sectors: collect_names(EntityKind::Sector, &self.sectors)?,
            summary: summary.trim().to_string(),
            relevance,
            url: self.url.filter(|u| !u.trim().is_empty()),
        })
    }
}

/// Remove Markdown code fences around a JSON reply
pub fn strip_code_fences(text: &str) -> String {
    FENCE_REGEX.replace_all(text, "").trim().to_string()
}

/// Parse and validate a model reply holding a JSON array of articles
pub fn parse_article_list(text: &str) -> Result<Vec<ExtractedArticle>, ExtractionError> {
    let cleaned = strip_code_fences(text);
    let raw: Vec<RawArticle> = serde_json::from_str(&cleaned)?;

    let articles = raw
        .into_iter()
        .enumerate()
        .map(|(idx, article)| article.validate(&format!("extracted article #{}", idx + 1)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(articles)
}

/// Trim names and collapse repeats within one article
fn collect_names(kind: EntityKind, raw: &[RawEntity]) -> Result<Vec<String>, DataValidationError> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(raw.len());
    for entity in raw {
        let name = normalize_name(kind, entity.name())?;
        if seen.insert(name.clone()) {
            names.push(name);
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = r#"```json
[
  {
    "companies": ["Tesco", {"name": "Sainsbury's"}, "Tesco"],
    "sectors": ["Retail"],
    "summary": "Grocers weigh a joint bid for a logistics firm.",
    "relevance": 7,
    "businesses": ["Tesco: UK grocer"],
    "url": "https://news.example/grocers"
  },
  {
    "companies": [],
    "sectors": ["Fintech"],
    "summary": "Seed round for a payments startup.",
    "relevance": 4
  }
]
```"#;

    #[test]
    fn test_parse_fenced_reply() {
        let articles = parse_article_list(REPLY).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].companies, vec!["Tesco", "Sainsbury's"]);
        // Descriptive extras the model adds are not stored
        let stored = serde_json::to_value(&articles[0]).unwrap();
        assert!(stored.get("businesses").is_none());
        assert_eq!(articles[1].url, None);
        assert!(articles[1].companies.is_empty());
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[]\n```"), "[]");
        assert_eq!(strip_code_fences("  []  "), "[]");
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = parse_article_list("Sorry, I could not find any articles.").unwrap_err();
        assert!(matches!(err, ExtractionError::Json(_)));
    }

    #[test]
    fn test_out_of_range_relevance_rejects_reply() {
        let reply = r#"[{"summary": "ok", "relevance": 5}, {"summary": "bad", "relevance": 14}]"#;
        let err = parse_article_list(reply).unwrap_err();
        match err {
            ExtractionError::Invalid(DataValidationError::RelevanceOutOfRange { article, relevance }) => {
                assert_eq!(article, "extracted article #2");
                assert_eq!(relevance, 14);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_summary_rejected() {
        let err = parse_article_list(r#"[{"relevance": 5, "sectors": ["Energy"]}]"#).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Invalid(DataValidationError::MissingField { field: "summary", .. })
        ));
    }

    #[test]
    fn test_blank_company_name_rejected() {
        let err = parse_article_list(r#"[{"summary": "x", "relevance": 5, "companies": [" "]}]"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Invalid(DataValidationError::EmptyName { kind: EntityKind::Company })
        ));
    }
}
