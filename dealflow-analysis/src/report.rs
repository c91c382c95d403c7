//! Report payload handed to the report generator

use serde::{Deserialize, Serialize};

use dealflow_core::Article;

/// A retained article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub summary: String,
    pub relevance: i64,
    pub url: Option<String>,
}

impl From<&Article> for ArticleRecord {
    fn from(article: &Article) -> Self {
        Self {
            summary: article.summary.clone(),
            relevance: article.relevance,
            url: article.url.clone(),
        }
    }
}

/// A retained company or sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub name: String,
    pub avg_relevance: f64,
    pub article_count: usize,
    pub weighted_score: f64,
    pub eigen_centrality_norm: f64,
}

/// The three filtered record sets, in ranking order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub articles: Vec<ArticleRecord>,
    pub sectors: Vec<EntityRecord>,
    pub companies: Vec<EntityRecord>,
}

impl ReportPayload {
    pub fn assemble(
        articles: &[&Article],
        sectors: Vec<EntityRecord>,
        companies: Vec<EntityRecord>,
    ) -> Self {
        Self {
            articles: articles.iter().map(|a| ArticleRecord::from(*a)).collect(),
            sectors,
            companies,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty() && self.sectors.is_empty() && self.companies.is_empty()
    }

    /// Articles as a JSON array of records
    pub fn articles_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.articles)
    }

    /// Sectors as a JSON array of records
    pub fn sectors_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.sectors)
    }

    /// Companies as a JSON array of records
    pub fn companies_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.companies)
    }
}
