//! Relational records supplied by the persistence layer

use serde::{Deserialize, Serialize};
use std::fmt;

/// A news article scored for deal-flow relevance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub summary: String,
    /// Relevance on a 1-10 scale
    pub relevance: i64,
    pub url: Option<String>,
}

/// A company mentioned by at least one article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
}

/// A business sector mentioned by at least one article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    pub id: i64,
    pub name: String,
}

/// Article <-> Company association row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArticleCompany {
    pub article_id: i64,
    pub company_id: i64,
}

/// Article <-> Sector association row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArticleSector {
    pub article_id: i64,
    pub sector_id: i64,
}

/// The two entity types an article can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Company,
    Sector,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Company => "company",
            EntityKind::Sector => "sector",
        }
    }

    /// The kind on the other side of the bipartite graph
    pub fn opposite(&self) -> EntityKind {
        match self {
            EntityKind::Company => EntityKind::Sector,
            EntityKind::Sector => EntityKind::Company,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
