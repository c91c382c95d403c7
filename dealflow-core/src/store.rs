//! In-memory article store
//!
//! Holds the Article / Company / Sector tables and their associations,
//! creates entities on first reference, and persists everything as a
//! single JSON document.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::{
    normalize_name, validate_relevance, validate_summary, Article, ArticleCompany, ArticleSector,
    Company, DataValidationError, EntityKind, ExtractedArticle, Sector, Snapshot, SnapshotTables,
};

/// Errors from loading or saving the store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store contents are inconsistent: {0}")]
    Invalid(#[from] DataValidationError),
}

/// Relational store of ingested articles
#[derive(Debug, Clone, Default)]
pub struct ArticleStore {
    tables: SnapshotTables,
}

impl ArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store file; a missing file yields an empty store
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No store at {}, starting empty", path.display());
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let tables: SnapshotTables = serde_json::from_str(&content)?;
        // Reject files that would not form a valid snapshot
        Snapshot::from_tables(tables.clone())?;

        info!(
            "Loaded store from {} ({} articles, {} companies, {} sectors)",
            path.display(),
            tables.articles.len(),
            tables.companies.len(),
            tables.sectors.len()
        );
        Ok(Self { tables })
    }

    /// Write the store as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(&self.tables)?)?;
        debug!("Saved store to {}", path.display());
        Ok(())
    }

    /// Id of the company with `name`, creating it if needed
    pub fn get_or_create_company(&mut self, name: &str) -> Result<i64, DataValidationError> {
        let name = normalize_name(EntityKind::Company, name)?;
        if let Some(existing) = self.tables.companies.iter().find(|c| c.name == name) {
            return Ok(existing.id);
        }
        let id = next_id(self.tables.companies.iter().map(|c| c.id));
        self.tables.companies.push(Company { id, name });
        Ok(id)
    }

    /// Id of the sector with `name`, creating it if needed
    pub fn get_or_create_sector(&mut self, name: &str) -> Result<i64, DataValidationError> {
        let name = normalize_name(EntityKind::Sector, name)?;
        if let Some(existing) = self.tables.sectors.iter().find(|s| s.name == name) {
            return Ok(existing.id);
        }
        let id = next_id(self.tables.sectors.iter().map(|s| s.id));
        self.tables.sectors.push(Sector { id, name });
        Ok(id)
    }

    /// Insert an extracted article and link its companies and sectors.
    ///
    /// Returns the new article id. Nothing is written if validation fails.
    pub fn insert_article(&mut self, article: &ExtractedArticle) -> Result<i64, DataValidationError> {
        let label = "new article";
        validate_relevance(label, article.relevance)?;
        validate_summary(label, &article.summary)?;
        for name in &article.companies {
            normalize_name(EntityKind::Company, name)?;
        }
        for name in &article.sectors {
            normalize_name(EntityKind::Sector, name)?;
        }

        let id = next_id(self.tables.articles.iter().map(|a| a.id));
        self.tables.articles.push(Article {
            id,
            summary: article.summary.clone(),
            relevance: article.relevance,
            url: article.url.clone(),
        });

        for name in &article.companies {
            let company_id = self.get_or_create_company(name)?;
            let row = ArticleCompany { article_id: id, company_id };
            if !self.tables.article_companies.contains(&row) {
                self.tables.article_companies.push(row);
            }
        }
        for name in &article.sectors {
            let sector_id = self.get_or_create_sector(name)?;
            let row = ArticleSector { article_id: id, sector_id };
            if !self.tables.article_sectors.contains(&row) {
                self.tables.article_sectors.push(row);
            }
        }

        Ok(id)
    }

    /// Validated read snapshot of the current tables
    pub fn snapshot(&self) -> Result<Snapshot, DataValidationError> {
        Snapshot::from_tables(self.tables.clone())
    }

    /// Whether an article with this link is already stored
    pub fn has_url(&self, url: &str) -> bool {
        self.tables
            .articles
            .iter()
            .any(|a| a.url.as_deref() == Some(url))
    }

    pub fn article_count(&self) -> usize {
        self.tables.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.articles.is_empty()
    }
}

fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}
