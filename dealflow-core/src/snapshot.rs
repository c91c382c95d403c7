//! Read-only dataset snapshot
//!
//! A [`Snapshot`] is built once per analysis from the raw tables and is
//! validated on construction, so every consumer can rely on:
//! - relevance in [1, 10] and a non-blank summary for every article
//! - unique ids and unique names per entity type
//! - associations that point at existing rows, each pair at most once

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::{
    normalize_name, validate_relevance, validate_summary, Article, ArticleCompany, ArticleSector,
    Company, DataValidationError, EntityKind, Sector,
};

/// The raw tables as handed over by the persistence layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTables {
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub sectors: Vec<Sector>,
    #[serde(default)]
    pub article_companies: Vec<ArticleCompany>,
    #[serde(default)]
    pub article_sectors: Vec<ArticleSector>,
}

/// One (entity, article) row of the association join
#[derive(Debug, Clone, Copy)]
pub struct EntityMention<'a> {
    pub name: &'a str,
    pub article: &'a Article,
}

/// One (company, sector, relevance) triple of the full article join
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoOccurrence<'a> {
    pub company: &'a str,
    pub sector: &'a str,
    pub relevance: i64,
}

#[derive(Debug, Clone, Default)]
struct ArticleLinks {
    companies: Vec<usize>,
}

/// Validated, immutable view of the dataset
#[derive(Debug, Clone)]
pub struct Snapshot {
    tables: SnapshotTables,
    /// article id -> position in `tables.articles`
    article_index: HashMap<i64, usize>,
    company_index: HashMap<i64, usize>,
    sector_index: HashMap<i64, usize>,
    /// article id -> linked company positions, in association order
    links: HashMap<i64, ArticleLinks>,
}

impl Snapshot {
    /// Validate raw tables and build the lookup indices
    pub fn from_tables(mut tables: SnapshotTables) -> Result<Self, DataValidationError> {
        tables.articles.sort_by_key(|a| a.id);

        let mut article_index = HashMap::with_capacity(tables.articles.len());
        for (pos, article) in tables.articles.iter().enumerate() {
            let label = format!("article {}", article.id);
            validate_relevance(&label, article.relevance)?;
            validate_summary(&label, &article.summary)?;
            if article_index.insert(article.id, pos).is_some() {
                return Err(DataValidationError::DuplicateArticleId(article.id));
            }
        }

        let company_index = index_entities(
            EntityKind::Company,
            tables.companies.iter().map(|c| (c.id, c.name.as_str())),
        )?;
        let sector_index = index_entities(
            EntityKind::Sector,
            tables.sectors.iter().map(|s| (s.id, s.name.as_str())),
        )?;

        let mut links: HashMap<i64, ArticleLinks> = HashMap::new();

        let mut seen = HashSet::new();
        for row in &tables.article_companies {
            let pos = resolve(
                EntityKind::Company,
                row.article_id,
                row.company_id,
                &article_index,
                &company_index,
            )?;
            if !seen.insert((row.article_id, row.company_id)) {
                return Err(DataValidationError::DuplicateAssociation {
                    kind: EntityKind::Company,
                    article_id: row.article_id,
                    entity_id: row.company_id,
                });
            }
            links.entry(row.article_id).or_default().companies.push(pos);
        }

        let mut seen = HashSet::new();
        for row in &tables.article_sectors {
            resolve(
                EntityKind::Sector,
                row.article_id,
                row.sector_id,
                &article_index,
                &sector_index,
            )?;
            if !seen.insert((row.article_id, row.sector_id)) {
                return Err(DataValidationError::DuplicateAssociation {
                    kind: EntityKind::Sector,
                    article_id: row.article_id,
                    entity_id: row.sector_id,
                });
            }
        }

        Ok(Self {
            tables,
            article_index,
            company_index,
            sector_index,
            links,
        })
    }

    /// A snapshot with no rows at all
    pub fn empty() -> Self {
        Self {
            tables: SnapshotTables::default(),
            article_index: HashMap::new(),
            company_index: HashMap::new(),
            sector_index: HashMap::new(),
            links: HashMap::new(),
        }
    }

    /// Articles in ascending id order
    pub fn articles(&self) -> &[Article] {
        &self.tables.articles
    }

    pub fn companies(&self) -> &[Company] {
        &self.tables.companies
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.tables.sectors
    }

    pub fn tables(&self) -> &SnapshotTables {
        &self.tables
    }

    pub fn is_empty(&self) -> bool {
        self.tables.articles.is_empty()
    }

    pub fn article(&self, id: i64) -> Option<&Article> {
        self.article_index.get(&id).map(|&pos| &self.tables.articles[pos])
    }

    pub fn company(&self, id: i64) -> Option<&Company> {
        self.company_index.get(&id).map(|&pos| &self.tables.companies[pos])
    }

    pub fn sector(&self, id: i64) -> Option<&Sector> {
        self.sector_index.get(&id).map(|&pos| &self.tables.sectors[pos])
    }

    /// Join the association table of `kind` with articles and entity names.
    ///
    /// Rows come out in association-table order.
    pub fn mentions(&self, kind: EntityKind) -> Vec<EntityMention<'_>> {
        let article = |id: i64| &self.tables.articles[self.article_index[&id]];
        match kind {
            EntityKind::Company => self
                .tables
                .article_companies
                .iter()
                .map(|row| EntityMention {
                    name: &self.tables.companies[self.company_index[&row.company_id]].name,
                    article: article(row.article_id),
                })
                .collect(),
            EntityKind::Sector => self
                .tables
                .article_sectors
                .iter()
                .map(|row| EntityMention {
                    name: &self.tables.sectors[self.sector_index[&row.sector_id]].name,
                    article: article(row.article_id),
                })
                .collect(),
        }
    }

    /// Cross product of linked sectors and companies for every article.
    ///
    /// Order follows the sector association table row by row; each row
    /// expands to its article's companies in company association order.
    /// Consumers that overwrite on repeated pairs depend on this order.
    pub fn co_occurrences(&self) -> Vec<CoOccurrence<'_>> {
        let mut triples = Vec::new();
        for row in &self.tables.article_sectors {
            let Some(links) = self.links.get(&row.article_id) else {
                continue;
            };
            let article = &self.tables.articles[self.article_index[&row.article_id]];
            let sector = &self.tables.sectors[self.sector_index[&row.sector_id]].name;
            for &c in &links.companies {
                triples.push(CoOccurrence {
                    company: &self.tables.companies[c].name,
                    sector,
                    relevance: article.relevance,
                });
            }
        }
        triples
    }
}

impl TryFrom<SnapshotTables> for Snapshot {
    type Error = DataValidationError;

    fn try_from(tables: SnapshotTables) -> Result<Self, Self::Error> {
        Snapshot::from_tables(tables)
    }
}

fn index_entities<'a>(
    kind: EntityKind,
    rows: impl Iterator<Item = (i64, &'a str)>,
) -> Result<HashMap<i64, usize>, DataValidationError> {
    let mut index = HashMap::new();
    let mut names = HashSet::new();
    for (pos, (id, name)) in rows.enumerate() {
        let name = normalize_name(kind, name)?;
        if index.insert(id, pos).is_some() {
            return Err(DataValidationError::DuplicateEntityId { kind, id });
        }
        if !names.insert(name.clone()) {
            return Err(DataValidationError::DuplicateName { kind, name });
        }
    }
    Ok(index)
}

fn resolve(
    kind: EntityKind,
    article_id: i64,
    entity_id: i64,
    articles: &HashMap<i64, usize>,
    entities: &HashMap<i64, usize>,
) -> Result<usize, DataValidationError> {
    if !articles.contains_key(&article_id) {
        return Err(DataValidationError::UnknownArticle { kind, article_id });
    }
    entities
        .get(&entity_id)
        .copied()
        .ok_or(DataValidationError::UnknownEntity { kind, entity_id })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: i64, relevance: i64) -> Article {
        Article {
            id,
            summary: format!("summary {}", id),
            relevance,
            url: Some(format!("https://news.example/{}", id)),
        }
    }

    fn tables() -> SnapshotTables {
        SnapshotTables {
            articles: vec![article(2, 4), article(1, 9)],
            companies: vec![
                Company { id: 1, name: "Acme".to_string() },
                Company { id: 2, name: "Globex".to_string() },
            ],
            sectors: vec![Sector { id: 1, name: "Retail".to_string() }],
            article_companies: vec![
                ArticleCompany { article_id: 1, company_id: 1 },
                ArticleCompany { article_id: 1, company_id: 2 },
                ArticleCompany { article_id: 2, company_id: 1 },
            ],
            article_sectors: vec![
                ArticleSector { article_id: 2, sector_id: 1 },
                ArticleSector { article_id: 1, sector_id: 1 },
            ],
        }
    }

    #[test]
    fn test_articles_sorted_by_id() {
        let snapshot = Snapshot::from_tables(tables()).unwrap();
        let ids: Vec<i64> = snapshot.articles().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(snapshot.article(2).unwrap().relevance, 4);
    }

    #[test]
    fn test_mentions_join() {
        let snapshot = Snapshot::from_tables(tables()).unwrap();
        let mentions = snapshot.mentions(EntityKind::Company);
        assert_eq!(mentions.len(), 3);
        assert_eq!(mentions[0].name, "Acme");
        assert_eq!(mentions[0].article.relevance, 9);
        assert_eq!(mentions[2].article.id, 2);

        let sectors = snapshot.mentions(EntityKind::Sector);
        assert!(sectors.iter().all(|m| m.name == "Retail"));
    }

    #[test]
    fn test_co_occurrence_order() {
        let snapshot = Snapshot::from_tables(tables()).unwrap();
        let triples = snapshot.co_occurrences();
        // Sector rows list article 2 before article 1
        assert_eq!(
            triples,
            vec![
                CoOccurrence { company: "Acme", sector: "Retail", relevance: 4 },
                CoOccurrence { company: "Acme", sector: "Retail", relevance: 9 },
                CoOccurrence { company: "Globex", sector: "Retail", relevance: 9 },
            ]
        );
    }

    #[test]
    fn test_co_occurrence_ignores_article_id_order() {
        let mut t = tables();
        t.article_sectors.reverse();
        let snapshot = Snapshot::from_tables(t).unwrap();
        let relevance: Vec<i64> = snapshot.co_occurrences().iter().map(|c| c.relevance).collect();
        assert_eq!(relevance, vec![9, 9, 4]);
    }

    #[test]
    fn test_rejects_out_of_range_relevance() {
        let mut t = tables();
        t.articles[0].relevance = 11;
        assert!(matches!(
            Snapshot::from_tables(t),
            Err(DataValidationError::RelevanceOutOfRange { relevance: 11, .. })
        ));
    }

    #[test]
    fn test_rejects_dangling_association() {
        let mut t = tables();
        t.article_sectors.push(ArticleSector { article_id: 1, sector_id: 9 });
        assert_eq!(
            Snapshot::from_tables(t).unwrap_err(),
            DataValidationError::UnknownEntity { kind: EntityKind::Sector, entity_id: 9 }
        );

        let mut t = tables();
        t.article_companies.push(ArticleCompany { article_id: 5, company_id: 1 });
        assert!(matches!(
            Snapshot::from_tables(t),
            Err(DataValidationError::UnknownArticle { article_id: 5, .. })
        ));
    }

    #[test]
    fn test_rejects_duplicates() {
        let mut t = tables();
        t.companies.push(Company { id: 3, name: "Acme".to_string() });
        assert!(matches!(
            Snapshot::from_tables(t),
            Err(DataValidationError::DuplicateName { kind: EntityKind::Company, .. })
        ));

        let mut t = tables();
        t.article_companies.push(ArticleCompany { article_id: 1, company_id: 1 });
        assert!(matches!(
            Snapshot::from_tables(t),
            Err(DataValidationError::DuplicateAssociation { .. })
        ));
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::from_tables(SnapshotTables::default()).unwrap();
        assert!(snapshot.is_empty());
        assert!(snapshot.co_occurrences().is_empty());
        assert!(Snapshot::empty().mentions(EntityKind::Sector).is_empty());
    }
}
