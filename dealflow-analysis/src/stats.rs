//! Per-entity relevance statistics

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use dealflow_core::{EntityKind, Snapshot};

/// Aggregated relevance figures for one company or sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityStats {
    pub name: String,
    /// Mean relevance over the entity's articles
    pub avg_relevance: f64,
    /// Number of distinct associated articles, always >= 1
    pub article_count: usize,
    /// `avg_relevance * ln(article_count + 1)`
    pub weighted_score: f64,
}

impl EntityStats {
    pub fn new(name: impl Into<String>, avg_relevance: f64, article_count: usize) -> Self {
        Self {
            name: name.into(),
            avg_relevance,
            article_count,
            weighted_score: weighted_score(avg_relevance, article_count),
        }
    }
}

/// Relevance damped by log article frequency
pub fn weighted_score(avg_relevance: f64, article_count: usize) -> f64 {
    avg_relevance * (article_count as f64 + 1.0).ln()
}

/// Group the snapshot's `kind` associations by entity name.
///
/// Sorted by weighted score descending; ties keep name order.
pub fn aggregate(snapshot: &Snapshot, kind: EntityKind) -> Vec<EntityStats> {
    let mut groups: BTreeMap<&str, (i64, usize)> = BTreeMap::new();
    for mention in snapshot.mentions(kind) {
        let entry = groups.entry(mention.name).or_insert((0, 0));
        entry.0 += mention.article.relevance;
        entry.1 += 1;
    }

    let mut stats: Vec<EntityStats> = groups
        .into_iter()
        .map(|(name, (sum, count))| EntityStats::new(name, sum as f64 / count as f64, count))
        .collect();

    stats.sort_by(|a, b| b.weighted_score.total_cmp(&a.weighted_score));

    debug!("Aggregated {} {} entities", stats.len(), kind);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealflow_core::{Article, ArticleCompany, ArticleSector, Company, Sector, SnapshotTables};

    fn snapshot() -> Snapshot {
        let articles = (1..=6)
            .map(|id| Article {
                id,
                summary: format!("story {}", id),
                relevance: if id == 6 { 2 } else { 9 },
                url: None,
            })
            .collect();

        // A appears in five relevance-9 articles, B in one relevance-2 article
        let mut article_companies: Vec<ArticleCompany> = (1..=5)
            .map(|article_id| ArticleCompany { article_id, company_id: 1 })
            .collect();
        article_companies.push(ArticleCompany { article_id: 6, company_id: 2 });

        Snapshot::from_tables(SnapshotTables {
            articles,
            companies: vec![
                Company { id: 1, name: "A".to_string() },
                Company { id: 2, name: "B".to_string() },
            ],
            sectors: vec![Sector { id: 1, name: "Industrials".to_string() }],
            article_companies,
            article_sectors: vec![
                ArticleSector { article_id: 1, sector_id: 1 },
                ArticleSector { article_id: 6, sector_id: 1 },
            ],
        })
        .unwrap()
    }

    #[test]
    fn test_weighted_score_ranking() {
        let stats = aggregate(&snapshot(), EntityKind::Company);
        assert_eq!(stats.len(), 2);

        assert_eq!(stats[0].name, "A");
        assert_eq!(stats[0].avg_relevance, 9.0);
        assert_eq!(stats[0].article_count, 5);
        assert!((stats[0].weighted_score - 9.0 * 6f64.ln()).abs() < 1e-12);
        assert!((stats[0].weighted_score - 16.13).abs() < 0.01);

        assert_eq!(stats[1].name, "B");
        assert!((stats[1].weighted_score - 2.0 * 2f64.ln()).abs() < 1e-12);
        assert!((stats[1].weighted_score - 1.39).abs() < 0.01);
    }

    #[test]
    fn test_sector_average() {
        let stats = aggregate(&snapshot(), EntityKind::Sector);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].article_count, 2);
        assert_eq!(stats[0].avg_relevance, 5.5);
    }

    #[test]
    fn test_weighted_score_monotonic() {
        for count in 1..20 {
            let mut previous = weighted_score(1.0, count);
            for tenth in 11..=100 {
                let score = weighted_score(tenth as f64 / 10.0, count);
                assert!(score > previous);
                previous = score;
            }
        }
        for relevance in 1..=10 {
            let relevance = relevance as f64;
            let mut previous = weighted_score(relevance, 1);
            for count in 2..50 {
                let score = weighted_score(relevance, count);
                assert!(score > previous);
                previous = score;
            }
        }
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(aggregate(&Snapshot::empty(), EntityKind::Company).is_empty());
    }
}
