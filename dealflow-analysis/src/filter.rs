//! Percentile-based ranking filter
//!
//! Entities are joined with their centrality and kept only when average
//! relevance, article count and raw centrality all reach the cutoff
//! quantile (inclusive). Articles are kept when their relevance is
//! strictly above the cutoff quantile. The two comparators differ on
//! purpose and are not unified.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use dealflow_core::{Article, EntityKind};

use crate::config::validate_cutoff;
use crate::{AnalysisConfig, CentralityRecord, ComputationError, EntityRecord, EntityStats};

/// Entity statistics joined with its centrality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntity {
    pub name: String,
    pub avg_relevance: f64,
    pub article_count: usize,
    pub weighted_score: f64,
    pub eigen_centrality: f64,
    pub eigen_centrality_norm: f64,
}

impl RankedEntity {
    /// Whether every metric reaches its threshold
    pub fn passes(&self, thresholds: &Thresholds) -> bool {
        self.avg_relevance >= thresholds.avg_relevance
            && self.article_count as f64 >= thresholds.article_count
            && self.eigen_centrality >= thresholds.eigen_centrality
    }

    /// Output record, without the raw centrality
    pub fn into_record(self) -> EntityRecord {
        EntityRecord {
            name: self.name,
            avg_relevance: self.avg_relevance,
            article_count: self.article_count,
            weighted_score: self.weighted_score,
            eigen_centrality_norm: self.eigen_centrality_norm,
        }
    }
}

/// Per-metric inclusion thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub avg_relevance: f64,
    pub article_count: f64,
    pub eigen_centrality: f64,
}

/// Linearly interpolated quantile, `q` in [0, 1]
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// Percentile filter over entities and articles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingFilter {
    percentile_cutoff: f64,
}

impl RankingFilter {
    pub fn new(percentile_cutoff: f64) -> Result<Self, ComputationError> {
        validate_cutoff(percentile_cutoff)?;
        Ok(Self { percentile_cutoff })
    }

    pub fn from_config(config: &AnalysisConfig) -> Result<Self, ComputationError> {
        Self::new(config.percentile_cutoff)
    }

    pub fn percentile_cutoff(&self) -> f64 {
        self.percentile_cutoff
    }

    /// Inner-join stats with centrality records of the same kind.
    ///
    /// Entities missing from the graph are dropped. Stats order is kept.
    pub fn join(
        &self,
        stats: &[EntityStats],
        kind: EntityKind,
        centrality: &[CentralityRecord],
    ) -> Vec<RankedEntity> {
        let by_name: HashMap<&str, &CentralityRecord> = centrality
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| (r.name.as_str(), r))
            .collect();

        stats
            .iter()
            .filter_map(|s| {
                let c = by_name.get(s.name.as_str())?;
                Some(RankedEntity {
                    name: s.name.clone(),
                    avg_relevance: s.avg_relevance,
                    article_count: s.article_count,
                    weighted_score: s.weighted_score,
                    eigen_centrality: c.eigen_centrality,
                    eigen_centrality_norm: c.eigen_centrality_norm,
                })
            })
            .collect()
    }

    /// Cutoff quantile of each metric over `rows`; `None` when empty
    pub fn thresholds(&self, rows: &[RankedEntity]) -> Option<Thresholds> {
        let metric = |f: fn(&RankedEntity) -> f64| {
            let values: Vec<f64> = rows.iter().map(f).collect();
            quantile(&values, self.percentile_cutoff)
        };
        Some(Thresholds {
            avg_relevance: metric(|r| r.avg_relevance)?,
            article_count: metric(|r| r.article_count as f64)?,
            eigen_centrality: metric(|r| r.eigen_centrality)?,
        })
    }

    /// Rows clearing every threshold, order kept
    pub fn retain(rows: &[RankedEntity], thresholds: &Thresholds) -> Vec<RankedEntity> {
        rows.iter().filter(|r| r.passes(thresholds)).cloned().collect()
    }

    /// Join, threshold and project one entity kind
    pub fn filter_entities(
        &self,
        stats: &[EntityStats],
        kind: EntityKind,
        centrality: &[CentralityRecord],
    ) -> Vec<EntityRecord> {
        let joined = self.join(stats, kind, centrality);
        let Some(thresholds) = self.thresholds(&joined) else {
            return Vec::new();
        };

        let kept = Self::retain(&joined, &thresholds);
        debug!(
            "Kept {} of {} {} entities (relevance >= {:.3}, count >= {:.1}, centrality >= {:.4})",
            kept.len(),
            joined.len(),
            kind,
            thresholds.avg_relevance,
            thresholds.article_count,
            thresholds.eigen_centrality
        );
        kept.into_iter().map(RankedEntity::into_record).collect()
    }

    /// Articles with relevance strictly above the cutoff quantile
    pub fn filter_articles<'a>(&self, articles: &'a [Article]) -> Vec<&'a Article> {
        let relevance: Vec<f64> = articles.iter().map(|a| a.relevance as f64).collect();
        let Some(threshold) = quantile(&relevance, self.percentile_cutoff) else {
            return Vec::new();
        };

        let kept: Vec<&Article> = articles
            .iter()
            .filter(|a| a.relevance as f64 > threshold)
            .collect();
        debug!(
            "Kept {} of {} articles (relevance > {:.2})",
            kept.len(),
            articles.len(),
            threshold
        );
        kept
    }
}

impl Default for RankingFilter {
    fn default() -> Self {
        Self {
            percentile_cutoff: crate::DEFAULT_PERCENTILE_CUTOFF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: i64, relevance: i64) -> Article {
        Article {
            id,
            summary: format!("story {}", id),
            relevance,
            url: Some(format!("https://news.example/{}", id)),
        }
    }

    fn centrality(kind: EntityKind, name: &str, raw: f64, norm: f64) -> CentralityRecord {
        CentralityRecord {
            kind,
            name: name.to_string(),
            eigen_centrality: raw,
            eigen_centrality_norm: norm,
        }
    }

    fn fixture() -> (Vec<EntityStats>, Vec<CentralityRecord>) {
        let stats = vec![
            EntityStats::new("Acme", 9.0, 4),
            EntityStats::new("Globex", 7.0, 3),
            EntityStats::new("Initech", 8.0, 1),
            EntityStats::new("Umbrella", 3.0, 2),
            // Never co-occurs with a sector
            EntityStats::new("Hooli", 10.0, 9),
        ];
        let records = vec![
            centrality(EntityKind::Company, "Acme", 0.6, 1.0),
            centrality(EntityKind::Company, "Globex", 0.4, 0.6),
            centrality(EntityKind::Company, "Initech", 0.5, 0.8),
            centrality(EntityKind::Company, "Umbrella", 0.1, 0.0),
            // Same name on the sector side must not satisfy the join
            centrality(EntityKind::Sector, "Hooli", 0.9, 1.0),
        ];
        (stats, records)
    }

    #[test]
    fn test_quantile_interpolates() {
        assert_eq!(quantile(&[8.0, 3.0], 0.5), Some(5.5));
        assert_eq!(quantile(&[1.0, 2.0, 3.0], 0.5), Some(2.0));
        assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.75), Some(4.0));
        assert_eq!(quantile(&[4.0], 0.3), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn test_articles_strictly_above_median() {
        let articles = vec![article(1, 8), article(2, 3)];
        let kept = RankingFilter::default().filter_articles(&articles);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].relevance, 8);
    }

    #[test]
    fn test_article_ties_at_median_excluded() {
        let articles = vec![article(1, 5), article(2, 5), article(3, 5)];
        assert!(RankingFilter::default().filter_articles(&articles).is_empty());
        assert!(RankingFilter::default().filter_articles(&[]).is_empty());
    }

    #[test]
    fn test_join_drops_entities_outside_graph() {
        let (stats, records) = fixture();
        let filter = RankingFilter::default();
        let joined = filter.join(&stats, EntityKind::Company, &records);
        assert_eq!(joined.len(), 4);
        assert!(joined.iter().all(|r| r.name != "Hooli"));

        let kept = filter.filter_entities(&stats, EntityKind::Company, &records);
        assert!(kept.iter().all(|r| r.name != "Hooli"));
    }

    #[test]
    fn test_all_metrics_must_pass() {
        let (stats, records) = fixture();
        let filter = RankingFilter::default();
        let joined = filter.join(&stats, EntityKind::Company, &records);

        // Medians over Acme, Globex, Initech, Umbrella
        let thresholds = filter.thresholds(&joined).unwrap();
        assert_eq!(thresholds.avg_relevance, 7.5);
        assert_eq!(thresholds.article_count, 2.5);
        assert!((thresholds.eigen_centrality - 0.45).abs() < 1e-12);

        let kept = filter.filter_entities(&stats, EntityKind::Company, &records);
        let names: Vec<&str> = kept.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Acme"]);
        assert_eq!(kept[0].eigen_centrality_norm, 1.0);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let stats = vec![EntityStats::new("A", 5.0, 2), EntityStats::new("B", 5.0, 2)];
        let records = vec![
            centrality(EntityKind::Sector, "A", 0.5, 0.0),
            centrality(EntityKind::Sector, "B", 0.5, 0.0),
        ];
        let kept = RankingFilter::default().filter_entities(&stats, EntityKind::Sector, &records);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let (stats, records) = fixture();
        let filter = RankingFilter::new(0.4).unwrap();
        let joined = filter.join(&stats, EntityKind::Company, &records);
        let thresholds = filter.thresholds(&joined).unwrap();

        let once = RankingFilter::retain(&joined, &thresholds);
        let twice = RankingFilter::retain(&once, &thresholds);
        assert_eq!(once, twice);
        assert!(!once.is_empty());
    }

    #[test]
    fn test_invalid_cutoff() {
        assert!(RankingFilter::new(0.0).is_err());
        assert!(RankingFilter::new(1.5).is_err());
        assert_eq!(RankingFilter::new(0.25).unwrap().percentile_cutoff(), 0.25);
    }

    #[test]
    fn test_empty_inputs() {
        let filter = RankingFilter::default();
        assert!(filter.filter_entities(&[], EntityKind::Company, &[]).is_empty());
        assert!(filter.thresholds(&[]).is_none());
    }
}
