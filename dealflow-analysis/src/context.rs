//! Per-invocation analysis context
//!
//! An [`AnalysisContext`] owns one snapshot and one configuration. Each
//! call derives its statistics, graph and centrality from scratch.

use tracing::info;

use dealflow_core::{EntityKind, Snapshot};

use crate::{
    aggregate, eigenvector_centrality, AnalysisConfig, CentralityRecord, CoOccurrenceGraph,
    ComputationError, EntityStats, RankingFilter, ReportPayload,
};

pub struct AnalysisContext {
    snapshot: Snapshot,
    config: AnalysisConfig,
}

impl AnalysisContext {
    pub fn new(snapshot: Snapshot, config: AnalysisConfig) -> Result<Self, ComputationError> {
        config.validate()?;
        Ok(Self { snapshot, config })
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn company_stats(&self) -> Vec<EntityStats> {
        aggregate(&self.snapshot, EntityKind::Company)
    }

    pub fn sector_stats(&self) -> Vec<EntityStats> {
        aggregate(&self.snapshot, EntityKind::Sector)
    }

    pub fn graph(&self) -> CoOccurrenceGraph {
        CoOccurrenceGraph::from_co_occurrences(&self.snapshot.co_occurrences())
    }

    pub fn centrality(&self) -> Result<Vec<CentralityRecord>, ComputationError> {
        eigenvector_centrality(&self.graph(), &self.config)
    }

    /// Run the full ranking and package the report payload.
    ///
    /// Without any company or sector rows the entity sets are empty and
    /// centrality is skipped. Otherwise a degenerate or non-converging
    /// graph fails the whole run.
    pub fn run(&self) -> Result<ReportPayload, ComputationError> {
        let filter = RankingFilter::from_config(&self.config)?;
        let articles = filter.filter_articles(self.snapshot.articles());

        let companies = self.company_stats();
        let sectors = self.sector_stats();

        if companies.is_empty() && sectors.is_empty() {
            info!("No company or sector associations, skipping centrality");
            return Ok(ReportPayload::assemble(&articles, Vec::new(), Vec::new()));
        }

        let centrality = self.centrality()?;
        let sector_records = filter.filter_entities(&sectors, EntityKind::Sector, &centrality);
        let company_records = filter.filter_entities(&companies, EntityKind::Company, &centrality);

        info!(
            "Analysis kept {} articles, {} sectors, {} companies",
            articles.len(),
            sector_records.len(),
            company_records.len()
        );
        Ok(ReportPayload::assemble(&articles, sector_records, company_records))
    }
}
