//! Pipeline Coordinator
//!
//! - **Ingest**: news search per topic, extraction per topic, store insert
//! - **Analyze**: store snapshot through the ranking engine
//! - **Report**: ranked payload through the report agent, written as Markdown

use std::fs;
use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use dealflow_agents::{AgentError, ExtractionAgent, PersonaRegistry, ReportAgent, SharedBackend};
use dealflow_analysis::{AnalysisConfig, AnalysisContext, ReportPayload};
use dealflow_core::ArticleStore;
use dealflow_news::{NewsClient, NewsConfig, NewsItem, TopicResult};

/// Pipeline configuration
pub struct PipelineConfig {
    /// LLM backend (pre-constructed)
    pub backend: SharedBackend,
    /// News API configuration
    pub news_config: NewsConfig,
    /// JSON store file
    pub store_path: PathBuf,
    /// Ranking parameters
    pub analysis_config: AnalysisConfig,
    /// Directory of persona TOML files overriding the embedded prompts
    pub persona_dir: Option<PathBuf>,
    /// Topics extracted at once
    pub max_concurrent_extractions: usize,
}

impl PipelineConfig {
    pub fn new(backend: SharedBackend, store_path: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            news_config: NewsConfig::default(),
            store_path: store_path.into(),
            analysis_config: AnalysisConfig::default(),
            persona_dir: None,
            max_concurrent_extractions: 2,
        }
    }
}

/// Counts from one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Topics that returned news
    pub topics: usize,
    /// News items sent to extraction
    pub fetched: usize,
    /// Articles the model returned
    pub extracted: usize,
    /// Articles written to the store
    pub inserted: usize,
    /// Articles dropped as already stored or invalid
    pub skipped: usize,
    /// Topics whose extraction failed
    pub failed_topics: usize,
}

/// The ingest / analyze / report pipeline
pub struct Pipeline {
    news: NewsClient,
    extractor: ExtractionAgent,
    reporter: ReportAgent,
    store_path: PathBuf,
    analysis_config: AnalysisConfig,
    max_concurrent_extractions: usize,
}

impl Pipeline {
    /// Create a pipeline with configuration
    pub fn new(config: PipelineConfig) -> Result<Self, anyhow::Error> {
        config.analysis_config.validate()?;

        let mut personas = PersonaRegistry::load_embedded();
        if let Some(dir) = &config.persona_dir {
            personas = personas.load_overrides(dir)?;
        }
        debug!("Loaded {} personas", personas.len());

        Ok(Self {
            news: NewsClient::new(config.news_config)?,
            extractor: ExtractionAgent::new(config.backend.clone(), &personas)?,
            reporter: ReportAgent::new(config.backend, &personas)?,
            store_path: config.store_path,
            analysis_config: config.analysis_config,
            max_concurrent_extractions: config.max_concurrent_extractions.max(1),
        })
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Search every topic and ingest what comes back
    pub async fn ingest(&self, topics: &[String]) -> Result<IngestStats, anyhow::Error> {
        info!("Searching news for {} topics", topics.len());
        let results = self.news.search_topics(topics).await;
        self.ingest_results(results).await
    }

    /// Extract and store already-fetched topic results.
    ///
    /// News already in the store is not sent to the model again. A topic
    /// whose extraction fails is skipped; the rest are still stored.
    pub async fn ingest_results(
        &self,
        results: Vec<TopicResult>,
    ) -> Result<IngestStats, anyhow::Error> {
        let mut store = ArticleStore::load(&self.store_path)?;
        let mut stats = IngestStats::default();

        let batches: Vec<(String, Vec<NewsItem>)> = results
            .into_iter()
            .map(|r| {
                let fresh: Vec<NewsItem> = r
                    .items
                    .into_iter()
                    .filter(|item| !store.has_url(&item.url))
                    .collect();
                (r.topic, fresh)
            })
            .filter(|(topic, items)| {
                if items.is_empty() {
                    debug!("Nothing new for topic {}", topic);
                }
                !items.is_empty()
            })
            .collect();

        stats.topics = batches.len();
        stats.fetched = batches.iter().map(|(_, items)| items.len()).sum();

        let extracted: Vec<_> = stream::iter(batches)
            .map(|(topic, items)| async move {
                let result = self.extractor.extract(&items).await;
                (topic, result)
            })
            .buffered(self.max_concurrent_extractions)
            .collect()
            .await;

        for (topic, result) in extracted {
            let articles = match result {
                Ok(articles) => articles,
                Err(AgentError::NoWork) => continue,
                Err(e) => {
                    warn!("Extraction for {} failed: {}", topic, e);
                    stats.failed_topics += 1;
                    continue;
                }
            };

            stats.extracted += articles.len();
            for article in &articles {
                if let Some(url) = &article.url {
                    if store.has_url(url) {
                        debug!("Already stored: {}", url);
                        stats.skipped += 1;
                        continue;
                    }
                }
                match store.insert_article(article) {
                    Ok(id) => {
                        debug!("Stored article {} for {}", id, topic);
                        stats.inserted += 1;
                    }
                    Err(e) => {
                        warn!("Rejected article for {}: {}", topic, e);
                        stats.skipped += 1;
                    }
                }
            }
        }

        store.save(&self.store_path)?;
        info!(
            "Ingested {} of {} extracted articles ({} stored in total)",
            stats.inserted,
            stats.extracted,
            store.article_count()
        );
        Ok(stats)
    }

    /// Rank the stored articles and entities
    pub fn analyze(&self) -> Result<ReportPayload, anyhow::Error> {
        analyze_store(&self.store_path, self.analysis_config)
    }

    /// Analyze, write the report and return where it was saved
    pub async fn report(&self, output: Option<PathBuf>) -> Result<PathBuf, anyhow::Error> {
        let payload = self.analyze()?;
        if payload.is_empty() {
            anyhow::bail!("nothing to report: no article or entity passed the ranking");
        }

        let markdown = self.reporter.generate(&payload).await?;
        let path = output.unwrap_or_else(default_report_path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&path, &markdown)?;
        info!("Report saved to {}", path.display());
        Ok(path)
    }
}

/// Rank the contents of a store file.
///
/// Needs no language model, so the binary can run it without API keys.
pub fn analyze_store(
    store_path: &Path,
    config: AnalysisConfig,
) -> Result<ReportPayload, anyhow::Error> {
    let snapshot = ArticleStore::load(store_path)?.snapshot()?;
    info!(
        "Analyzing {} articles, {} companies, {} sectors",
        snapshot.articles().len(),
        snapshot.companies().len(),
        snapshot.sectors().len()
    );

    let context = AnalysisContext::new(snapshot, config)?;
    let payload = context.run()?;
    info!(
        "Selected {} articles, {} sectors, {} companies",
        payload.articles.len(),
        payload.sectors.len(),
        payload.companies.len()
    );
    Ok(payload)
}

/// `report_<timestamp>.md` in the working directory
pub fn default_report_path() -> PathBuf {
    let timestamp = chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S");
    PathBuf::from(format!("report_{}.md", timestamp))
}
