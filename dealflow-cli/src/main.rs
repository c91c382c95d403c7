//! dealflow CLI
//!
//! Ranks UK business news for private-equity deal flow.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use dealflow_agents::{create_provider_backend, Provider};
use dealflow_analysis::{AnalysisConfig, DEFAULT_PERCENTILE_CUTOFF};
use dealflow_news::{NewsConfig, DEFAULT_TOPICS};
use dealflow_runtime::{analyze_store, Pipeline, PipelineConfig};

#[derive(Parser)]
#[command(name = "dealflow")]
#[command(author, version, about = "dealflow: entity relevance and centrality over business news", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,

    /// Article store file
    #[arg(long, default_value = "data/articles.json")]
    store: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch news, extract articles and add them to the store
    Ingest {
        /// Search topic (repeatable; default: the built-in deal-flow topics)
        #[arg(short, long = "topic")]
        topics: Vec<String>,

        /// NewsAPI key (or set NEWSAPI_KEY env var)
        #[arg(long, env = "NEWSAPI_KEY")]
        news_key: Option<String>,

        /// Articles requested per topic
        #[arg(long, default_value = "5")]
        page_size: u32,

        #[command(flatten)]
        llm: LlmArgs,
    },

    /// Rank the stored articles and print the payload as JSON
    Analyze {
        /// Percentile cutoff for every threshold
        #[arg(long, default_value_t = DEFAULT_PERCENTILE_CUTOFF)]
        cutoff: f64,
    },

    /// Rank the stored articles and write a Markdown report
    Report {
        /// Output file (default: report_<timestamp>.md)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Percentile cutoff for every threshold
        #[arg(long, default_value_t = DEFAULT_PERCENTILE_CUTOFF)]
        cutoff: f64,

        #[command(flatten)]
        llm: LlmArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    Gemini,
    Openai,
    Anthropic,
}

impl From<ProviderArg> for Provider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Gemini => Provider::Gemini,
            ProviderArg::Openai => Provider::OpenAI,
            ProviderArg::Anthropic => Provider::Anthropic,
        }
    }
}

#[derive(Args)]
struct LlmArgs {
    /// Language model provider
    #[arg(long, value_enum, default_value = "gemini")]
    provider: ProviderArg,

    /// Model to use (default depends on provider)
    #[arg(short, long)]
    model: Option<String>,

    /// Gemini API key (or set GEMINI_API_KEY env var)
    #[arg(long, env = "GEMINI_API_KEY")]
    gemini_key: Option<String>,

    /// OpenAI API key (or set OPENAI_API_KEY env var)
    #[arg(long, env = "OPENAI_API_KEY")]
    openai_key: Option<String>,

    /// Anthropic API key (or set ANTHROPIC_API_KEY env var)
    #[arg(long, env = "ANTHROPIC_API_KEY")]
    anthropic_key: Option<String>,

    /// Directory of persona TOML files overriding the built-in prompts
    #[arg(long)]
    prompts: Option<PathBuf>,
}

impl LlmArgs {
    fn pipeline_config(&self, store: PathBuf) -> Result<PipelineConfig> {
        let provider = Provider::from(self.provider);
        let key = match provider {
            Provider::Gemini => self.gemini_key.as_deref(),
            Provider::OpenAI => self.openai_key.as_deref(),
            Provider::Anthropic => self.anthropic_key.as_deref(),
        }
        .unwrap_or_default();

        let backend = create_provider_backend(provider, key, self.model.as_deref())?;
        println!("📡 Provider: {:?} | Model: {}", provider, backend.model_name());

        let mut config = PipelineConfig::new(backend, store);
        config.persona_dir = self.prompts.clone();
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match cli.command {
        Commands::Ingest {
            topics,
            news_key,
            page_size,
            llm,
        } => {
            run_ingest(cli.store, topics, news_key, page_size, &llm).await?;
        }
        Commands::Analyze { cutoff } => {
            let config = AnalysisConfig::default().with_percentile_cutoff(cutoff);
            let payload = analyze_store(&cli.store, config)?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Commands::Report {
            output,
            cutoff,
            llm,
        } => {
            run_report(cli.store, output, cutoff, &llm).await?;
        }
    }

    Ok(())
}

async fn run_ingest(
    store: PathBuf,
    topics: Vec<String>,
    news_key: Option<String>,
    page_size: u32,
    llm: &LlmArgs,
) -> Result<()> {
    println!("📰 dealflow - news ingestion\n");

    let news_key = news_key
        .ok_or_else(|| anyhow::anyhow!("NewsAPI key required. Set NEWSAPI_KEY or use --news-key"))?;
    let topics = if topics.is_empty() {
        DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect()
    } else {
        topics
    };

    let mut config = llm.pipeline_config(store)?;
    config.news_config = NewsConfig::default()
        .with_api_key(&news_key)
        .with_page_size(page_size);
    println!("🔍 Topics: {}", topics.len());
    println!("💾 Store: {}\n", config.store_path.display());

    let pipeline = Pipeline::new(config)?;
    let stats = pipeline.ingest(&topics).await?;

    println!("\n✅ Ingestion complete!");
    println!("   Topics with news: {}", stats.topics);
    println!("   News items extracted: {}", stats.fetched);
    println!("   Articles stored: {} ({} skipped)", stats.inserted, stats.skipped);
    if stats.failed_topics > 0 {
        println!("⚠️  {} topics failed extraction (see log)", stats.failed_topics);
    }

    Ok(())
}

async fn run_report(
    store: PathBuf,
    output: Option<PathBuf>,
    cutoff: f64,
    llm: &LlmArgs,
) -> Result<()> {
    println!("📊 dealflow - deal-flow report\n");

    let mut config = llm.pipeline_config(store)?;
    config.analysis_config = AnalysisConfig::default().with_percentile_cutoff(cutoff);

    let pipeline = Pipeline::new(config)?;
    let path = pipeline.report(output).await?;
    let report = std::fs::read_to_string(&path)?;

    println!("\n✅ Report complete!");
    println!("📄 Report saved to: {}", path.display());

    // Print report preview
    println!("\n{}", "=".repeat(60));
    let preview: String = report.chars().take(1000).collect();
    println!("{}", preview);
    if report.len() > 1000 {
        println!("...\n[truncated - see full report in output file]");
    }

    Ok(())
}
