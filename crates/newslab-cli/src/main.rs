use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use newslab_ingest::{build_scheduler, IngestConfig, Ingestor};
use newslab_storage::NewsStore;
use newslab_web::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "newslab-cli")]
#[command(about = "Newslab aggregation pipeline command-line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one crawl and print the tally.
    Crawl {
        #[arg(value_enum, default_value_t = CrawlSource::All)]
        source: CrawlSource,
    },
    /// Analyze articles that have no summary yet.
    Analyze,
    /// Apply pending database migrations.
    Migrate,
    /// Run the recurring jobs without the API.
    Schedule,
    /// Serve the API, with the scheduler when enabled.
    Serve,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CrawlSource {
    Naver,
    Daum,
    Bills,
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("newslab=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = IngestConfig::from_env();
    let store = NewsStore::connect_lazy(&config.database_url, config.max_db_connections)
        .context("building database pool")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Crawl { source } => {
            let ingestor = Ingestor::new(config, store)?;
            match source {
                CrawlSource::Naver => print_summary(&ingestor.crawl_naver().await?),
                CrawlSource::Daum => print_summary(&ingestor.crawl_daum().await?),
                CrawlSource::Bills => print_summary(&ingestor.crawl_bills().await?),
                CrawlSource::All => {
                    for summary in ingestor.crawl_all().await? {
                        print_summary(&summary);
                    }
                }
            }
        }
        Commands::Analyze => {
            let ingestor = Ingestor::new(config, store)?;
            let analyzed = ingestor.analyze_pending().await?;
            println!("analyzed {analyzed} articles");
        }
        Commands::Migrate => {
            store.migrate().await.context("running migrations")?;
            println!("migrations applied");
        }
        Commands::Schedule => {
            store.migrate().await.context("running migrations")?;

            let mut config = config;
            config.scheduler_enabled = true;
            let ingestor = Arc::new(Ingestor::new(config.clone(), store)?);
            let scheduler = build_scheduler(ingestor, &config)
                .await?
                .context("scheduler was not constructed")?;
            scheduler.start().await.context("starting scheduler")?;
            info!("scheduler running");
            tokio::signal::ctrl_c()
                .await
                .context("waiting for shutdown signal")?;
        }
        Commands::Serve => {
            store.migrate().await.context("running migrations")?;

            let ingestor = Arc::new(Ingestor::new(config.clone(), store.clone())?);
            if let Some(scheduler) = build_scheduler(ingestor.clone(), &config).await? {
                scheduler.start().await.context("starting scheduler")?;
                info!("scheduler started");
            }

            newslab_web::serve(AppState::new(store, ingestor)).await?;
        }
    }

    Ok(())
}

fn print_summary(summary: &newslab_ingest::CrawlSummary) {
    println!(
        "{}: saved={} duplicates={} errors={} elapsed_ms={}",
        summary.source, summary.saved, summary.duplicates, summary.errors, summary.elapsed_ms
    );
}
