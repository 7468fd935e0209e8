use application::index_service::{IndexOrigin, IndexService};
use application::ingest_service::{IngestOptions, IngestService};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use infrastructure::config::Config;
use infrastructure::dataset::{DatasetReader, DatasetSource};
use shared::confirmation::ask_confirmation;
use shared::types::Result;
use std::time::Duration;

/// Load a question dataset into the Pinecone index.
#[derive(Parser, Debug)]
#[command(name = "qa_ingest")]
#[command(about = "One-time loader for the question index", long_about = None)]
pub struct IngestCli {
    /// JSON Lines file or http(s) URL
    pub source: String,

    /// Do not ask before writing into a non-empty index
    #[arg(long)]
    pub yes: bool,

    /// Stop after this many records
    #[arg(long)]
    pub limit: Option<usize>,
}

pub struct IngestApp {
    index_service: IndexService,
}

impl IngestApp {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            index_service: IndexService::new(config)?,
        })
    }

    pub async fn run(&self, cli: IngestCli) -> Result<()> {
        let config = self.index_service.config();
        let (index, origin) = self.index_service.ensure_index().await?;
        match origin {
            IndexOrigin::Created => println!(
                "{} '{}' ({} embedding)",
                "Created index".green(),
                config.index_name,
                config.mode
            ),
            IndexOrigin::Existing => println!("Index '{}' already exists.", config.index_name),
        }

        let stats = self.index_service.stats(&index).await?;
        if stats.total_vector_count > 0 {
            println!("Index contains {} vectors", stats.total_vector_count);
            let prompt = "Upsert the dataset anyway? Existing ids are overwritten";
            if !ask_confirmation(prompt, false, cli.yes)? {
                println!("{}", "Nothing loaded.".yellow());
                return Ok(());
            }
        }

        let source = DatasetSource::parse(&cli.source);
        let mut reader = DatasetReader::new(source.open().await?);
        let service = IngestService::new(index, IngestOptions::new(config.batch_size))?;

        println!(
            "Upserting questions in batches of at most {}...",
            service.options().batch_size
        );
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
        bar.enable_steady_tick(Duration::from_millis(120));

        let records = reader.by_ref().take(cli.limit.unwrap_or(usize::MAX));
        let result = service
            .ingest(records, |progress| {
                bar.set_message(format!(
                    "batch {} ({} records), {} sent",
                    progress.index + 1,
                    progress.size,
                    progress.records_sent
                ))
            })
            .await;
        bar.finish_and_clear();

        let report = result?;
        println!(
            "{} {} questions in {} batches ({} skipped without text)",
            "Successfully upserted".green().bold(),
            report.records,
            report.batches,
            reader.skipped()
        );
        Ok(())
    }
}
