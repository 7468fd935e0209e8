use clap::Parser;
use colored::Colorize;
use presentation::ingest::{IngestApp, IngestCli};
use presentation::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    shared::telemetry::init_tracing();
    let cli = IngestCli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{} {}", "Configuration error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    if let Err(err) = IngestApp::new(config)?.run(cli).await {
        eprintln!("{} {:#}", "Ingestion aborted:".red().bold(), err);
        std::process::exit(1);
    }
    Ok(())
}
