use clap::Parser;
use colored::Colorize;
use presentation::cli::{Cli, CliApp};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    shared::telemetry::init_tracing();
    let cli = Cli::parse();

    println!("Initializing Smart Q&A Finder...");
    let app = match CliApp::from_env().await {
        Ok(app) => app,
        Err(err) => {
            eprintln!("{} {:#}", "Failed to initialize:".red().bold(), err);
            eprintln!("Please check your setup and try again.");
            std::process::exit(1);
        }
    };

    app.run(cli).await?;
    Ok(())
}
