use crate::repl::{choose_mode, run_demo, run_query_loop, Mode, DEMO_QUESTIONS};
use application::index_service::IndexService;
use application::query_service::QueryService;
use clap::Parser;
use colored::Colorize;
use infrastructure::config::Config;
use infrastructure::question_index::QuestionIndex;
use shared::types::Result;
use std::io;
use tracing::info;

/// Find Quora questions similar to yours, backed by a Pinecone index.
#[derive(Parser, Debug)]
#[command(name = "qa_finder")]
#[command(about = "Semantic question finder over a hosted Pinecone index", long_about = None)]
pub struct Cli {
    /// Skip the mode prompt
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,
}

pub struct CliApp {
    service: QueryService<QuestionIndex>,
}

impl CliApp {
    /// Load `.env` and the environment, then connect.
    pub async fn from_env() -> Result<Self> {
        Self::connect(Config::load()?).await
    }

    pub async fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::connect(Config::from_lookup(lookup)?).await
    }

    pub async fn connect(config: Config) -> Result<Self> {
        let top_k = config.top_k;
        info!(index = %config.index_name, mode = %config.mode, top_k, "connecting");
        let index = IndexService::new(config)?.connect().await?;
        Ok(Self {
            service: QueryService::new(index, top_k),
        })
    }

    pub fn service(&self) -> &QueryService<QuestionIndex> {
        &self.service
    }

    pub async fn run(&self, cli: Cli) -> Result<()> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut out = io::stdout();

        println!("{}", "Smart Q&A Finder ready!".green());
        println!();

        let mode = match cli.mode {
            Some(mode) => mode,
            None => choose_mode(&mut input, &mut out)?,
        };
        match mode {
            Mode::Interactive => run_query_loop(&self.service, &mut input, &mut out).await,
            Mode::Demo => run_demo(&self.service, &DEMO_QUESTIONS, &mut out).await,
        }
    }
}
