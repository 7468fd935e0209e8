pub mod cli;
pub mod ingest;
pub mod render;
pub mod repl;

pub use infrastructure::config::Config;
