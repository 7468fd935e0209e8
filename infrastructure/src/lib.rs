pub mod config;
pub mod dataset;
pub mod embedder;
pub mod errors;
pub mod ollama_client;
pub mod pinecone_client;
pub mod question_index;
