pub mod batching;
pub mod index_service;
pub mod ingest_service;
pub mod query_service;
