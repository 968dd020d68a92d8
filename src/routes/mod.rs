pub mod analytics;
pub mod health;
pub mod ingest;
pub mod search_query;
