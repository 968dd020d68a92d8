pub mod analytics_service;
pub mod hh_client;
pub mod ingest_service;
pub mod notification_service;
pub mod reference_service;
pub mod salary_ledger;
pub mod search_query_service;
pub mod skill_ledger;
pub mod source;
pub mod status_tracker;
pub mod store;
