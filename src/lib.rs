pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::PgPool;

use crate::database::pg_store::PgStore;
use crate::services::analytics_service::AnalyticsService;
use crate::services::hh_client::HhClient;
use crate::services::ingest_service::{IngestOptions, IngestService};
use crate::services::notification_service::MailerService;
use crate::services::search_query_service::SearchQueryService;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub analytics_service: AnalyticsService,
    pub search_query_service: SearchQueryService,
    pub ingest: Arc<IngestService>,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        let analytics_service = AnalyticsService::new(pool.clone());
        let search_query_service = SearchQueryService::new(pool.clone());

        let store = Arc::new(PgStore::new(pool.clone()));
        let source = Arc::new(HhClient::new(config.hh_base_url.clone(), http_client.clone()));
        let sink = Arc::new(MailerService::new(
            config.mail_webhook_url.clone(),
            http_client,
        ));
        let options = IngestOptions {
            per_page: config.ingest_per_page,
            item_pace: Duration::from_millis(config.ingest_pace_ms),
            page_pace: Duration::from_millis(config.ingest_page_pace_ms),
            fetch_attempts: config.ingest_fetch_attempts,
            admin_email: config.admin_email.clone(),
            data_dir: config.ingest_data_dir.clone().map(PathBuf::from),
        };
        let ingest = Arc::new(IngestService::new(store, source, sink, options));

        Self {
            pool,
            analytics_service,
            search_query_service,
            ingest,
        }
    }
}
