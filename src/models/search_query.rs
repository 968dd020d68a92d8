use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User-submitted filter that scopes which vacancies are fetched and tracked
/// together. The ingestion scheduler only processes active queries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SearchQuery {
    pub id: i64,
    pub query: String,
    pub initiator: Option<String>,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
