use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::search_query::SearchQuery;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSearchQueryPayload {
    #[validate(length(min = 1))]
    pub query: String,
    pub initiator: Option<String>,
    #[validate(email)]
    pub email: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateSearchQueryPayload {
    pub is_active: Option<bool>,
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQueryResponse {
    pub id: i64,
    pub query: String,
    pub initiator: Option<String>,
    pub email: String,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<SearchQuery> for SearchQueryResponse {
    fn from(value: SearchQuery) -> Self {
        Self {
            id: value.id,
            query: value.query,
            initiator: value.initiator,
            email: value.email,
            is_active: value.is_active,
            created_at: value.created_at,
        }
    }
}
