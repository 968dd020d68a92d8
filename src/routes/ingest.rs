use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::Result;
use crate::services::ingest_service::IngestReport;
use crate::AppState;

/// Manual trigger for one search query's reconciliation run. The run is
/// executed inline and the report returned to the caller.
pub async fn run_search_query(
    State(state): State<AppState>,
    Path(query_id): Path<i64>,
) -> Result<Json<IngestReport>> {
    let query = state.search_query_service.get(query_id).await?;
    let report = state.ingest.run_query(&query).await?;
    Ok(Json(report))
}
