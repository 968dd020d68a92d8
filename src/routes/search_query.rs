use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::dto::search_query_dto::{
    CreateSearchQueryPayload, SearchQueryResponse, UpdateSearchQueryPayload,
};
use crate::error::Result;
use crate::AppState;

pub async fn create_search_query(
    State(state): State<AppState>,
    Json(payload): Json<CreateSearchQueryPayload>,
) -> Result<(StatusCode, Json<SearchQueryResponse>)> {
    let query = state.search_query_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(query.into())))
}

pub async fn list_search_queries(
    State(state): State<AppState>,
) -> Result<Json<Vec<SearchQueryResponse>>> {
    let queries = state.search_query_service.list().await?;
    Ok(Json(queries.into_iter().map(Into::into).collect()))
}

pub async fn get_search_query(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SearchQueryResponse>> {
    let query = state.search_query_service.get(id).await?;
    Ok(Json(query.into()))
}

pub async fn update_search_query(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSearchQueryPayload>,
) -> Result<Json<SearchQueryResponse>> {
    let query = state.search_query_service.update(id, payload).await?;
    Ok(Json(query.into()))
}
