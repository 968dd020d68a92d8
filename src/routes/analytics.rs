use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::dto::analytics_dto::{
    AccreditationSlice, AverageSalary, NamedCount, QueryCounts, SalaryCorrelation, SkillCount,
    StatusTrendPoint,
};
use crate::error::Result;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

pub async fn top_skills(
    State(state): State<AppState>,
    Path(query_id): Path<i64>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<SkillCount>>> {
    let rows = state
        .analytics_service
        .top_skills(query_id, params.limit.unwrap_or(20))
        .await?;
    Ok(Json(rows))
}

pub async fn by_work_format(
    State(state): State<AppState>,
    Path(query_id): Path<i64>,
) -> Result<Json<Vec<NamedCount>>> {
    Ok(Json(
        state.analytics_service.vacancies_by_work_format(query_id).await?,
    ))
}

pub async fn by_experience(
    State(state): State<AppState>,
    Path(query_id): Path<i64>,
) -> Result<Json<Vec<NamedCount>>> {
    Ok(Json(
        state.analytics_service.vacancies_by_experience(query_id).await?,
    ))
}

pub async fn by_professional_role(
    State(state): State<AppState>,
    Path(query_id): Path<i64>,
) -> Result<Json<Vec<NamedCount>>> {
    Ok(Json(
        state
            .analytics_service
            .vacancies_by_professional_role(query_id)
            .await?,
    ))
}

pub async fn by_industry(
    State(state): State<AppState>,
    Path(query_id): Path<i64>,
) -> Result<Json<Vec<NamedCount>>> {
    Ok(Json(
        state.analytics_service.vacancies_by_industry(query_id).await?,
    ))
}

pub async fn average_salaries(
    State(state): State<AppState>,
    Path(query_id): Path<i64>,
) -> Result<Json<Vec<AverageSalary>>> {
    Ok(Json(state.analytics_service.average_salaries(query_id).await?))
}

pub async fn salary_experience_correlation(
    State(state): State<AppState>,
    Path(query_id): Path<i64>,
) -> Result<Json<SalaryCorrelation>> {
    Ok(Json(
        state
            .analytics_service
            .salary_experience_correlation(query_id)
            .await?,
    ))
}

pub async fn status_trends(
    State(state): State<AppState>,
    Path(query_id): Path<i64>,
) -> Result<Json<Vec<StatusTrendPoint>>> {
    Ok(Json(state.analytics_service.status_trends(query_id).await?))
}

pub async fn accreditation_split(
    State(state): State<AppState>,
    Path(query_id): Path<i64>,
) -> Result<Json<Vec<AccreditationSlice>>> {
    Ok(Json(
        state.analytics_service.accreditation_split(query_id).await?,
    ))
}

pub async fn top_areas(
    State(state): State<AppState>,
    Path(query_id): Path<i64>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<NamedCount>>> {
    let rows = state
        .analytics_service
        .top_areas(query_id, params.limit.unwrap_or(10))
        .await?;
    Ok(Json(rows))
}

pub async fn counts(
    State(state): State<AppState>,
    Path(query_id): Path<i64>,
) -> Result<Json<QueryCounts>> {
    Ok(Json(state.analytics_service.counts(query_id).await?))
}
