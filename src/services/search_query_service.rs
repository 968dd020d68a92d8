use sqlx::PgPool;
use validator::Validate;

use crate::dto::search_query_dto::{CreateSearchQueryPayload, UpdateSearchQueryPayload};
use crate::error::{Error, Result};
use crate::models::search_query::SearchQuery;

/// CRUD over the search queries that scope ingestion runs.
#[derive(Clone)]
pub struct SearchQueryService {
    pool: PgPool,
}

impl SearchQueryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateSearchQueryPayload) -> Result<SearchQuery> {
        payload.validate()?;

        let query = sqlx::query_as::<_, SearchQuery>(
            r#"
            INSERT INTO search_queries (query, initiator, email, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, query, initiator, email, is_active, created_at
            "#,
        )
        .bind(&payload.query)
        .bind(&payload.initiator)
        .bind(&payload.email)
        .bind(payload.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(query)
    }

    pub async fn list(&self) -> Result<Vec<SearchQuery>> {
        let queries = sqlx::query_as::<_, SearchQuery>(
            "SELECT id, query, initiator, email, is_active, created_at
             FROM search_queries ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(queries)
    }

    pub async fn get(&self, id: i64) -> Result<SearchQuery> {
        sqlx::query_as::<_, SearchQuery>(
            "SELECT id, query, initiator, email, is_active, created_at
             FROM search_queries WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Search query {} not found", id)))
    }

    pub async fn update(&self, id: i64, payload: UpdateSearchQueryPayload) -> Result<SearchQuery> {
        payload.validate()?;

        sqlx::query_as::<_, SearchQuery>(
            r#"
            UPDATE search_queries
            SET is_active = COALESCE($2, is_active),
                email = COALESCE($3, email)
            WHERE id = $1
            RETURNING id, query, initiator, email, is_active, created_at
            "#,
        )
        .bind(id)
        .bind(payload.is_active)
        .bind(&payload.email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Search query {} not found", id)))
    }
}
