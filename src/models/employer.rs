use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Employer record keyed by the upstream external id. The rating and
/// accreditation fields are a snapshot taken when the row is created and are
/// never refreshed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Employer {
    pub id: i64,
    pub id_external: String,
    pub name: String,
    pub area: Option<String>,
    pub accredited_it_employer: bool,
    pub open_vacancies: i32,
    pub total_rating: Decimal,
    pub reviews_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEmployer {
    pub id_external: String,
    pub name: String,
    pub area: Option<String>,
    pub accredited_it_employer: bool,
    pub open_vacancies: i32,
    pub total_rating: Decimal,
    pub reviews_count: i32,
}
