use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One salary observation in the per-vacancy timeline. Invariant: at most one
/// row with `is_active = true` per vacancy; superseded rows are deactivated,
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SalaryHistory {
    pub id: i64,
    pub vacancy_id: i64,
    pub salary_from: Option<Decimal>,
    pub salary_to: Option<Decimal>,
    pub currency: String,
    pub mode_id: Option<String>,
    pub mode_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSalaryHistory {
    pub vacancy_id: i64,
    pub salary_from: Option<Decimal>,
    pub salary_to: Option<Decimal>,
    pub currency: String,
    pub mode_id: Option<String>,
    pub mode_name: Option<String>,
}
