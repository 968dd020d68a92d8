use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Association between a vacancy and a key skill over time. Invariant: at most
/// one active row per (vacancy, skill) pair; a deactivated pair is reactivated
/// in place when the skill reappears instead of being duplicated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct KeySkillHistory {
    pub id: i64,
    pub vacancy_id: i64,
    pub key_skill_id: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
