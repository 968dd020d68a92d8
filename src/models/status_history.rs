use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Kind of lifecycle transition recorded in the status audit log. Labels match
/// the values the upstream data set has accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    InitialLoad,
    Archived,
    Revived,
}

impl TransitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::InitialLoad => "Первичная загрузка",
            TransitionKind::Archived => "Отправлена в архив",
            TransitionKind::Revived => "Возобновление",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Первичная загрузка" => Some(TransitionKind::InitialLoad),
            "Отправлена в архив" => Some(TransitionKind::Archived),
            "Возобновление" => Some(TransitionKind::Revived),
            _ => None,
        }
    }
}

/// Append-only audit row for a status transition; never mutated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VacancyStatusHistory {
    pub id: i64,
    pub vacancy_id: i64,
    pub prev_status: String,
    pub cur_status: String,
    pub created_at_prev_status: DateTime<Utc>,
    pub created_at_cur_status: DateTime<Utc>,
    pub duration_days: i32,
    pub type_changed: String,
}

#[derive(Debug, Clone)]
pub struct NewStatusHistory {
    pub vacancy_id: i64,
    pub prev_status: String,
    pub cur_status: String,
    pub created_at_prev_status: DateTime<Utc>,
    pub created_at_cur_status: DateTime<Utc>,
    pub duration_days: i32,
    pub type_changed: TransitionKind,
}
