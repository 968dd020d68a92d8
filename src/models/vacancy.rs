use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle status of a tracked vacancy. The store keeps the Russian labels
/// the upstream data set has always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VacancyStatus {
    Active,
    Archived,
}

impl VacancyStatus {
    pub const ABSENT_LABEL: &'static str = "Отсутствует";

    pub fn as_str(&self) -> &'static str {
        match self {
            VacancyStatus::Active => "Активный",
            VacancyStatus::Archived => "Архивный",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Активный" => Some(VacancyStatus::Active),
            "Архивный" => Some(VacancyStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vacancy {
    pub id: i64,
    pub external_id: String,
    pub title: String,
    pub employer_id: i64,
    pub area: Option<String>,
    pub experience_id: i64,
    pub professional_role_id: i64,
    pub employment_form_id: i64,
    pub working_hours_id: i64,
    pub status: String,
    pub created_date: Option<DateTime<Utc>>,
    pub published_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vacancy {
    pub fn status(&self) -> Option<VacancyStatus> {
        VacancyStatus::from_label(&self.status)
    }

    pub fn is_archived(&self) -> bool {
        self.status() == Some(VacancyStatus::Archived)
    }
}

/// Insert payload for a vacancy observed for the first time.
#[derive(Debug, Clone)]
pub struct NewVacancy {
    pub external_id: String,
    pub title: String,
    pub employer_id: i64,
    pub area: Option<String>,
    pub experience_id: i64,
    pub professional_role_id: i64,
    pub employment_form_id: i64,
    pub working_hours_id: i64,
    pub status: VacancyStatus,
    pub created_date: Option<DateTime<Utc>>,
    pub published_date: Option<DateTime<Utc>>,
}
