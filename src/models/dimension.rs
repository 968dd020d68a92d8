use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Taxonomy dimensions resolved from the vacancy source. Each table stores an
/// internal surrogate id plus the upstream external id; rows are created on
/// first sight and never updated or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DimensionKind {
    Experience,
    ProfessionalRole,
    EmploymentForm,
    WorkingHours,
    WorkFormat,
    WorkSchedule,
    Industry,
}

impl DimensionKind {
    pub fn table_name(&self) -> &'static str {
        match self {
            DimensionKind::Experience => "experience_levels",
            DimensionKind::ProfessionalRole => "professional_roles",
            DimensionKind::EmploymentForm => "employment_forms",
            DimensionKind::WorkingHours => "working_hours",
            DimensionKind::WorkFormat => "work_formats",
            DimensionKind::WorkSchedule => "work_schedules",
            DimensionKind::Industry => "industries",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DimensionRow {
    pub id: i64,
    pub id_external: String,
    pub name: String,
}

/// Key skills are deduplicated by display name: the upstream payload exposes
/// no external id for them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct KeySkill {
    pub id: i64,
    pub name: String,
}
