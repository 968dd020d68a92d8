//! Payload shapes consumed from the HH vacancy API. Only the fields the
//! ingestion pipeline actually reads are modelled; everything else in the
//! upstream JSON is ignored.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One page of the vacancy listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacancyPage {
    #[serde(default)]
    pub items: Vec<VacancyListing>,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub found: u64,
}

/// Listing-level vacancy item; detail-only fields live on [`VacancyDetail`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacancyListing {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub archived: bool,
    pub employer: Option<EmployerRef>,
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployerRef {
    pub id: Option<String>,
    pub name: String,
    /// Free-shape rating blob; upstream is inconsistent about number vs.
    /// string fields here, so coercion happens in [`parse_rating`].
    #[serde(default)]
    pub employer_rating: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacancyDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub archived: bool,
    pub experience: Option<NamedRef>,
    #[serde(default)]
    pub professional_roles: Vec<NamedRef>,
    pub employment_form: Option<NamedRef>,
    #[serde(default)]
    pub working_hours: Vec<NamedRef>,
    #[serde(default)]
    pub work_format: Vec<NamedRef>,
    #[serde(default)]
    pub work_schedule_by_days: Vec<NamedRef>,
    #[serde(default)]
    pub key_skills: Vec<KeySkillRef>,
    pub salary_range: Option<SalaryRange>,
    pub initial_created_at: Option<String>,
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeySkillRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryRange {
    pub from: Option<Decimal>,
    pub to: Option<Decimal>,
    pub currency: Option<String>,
    pub mode: Option<NamedRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployerDetail {
    pub id: Option<String>,
    pub name: Option<String>,
    pub area: Option<AreaRef>,
    pub open_vacancies: Option<i32>,
    #[serde(default)]
    pub accredited_it_employer: bool,
    #[serde(default)]
    pub industries: Vec<NamedRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaRef {
    pub name: Option<String>,
}

/// Parses the source timestamp format (`2025-07-04T12:00:00+0300`) into UTC.
pub fn parse_source_datetime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Extracts `(total_rating, reviews_count)` from the loosely-typed employer
/// rating blob, defaulting to zeros on any shape mismatch.
pub fn parse_rating(rating: Option<&JsonValue>) -> (Decimal, i32) {
    let Some(rating) = rating else {
        return (Decimal::ZERO, 0);
    };

    let total = match rating.get("total_rating") {
        Some(JsonValue::String(s)) => s.parse::<Decimal>().unwrap_or(Decimal::ZERO),
        Some(JsonValue::Number(n)) => n
            .as_f64()
            .and_then(|f| Decimal::try_from(f).ok())
            .unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    };
    let reviews = match rating.get("reviews_count") {
        Some(JsonValue::Number(n)) => n.as_i64().unwrap_or(0) as i32,
        Some(JsonValue::String(s)) => s.parse::<i32>().unwrap_or(0),
        _ => 0,
    };
    (total, reviews)
}
