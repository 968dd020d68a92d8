use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillCount {
    pub skill: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NamedCount {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AverageSalary {
    pub currency: String,
    pub experience_level: String,
    pub avg_salary: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryCorrelation {
    pub correlation: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StatusTrendPoint {
    pub status: String,
    pub count: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccreditationSlice {
    pub accredited: bool,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QueryCounts {
    pub vacancies: i64,
    pub active_vacancies: i64,
    pub employers: i64,
}
