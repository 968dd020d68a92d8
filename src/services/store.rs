//! Persistence surface consumed by the reconciliation engine and the history
//! ledgers. Production code runs against [`crate::database::pg_store::PgStore`];
//! tests supply an in-memory implementation, so nothing in the core depends on
//! a live database.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::dimension::DimensionKind;
use crate::models::employer::NewEmployer;
use crate::models::key_skill_history::KeySkillHistory;
use crate::models::salary_history::{NewSalaryHistory, SalaryHistory};
use crate::models::search_query::SearchQuery;
use crate::models::status_history::{NewStatusHistory, VacancyStatusHistory};
use crate::models::vacancy::{NewVacancy, Vacancy, VacancyStatus};

#[async_trait]
pub trait VacancyStore: Send + Sync {
    // Dimension resolution. Both calls are idempotent: resolving the same
    // external key twice returns the same internal id without mutation.
    async fn resolve_dimension(
        &self,
        kind: DimensionKind,
        external_id: &str,
        name: &str,
    ) -> Result<i64>;
    async fn resolve_key_skill(&self, name: &str) -> Result<i64>;

    // Employers.
    async fn find_employer_id(&self, external_id: &str) -> Result<Option<i64>>;
    async fn insert_employer(&self, employer: NewEmployer) -> Result<i64>;
    async fn link_employer_industry(&self, employer_id: i64, industry_id: i64) -> Result<()>;

    // Vacancies.
    async fn find_vacancy_by_external_id(&self, external_id: &str) -> Result<Option<Vacancy>>;
    async fn insert_vacancy(&self, vacancy: NewVacancy) -> Result<Vacancy>;
    async fn set_vacancy_status(
        &self,
        vacancy_id: i64,
        status: VacancyStatus,
        now: DateTime<Utc>,
    ) -> Result<()>;
    async fn set_published_date(
        &self,
        vacancy_id: i64,
        published: Option<DateTime<Utc>>,
    ) -> Result<()>;
    async fn link_work_format(&self, vacancy_id: i64, work_format_id: i64) -> Result<()>;
    async fn link_work_schedule(&self, vacancy_id: i64, work_schedule_id: i64) -> Result<()>;

    // Search-query membership.
    async fn list_active_search_queries(&self) -> Result<Vec<SearchQuery>>;
    async fn find_search_query(&self, id: i64) -> Result<Option<SearchQuery>>;
    async fn linked_external_ids(&self, search_query_id: i64) -> Result<HashSet<String>>;
    async fn is_linked_to_search_query(
        &self,
        search_query_id: i64,
        vacancy_id: i64,
    ) -> Result<bool>;
    async fn link_search_query(&self, search_query_id: i64, vacancy_id: i64) -> Result<()>;

    // Salary ledger.
    async fn active_salary(&self, vacancy_id: i64) -> Result<Option<SalaryHistory>>;
    async fn deactivate_salary(&self, row_id: i64, now: DateTime<Utc>) -> Result<()>;
    async fn insert_salary(&self, row: NewSalaryHistory) -> Result<()>;

    // Key-skill ledger.
    async fn active_skill_ids(&self, vacancy_id: i64) -> Result<HashSet<i64>>;
    async fn find_skill_history(
        &self,
        vacancy_id: i64,
        key_skill_id: i64,
    ) -> Result<Option<KeySkillHistory>>;
    async fn set_skill_history_active(
        &self,
        row_id: i64,
        is_active: bool,
        now: DateTime<Utc>,
    ) -> Result<()>;
    async fn insert_skill_history(&self, vacancy_id: i64, key_skill_id: i64) -> Result<()>;

    // Status audit log.
    async fn last_status_history(&self, vacancy_id: i64) -> Result<Option<VacancyStatusHistory>>;
    async fn insert_status_history(&self, row: NewStatusHistory) -> Result<()>;
}
