//! Postgres implementation of the persistence surface. Each method is its own
//! statement against the pool, which gives the batch job commit-per-unit
//! durability: a killed run keeps everything already written.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::Result;
use crate::models::dimension::DimensionKind;
use crate::models::employer::NewEmployer;
use crate::models::key_skill_history::KeySkillHistory;
use crate::models::salary_history::{NewSalaryHistory, SalaryHistory};
use crate::models::search_query::SearchQuery;
use crate::models::status_history::{NewStatusHistory, VacancyStatusHistory};
use crate::models::vacancy::{NewVacancy, Vacancy, VacancyStatus};
use crate::services::store::VacancyStore;

const VACANCY_COLUMNS: &str = "id, external_id, title, employer_id, area, experience_id, \
     professional_role_id, employment_form_id, working_hours_id, status, \
     created_date, published_date, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VacancyStore for PgStore {
    /// Lookup-or-create against the unique external-id column. A concurrent
    /// insert of the same key is absorbed by `ON CONFLICT DO NOTHING` plus a
    /// re-select, so the check-then-act race cannot duplicate rows.
    async fn resolve_dimension(
        &self,
        kind: DimensionKind,
        external_id: &str,
        name: &str,
    ) -> Result<i64> {
        let table = kind.table_name();
        let select = format!("SELECT id FROM {} WHERE id_external = $1", table);

        if let Some(id) = sqlx::query_scalar::<_, i64>(&select)
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(id);
        }

        let insert = format!(
            "INSERT INTO {} (id_external, name) VALUES ($1, $2)
             ON CONFLICT (id_external) DO NOTHING RETURNING id",
            table
        );
        if let Some(id) = sqlx::query_scalar::<_, i64>(&insert)
            .bind(external_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(id);
        }

        // Lost the insert race; the row exists now.
        let id = sqlx::query_scalar::<_, i64>(&select)
            .bind(external_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    async fn resolve_key_skill(&self, name: &str) -> Result<i64> {
        if let Some(id) =
            sqlx::query_scalar::<_, i64>("SELECT id FROM key_skills WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?
        {
            return Ok(id);
        }

        if let Some(id) = sqlx::query_scalar::<_, i64>(
            "INSERT INTO key_skills (name) VALUES ($1)
             ON CONFLICT (name) DO NOTHING RETURNING id",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        {
            return Ok(id);
        }

        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM key_skills WHERE name = $1")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    async fn find_employer_id(&self, external_id: &str) -> Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM employers WHERE id_external = $1")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    async fn insert_employer(&self, employer: NewEmployer) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO employers
                (id_external, name, area, accredited_it_employer,
                 open_vacancies, total_rating, reviews_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&employer.id_external)
        .bind(&employer.name)
        .bind(&employer.area)
        .bind(employer.accredited_it_employer)
        .bind(employer.open_vacancies)
        .bind(employer.total_rating)
        .bind(employer.reviews_count)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn link_employer_industry(&self, employer_id: i64, industry_id: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO employer_industries (employer_id, industry_id)
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(employer_id)
        .bind(industry_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_vacancy_by_external_id(&self, external_id: &str) -> Result<Option<Vacancy>> {
        let sql = format!(
            "SELECT {} FROM vacancies WHERE external_id = $1",
            VACANCY_COLUMNS
        );
        let vacancy = sqlx::query_as::<_, Vacancy>(&sql)
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vacancy)
    }

    async fn insert_vacancy(&self, vacancy: NewVacancy) -> Result<Vacancy> {
        let sql = format!(
            r#"
            INSERT INTO vacancies
                (external_id, title, employer_id, area, experience_id,
                 professional_role_id, employment_form_id, working_hours_id,
                 status, created_date, published_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            VACANCY_COLUMNS
        );
        let row = sqlx::query_as::<_, Vacancy>(&sql)
            .bind(&vacancy.external_id)
            .bind(&vacancy.title)
            .bind(vacancy.employer_id)
            .bind(&vacancy.area)
            .bind(vacancy.experience_id)
            .bind(vacancy.professional_role_id)
            .bind(vacancy.employment_form_id)
            .bind(vacancy.working_hours_id)
            .bind(vacancy.status.as_str())
            .bind(vacancy.created_date)
            .bind(vacancy.published_date)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn set_vacancy_status(
        &self,
        vacancy_id: i64,
        status: VacancyStatus,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("UPDATE vacancies SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(vacancy_id)
            .bind(status.as_str())
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_published_date(
        &self,
        vacancy_id: i64,
        published: Option<DateTime<Utc>>,
    ) -> Result<()> {
        sqlx::query("UPDATE vacancies SET published_date = $2 WHERE id = $1")
            .bind(vacancy_id)
            .bind(published)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn link_work_format(&self, vacancy_id: i64, work_format_id: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO vacancy_work_formats (vacancy_id, work_format_id)
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(vacancy_id)
        .bind(work_format_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn link_work_schedule(&self, vacancy_id: i64, work_schedule_id: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO vacancy_work_schedules (vacancy_id, work_schedule_id)
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(vacancy_id)
        .bind(work_schedule_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_active_search_queries(&self) -> Result<Vec<SearchQuery>> {
        let queries = sqlx::query_as::<_, SearchQuery>(
            "SELECT id, query, initiator, email, is_active, created_at
             FROM search_queries WHERE is_active = TRUE ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(queries)
    }

    async fn find_search_query(&self, id: i64) -> Result<Option<SearchQuery>> {
        let query = sqlx::query_as::<_, SearchQuery>(
            "SELECT id, query, initiator, email, is_active, created_at
             FROM search_queries WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(query)
    }

    async fn linked_external_ids(&self, search_query_id: i64) -> Result<HashSet<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT v.external_id
            FROM search_query_vacancies sqv
            JOIN vacancies v ON v.id = sqv.vacancy_id
            WHERE sqv.search_query_id = $1
            "#,
        )
        .bind(search_query_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().collect())
    }

    async fn is_linked_to_search_query(
        &self,
        search_query_id: i64,
        vacancy_id: i64,
    ) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM search_query_vacancies
             WHERE search_query_id = $1 AND vacancy_id = $2)",
        )
        .bind(search_query_id)
        .bind(vacancy_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn link_search_query(&self, search_query_id: i64, vacancy_id: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO search_query_vacancies (search_query_id, vacancy_id)
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(search_query_id)
        .bind(vacancy_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn active_salary(&self, vacancy_id: i64) -> Result<Option<SalaryHistory>> {
        let row = sqlx::query_as::<_, SalaryHistory>(
            "SELECT id, vacancy_id, salary_from, salary_to, currency, mode_id,
                    mode_name, is_active, created_at, updated_at
             FROM salary_history WHERE vacancy_id = $1 AND is_active = TRUE",
        )
        .bind(vacancy_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn deactivate_salary(&self, row_id: i64, now: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE salary_history SET is_active = FALSE, updated_at = $2 WHERE id = $1")
            .bind(row_id)
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_salary(&self, row: NewSalaryHistory) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO salary_history
                (vacancy_id, salary_from, salary_to, currency, mode_id, mode_name, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE)
            "#,
        )
        .bind(row.vacancy_id)
        .bind(row.salary_from)
        .bind(row.salary_to)
        .bind(&row.currency)
        .bind(&row.mode_id)
        .bind(&row.mode_name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn active_skill_ids(&self, vacancy_id: i64) -> Result<HashSet<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT key_skill_id FROM key_skill_history
             WHERE vacancy_id = $1 AND is_active = TRUE",
        )
        .bind(vacancy_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().collect())
    }

    async fn find_skill_history(
        &self,
        vacancy_id: i64,
        key_skill_id: i64,
    ) -> Result<Option<KeySkillHistory>> {
        let row = sqlx::query_as::<_, KeySkillHistory>(
            "SELECT id, vacancy_id, key_skill_id, is_active, created_at, updated_at
             FROM key_skill_history WHERE vacancy_id = $1 AND key_skill_id = $2",
        )
        .bind(vacancy_id)
        .bind(key_skill_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn set_skill_history_active(
        &self,
        row_id: i64,
        is_active: bool,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE key_skill_history SET is_active = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(row_id)
        .bind(is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_skill_history(&self, vacancy_id: i64, key_skill_id: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO key_skill_history (vacancy_id, key_skill_id, is_active)
             VALUES ($1, $2, TRUE)",
        )
        .bind(vacancy_id)
        .bind(key_skill_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn last_status_history(&self, vacancy_id: i64) -> Result<Option<VacancyStatusHistory>> {
        let row = sqlx::query_as::<_, VacancyStatusHistory>(
            "SELECT id, vacancy_id, prev_status, cur_status, created_at_prev_status,
                    created_at_cur_status, duration_days, type_changed
             FROM vacancy_status_history
             WHERE vacancy_id = $1 ORDER BY id DESC LIMIT 1",
        )
        .bind(vacancy_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_status_history(&self, row: NewStatusHistory) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO vacancy_status_history
                (vacancy_id, prev_status, cur_status, created_at_prev_status,
                 created_at_cur_status, duration_days, type_changed)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(row.vacancy_id)
        .bind(&row.prev_status)
        .bind(&row.cur_status)
        .bind(row.created_at_prev_status)
        .bind(row.created_at_cur_status)
        .bind(row.duration_days)
        .bind(row.type_changed.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
