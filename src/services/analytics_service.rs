//! Read-only aggregations over one search query's tracked vacancies. Every
//! query joins through the search-query membership table and restricts itself
//! to the active status unless the endpoint is explicitly about lifecycle
//! history.

use sqlx::PgPool;

use crate::dto::analytics_dto::{
    AccreditationSlice, AverageSalary, NamedCount, QueryCounts, SalaryCorrelation, SkillCount,
    StatusTrendPoint,
};
use crate::error::Result;
use crate::models::vacancy::VacancyStatus;

const TOP_SKILLS_SQL: &str = r#"
    SELECT ks.name AS skill, COUNT(*) AS count
    FROM key_skill_history ksh
    JOIN key_skills ks ON ks.id = ksh.key_skill_id
    JOIN vacancies v ON v.id = ksh.vacancy_id
    JOIN search_query_vacancies sqv
        ON sqv.vacancy_id = v.id AND sqv.search_query_id = $2
    WHERE ksh.is_active = TRUE AND v.status = $1
    GROUP BY ks.name
    ORDER BY count DESC, ks.name
    LIMIT $3
"#;

const BY_WORK_FORMAT_SQL: &str = r#"
    SELECT wf.name AS name, COUNT(*) AS count
    FROM vacancy_work_formats vwf
    JOIN work_formats wf ON wf.id = vwf.work_format_id
    JOIN vacancies v ON v.id = vwf.vacancy_id
    JOIN search_query_vacancies sqv
        ON sqv.vacancy_id = v.id AND sqv.search_query_id = $2
    WHERE v.status = $1
    GROUP BY wf.name
    ORDER BY count DESC
"#;

const BY_EXPERIENCE_SQL: &str = r#"
    SELECT el.name AS name, COUNT(*) AS count
    FROM vacancies v
    JOIN experience_levels el ON el.id = v.experience_id
    JOIN search_query_vacancies sqv
        ON sqv.vacancy_id = v.id AND sqv.search_query_id = $2
    WHERE v.status = $1
    GROUP BY el.name
    ORDER BY count DESC
"#;

const BY_PROFESSIONAL_ROLE_SQL: &str = r#"
    SELECT pr.name AS name, COUNT(*) AS count
    FROM vacancies v
    JOIN professional_roles pr ON pr.id = v.professional_role_id
    JOIN search_query_vacancies sqv
        ON sqv.vacancy_id = v.id AND sqv.search_query_id = $2
    WHERE v.status = $1
    GROUP BY pr.name
    ORDER BY count DESC
"#;

const BY_INDUSTRY_SQL: &str = r#"
    SELECT i.name AS name, COUNT(DISTINCT v.id) AS count
    FROM vacancies v
    JOIN employer_industries ei ON ei.employer_id = v.employer_id
    JOIN industries i ON i.id = ei.industry_id
    JOIN search_query_vacancies sqv
        ON sqv.vacancy_id = v.id AND sqv.search_query_id = $2
    WHERE v.status = $1
    GROUP BY i.name
    ORDER BY count DESC
"#;

const AVERAGE_SALARIES_SQL: &str = r#"
    SELECT sh.currency AS currency,
           el.name AS experience_level,
           AVG((COALESCE(sh.salary_from, sh.salary_to)
                + COALESCE(sh.salary_to, sh.salary_from)) / 2) AS avg_salary
    FROM salary_history sh
    JOIN vacancies v ON v.id = sh.vacancy_id
    JOIN experience_levels el ON el.id = v.experience_id
    JOIN search_query_vacancies sqv
        ON sqv.vacancy_id = v.id AND sqv.search_query_id = $2
    WHERE sh.is_active = TRUE AND v.status = $1
    GROUP BY sh.currency, el.name
    ORDER BY sh.currency, el.name
"#;

const CORRELATION_PAIRS_SQL: &str = r#"
    SELECT CASE el.id_external
               WHEN 'noExperience' THEN 0.0
               WHEN 'between1And3' THEN 2.0
               WHEN 'between3And6' THEN 4.5
               WHEN 'moreThan6' THEN 7.0
               ELSE 0.0
           END AS years,
           CAST((COALESCE(sh.salary_from, sh.salary_to)
                 + COALESCE(sh.salary_to, sh.salary_from)) / 2
                AS DOUBLE PRECISION) AS salary
    FROM salary_history sh
    JOIN vacancies v ON v.id = sh.vacancy_id
    JOIN experience_levels el ON el.id = v.experience_id
    JOIN search_query_vacancies sqv
        ON sqv.vacancy_id = v.id AND sqv.search_query_id = $2
    WHERE sh.is_active = TRUE
      AND v.status = $1
      AND sh.currency IN ('RUR', 'RUB')
      AND COALESCE(sh.salary_from, sh.salary_to) IS NOT NULL
"#;

const STATUS_TRENDS_SQL: &str = r#"
    SELECT vsh.cur_status AS status,
           COUNT(*) AS count,
           CAST(vsh.created_at_cur_status AS DATE) AS date
    FROM vacancy_status_history vsh
    JOIN search_query_vacancies sqv
        ON sqv.vacancy_id = vsh.vacancy_id AND sqv.search_query_id = $1
    GROUP BY vsh.cur_status, CAST(vsh.created_at_cur_status AS DATE)
    ORDER BY date, vsh.cur_status
"#;

const ACCREDITATION_SQL: &str = r#"
    SELECT e.accredited_it_employer AS accredited, COUNT(*) AS count
    FROM vacancies v
    JOIN employers e ON e.id = v.employer_id
    JOIN search_query_vacancies sqv
        ON sqv.vacancy_id = v.id AND sqv.search_query_id = $2
    WHERE v.status = $1
    GROUP BY e.accredited_it_employer
    ORDER BY accredited DESC
"#;

const TOP_AREAS_SQL: &str = r#"
    SELECT v.area AS name, COUNT(*) AS count
    FROM vacancies v
    JOIN search_query_vacancies sqv
        ON sqv.vacancy_id = v.id AND sqv.search_query_id = $2
    WHERE v.status = $1 AND v.area IS NOT NULL
    GROUP BY v.area
    ORDER BY count DESC
    LIMIT $3
"#;

const COUNTS_SQL: &str = r#"
    SELECT COUNT(DISTINCT v.id) AS vacancies,
           COUNT(DISTINCT v.id) FILTER (WHERE v.status = $1) AS active_vacancies,
           COUNT(DISTINCT v.employer_id) AS employers
    FROM vacancies v
    JOIN search_query_vacancies sqv
        ON sqv.vacancy_id = v.id AND sqv.search_query_id = $2
"#;

#[derive(Clone)]
pub struct AnalyticsService {
    pool: PgPool,
}

impl AnalyticsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn top_skills(&self, search_query_id: i64, limit: i64) -> Result<Vec<SkillCount>> {
        let rows = sqlx::query_as::<_, SkillCount>(TOP_SKILLS_SQL)
            .bind(VacancyStatus::Active.as_str())
            .bind(search_query_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn vacancies_by_work_format(
        &self,
        search_query_id: i64,
    ) -> Result<Vec<NamedCount>> {
        let rows = sqlx::query_as::<_, NamedCount>(BY_WORK_FORMAT_SQL)
            .bind(VacancyStatus::Active.as_str())
            .bind(search_query_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn vacancies_by_experience(&self, search_query_id: i64) -> Result<Vec<NamedCount>> {
        let rows = sqlx::query_as::<_, NamedCount>(BY_EXPERIENCE_SQL)
            .bind(VacancyStatus::Active.as_str())
            .bind(search_query_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn vacancies_by_professional_role(
        &self,
        search_query_id: i64,
    ) -> Result<Vec<NamedCount>> {
        let rows = sqlx::query_as::<_, NamedCount>(BY_PROFESSIONAL_ROLE_SQL)
            .bind(VacancyStatus::Active.as_str())
            .bind(search_query_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn vacancies_by_industry(&self, search_query_id: i64) -> Result<Vec<NamedCount>> {
        let rows = sqlx::query_as::<_, NamedCount>(BY_INDUSTRY_SQL)
            .bind(VacancyStatus::Active.as_str())
            .bind(search_query_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Average of the salary-range midpoint per currency and experience level,
    /// over active salary rows of the query's active vacancies.
    pub async fn average_salaries(&self, search_query_id: i64) -> Result<Vec<AverageSalary>> {
        let rows = sqlx::query_as::<_, AverageSalary>(AVERAGE_SALARIES_SQL)
            .bind(VacancyStatus::Active.as_str())
            .bind(search_query_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Pearson correlation between years of experience (midpoint of the HH
    /// experience bracket) and the salary-range midpoint, rouble rows only.
    pub async fn salary_experience_correlation(
        &self,
        search_query_id: i64,
    ) -> Result<SalaryCorrelation> {
        let pairs = sqlx::query_as::<_, (f64, f64)>(CORRELATION_PAIRS_SQL)
            .bind(VacancyStatus::Active.as_str())
            .bind(search_query_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(SalaryCorrelation {
            correlation: pearson_correlation(&pairs),
        })
    }

    /// Daily transition counts from the status audit log of the query's
    /// vacancies.
    pub async fn status_trends(&self, search_query_id: i64) -> Result<Vec<StatusTrendPoint>> {
        let rows = sqlx::query_as::<_, StatusTrendPoint>(STATUS_TRENDS_SQL)
            .bind(search_query_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn accreditation_split(
        &self,
        search_query_id: i64,
    ) -> Result<Vec<AccreditationSlice>> {
        let rows = sqlx::query_as::<_, AccreditationSlice>(ACCREDITATION_SQL)
            .bind(VacancyStatus::Active.as_str())
            .bind(search_query_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn top_areas(&self, search_query_id: i64, limit: i64) -> Result<Vec<NamedCount>> {
        let rows = sqlx::query_as::<_, NamedCount>(TOP_AREAS_SQL)
            .bind(VacancyStatus::Active.as_str())
            .bind(search_query_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn counts(&self, search_query_id: i64) -> Result<QueryCounts> {
        let counts = sqlx::query_as::<_, QueryCounts>(COUNTS_SQL)
            .bind(VacancyStatus::Active.as_str())
            .bind(search_query_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(counts)
    }
}

/// Sample Pearson correlation coefficient. `None` when there are fewer than
/// two points or either variable has zero variance.
pub fn pearson_correlation(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom == 0.0 {
        None
    } else {
        Some(sxy / denom)
    }
}
