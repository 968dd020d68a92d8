#![allow(dead_code)]

//! Shared fixtures: an in-memory store, a scriptable vacancy source and a
//! mocked notification sink, so the engine and ledgers run without Postgres.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use vacancy_analytics_backend::dto::hh_dto::{
    EmployerDetail, EmployerRef, KeySkillRef, NamedRef, SalaryRange, VacancyDetail, VacancyListing,
    VacancyPage,
};
use vacancy_analytics_backend::error::{Error, Result};
use vacancy_analytics_backend::models::dimension::DimensionKind;
use vacancy_analytics_backend::models::employer::NewEmployer;
use vacancy_analytics_backend::models::key_skill_history::KeySkillHistory;
use vacancy_analytics_backend::models::salary_history::{NewSalaryHistory, SalaryHistory};
use vacancy_analytics_backend::models::search_query::SearchQuery;
use vacancy_analytics_backend::models::status_history::{NewStatusHistory, VacancyStatusHistory};
use vacancy_analytics_backend::models::vacancy::{NewVacancy, Vacancy, VacancyStatus};
use vacancy_analytics_backend::services::notification_service::NotificationSink;
use vacancy_analytics_backend::services::source::VacancySource;
use vacancy_analytics_backend::services::store::VacancyStore;

#[derive(Default)]
struct State {
    next_id: i64,
    dimensions: HashMap<(DimensionKind, String), i64>,
    key_skills: HashMap<String, i64>,
    employers: HashMap<String, i64>,
    employer_industries: HashSet<(i64, i64)>,
    vacancies: Vec<Vacancy>,
    work_format_links: HashSet<(i64, i64)>,
    work_schedule_links: HashSet<(i64, i64)>,
    search_queries: Vec<SearchQuery>,
    query_links: HashSet<(i64, i64)>,
    salary_rows: Vec<SalaryHistory>,
    skill_rows: Vec<KeySkillHistory>,
    status_rows: Vec<VacancyStatusHistory>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_search_query(&self, query: &str, email: &str) -> SearchQuery {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let row = SearchQuery {
            id,
            query: query.to_string(),
            initiator: None,
            email: email.to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        state.search_queries.push(row.clone());
        row
    }

    /// Seeds a vacancy linked to a search query, with `updated_at` pushed back
    /// by the given number of days.
    pub fn seed_vacancy(
        &self,
        external_id: &str,
        query_id: i64,
        status: VacancyStatus,
        days_in_status: i64,
    ) -> Vacancy {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let now = Utc::now();
        let vacancy = Vacancy {
            id,
            external_id: external_id.to_string(),
            title: format!("Vacancy {}", external_id),
            employer_id: 1,
            area: None,
            experience_id: 1,
            professional_role_id: 1,
            employment_form_id: 1,
            working_hours_id: 1,
            status: status.as_str().to_string(),
            created_date: None,
            published_date: None,
            created_at: now - Duration::days(days_in_status),
            updated_at: now - Duration::days(days_in_status),
        };
        state.vacancies.push(vacancy.clone());
        state.query_links.insert((query_id, id));
        vacancy
    }

    pub fn vacancy(&self, external_id: &str) -> Option<Vacancy> {
        let state = self.state.lock().unwrap();
        state
            .vacancies
            .iter()
            .find(|v| v.external_id == external_id)
            .cloned()
    }

    pub fn vacancy_count(&self) -> usize {
        self.state.lock().unwrap().vacancies.len()
    }

    pub fn salary_rows(&self, vacancy_id: i64) -> Vec<SalaryHistory> {
        let state = self.state.lock().unwrap();
        state
            .salary_rows
            .iter()
            .filter(|r| r.vacancy_id == vacancy_id)
            .cloned()
            .collect()
    }

    pub fn skill_rows(&self, vacancy_id: i64) -> Vec<KeySkillHistory> {
        let state = self.state.lock().unwrap();
        state
            .skill_rows
            .iter()
            .filter(|r| r.vacancy_id == vacancy_id)
            .cloned()
            .collect()
    }

    pub fn status_rows(&self, vacancy_id: i64) -> Vec<VacancyStatusHistory> {
        let state = self.state.lock().unwrap();
        state
            .status_rows
            .iter()
            .filter(|r| r.vacancy_id == vacancy_id)
            .cloned()
            .collect()
    }

    pub fn skill_name(&self, key_skill_id: i64) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .key_skills
            .iter()
            .find(|(_, id)| **id == key_skill_id)
            .map(|(name, _)| name.clone())
    }

    pub fn is_linked(&self, query_id: i64, vacancy_id: i64) -> bool {
        self.state
            .lock()
            .unwrap()
            .query_links
            .contains(&(query_id, vacancy_id))
    }
}

#[async_trait]
impl VacancyStore for InMemoryStore {
    async fn resolve_dimension(
        &self,
        kind: DimensionKind,
        external_id: &str,
        _name: &str,
    ) -> Result<i64> {
        let mut state = self.state.lock().unwrap();
        if let Some(id) = state.dimensions.get(&(kind, external_id.to_string())) {
            return Ok(*id);
        }
        let id = state.next_id();
        state.dimensions.insert((kind, external_id.to_string()), id);
        Ok(id)
    }

    async fn resolve_key_skill(&self, name: &str) -> Result<i64> {
        let mut state = self.state.lock().unwrap();
        if let Some(id) = state.key_skills.get(name) {
            return Ok(*id);
        }
        let id = state.next_id();
        state.key_skills.insert(name.to_string(), id);
        Ok(id)
    }

    async fn find_employer_id(&self, external_id: &str) -> Result<Option<i64>> {
        Ok(self.state.lock().unwrap().employers.get(external_id).copied())
    }

    async fn insert_employer(&self, employer: NewEmployer) -> Result<i64> {
        let mut state = self.state.lock().unwrap();
        if state.employers.contains_key(&employer.id_external) {
            return Err(Error::Internal(format!(
                "duplicate employer {}",
                employer.id_external
            )));
        }
        let id = state.next_id();
        state.employers.insert(employer.id_external.clone(), id);
        Ok(id)
    }

    async fn link_employer_industry(&self, employer_id: i64, industry_id: i64) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .employer_industries
            .insert((employer_id, industry_id));
        Ok(())
    }

    async fn find_vacancy_by_external_id(&self, external_id: &str) -> Result<Option<Vacancy>> {
        Ok(self.vacancy(external_id))
    }

    async fn insert_vacancy(&self, vacancy: NewVacancy) -> Result<Vacancy> {
        let mut state = self.state.lock().unwrap();
        if state
            .vacancies
            .iter()
            .any(|v| v.external_id == vacancy.external_id)
        {
            return Err(Error::Internal(format!(
                "duplicate vacancy {}",
                vacancy.external_id
            )));
        }
        let id = state.next_id();
        let now = Utc::now();
        let row = Vacancy {
            id,
            external_id: vacancy.external_id,
            title: vacancy.title,
            employer_id: vacancy.employer_id,
            area: vacancy.area,
            experience_id: vacancy.experience_id,
            professional_role_id: vacancy.professional_role_id,
            employment_form_id: vacancy.employment_form_id,
            working_hours_id: vacancy.working_hours_id,
            status: vacancy.status.as_str().to_string(),
            created_date: vacancy.created_date,
            published_date: vacancy.published_date,
            created_at: now,
            updated_at: now,
        };
        state.vacancies.push(row.clone());
        Ok(row)
    }

    async fn set_vacancy_status(
        &self,
        vacancy_id: i64,
        status: VacancyStatus,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(v) = state.vacancies.iter_mut().find(|v| v.id == vacancy_id) {
            v.status = status.as_str().to_string();
            v.updated_at = now;
        }
        Ok(())
    }

    async fn set_published_date(
        &self,
        vacancy_id: i64,
        published: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(v) = state.vacancies.iter_mut().find(|v| v.id == vacancy_id) {
            v.published_date = published;
        }
        Ok(())
    }

    async fn link_work_format(&self, vacancy_id: i64, work_format_id: i64) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .work_format_links
            .insert((vacancy_id, work_format_id));
        Ok(())
    }

    async fn link_work_schedule(&self, vacancy_id: i64, work_schedule_id: i64) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .work_schedule_links
            .insert((vacancy_id, work_schedule_id));
        Ok(())
    }

    async fn list_active_search_queries(&self) -> Result<Vec<SearchQuery>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .search_queries
            .iter()
            .filter(|q| q.is_active)
            .cloned()
            .collect())
    }

    async fn find_search_query(&self, id: i64) -> Result<Option<SearchQuery>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .search_queries
            .iter()
            .find(|q| q.id == id)
            .cloned())
    }

    async fn linked_external_ids(&self, search_query_id: i64) -> Result<HashSet<String>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .query_links
            .iter()
            .filter(|(qid, _)| *qid == search_query_id)
            .filter_map(|(_, vid)| {
                state
                    .vacancies
                    .iter()
                    .find(|v| v.id == *vid)
                    .map(|v| v.external_id.clone())
            })
            .collect())
    }

    async fn is_linked_to_search_query(
        &self,
        search_query_id: i64,
        vacancy_id: i64,
    ) -> Result<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .query_links
            .contains(&(search_query_id, vacancy_id)))
    }

    async fn link_search_query(&self, search_query_id: i64, vacancy_id: i64) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .query_links
            .insert((search_query_id, vacancy_id));
        Ok(())
    }

    async fn active_salary(&self, vacancy_id: i64) -> Result<Option<SalaryHistory>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .salary_rows
            .iter()
            .find(|r| r.vacancy_id == vacancy_id && r.is_active)
            .cloned())
    }

    async fn deactivate_salary(&self, row_id: i64, now: DateTime<Utc>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(row) = state.salary_rows.iter_mut().find(|r| r.id == row_id) {
            row.is_active = false;
            row.updated_at = now;
        }
        Ok(())
    }

    async fn insert_salary(&self, row: NewSalaryHistory) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let now = Utc::now();
        state.salary_rows.push(SalaryHistory {
            id,
            vacancy_id: row.vacancy_id,
            salary_from: row.salary_from,
            salary_to: row.salary_to,
            currency: row.currency,
            mode_id: row.mode_id,
            mode_name: row.mode_name,
            is_active: true,
            created_at: now,
            updated_at: now,
        });
        Ok(())
    }

    async fn active_skill_ids(&self, vacancy_id: i64) -> Result<HashSet<i64>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .skill_rows
            .iter()
            .filter(|r| r.vacancy_id == vacancy_id && r.is_active)
            .map(|r| r.key_skill_id)
            .collect())
    }

    async fn find_skill_history(
        &self,
        vacancy_id: i64,
        key_skill_id: i64,
    ) -> Result<Option<KeySkillHistory>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .skill_rows
            .iter()
            .find(|r| r.vacancy_id == vacancy_id && r.key_skill_id == key_skill_id)
            .cloned())
    }

    async fn set_skill_history_active(
        &self,
        row_id: i64,
        is_active: bool,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(row) = state.skill_rows.iter_mut().find(|r| r.id == row_id) {
            row.is_active = is_active;
            row.updated_at = now;
        }
        Ok(())
    }

    async fn insert_skill_history(&self, vacancy_id: i64, key_skill_id: i64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let now = Utc::now();
        state.skill_rows.push(KeySkillHistory {
            id,
            vacancy_id,
            key_skill_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        });
        Ok(())
    }

    async fn last_status_history(&self, vacancy_id: i64) -> Result<Option<VacancyStatusHistory>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .status_rows
            .iter()
            .filter(|r| r.vacancy_id == vacancy_id)
            .max_by_key(|r| r.id)
            .cloned())
    }

    async fn insert_status_history(&self, row: NewStatusHistory) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.status_rows.push(VacancyStatusHistory {
            id,
            vacancy_id: row.vacancy_id,
            prev_status: row.prev_status,
            cur_status: row.cur_status,
            created_at_prev_status: row.created_at_prev_status,
            created_at_cur_status: row.created_at_cur_status,
            duration_days: row.duration_days,
            type_changed: row.type_changed.as_str().to_string(),
        });
        Ok(())
    }
}

/// Scriptable vacancy source. Details and employers are looked up by external
/// id; ids in `not_found` answer 404; `fail_detail_times` makes the next N
/// detail calls for an id fail with a transient error.
#[derive(Default)]
pub struct StubSource {
    pub listing: Mutex<Vec<VacancyListing>>,
    pub details: Mutex<HashMap<String, VacancyDetail>>,
    pub employers: Mutex<HashMap<String, EmployerDetail>>,
    pub not_found: Mutex<HashSet<String>>,
    pub fail_detail_times: Mutex<HashMap<String, u32>>,
    pub detail_calls: Mutex<HashMap<String, u32>>,
}

impl StubSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn put_vacancy(&self, listing: VacancyListing, detail: VacancyDetail) {
        self.details
            .lock()
            .unwrap()
            .insert(listing.id.clone(), detail);
        self.listing.lock().unwrap().push(listing);
    }

    pub fn put_detail(&self, detail: VacancyDetail) {
        self.details
            .lock()
            .unwrap()
            .insert(detail.id.clone(), detail);
    }

    pub fn put_employer(&self, external_id: &str, detail: EmployerDetail) {
        self.employers
            .lock()
            .unwrap()
            .insert(external_id.to_string(), detail);
    }

    pub fn mark_not_found(&self, external_id: &str) {
        self.not_found
            .lock()
            .unwrap()
            .insert(external_id.to_string());
    }

    pub fn fail_next_details(&self, external_id: &str, times: u32) {
        self.fail_detail_times
            .lock()
            .unwrap()
            .insert(external_id.to_string(), times);
    }

    pub fn detail_calls_for(&self, external_id: &str) -> u32 {
        self.detail_calls
            .lock()
            .unwrap()
            .get(external_id)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl VacancySource for StubSource {
    async fn list_vacancies(
        &self,
        _text: &str,
        _page: u32,
        _per_page: u32,
        _date_from: Option<&str>,
        _date_to: Option<&str>,
    ) -> Result<VacancyPage> {
        let items = self.listing.lock().unwrap().clone();
        let found = items.len() as u64;
        Ok(VacancyPage {
            items,
            pages: 1,
            page: 0,
            found,
        })
    }

    async fn get_vacancy_detail(&self, external_id: &str) -> Result<VacancyDetail> {
        *self
            .detail_calls
            .lock()
            .unwrap()
            .entry(external_id.to_string())
            .or_insert(0) += 1;

        if self.not_found.lock().unwrap().contains(external_id) {
            return Err(Error::NotFound(format!("vacancy {} not found", external_id)));
        }
        {
            let mut failures = self.fail_detail_times.lock().unwrap();
            if let Some(remaining) = failures.get_mut(external_id) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(Error::Internal(format!(
                        "injected failure for {}",
                        external_id
                    )));
                }
            }
        }
        self.details
            .lock()
            .unwrap()
            .get(external_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("vacancy {} not found", external_id)))
    }

    async fn get_employer_detail(&self, external_id: &str) -> Result<EmployerDetail> {
        self.employers
            .lock()
            .unwrap()
            .get(external_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("employer {} not found", external_id)))
    }
}

/// Notification sink that records every send.
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent_to(&self, recipient: &str) -> Vec<(String, String, String)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, _, r)| r == recipient)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, subject: &str, html_body: &str, recipient: &str) -> Result<()> {
        self.sent.lock().unwrap().push((
            subject.to_string(),
            html_body.to_string(),
            recipient.to_string(),
        ));
        Ok(())
    }
}

pub fn named(id: &str, name: &str) -> NamedRef {
    NamedRef {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn listing(external_id: &str, employer_id: &str) -> VacancyListing {
    VacancyListing {
        id: external_id.to_string(),
        name: format!("Vacancy {}", external_id),
        archived: false,
        employer: Some(EmployerRef {
            id: Some(employer_id.to_string()),
            name: format!("Employer {}", employer_id),
            employer_rating: None,
        }),
        published_at: Some("2025-07-01T10:00:00+0300".to_string()),
    }
}

pub fn detail(external_id: &str, skills: &[&str], salary: Option<(i64, i64)>) -> VacancyDetail {
    VacancyDetail {
        id: external_id.to_string(),
        name: format!("Vacancy {}", external_id),
        archived: false,
        experience: Some(named("between1And3", "От 1 года до 3 лет")),
        professional_roles: vec![named("96", "Программист, разработчик")],
        employment_form: Some(named("FULL", "Полная")),
        working_hours: vec![named("HOURS_8", "8 часов")],
        work_format: vec![named("REMOTE", "Удалённо")],
        work_schedule_by_days: vec![named("FIVE_ON_TWO_OFF", "5/2")],
        key_skills: skills
            .iter()
            .map(|s| KeySkillRef {
                name: s.to_string(),
            })
            .collect(),
        salary_range: salary.map(|(from, to)| SalaryRange {
            from: Some(from.into()),
            to: Some(to.into()),
            currency: Some("RUR".to_string()),
            mode: Some(named("MONTH", "За месяц")),
        }),
        initial_created_at: Some("2025-06-20T09:00:00+0300".to_string()),
        published_at: Some("2025-07-01T10:00:00+0300".to_string()),
    }
}

pub fn archived_detail(external_id: &str) -> VacancyDetail {
    VacancyDetail {
        archived: true,
        ..detail(external_id, &[], None)
    }
}

pub fn employer_detail(name: &str) -> EmployerDetail {
    EmployerDetail {
        id: None,
        name: Some(name.to_string()),
        area: Some(vacancy_analytics_backend::dto::hh_dto::AreaRef {
            name: Some("Москва".to_string()),
        }),
        open_vacancies: Some(5),
        accredited_it_employer: true,
        industries: vec![named("7", "Информационные технологии")],
    }
}
