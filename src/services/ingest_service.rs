//! Reconciliation engine. Drives the fetch → classify → persist pipeline for
//! one search query at a time: new vacancies are created through the resolver
//! and ledger collaborators, vacancies missing from the fetch are checked
//! against the live API before any archival, and every run ends with a report
//! no matter how many individual items failed along the way.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::dto::hh_dto::{parse_source_datetime, KeySkillRef, NamedRef, VacancyListing};
use crate::error::{Error, Result};
use crate::models::dimension::DimensionKind;
use crate::models::search_query::SearchQuery;
use crate::models::vacancy::{NewVacancy, Vacancy, VacancyStatus};
use crate::services::notification_service::NotificationSink;
use crate::services::reference_service::{EmployerResolver, ReferenceDataResolver};
use crate::services::salary_ledger::{SalaryLedger, SalaryObservation};
use crate::services::skill_ledger::SkillLedger;
use crate::services::source::VacancySource;
use crate::services::status_tracker::StatusTracker;
use crate::services::store::VacancyStore;
use crate::utils::email::{render_admin_report, render_query_digest, DigestEntry};

/// Tunables for one engine instance. Production values come from the
/// environment; tests construct their own with zero pacing.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub per_page: u32,
    /// Delay between per-item API calls, the rate-limit backpressure policy.
    pub item_pace: Duration,
    /// Delay between listing-page fetches.
    pub page_pace: Duration,
    /// Attempts for the whole paginated fetch before the query run aborts.
    pub fetch_attempts: u32,
    pub admin_email: Option<String>,
    /// Where raw fetched batches are persisted as JSON, if anywhere.
    pub data_dir: Option<PathBuf>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            per_page: 20,
            item_pace: Duration::ZERO,
            page_pace: Duration::ZERO,
            fetch_attempts: 2,
            admin_email: None,
            data_dir: None,
        }
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub run_id: Uuid,
    pub query_id: i64,
    pub query_text: String,
    pub total_fetched: usize,
    pub added: usize,
    pub revived: usize,
    pub archived: usize,
    pub skipped_existing: usize,
    /// External ids that failed processing even after the retry pass.
    pub errored: Vec<String>,
    /// External ids absent from the fetch whose detail lookup returned 404.
    /// Never archived automatically, surfaced for manual review.
    pub missing_unknown_status: Vec<String>,
}

enum FetchOutcome {
    Added,
    Revived,
    Skipped,
}

enum MissingOutcome {
    Archived,
    AlreadyArchived,
    StillActive,
}

pub struct IngestService {
    store: Arc<dyn VacancyStore>,
    source: Arc<dyn VacancySource>,
    sink: Arc<dyn NotificationSink>,
    options: IngestOptions,
    references: ReferenceDataResolver,
    employers: EmployerResolver,
    salaries: SalaryLedger,
    skills: SkillLedger,
    statuses: StatusTracker,
}

impl IngestService {
    pub fn new(
        store: Arc<dyn VacancyStore>,
        source: Arc<dyn VacancySource>,
        sink: Arc<dyn NotificationSink>,
        options: IngestOptions,
    ) -> Self {
        Self {
            references: ReferenceDataResolver::new(store.clone()),
            employers: EmployerResolver::new(store.clone()),
            salaries: SalaryLedger::new(store.clone()),
            skills: SkillLedger::new(store.clone()),
            statuses: StatusTracker::new(store.clone()),
            store,
            source,
            sink,
            options,
        }
    }

    /// Processes every active search query sequentially. A failing query is
    /// logged and does not affect the others.
    pub async fn run_all(&self) -> Result<Vec<IngestReport>> {
        let queries = self.store.list_active_search_queries().await?;
        info!(count = queries.len(), "Starting ingestion pass");

        let mut reports = Vec::with_capacity(queries.len());
        for query in &queries {
            match self.run_query(query).await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    error!(query_id = query.id, error = ?e, "Search query run aborted");
                }
            }
        }
        Ok(reports)
    }

    /// Fetches the full listing for one query and reconciles it. A fetch that
    /// fails all its attempts aborts this query's run.
    pub async fn run_query(&self, query: &SearchQuery) -> Result<IngestReport> {
        let batch = self.fetch_all_pages(&query.query).await?;
        if let Err(e) = self.persist_raw_batch(query.id, &batch).await {
            warn!(query_id = query.id, error = ?e, "Failed to persist raw batch");
        }
        self.reconcile(query, &batch).await
    }

    async fn fetch_all_pages(&self, text: &str) -> Result<Vec<VacancyListing>> {
        let mut last_error = None;
        for attempt in 1..=self.options.fetch_attempts.max(1) {
            match self.fetch_pages_once(text).await {
                Ok(items) => return Ok(items),
                Err(e) => {
                    warn!(attempt, error = ?e, "Listing fetch failed");
                    last_error = Some(e);
                    sleep(self.options.page_pace).await;
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| Error::Internal("listing fetch produced no result".to_string())))
    }

    async fn fetch_pages_once(&self, text: &str) -> Result<Vec<VacancyListing>> {
        let mut items = Vec::new();
        let mut page = 0;
        loop {
            let chunk = self
                .source
                .list_vacancies(text, page, self.options.per_page, None, None)
                .await?;
            let pages = chunk.pages;
            items.extend(chunk.items);
            page += 1;
            if page >= pages {
                break;
            }
            sleep(self.options.page_pace).await;
        }
        Ok(items)
    }

    async fn persist_raw_batch(&self, query_id: i64, batch: &[VacancyListing]) -> Result<()> {
        let Some(dir) = &self.options.data_dir else {
            return Ok(());
        };
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!(
            "vacancies_query_{}_{}.json",
            query_id,
            Utc::now().format("%Y-%m-%d")
        ));
        let payload = serde_json::to_vec_pretty(batch)?;
        tokio::fs::write(&path, payload).await?;
        info!(query_id, path = %path.display(), "Raw batch persisted");
        Ok(())
    }

    /// Classifies the fetched batch against the store and drives the ledgers
    /// and the state machine. Always returns a report; per-item failures end
    /// up in its error buckets.
    pub async fn reconcile(
        &self,
        query: &SearchQuery,
        batch: &[VacancyListing],
    ) -> Result<IngestReport> {
        let mut report = IngestReport {
            run_id: Uuid::new_v4(),
            query_id: query.id,
            query_text: query.query.clone(),
            total_fetched: batch.len(),
            added: 0,
            revived: 0,
            archived: 0,
            skipped_existing: 0,
            errored: Vec::new(),
            missing_unknown_status: Vec::new(),
        };
        info!(run_id = %report.run_id, query_id = query.id, total = batch.len(), "Reconciliation started");

        let existing_ids = self.store.linked_external_ids(query.id).await?;
        let fetched_ids: HashSet<String> = batch.iter().map(|i| i.id.clone()).collect();
        let by_id: HashMap<&str, &VacancyListing> =
            batch.iter().map(|i| (i.id.as_str(), i)).collect();

        let mut digest: Vec<DigestEntry> = Vec::new();
        let mut skill_counts: HashMap<String, i64> = HashMap::new();

        for item in batch {
            match self
                .process_fetched(query, item, &mut digest, &mut skill_counts)
                .await
            {
                Ok(FetchOutcome::Added) => report.added += 1,
                Ok(FetchOutcome::Revived) => report.revived += 1,
                Ok(FetchOutcome::Skipped) => report.skipped_existing += 1,
                Err(e) => {
                    warn!(external_id = %item.id, error = ?e, "Failed to process fetched vacancy");
                    report.errored.push(item.id.clone());
                }
            }
            sleep(self.options.item_pace).await;
        }

        let mut missing: Vec<&String> = existing_ids.difference(&fetched_ids).collect();
        missing.sort();
        for external_id in missing {
            match self.check_missing(external_id).await {
                Ok(MissingOutcome::Archived) => report.archived += 1,
                Ok(MissingOutcome::AlreadyArchived) => report.skipped_existing += 1,
                Ok(MissingOutcome::StillActive) => {
                    info!(external_id = %external_id, "Missing from fetch but still active upstream");
                    report.skipped_existing += 1;
                }
                Err(e) if e.is_not_found() => {
                    warn!(external_id = %external_id, "Detail lookup returned 404, status unknown");
                    report.missing_unknown_status.push(external_id.clone());
                }
                Err(e) => {
                    warn!(external_id = %external_id, error = ?e, "Failed to check missing vacancy");
                    report.errored.push(external_id.clone());
                }
            }
            sleep(self.options.item_pace).await;
        }

        // One retry pass over failed ids, replayed from the in-memory batch.
        if !report.errored.is_empty() {
            let failed = std::mem::take(&mut report.errored);
            for external_id in failed {
                let Some(item) = by_id.get(external_id.as_str()) else {
                    report.errored.push(external_id);
                    continue;
                };
                match self
                    .process_fetched(query, item, &mut digest, &mut skill_counts)
                    .await
                {
                    Ok(FetchOutcome::Added) => report.added += 1,
                    Ok(FetchOutcome::Revived) => report.revived += 1,
                    Ok(FetchOutcome::Skipped) => report.skipped_existing += 1,
                    Err(e) => {
                        warn!(external_id = %external_id, error = ?e, "Retry failed");
                        report.errored.push(external_id);
                    }
                }
                sleep(self.options.item_pace).await;
            }
        }

        self.notify(query, &report, digest, skill_counts).await;
        info!(
            run_id = %report.run_id,
            added = report.added,
            revived = report.revived,
            archived = report.archived,
            skipped = report.skipped_existing,
            errored = report.errored.len(),
            unknown = report.missing_unknown_status.len(),
            "Reconciliation finished"
        );
        Ok(report)
    }

    /// One fetched listing item. Unknown vacancies are created in full;
    /// vacancies known under another query are attached to this one; archived
    /// vacancies that reappear are revived with refreshed ledgers.
    async fn process_fetched(
        &self,
        query: &SearchQuery,
        item: &VacancyListing,
        digest: &mut Vec<DigestEntry>,
        skill_counts: &mut HashMap<String, i64>,
    ) -> Result<FetchOutcome> {
        match self.store.find_vacancy_by_external_id(&item.id).await? {
            None => {
                self.create_vacancy(query, item, digest, skill_counts).await?;
                Ok(FetchOutcome::Added)
            }
            Some(vacancy) => {
                let was_linked = self
                    .store
                    .is_linked_to_search_query(query.id, vacancy.id)
                    .await?;
                if !was_linked {
                    self.store.link_search_query(query.id, vacancy.id).await?;
                    info!(external_id = %item.id, query_id = query.id, "Existing vacancy attached to query");
                }

                if vacancy.is_archived() {
                    self.revive_existing(&vacancy).await?;
                    Ok(FetchOutcome::Revived)
                } else if was_linked {
                    Ok(FetchOutcome::Skipped)
                } else {
                    Ok(FetchOutcome::Added)
                }
            }
        }
    }

    async fn create_vacancy(
        &self,
        query: &SearchQuery,
        item: &VacancyListing,
        digest: &mut Vec<DigestEntry>,
        skill_counts: &mut HashMap<String, i64>,
    ) -> Result<Vacancy> {
        let detail = self.source.get_vacancy_detail(&item.id).await?;
        let employer_ref = item.employer.as_ref().ok_or_else(|| {
            Error::SourcePayload(format!("vacancy {} has no employer", item.id))
        })?;
        let employer_external = employer_ref.id.as_deref().ok_or_else(|| {
            Error::SourcePayload(format!("vacancy {} employer has no id", item.id))
        })?;
        let employer_detail = self.source.get_employer_detail(employer_external).await?;
        let employer_id = self.employers.resolve(employer_ref, &employer_detail).await?;

        let experience = ref_or_unknown(detail.experience.as_ref());
        let role = first_or_unknown(&detail.professional_roles);
        let employment_form = ref_or_unknown(detail.employment_form.as_ref());
        let working_hours = first_or_unknown(&detail.working_hours);

        let experience_id = self
            .references
            .resolve(DimensionKind::Experience, &experience)
            .await?;
        let professional_role_id = self
            .references
            .resolve(DimensionKind::ProfessionalRole, &role)
            .await?;
        let employment_form_id = self
            .references
            .resolve(DimensionKind::EmploymentForm, &employment_form)
            .await?;
        let working_hours_id = self
            .references
            .resolve(DimensionKind::WorkingHours, &working_hours)
            .await?;

        let area = employer_detail.area.as_ref().and_then(|a| a.name.clone());
        let created_date = detail
            .initial_created_at
            .as_deref()
            .and_then(parse_source_datetime);
        let published_date = detail
            .published_at
            .as_deref()
            .or(item.published_at.as_deref())
            .and_then(parse_source_datetime);

        let vacancy = self
            .store
            .insert_vacancy(NewVacancy {
                external_id: item.id.clone(),
                title: detail.name.clone(),
                employer_id,
                area: area.clone(),
                experience_id,
                professional_role_id,
                employment_form_id,
                working_hours_id,
                status: VacancyStatus::Active,
                created_date,
                published_date,
            })
            .await?;

        self.statuses.record_initial_load(&vacancy).await?;
        self.store.link_search_query(query.id, vacancy.id).await?;

        for work_format_id in self
            .references
            .resolve_all(DimensionKind::WorkFormat, &detail.work_format)
            .await?
        {
            self.store.link_work_format(vacancy.id, work_format_id).await?;
        }
        for work_schedule_id in self
            .references
            .resolve_all(DimensionKind::WorkSchedule, &detail.work_schedule_by_days)
            .await?
        {
            self.store
                .link_work_schedule(vacancy.id, work_schedule_id)
                .await?;
        }

        let observation = SalaryObservation::from_range(detail.salary_range.as_ref());
        if observation.has_value() {
            self.salaries.observe(vacancy.id, observation).await?;
        }
        self.skills
            .sync(vacancy.id, detail.key_skills.iter().map(skill_name))
            .await?;
        for skill in &detail.key_skills {
            *skill_counts.entry(skill.name.clone()).or_insert(0) += 1;
        }

        digest.push(DigestEntry {
            external_id: item.id.clone(),
            title: detail.name.clone(),
            employer_name: employer_ref.name.clone(),
            employer_open_vacancies: employer_detail.open_vacancies.unwrap_or(0),
            area,
        });
        info!(external_id = %item.id, vacancy_id = vacancy.id, "Vacancy created");
        Ok(vacancy)
    }

    /// Revives an archived vacancy that reappeared in a fetch, refreshing the
    /// publication date and both history ledgers from a fresh detail payload.
    async fn revive_existing(&self, vacancy: &Vacancy) -> Result<()> {
        let detail = self.source.get_vacancy_detail(&vacancy.external_id).await?;
        self.statuses.revive(vacancy).await?;

        if let Some(published) = detail.published_at.as_deref().and_then(parse_source_datetime) {
            self.store
                .set_published_date(vacancy.id, Some(published))
                .await?;
        }

        let observation = SalaryObservation::from_range(detail.salary_range.as_ref());
        if observation.has_value() || self.store.active_salary(vacancy.id).await?.is_some() {
            self.salaries.observe(vacancy.id, observation).await?;
        }
        self.skills
            .sync(vacancy.id, detail.key_skills.iter().map(skill_name))
            .await?;
        Ok(())
    }

    /// A vacancy linked to the query but absent from the fetch. Only a live
    /// detail lookup confirming `archived` drives the state machine; a 404
    /// surfaces as [`Error::NotFound`] for the caller to bucket separately.
    async fn check_missing(&self, external_id: &str) -> Result<MissingOutcome> {
        let vacancy = self
            .store
            .find_vacancy_by_external_id(external_id)
            .await?
            .ok_or_else(|| {
                Error::Internal(format!("linked vacancy {} not found in store", external_id))
            })?;
        if vacancy.is_archived() {
            return Ok(MissingOutcome::AlreadyArchived);
        }

        let detail = self.source.get_vacancy_detail(external_id).await?;
        if detail.archived {
            if self.statuses.archive(&vacancy).await? {
                Ok(MissingOutcome::Archived)
            } else {
                Ok(MissingOutcome::AlreadyArchived)
            }
        } else {
            Ok(MissingOutcome::StillActive)
        }
    }

    /// Send failures are logged and never fail the run.
    async fn notify(
        &self,
        query: &SearchQuery,
        report: &IngestReport,
        mut digest: Vec<DigestEntry>,
        skill_counts: HashMap<String, i64>,
    ) {
        if !digest.is_empty() {
            digest.sort_by(|a, b| b.employer_open_vacancies.cmp(&a.employer_open_vacancies));
            let mut top_skills: Vec<(String, i64)> = skill_counts.into_iter().collect();
            top_skills.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            top_skills.truncate(10);

            let subject = format!("Новые вакансии по запросу «{}»", query.query);
            let html = render_query_digest(query, &digest, &top_skills);
            if let Err(e) = self.sink.send(&subject, &html, &query.email).await {
                warn!(query_id = query.id, error = ?e, "Failed to send subscriber digest");
            }
        }

        if let Some(admin) = &self.options.admin_email {
            let subject = format!("Отчёт о синхронизации вакансий: {}", query.query);
            let html = render_admin_report(report);
            if let Err(e) = self.sink.send(&subject, &html, admin).await {
                warn!(query_id = query.id, error = ?e, "Failed to send admin report");
            }
        }
    }
}

// A named fn instead of a closure: closures returning borrows are not
// inferred as higher-ranked over lifetimes when held across an await.
fn skill_name(skill: &KeySkillRef) -> &str {
    skill.name.as_str()
}

fn fallback_ref() -> NamedRef {
    NamedRef {
        id: "unknown".to_string(),
        name: "Не указано".to_string(),
    }
}

fn ref_or_unknown(item: Option<&NamedRef>) -> NamedRef {
    item.cloned().unwrap_or_else(fallback_ref)
}

fn first_or_unknown(items: &[NamedRef]) -> NamedRef {
    items.first().cloned().unwrap_or_else(fallback_ref)
}
