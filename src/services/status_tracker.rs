use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::error::Result;
use crate::models::status_history::{NewStatusHistory, TransitionKind};
use crate::models::vacancy::{Vacancy, VacancyStatus};
use crate::services::store::VacancyStore;

/// Active/Archived state machine with an append-only audit trail. Vacancies
/// can cycle between the two states indefinitely; every transition records the
/// whole-day duration spent in the previous state.
#[derive(Clone)]
pub struct StatusTracker {
    store: Arc<dyn VacancyStore>,
}

impl StatusTracker {
    pub fn new(store: Arc<dyn VacancyStore>) -> Self {
        Self { store }
    }

    /// Records the "first load" audit row for a vacancy that was just created.
    pub async fn record_initial_load(&self, vacancy: &Vacancy) -> Result<()> {
        self.store
            .insert_status_history(NewStatusHistory {
                vacancy_id: vacancy.id,
                prev_status: VacancyStatus::ABSENT_LABEL.to_string(),
                cur_status: VacancyStatus::Active.as_str().to_string(),
                created_at_prev_status: vacancy.created_at,
                created_at_cur_status: vacancy.created_at,
                duration_days: 0,
                type_changed: TransitionKind::InitialLoad,
            })
            .await
    }

    /// Active → Archived, confirmed by an upstream detail lookup. Returns
    /// whether a transition actually happened; repeated detection of an
    /// already-archived vacancy is a no-op, guarded by the most recent audit
    /// row rather than the status column alone.
    pub async fn archive(&self, vacancy: &Vacancy) -> Result<bool> {
        if let Some(last) = self.store.last_status_history(vacancy.id).await? {
            if last.type_changed == TransitionKind::Archived.as_str() {
                info!(external_id = %vacancy.external_id, "Vacancy is already archived");
                return Ok(false);
            }
        }

        self.transition(vacancy, VacancyStatus::Archived, TransitionKind::Archived)
            .await?;
        info!(external_id = %vacancy.external_id, "Vacancy archived");
        Ok(true)
    }

    /// Archived → Active, triggered when the vacancy reappears in a fetch.
    pub async fn revive(&self, vacancy: &Vacancy) -> Result<bool> {
        if !vacancy.is_archived() {
            return Ok(false);
        }
        if let Some(last) = self.store.last_status_history(vacancy.id).await? {
            if last.type_changed == TransitionKind::Revived.as_str() {
                return Ok(false);
            }
        }

        self.transition(vacancy, VacancyStatus::Active, TransitionKind::Revived)
            .await?;
        info!(external_id = %vacancy.external_id, "Vacancy revived");
        Ok(true)
    }

    async fn transition(
        &self,
        vacancy: &Vacancy,
        target: VacancyStatus,
        kind: TransitionKind,
    ) -> Result<()> {
        let now = Utc::now();
        let prev_started_at = vacancy.updated_at;
        let duration_days = (now - prev_started_at).num_days().max(0) as i32;

        self.store
            .insert_status_history(NewStatusHistory {
                vacancy_id: vacancy.id,
                prev_status: vacancy.status.clone(),
                cur_status: target.as_str().to_string(),
                created_at_prev_status: prev_started_at,
                created_at_cur_status: now,
                duration_days,
                type_changed: kind,
            })
            .await?;
        self.store.set_vacancy_status(vacancy.id, target, now).await?;
        Ok(())
    }
}
