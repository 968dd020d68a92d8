use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::error::Result;
use crate::services::store::VacancyStore;

/// Active/inactive skill associations per vacancy, preserving history of
/// additions and removals. At most one row exists per (vacancy, skill) pair;
/// it is toggled rather than duplicated.
#[derive(Clone)]
pub struct SkillLedger {
    store: Arc<dyn VacancyStore>,
}

impl SkillLedger {
    pub fn new(store: Arc<dyn VacancyStore>) -> Self {
        Self { store }
    }

    /// Reconciles the vacancy's active skill rows with the observed skill
    /// names. Afterwards the active set equals the observed set; vanished
    /// skills are deactivated, returning skills are reactivated in place.
    pub async fn sync<I, S>(&self, vacancy_id: i64, observed_names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let current_active = self.store.active_skill_ids(vacancy_id).await?;

        let mut observed_ids = HashSet::new();
        for name in observed_names {
            let name = name.as_ref();
            let skill_id = self.store.resolve_key_skill(name).await?;
            observed_ids.insert(skill_id);

            if current_active.contains(&skill_id) {
                continue;
            }
            match self.store.find_skill_history(vacancy_id, skill_id).await? {
                Some(row) => {
                    self.store
                        .set_skill_history_active(row.id, true, Utc::now())
                        .await?;
                    info!(vacancy_id, skill = name, "Key skill reactivated");
                }
                None => {
                    self.store.insert_skill_history(vacancy_id, skill_id).await?;
                    info!(vacancy_id, skill = name, "Key skill added");
                }
            }
        }

        for skill_id in current_active.difference(&observed_ids) {
            if let Some(row) = self.store.find_skill_history(vacancy_id, *skill_id).await? {
                self.store
                    .set_skill_history_active(row.id, false, Utc::now())
                    .await?;
                info!(vacancy_id, skill_id, "Key skill deactivated");
            }
        }

        Ok(())
    }
}
