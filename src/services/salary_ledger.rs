use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use crate::dto::hh_dto::SalaryRange;
use crate::error::Result;
use crate::models::salary_history::NewSalaryHistory;
use crate::services::store::VacancyStore;

pub const DEFAULT_CURRENCY: &str = "RUB";

/// Normalized salary fields as observed on a single fetch, compared against
/// the current active ledger row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryObservation {
    pub salary_from: Option<Decimal>,
    pub salary_to: Option<Decimal>,
    pub currency: String,
    pub mode_id: Option<String>,
    pub mode_name: Option<String>,
}

impl SalaryObservation {
    pub fn from_range(range: Option<&SalaryRange>) -> Self {
        let currency = range
            .and_then(|r| r.currency.clone())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        Self {
            salary_from: range.and_then(|r| r.from),
            salary_to: range.and_then(|r| r.to),
            currency,
            mode_id: range.and_then(|r| r.mode.as_ref()).map(|m| m.id.clone()),
            mode_name: range.and_then(|r| r.mode.as_ref()).map(|m| m.name.clone()),
        }
    }

    pub fn has_value(&self) -> bool {
        self.salary_from.is_some() || self.salary_to.is_some()
    }

    fn into_row(self, vacancy_id: i64) -> NewSalaryHistory {
        NewSalaryHistory {
            vacancy_id,
            salary_from: self.salary_from,
            salary_to: self.salary_to,
            currency: self.currency,
            mode_id: self.mode_id,
            mode_name: self.mode_name,
        }
    }
}

/// Append-only salary timeline with at most one active row per vacancy.
#[derive(Clone)]
pub struct SalaryLedger {
    store: Arc<dyn VacancyStore>,
}

impl SalaryLedger {
    pub fn new(store: Arc<dyn VacancyStore>) -> Self {
        Self { store }
    }

    /// Records an observation. Identical to the current active row → no-op;
    /// different → the active row is deactivated and a fresh active row is
    /// inserted; no active row → a fresh active row is inserted. Nothing is
    /// ever deleted.
    pub async fn observe(&self, vacancy_id: i64, observed: SalaryObservation) -> Result<()> {
        let current = self.store.active_salary(vacancy_id).await?;

        match current {
            Some(row) => {
                let unchanged = row.salary_from == observed.salary_from
                    && row.salary_to == observed.salary_to
                    && row.currency == observed.currency
                    && row.mode_id == observed.mode_id
                    && row.mode_name == observed.mode_name;
                if unchanged {
                    return Ok(());
                }
                self.store.deactivate_salary(row.id, Utc::now()).await?;
                self.store.insert_salary(observed.into_row(vacancy_id)).await?;
                info!(vacancy_id, "Salary history updated");
            }
            None => {
                self.store.insert_salary(observed.into_row(vacancy_id)).await?;
                info!(vacancy_id, "Salary history started");
            }
        }
        Ok(())
    }
}
