use std::sync::Arc;

use tracing::info;

use crate::dto::hh_dto::{parse_rating, EmployerDetail, EmployerRef, NamedRef};
use crate::error::{Error, Result};
use crate::models::dimension::DimensionKind;
use crate::models::employer::NewEmployer;
use crate::services::store::VacancyStore;

/// Maps external taxonomy refs to internal dimension ids, creating rows on
/// first sight. Idempotence and duplicate protection under concurrent writers
/// live in the store (unique external-id columns, conflict-as-exists insert).
#[derive(Clone)]
pub struct ReferenceDataResolver {
    store: Arc<dyn VacancyStore>,
}

impl ReferenceDataResolver {
    pub fn new(store: Arc<dyn VacancyStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, kind: DimensionKind, item: &NamedRef) -> Result<i64> {
        self.store.resolve_dimension(kind, &item.id, &item.name).await
    }

    pub async fn resolve_all(&self, kind: DimensionKind, items: &[NamedRef]) -> Result<Vec<i64>> {
        let mut ids = Vec::with_capacity(items.len());
        for item in items {
            ids.push(self.resolve(kind, item).await?);
        }
        Ok(ids)
    }
}

/// Upserts employer rows keyed by external id. The rating/accreditation
/// snapshot is captured at creation time only and never refreshed; industry
/// links are populated at creation time.
#[derive(Clone)]
pub struct EmployerResolver {
    store: Arc<dyn VacancyStore>,
    references: ReferenceDataResolver,
}

impl EmployerResolver {
    pub fn new(store: Arc<dyn VacancyStore>) -> Self {
        let references = ReferenceDataResolver::new(store.clone());
        Self { store, references }
    }

    pub async fn resolve(
        &self,
        employer_ref: &EmployerRef,
        detail: &EmployerDetail,
    ) -> Result<i64> {
        let external_id = employer_ref
            .id
            .as_deref()
            .ok_or_else(|| Error::SourcePayload("employer without external id".to_string()))?;

        if let Some(id) = self.store.find_employer_id(external_id).await? {
            return Ok(id);
        }

        let (total_rating, reviews_count) = parse_rating(employer_ref.employer_rating.as_ref());
        let area = detail.area.as_ref().and_then(|a| a.name.clone());

        let employer_id = self
            .store
            .insert_employer(NewEmployer {
                id_external: external_id.to_string(),
                name: employer_ref.name.clone(),
                area,
                accredited_it_employer: detail.accredited_it_employer,
                open_vacancies: detail.open_vacancies.unwrap_or(0),
                total_rating,
                reviews_count,
            })
            .await?;
        info!(external_id, employer_id, "Employer created");

        for industry in &detail.industries {
            let industry_id = self
                .references
                .resolve(DimensionKind::Industry, industry)
                .await?;
            self.store
                .link_employer_industry(employer_id, industry_id)
                .await?;
        }

        Ok(employer_id)
    }
}
