//! Read-only interface over the upstream vacancy API.

use async_trait::async_trait;

use crate::dto::hh_dto::{EmployerDetail, VacancyDetail, VacancyPage};
use crate::error::Result;

#[async_trait]
pub trait VacancySource: Send + Sync {
    /// One page of the paginated listing for a free-text query.
    async fn list_vacancies(
        &self,
        text: &str,
        page: u32,
        per_page: u32,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> Result<VacancyPage>;

    /// Full detail payload for a single vacancy. A vacancy the source no
    /// longer knows about surfaces as [`crate::error::Error::NotFound`],
    /// which callers must treat as distinct from transient failures.
    async fn get_vacancy_detail(&self, external_id: &str) -> Result<VacancyDetail>;

    async fn get_employer_detail(&self, external_id: &str) -> Result<EmployerDetail>;
}
