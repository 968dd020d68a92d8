use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::dto::hh_dto::{EmployerDetail, VacancyDetail, VacancyPage};
use crate::error::{Error, Result};
use crate::services::source::VacancySource;

/// reqwest-backed client for the HH public API.
#[derive(Clone)]
pub struct HhClient {
    client: Client,
    base_url: String,
}

impl HhClient {
    pub fn new(base_url: String, client: Client) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "HH API request");
        let response = self.client.get(&url).query(params).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("{} not found on source", path)));
        }
        let response = response.error_for_status()?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl VacancySource for HhClient {
    async fn list_vacancies(
        &self,
        text: &str,
        page: u32,
        per_page: u32,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> Result<VacancyPage> {
        let mut params = vec![
            ("text", text.to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        if let Some(from) = date_from {
            params.push(("date_from", from.to_string()));
        }
        if let Some(to) = date_to {
            params.push(("date_to", to.to_string()));
        }
        self.get_json("vacancies", &params).await
    }

    async fn get_vacancy_detail(&self, external_id: &str) -> Result<VacancyDetail> {
        self.get_json(&format!("vacancies/{}", external_id), &[]).await
    }

    async fn get_employer_detail(&self, external_id: &str) -> Result<EmployerDetail> {
        self.get_json(&format!("employers/{}", external_id), &[]).await
    }
}
