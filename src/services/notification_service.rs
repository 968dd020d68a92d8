use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::info;

use crate::error::{Error, Result};

/// Outbound notification channel. Delivery failures are the caller's to log;
/// the reconciliation engine never lets them abort a run.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, subject: &str, html_body: &str, recipient: &str) -> Result<()>;
}

/// Posts rendered emails to a mail-relay webhook which handles the actual
/// SMTP/provider delivery.
#[derive(Clone)]
pub struct MailerService {
    client: Client,
    webhook_url: String,
}

impl MailerService {
    pub fn new(webhook_url: String, client: Client) -> Self {
        Self { client, webhook_url }
    }
}

#[async_trait]
impl NotificationSink for MailerService {
    async fn send(&self, subject: &str, html_body: &str, recipient: &str) -> Result<()> {
        let payload = json!({
            "to": recipient,
            "subject": subject,
            "html": html_body,
        });

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Internal(format!(
                "Mail relay responded with status {}",
                response.status()
            )));
        }

        info!(recipient, subject, "Notification email dispatched");
        Ok(())
    }
}
