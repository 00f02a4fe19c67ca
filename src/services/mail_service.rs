use reqwest::Client;
use serde_json::json;

use crate::error::Result;

/// Outbound HR mail, delivered by POSTing to a relay webhook. SMTP itself
/// lives behind the relay; this service only hands messages over.
#[derive(Clone)]
pub struct MailService {
    client: Client,
    relay_url: Option<String>,
}

impl MailService {
    pub fn new(relay_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            relay_url,
        }
    }

    pub async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
        let Some(relay_url) = &self.relay_url else {
            tracing::info!(to, subject, "mail relay not configured, skipping send");
            return Ok(());
        };

        let payload = json!({
            "to": to,
            "subject": subject,
            "html": format!(
                "<div style=\"font-family: Arial, sans-serif; color: #333;\">{}</div>",
                html_body
            ),
        });

        let resp = self
            .client
            .post(relay_url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        tracing::debug!(to, status = %resp.status(), "mail handed to relay");
        Ok(())
    }

    /// Best-effort variant for notification mail that must never fail the
    /// surrounding request.
    pub async fn send_logged(&self, to: &str, subject: &str, html_body: &str) {
        if let Err(e) = self.send(to, subject, html_body).await {
            tracing::warn!(to, error = ?e, "failed to send notification mail");
        }
    }
}
