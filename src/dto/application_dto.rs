use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::application::Application;
use crate::models::ledger::Status;

/// An application merged at read time with its resolved status. Never
/// persisted in this form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedApplication {
    #[serde(flatten)]
    pub application: Application,
    pub status: Status,
    pub status_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListApplicationsResponse {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub data: Vec<AnnotatedApplication>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub application_id: Uuid,
    #[validate(email)]
    pub to: String,
    pub subject: String,
    pub message: String,
    /// One of Selected / Rejected / Interview; anything else falls back to
    /// Interview, matching the long-standing UI contract.
    pub status: Option<String>,
}

/// Counts grouped by the applying-for category, fixed keys plus total.
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct ApplicationCounts {
    #[serde(rename = "Teaching")]
    pub teaching: i64,
    #[serde(rename = "Non Teaching")]
    pub non_teaching: i64,
    #[serde(rename = "Admin")]
    pub admin: i64,
    pub total: i64,
}

#[derive(Debug, Deserialize)]
pub struct SelectedIdsQuery {
    /// Comma-separated application ids.
    pub ids: String,
}
