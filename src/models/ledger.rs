use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One HR communication, appended to a bucket and never edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailRecord {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// The three outcome categories mail history is grouped under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusBucket {
    Selected,
    Rejected,
    Interview,
}

impl StatusBucket {
    /// Fixed iteration order; the scan path prefers the later bucket on
    /// timestamp ties.
    pub const ALL: [StatusBucket; 3] = [
        StatusBucket::Selected,
        StatusBucket::Rejected,
        StatusBucket::Interview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusBucket::Selected => "Selected",
            StatusBucket::Rejected => "Rejected",
            StatusBucket::Interview => "Interview",
        }
    }

    pub fn parse(s: &str) -> Option<StatusBucket> {
        match s {
            "Selected" => Some(StatusBucket::Selected),
            "Rejected" => Some(StatusBucket::Rejected),
            "Interview" => Some(StatusBucket::Interview),
            _ => None,
        }
    }
}

/// Derived hiring status of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Pending,
    Selected,
    Rejected,
    Interview,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Selected => "Selected",
            Status::Rejected => "Rejected",
            Status::Interview => "Interview",
        }
    }

    pub fn parse(s: &str) -> Option<Status> {
        match s {
            "Pending" => Some(Status::Pending),
            "Selected" => Some(Status::Selected),
            "Rejected" => Some(Status::Rejected),
            "Interview" => Some(Status::Interview),
            _ => None,
        }
    }
}

impl From<StatusBucket> for Status {
    fn from(bucket: StatusBucket) -> Self {
        match bucket {
            StatusBucket::Selected => Status::Selected,
            StatusBucket::Rejected => Status::Rejected,
            StatusBucket::Interview => Status::Interview,
        }
    }
}

/// Per-application HR history: three append-only mail buckets plus a
/// denormalized latest-status cache refreshed on every append. At most one
/// entry exists per application; absence means Pending.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HrLedgerEntry {
    pub id: Uuid,
    pub application_id: Uuid,
    /// Legacy plain status, kept for entries written before the cache
    /// columns existed.
    pub status: Option<String>,
    pub latest_status: Option<String>,
    pub latest_status_at: Option<DateTime<Utc>>,
    pub selected_mails: Json<Vec<MailRecord>>,
    pub rejected_mails: Json<Vec<MailRecord>>,
    pub interview_mails: Json<Vec<MailRecord>>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HrLedgerEntry {
    pub fn bucket(&self, bucket: StatusBucket) -> &[MailRecord] {
        match bucket {
            StatusBucket::Selected => &self.selected_mails,
            StatusBucket::Rejected => &self.rejected_mails,
            StatusBucket::Interview => &self.interview_mails,
        }
    }
}
