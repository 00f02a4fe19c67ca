use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::ledger::{HrLedgerEntry, MailRecord, StatusBucket};

/// Persistence seam for the HR status ledger.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn find_by_application(&self, application_id: Uuid) -> Result<Option<HrLedgerEntry>>;
    /// Batch lookup for a page of applications; one round trip.
    async fn find_by_applications(&self, application_ids: &[Uuid]) -> Result<Vec<HrLedgerEntry>>;
    /// Appends the mail to the given bucket and refreshes the latest-status
    /// cache as a single atomic upsert, so a concurrent reader never sees
    /// history and cache out of sync.
    async fn append_and_refresh(
        &self,
        application_id: Uuid,
        bucket: StatusBucket,
        mail: MailRecord,
    ) -> Result<HrLedgerEntry>;
}

#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn find_by_application(&self, application_id: Uuid) -> Result<Option<HrLedgerEntry>> {
        let entry = sqlx::query_as::<_, HrLedgerEntry>(
            "SELECT * FROM hr_ledger_entries WHERE application_id = $1",
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn find_by_applications(&self, application_ids: &[Uuid]) -> Result<Vec<HrLedgerEntry>> {
        let entries = sqlx::query_as::<_, HrLedgerEntry>(
            "SELECT * FROM hr_ledger_entries WHERE application_id = ANY($1)",
        )
        .bind(application_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn append_and_refresh(
        &self,
        application_id: Uuid,
        bucket: StatusBucket,
        mail: MailRecord,
    ) -> Result<HrLedgerEntry> {
        // Bucket name comes from our enum, never from input, so inlining the
        // column is safe. `||` appends to the jsonb array, keeping the
        // history ordered by insertion.
        let column = match bucket {
            StatusBucket::Selected => "selected_mails",
            StatusBucket::Rejected => "rejected_mails",
            StatusBucket::Interview => "interview_mails",
        };
        let sql = format!(
            r#"
            INSERT INTO hr_ledger_entries
                (application_id, status, latest_status, latest_status_at, {column})
            VALUES ($1, $2, $2, $3, $4)
            ON CONFLICT (application_id) DO UPDATE SET
                {column} = hr_ledger_entries.{column} || EXCLUDED.{column},
                status = EXCLUDED.status,
                latest_status = EXCLUDED.latest_status,
                latest_status_at = EXCLUDED.latest_status_at,
                updated_at = NOW()
            RETURNING *
            "#
        );
        let sent_at = mail.sent_at;
        let entry = sqlx::query_as::<_, HrLedgerEntry>(&sql)
            .bind(application_id)
            .bind(bucket.as_str())
            .bind(sent_at)
            .bind(Json(vec![mail]))
            .fetch_one(&self.pool)
            .await?;
        Ok(entry)
    }
}
