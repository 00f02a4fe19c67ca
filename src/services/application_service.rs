use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::dto::application_dto::{AnnotatedApplication, ApplicationCounts};
use crate::error::Result;
use crate::models::application::{Application, NewApplication};
use crate::models::ledger::{HrLedgerEntry, MailRecord, StatusBucket};
use crate::query::predicate::Predicate;
use crate::services::status::{self, ResolvedStatus};
use crate::stores::application_store::ApplicationStore;
use crate::stores::ledger_store::LedgerStore;

#[derive(Debug)]
pub struct PagedApplications {
    pub total: i64,
    pub total_pages: i64,
    pub items: Vec<AnnotatedApplication>,
}

/// The query orchestrator: every status-annotated read path (listing, single
/// fetch, export) goes through here, so one derivation algorithm serves them
/// all. Ledger lookups are batched per fetched page, never per matching set.
#[derive(Clone)]
pub struct ApplicationService {
    applications: Arc<dyn ApplicationStore>,
    ledger: Arc<dyn LedgerStore>,
}

impl ApplicationService {
    pub fn new(applications: Arc<dyn ApplicationStore>, ledger: Arc<dyn LedgerStore>) -> Self {
        Self {
            applications,
            ledger,
        }
    }

    pub async fn create(&self, new: NewApplication) -> Result<Application> {
        self.applications.insert(new).await
    }

    /// Count plus one bounded page, newest first. Count and fetch are
    /// independent operations; concurrent writes between them are accepted.
    pub async fn list(
        &self,
        predicate: &Predicate,
        page: i64,
        page_size: i64,
    ) -> Result<PagedApplications> {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let skip = (page - 1) * page_size;

        let total = self.applications.count(predicate).await?;
        let apps = self
            .applications
            .find(predicate, skip, Some(page_size))
            .await?;
        let items = self.annotate(apps).await?;

        Ok(PagedApplications {
            total,
            total_pages: (total + page_size - 1) / page_size,
            items,
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<AnnotatedApplication>> {
        let Some(app) = self.applications.find_by_id(id).await? else {
            return Ok(None);
        };
        let mut items = self.annotate(vec![app]).await?;
        Ok(items.pop())
    }

    /// Unbounded annotated fetch for the export collaborator. Zero matches
    /// come back as zero rows; any widening fallback is the caller's
    /// explicit decision (see [`Self::list_all_unfiltered`]).
    pub async fn export_rows(&self, predicate: &Predicate) -> Result<Vec<AnnotatedApplication>> {
        let apps = self.applications.find(predicate, 0, None).await?;
        self.annotate(apps).await
    }

    /// Deliberately named full dump. Callers opt into full-table latency.
    pub async fn list_all_unfiltered(&self) -> Result<Vec<AnnotatedApplication>> {
        self.export_rows(&Predicate::default()).await
    }

    pub async fn export_by_ids(&self, ids: &[Uuid]) -> Result<Vec<AnnotatedApplication>> {
        let apps = self.applications.find_by_ids(ids).await?;
        self.annotate(apps).await
    }

    pub async fn resolve_status(&self, application_id: Uuid) -> Result<ResolvedStatus> {
        let entry = self.ledger.find_by_application(application_id).await?;
        Ok(status::resolve(entry.as_ref()))
    }

    /// Appends one HR mail to the given bucket and refreshes the cached
    /// status, atomically at the store.
    pub async fn record_status_change(
        &self,
        application_id: Uuid,
        bucket: StatusBucket,
        to: String,
        subject: String,
        body: String,
    ) -> Result<HrLedgerEntry> {
        let mail = MailRecord {
            to,
            subject,
            body,
            sent_at: Utc::now(),
        };
        self.ledger
            .append_and_refresh(application_id, bucket, mail)
            .await
    }

    pub async fn counts_by_applying_for(&self) -> Result<ApplicationCounts> {
        let rows = self.applications.counts_by_applying_for().await?;
        let mut counts = ApplicationCounts::default();
        for (category, count) in rows {
            match category.as_str() {
                "Teaching" => counts.teaching = count,
                "Non Teaching" => counts.non_teaching = count,
                "Admin" => counts.admin = count,
                _ => {}
            }
            counts.total += count;
        }
        Ok(counts)
    }

    pub async fn remove_duplicates(&self) -> Result<u64> {
        self.applications.delete_duplicates().await
    }

    /// One batch ledger lookup sized to the page, then the shared resolver
    /// per record. Ids are matched in stable string form; output order is
    /// the store's order and every record carries a status.
    async fn annotate(&self, apps: Vec<Application>) -> Result<Vec<AnnotatedApplication>> {
        if apps.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = apps.iter().map(|a| a.id).collect();
        let entries = self.ledger.find_by_applications(&ids).await?;
        let by_id: HashMap<String, HrLedgerEntry> = entries
            .into_iter()
            .map(|e| (e.application_id.to_string(), e))
            .collect();

        Ok(apps
            .into_iter()
            .map(|app| {
                let resolved = status::resolve(by_id.get(&app.id.to_string()));
                AnnotatedApplication {
                    application: app,
                    status: resolved.status,
                    status_updated_at: resolved.status_updated_at,
                }
            })
            .collect())
    }
}
