use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use recruitment_intake::error::Result;
use recruitment_intake::models::application::{Application, NewApplication};
use recruitment_intake::models::ledger::{HrLedgerEntry, MailRecord, StatusBucket};
use recruitment_intake::query::predicate::Predicate;
use recruitment_intake::stores::application_store::ApplicationStore;
use recruitment_intake::stores::ledger_store::LedgerStore;

/// In-memory application store driven by the predicate's reference matching
/// semantics. Insertion order maps to strictly increasing timestamps so the
/// newest-first sort is deterministic.
#[derive(Default)]
pub struct InMemoryApplicationStore {
    rows: Mutex<Vec<Application>>,
    seq: AtomicI64,
}

impl InMemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts with an explicit timestamp, so tests can force creation-time
    /// ties.
    pub fn insert_at(&self, new: NewApplication, created_at: DateTime<Utc>) -> Application {
        let app = Application::from_new(new, Uuid::new_v4(), created_at);
        self.rows.lock().unwrap().push(app.clone());
        app
    }
}

#[async_trait]
impl ApplicationStore for InMemoryApplicationStore {
    async fn insert(&self, new: NewApplication) -> Result<Application> {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        let created_at = Utc.timestamp_opt(1_700_000_000 + seq, 0).unwrap();
        let app = Application::from_new(new, Uuid::new_v4(), created_at);
        self.rows.lock().unwrap().push(app.clone());
        Ok(app)
    }

    async fn find(
        &self,
        predicate: &Predicate,
        skip: i64,
        limit: Option<i64>,
    ) -> Result<Vec<Application>> {
        let rows = self.rows.lock().unwrap();
        let mut matched: Vec<Application> = rows
            .iter()
            .filter(|app| predicate.matches(app))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        let matched = matched.into_iter().skip(skip.max(0) as usize);
        Ok(match limit {
            Some(limit) => matched.take(limit.max(0) as usize).collect(),
            None => matched.collect(),
        })
    }

    async fn count(&self, predicate: &Predicate) -> Result<i64> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|app| predicate.matches(app)).count() as i64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|app| app.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Application>> {
        let rows = self.rows.lock().unwrap();
        let mut matched: Vec<Application> = rows
            .iter()
            .filter(|app| ids.contains(&app.id))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(matched)
    }

    async fn counts_by_applying_for(&self) -> Result<Vec<(String, i64)>> {
        let rows = self.rows.lock().unwrap();
        let mut counts: Vec<(String, i64)> = Vec::new();
        for app in rows.iter() {
            let key = app.applying_for.clone().unwrap_or_default();
            match counts.iter_mut().find(|(k, _)| *k == key) {
                Some((_, n)) => *n += 1,
                None => counts.push((key, 1)),
            }
        }
        Ok(counts)
    }

    async fn delete_duplicates(&self) -> Result<u64> {
        let mut rows = self.rows.lock().unwrap();
        let mut kept: Vec<Application> = Vec::new();
        let mut removed = 0u64;
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        for app in rows.drain(..) {
            let duplicate = kept.iter().any(|k| {
                k.full_name == app.full_name && k.mobile_number == app.mobile_number
            });
            if duplicate {
                removed += 1;
            } else {
                kept.push(app);
            }
        }
        *rows = kept;
        Ok(removed)
    }
}

/// In-memory ledger store; counts batch lookups so tests can assert the
/// page-bounded access pattern.
#[derive(Default)]
pub struct InMemoryLedgerStore {
    entries: Mutex<Vec<HrLedgerEntry>>,
    pub batch_lookups: AtomicUsize,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch_lookup_count(&self) -> usize {
        self.batch_lookups.load(Ordering::SeqCst)
    }

    /// Drops the denormalized cache of every entry, forcing the scan path.
    pub fn clear_caches(&self) {
        let mut entries = self.entries.lock().unwrap();
        for entry in entries.iter_mut() {
            entry.latest_status = None;
            entry.latest_status_at = None;
        }
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn find_by_application(&self, application_id: Uuid) -> Result<Option<HrLedgerEntry>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .find(|e| e.application_id == application_id)
            .cloned())
    }

    async fn find_by_applications(&self, application_ids: &[Uuid]) -> Result<Vec<HrLedgerEntry>> {
        self.batch_lookups.fetch_add(1, Ordering::SeqCst);
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .filter(|e| application_ids.contains(&e.application_id))
            .cloned()
            .collect())
    }

    async fn append_and_refresh(
        &self,
        application_id: Uuid,
        bucket: StatusBucket,
        mail: MailRecord,
    ) -> Result<HrLedgerEntry> {
        let mut entries = self.entries.lock().unwrap();
        let now = Utc::now();
        let entry = match entries.iter_mut().find(|e| e.application_id == application_id) {
            Some(entry) => entry,
            None => {
                entries.push(HrLedgerEntry {
                    id: Uuid::new_v4(),
                    application_id,
                    status: None,
                    latest_status: None,
                    latest_status_at: None,
                    selected_mails: Json(vec![]),
                    rejected_mails: Json(vec![]),
                    interview_mails: Json(vec![]),
                    remarks: None,
                    created_at: now,
                    updated_at: now,
                });
                entries.last_mut().unwrap()
            }
        };

        let sent_at = mail.sent_at;
        match bucket {
            StatusBucket::Selected => entry.selected_mails.push(mail),
            StatusBucket::Rejected => entry.rejected_mails.push(mail),
            StatusBucket::Interview => entry.interview_mails.push(mail),
        }
        entry.status = Some(bucket.as_str().to_string());
        entry.latest_status = Some(bucket.as_str().to_string());
        entry.latest_status_at = Some(sent_at);
        entry.updated_at = now;
        Ok(entry.clone())
    }
}

/// A minimal application with just the fields the query tests care about.
pub fn new_application(full_name: &str, experience: f64) -> NewApplication {
    NewApplication {
        full_name: Some(full_name.to_string()),
        total_work_experience: experience,
        ..NewApplication::default()
    }
}
