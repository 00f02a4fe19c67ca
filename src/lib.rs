pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod query;
pub mod routes;
pub mod services;
pub mod stores;

use std::sync::Arc;

use sqlx::PgPool;

use crate::services::application_service::ApplicationService;
use crate::services::mail_service::MailService;
use crate::stores::application_store::{ApplicationStore, PgApplicationStore};
use crate::stores::ledger_store::{LedgerStore, PgLedgerStore};

#[derive(Clone)]
pub struct AppState {
    pub application_service: ApplicationService,
    pub mail_service: MailService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        Self::with_stores(
            Arc::new(PgApplicationStore::new(pool.clone())),
            Arc::new(PgLedgerStore::new(pool)),
            MailService::new(config.mail_relay_url.clone()),
        )
    }

    /// Wires the services over any store pair; route tests run against
    /// in-memory stores through this.
    pub fn with_stores(
        applications: Arc<dyn ApplicationStore>,
        ledger: Arc<dyn LedgerStore>,
        mail_service: MailService,
    ) -> Self {
        Self {
            application_service: ApplicationService::new(applications, ledger),
            mail_service,
        }
    }
}
