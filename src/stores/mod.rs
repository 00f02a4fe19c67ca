pub mod application_store;
pub mod ledger_store;
