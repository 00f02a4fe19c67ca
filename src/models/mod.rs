pub mod application;
pub mod ledger;
