pub mod application_service;
pub mod export_service;
pub mod mail_service;
pub mod status;
