pub mod audit_service;
pub mod export_service;
pub mod import_service;
pub mod report_service;

pub use audit_service::AuditRecorder;
