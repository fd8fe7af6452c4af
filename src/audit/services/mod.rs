//! Application services for the audit trail.

mod recorder;

pub use recorder::AuditRecorder;
