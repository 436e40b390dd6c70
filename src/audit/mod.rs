//! Append-only security audit log.

pub mod error;
pub mod log;
pub mod query;
pub mod types;

pub use error::AuditError;
pub use log::{AuditEvent, AuditLog};
pub use query::AuditQuery;
pub use types::{AuditAction, AuditLogEntry, AuditResult};
