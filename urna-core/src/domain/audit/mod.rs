pub mod types;

pub use types::{Actor, AuditEntry, AuditEvent};
