//! Domain services for the media catalog.
//!
//! Services contain business logic that operates on domain models.

pub mod audit;
pub mod audit_store;
pub mod diff;

pub use audit::{ChangeAuditLog, DEFAULT_HISTORY_LIMIT};
pub use audit_store::{AuditStore, CatalogLookup, InMemoryAuditStore};
pub use diff::{shallow_diff, shallow_eq};
