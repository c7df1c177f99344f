//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod audit_record;
pub mod catalog_item;

pub use audit_record::AuditRecordEntity;
pub use catalog_item::CatalogItemEntity;
