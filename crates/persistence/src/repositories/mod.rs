//! Repository implementations for database operations.

pub mod audit_record;
pub mod catalog_item;

pub use audit_record::AuditRecordRepository;
pub use catalog_item::CatalogItemRepository;
