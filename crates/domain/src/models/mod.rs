//! Domain models for the media catalog.

pub mod audit_log;
pub mod catalog_item;

pub use audit_log::{
    AuditDetails, AuditRecord, AuditStatus, FieldChange, HistoryEntry, HistoryEntryType,
    ImageField, NewAuditRecord, UNKNOWN_SOURCE,
};
pub use catalog_item::{CatalogItem, CreateCatalogItemRequest, FieldSet, MediaType};
