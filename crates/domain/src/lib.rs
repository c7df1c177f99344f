//! Domain layer for the media catalog backend.
//!
//! This crate contains:
//! - Domain models (CatalogItem, audit records, field changes)
//! - The change audit log service and its storage seams
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::DomainError;
