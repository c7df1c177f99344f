//! Shared utilities and common types for the media catalog backend.
//!
//! This crate provides functionality used across the other crates:
//! - Common validation logic for catalog input

pub mod validation;
