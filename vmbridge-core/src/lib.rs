//! Core utilities and types for the vmbridge generator.
//!
//! This crate provides the naming helpers shared by every backend and the
//! file-writing primitives used when artifacts are materialized on disk.

mod file;
mod naming;

// File operations
pub use file::{File, FileRules, GeneratedFile, Overwrite, WriteResult};
// Naming helpers
pub use naming::{
    field_to_property_name, strip_async_suffix, to_camel_case, to_pascal_case, to_snake_case,
};
