//! Model extraction and shared code generation utilities for vmbridge.
//!
//! This crate turns a loaded [`vmbridge_source::SymbolTable`] into the frozen
//! [`vmbridge_ir::ModelIR`] and provides the pieces every backend shares.
//!
//! # Module Organization
//!
//! - [`pipeline`] - Phases (harvest → resolve → lower), diagnostics, context
//! - [`harvest`] - Member enumeration over ancestors and interfaces
//! - [`attributes`] - Marker attribute matching
//! - [`closure`] - Dependent-type closure resolution
//! - [`mapper`] - Host type → wire type mapping
//! - [`wrappers`] - Pack/unpack table for single values
//! - [`builder`] - Code generation building blocks
//! - [`testing`] - Test utilities (feature-gated)

pub mod attributes;
mod backend;
pub mod builder;
pub mod closure;
mod error;
pub mod harvest;
pub mod mapper;
pub mod pipeline;
pub mod wrappers;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use attributes::Marker;
pub use backend::{Backend, GENERATED_HEADER, PreviewFile};
pub use builder::{CodeBuilder, Indent};
pub use error::CodegenError;
pub use mapper::TypeMapper;
pub use wrappers::Wrapper;
