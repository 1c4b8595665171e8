//! Intermediate representation types for the vmbridge generator.
//!
//! This crate provides the frozen model that every backend consumes. It is
//! built once per generation run from a symbol snapshot and is never mutated
//! afterwards.
//!
//! # Architecture
//!
//! ```text
//! *.cs (declarations) → vmbridge-source (symbols) → vmbridge-codegen (pipeline)
//!     → vmbridge-ir (frozen model) → backends (proto, C#, TypeScript)
//! ```
//!
//! The IR types are designed to be:
//! - Target-agnostic (no proto/C#/TypeScript rendering concerns)
//! - Immutable once built, so backends can read them concurrently
//! - Self-contained (no dependencies beyond serde)

mod connection;
mod model;
mod types;
mod wire;

pub use connection::{ConnectionEvent, ConnectionState, TRANSITIONS, Transition};
pub use model::{
    AUXILIARY_MESSAGES, CommandDescriptor, FIXED_RPCS, MessageDescriptor, ModelIR, ModelMeta,
    ParameterDescriptor, PropertyDescriptor, ViewModelDescriptor,
};
pub use types::{TypeKind, TypeRef};
pub use wire::{ScalarKind, WellKnownKind, WireType};
