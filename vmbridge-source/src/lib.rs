//! Declaration sources for the vmbridge generator.
//!
//! This crate turns C#-style view-model declarations into a [`SymbolTable`]:
//! it lexes and parses source files, links declarations into an arena with
//! explicit base and interface edges, binds written types to
//! [`vmbridge_ir::TypeRef`]s and discovers dependent type sources on disk.
//! It also loads the `vmbridge.toml` configuration.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod binder;
pub mod builtins;
mod config;
mod error;
mod lexer;
mod locate;
mod parser;
mod symbols;
pub mod syntax;

pub use binder::{bind, is_declared};
pub use config::{CONFIG_FILE, Config, GenerateConfig, MarkerConfig, ProjectConfig};
pub use error::{Error, Result, SourceContext};
pub use locate::{
    DirectoryLocator, MemoryLocator, SOURCE_EXTENSION, TypeSourceLocator, collect_sources,
};
pub use parser::{parse_file, parse_source};
pub use symbols::{DuplicateDefinition, Scope, SymbolTable, TypeDecl, TypeId};
