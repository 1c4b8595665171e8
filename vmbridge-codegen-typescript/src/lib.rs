//! TypeScript grpc-web client generator for vmbridge.
//!
//! The generated proxy expects the schema to be compiled with
//! `protoc-gen-js` (`import_style=commonjs`) and `protoc-gen-grpc-web`
//! (`import_style=typescript`, `mode=grpcwebtext`) into the same directory.
//!
//! # Usage
//!
//! ```ignore
//! use vmbridge_codegen::Backend;
//! use vmbridge_codegen_typescript::Generator;
//!
//! Generator.generate(&ir, Path::new("generated"))?;
//! ```
//!
//! # Generated Output
//!
//! - `ts/<Name>RemoteClient.ts` - proxy with typed state, change listeners,
//!   connection tracking and one method per command

mod generator;
mod naming;
mod types;

pub mod ast;
pub mod files;

pub use ast::Import;
pub use generator::Generator;
