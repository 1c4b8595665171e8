//! C# generators for vmbridge.
//!
//! # Usage
//!
//! ```ignore
//! use vmbridge_codegen::Backend;
//! use vmbridge_codegen_csharp::{ClientGenerator, ServerGenerator};
//!
//! ServerGenerator.generate(&ir, Path::new("generated"))?;
//! ClientGenerator.generate(&ir, Path::new("generated"))?;
//! ```
//!
//! # Generated Output
//!
//! - `server/<Name>GrpcServiceImpl.cs` - service implementation that adapts
//!   the live view model to the generated service base class
//! - `client/<Name>RemoteClient.cs` - observable proxy with connection
//!   tracking, change subscription and command wrappers

mod convert;
mod generator;

pub mod files;

pub use generator::{ClientGenerator, ServerGenerator};
