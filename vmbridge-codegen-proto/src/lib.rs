//! Protocol Buffers schema generator for vmbridge.
//!
//! # Usage
//!
//! ```ignore
//! use vmbridge_codegen::Backend;
//! use vmbridge_codegen_proto::Generator;
//!
//! let files = Generator.preview(&ir);
//! Generator.generate(&ir, Path::new("generated"))?;
//! ```
//!
//! # Generated Output
//!
//! - `<snake_name>.proto` - state message, dependent messages, the fixed
//!   auxiliary messages, one request/response pair per command and the service

mod generator;
mod types;

pub mod files;

pub use generator::Generator;
pub use types::{imports, proto_type};
