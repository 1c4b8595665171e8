//! Core operations.
//!
//! This module contains the business logic for vmbridge commands,
//! separated from CLI argument parsing and output rendering.

pub mod check;
pub mod extract;
pub mod generate;

pub use check::check;
pub use extract::{Extracted, extract, load_sources};
pub use generate::{GenerateOptions, generate};
