//! Built-in pipeline phases.
//!
//! This module provides the standard phases that run in every pipeline:
//!
//! - [`HarvestPhase`] - selects the root view model and harvests its members
//! - [`ResolvePhase`] - computes the dependent-type closure
//! - [`LowerPhase`] - maps types and freezes the model IR

mod harvest;
mod lower;
mod resolve;

pub use harvest::HarvestPhase;
pub use lower::{LowerPhase, package_name};
pub use resolve::ResolvePhase;
