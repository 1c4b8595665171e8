//! TypeScript file generators.

mod client_ts;

pub use client_ts::ClientTs;
