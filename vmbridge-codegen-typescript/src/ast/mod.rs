//! TypeScript syntax helpers.

mod imports;

pub use imports::Import;
