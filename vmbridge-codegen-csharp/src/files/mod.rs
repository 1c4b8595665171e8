//! C# file generators.

mod client_cs;
mod server_cs;

pub use client_cs::ClientCs;
pub use server_cs::ServerCs;
