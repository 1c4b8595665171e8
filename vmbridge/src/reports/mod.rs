//! Report data structures for commands.
//!
//! This module provides data structures that separate data collection from rendering.
//! Commands build reports, then render them as text or serialize them as JSON.

mod check;
mod generate;
mod output;

use eyre::{Context, Result};
use serde::Serialize;

pub use check::{CheckReport, CommandSummary, FieldSummary, MessageSummary};
pub use generate::{
    FileStatus, GenerateReport, GenerationResult, PreviewFile, PreviewResult, WrittenFile,
    WrittenResult,
};
pub use output::{Report, TerminalOutput};

use crate::commands::Format;

/// Print `report` to stdout in the requested format.
pub fn print<R: Report + Serialize>(format: Format, report: &R) -> Result<()> {
    match format {
        Format::Text => report.render(&mut TerminalOutput::new()),
        Format::Json => {
            let json = serde_json::to_string_pretty(report).wrap_err("Failed to serialize report")?;
            println!("{}", json);
        }
    }
    Ok(())
}
