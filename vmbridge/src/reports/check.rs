//! Check command report data structures.

use std::path::PathBuf;

use serde::Serialize;
use vmbridge_codegen::pipeline::Diagnostic;

use super::output::{Output, Report};

/// Summary of an extracted model.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    /// Path to the config file.
    pub config_path: PathBuf,
    pub view_model: String,
    pub package: String,
    pub service: String,
    /// State message fields, numbered as in the schema.
    pub properties: Vec<FieldSummary>,
    pub commands: Vec<CommandSummary>,
    /// Messages generated for dependent types.
    pub messages: Vec<MessageSummary>,
    pub warning_count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Serialize)]
pub struct FieldSummary {
    pub number: u32,
    pub name: String,
    /// Proto3 field type.
    pub wire: String,
    pub writable: bool,
}

#[derive(Debug, Serialize)]
pub struct CommandSummary {
    pub method: String,
    pub request: String,
    /// `name: type` per parameter.
    pub parameters: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageSummary {
    pub name: String,
    pub host_type: String,
    pub fields: usize,
}

fn count(n: usize, singular: &str, plural: &str) -> String {
    format!("{} {}", n, if n == 1 { singular } else { plural })
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for diag in &self.diagnostics {
            out.warning(&diag.to_string());
        }
        if !self.diagnostics.is_empty() {
            out.newline();
        }

        out.preformatted(&format!("✓ {} is valid", self.config_path.display()));
        out.newline();
        out.key_value("View model", &self.view_model);
        out.key_value("Package", &self.package);
        out.key_value("Service", &self.service);

        out.newline();
        out.section(&count(self.properties.len(), "property", "properties"));
        for field in &self.properties {
            let access = if field.writable { "" } else { " (read-only)" };
            out.list_item(&format!("{} {} = {}{}", field.wire, field.name, field.number, access));
        }

        if !self.commands.is_empty() {
            out.newline();
            out.section(&count(self.commands.len(), "command", "commands"));
            for command in &self.commands {
                out.list_item(&format!(
                    "{}({}) -> {}",
                    command.method,
                    command.parameters.join(", "),
                    command.request
                ));
            }
        }

        if !self.messages.is_empty() {
            out.newline();
            out.section(&count(self.messages.len(), "message", "messages"));
            for message in &self.messages {
                out.list_item(&format!(
                    "{} <- {} ({})",
                    message.name,
                    message.host_type,
                    count(message.fields, "field", "fields")
                ));
            }
        }

        if self.warning_count > 0 {
            out.newline();
            out.preformatted(&count(self.warning_count, "warning", "warnings"));
        }
    }
}
