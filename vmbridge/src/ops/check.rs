//! Check operation - model summary without generation.

use std::path::Path;

use vmbridge_codegen::pipeline::Severity;
use vmbridge_codegen_proto::proto_type;

use super::Extracted;
use crate::reports::{CheckReport, CommandSummary, FieldSummary, MessageSummary};

/// Summarize the extracted model and its diagnostics.
pub fn check(model: &Extracted, config_path: &Path) -> CheckReport {
    let ir = &model.ir;
    let vm = &ir.view_model;

    let properties = vm
        .numbered_properties()
        .map(|(number, p)| FieldSummary {
            number,
            name: p.name.clone(),
            wire: proto_type(&p.wire),
            writable: p.writable,
        })
        .collect();

    let commands = vm
        .commands
        .iter()
        .map(|c| CommandSummary {
            method: c.method_name.clone(),
            request: c.request_message(),
            parameters: c
                .parameters
                .iter()
                .map(|p| format!("{}: {}", p.name, proto_type(&p.wire)))
                .collect(),
        })
        .collect();

    let messages = ir
        .messages
        .iter()
        .map(|m| MessageSummary {
            name: m.name.clone(),
            host_type: m.host_type.clone(),
            fields: m.fields.len(),
        })
        .collect();

    let count = |severity: Severity| {
        model
            .diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    };

    CheckReport {
        config_path: config_path.to_path_buf(),
        view_model: vm.full_name(),
        package: ir.meta.package.clone(),
        service: vm.service_name(),
        properties,
        commands,
        messages,
        warning_count: count(Severity::Warning),
        diagnostics: model.diagnostics.clone(),
    }
}
