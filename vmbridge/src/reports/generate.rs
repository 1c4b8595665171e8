//! Generate command report data structures.

use std::path::PathBuf;

use serde::Serialize;
use vmbridge_codegen::pipeline::Diagnostic;
use vmbridge_core::WriteResult;

use super::output::{Output, Report};

/// Report data from code generation.
#[derive(Debug, Serialize)]
pub struct GenerateReport {
    /// Fully-qualified name of the root view model.
    pub view_model: String,
    /// Schema package.
    pub package: String,
    /// Diagnostics raised while extracting the model.
    pub diagnostics: Vec<Diagnostic>,
    /// Generation result (files written or preview).
    pub result: GenerationResult,
}

/// Result of code generation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase", tag = "mode")]
pub enum GenerationResult {
    /// Files were written to disk.
    Written(WrittenResult),
    /// Dry-run preview.
    Preview(PreviewResult),
}

/// Result when files were written to disk.
#[derive(Debug, Serialize)]
pub struct WrittenResult {
    pub output_dir: PathBuf,
    pub files: Vec<WrittenFile>,
}

#[derive(Debug, Serialize)]
pub struct WrittenFile {
    pub backend: &'static str,
    pub path: PathBuf,
    pub status: FileStatus,
}

/// Outcome of writing one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Written,
    Unchanged,
    Skipped,
}

impl From<WriteResult> for FileStatus {
    fn from(result: WriteResult) -> Self {
        match result {
            WriteResult::Written => FileStatus::Written,
            WriteResult::Unchanged => FileStatus::Unchanged,
            WriteResult::Skipped => FileStatus::Skipped,
        }
    }
}

/// Result of a dry-run preview.
#[derive(Debug, Serialize)]
pub struct PreviewResult {
    /// Files that would be generated.
    pub files: Vec<PreviewFile>,
}

/// A file in preview mode.
#[derive(Debug, Serialize)]
pub struct PreviewFile {
    pub backend: &'static str,
    /// Path relative to the output directory.
    pub path: String,
    pub content: String,
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        for diag in &self.diagnostics {
            out.warning(&diag.to_string());
        }
        if !self.diagnostics.is_empty() {
            out.newline();
        }

        match &self.result {
            GenerationResult::Written(written) => self.render_written(out, written),
            GenerationResult::Preview(preview) => self.render_preview(out, preview),
        }
    }
}

impl GenerateReport {
    fn render_written(&self, out: &mut dyn Output, written: &WrittenResult) {
        out.preformatted(&format!(
            "Generated {} ({}) into {}",
            self.view_model,
            self.package,
            written.output_dir.display()
        ));

        let display = |file: &WrittenFile| {
            file.path
                .strip_prefix(&written.output_dir)
                .unwrap_or(&file.path)
                .display()
                .to_string()
        };

        let changed: Vec<&WrittenFile> = written
            .files
            .iter()
            .filter(|f| f.status == FileStatus::Written)
            .collect();
        if changed.is_empty() {
            out.preformatted("Everything up to date.");
            return;
        }

        out.newline();
        out.section("Written");
        for file in changed {
            out.added_item(&format!("{} ({})", display(file), file.backend));
        }

        let unchanged = written
            .files
            .iter()
            .filter(|f| f.status == FileStatus::Unchanged)
            .count();
        if unchanged > 0 {
            out.newline();
            out.preformatted(&format!(
                "{} file{} unchanged",
                unchanged,
                if unchanged == 1 { "" } else { "s" }
            ));
        }
    }

    fn render_preview(&self, out: &mut dyn Output, preview: &PreviewResult) {
        out.title(&format!("Dry run: {}", self.view_model));
        out.newline();
        for file in &preview.files {
            out.divider(&file.path);
            out.preformatted(&file.content);
        }
        out.preformatted(&format!("{} files would be generated.", preview.files.len()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::output::RecordingOutput;

    fn report(files: Vec<WrittenFile>) -> GenerateReport {
        GenerateReport {
            view_model: "Demo.MainViewModel".to_string(),
            package: "demo".to_string(),
            diagnostics: vec![Diagnostic::warning("lower", "type 'Foo' could not be resolved")],
            result: GenerationResult::Written(WrittenResult {
                output_dir: PathBuf::from("out"),
                files,
            }),
        }
    }

    fn file(path: &str, status: FileStatus) -> WrittenFile {
        WrittenFile {
            backend: "schema",
            path: PathBuf::from("out").join(path),
            status,
        }
    }

    #[test]
    fn test_lists_written_files_relative_to_output() {
        let mut out = RecordingOutput::default();
        report(vec![
            file("main_view_model.proto", FileStatus::Written),
            file("other.proto", FileStatus::Unchanged),
        ])
        .render(&mut out);

        assert_eq!(
            out.lines,
            [
                "! warning: type 'Foo' could not be resolved",
                "",
                "Generated Demo.MainViewModel (demo) into out",
                "",
                "Written:",
                "+ main_view_model.proto (schema)",
                "",
                "1 file unchanged",
            ]
        );
    }

    #[test]
    fn test_nothing_written() {
        let mut out = RecordingOutput::default();
        report(vec![file("main_view_model.proto", FileStatus::Unchanged)]).render(&mut out);
        assert_eq!(out.lines.last().map(String::as_str), Some("Everything up to date."));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(report(Vec::new())).unwrap();
        assert_eq!(json["result"]["mode"], "written");
        assert_eq!(json["diagnostics"][0]["severity"], "warning");
        assert_eq!(json["view_model"], "Demo.MainViewModel");
    }
}
