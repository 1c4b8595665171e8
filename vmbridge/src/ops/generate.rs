//! Generate operation - run the selected backends over the model.

use std::path::Path;

use eyre::{Context, Result};
use rayon::prelude::*;
use vmbridge_codegen::Backend;

use super::Extracted;
use crate::reports::{
    FileStatus, GenerateReport, GenerationResult, PreviewFile, PreviewResult, WrittenFile,
    WrittenResult,
};

/// Options for the generate operation.
pub struct GenerateOptions<'a> {
    /// Output directory for generated artifacts.
    pub output_dir: &'a Path,
    /// Whether to preview without writing files.
    pub dry_run: bool,
}

/// Execute the generate operation.
///
/// Backends only read the frozen model, so they run in parallel. Files are
/// reported in backend order.
pub fn generate(
    model: &Extracted,
    backends: &[Box<dyn Backend>],
    opts: GenerateOptions,
) -> Result<GenerateReport> {
    let ir = &model.ir;

    let result = if opts.dry_run {
        let files = backends
            .par_iter()
            .map(|backend| {
                backend
                    .preview(ir)
                    .into_iter()
                    .map(|f| PreviewFile {
                        backend: backend.name(),
                        path: f.path,
                        content: f.content,
                    })
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect();
        GenerationResult::Preview(PreviewResult { files })
    } else {
        let written = backends
            .par_iter()
            .map(|backend| {
                let results = backend
                    .generate(ir, opts.output_dir)
                    .wrap_err_with(|| format!("Failed to generate {} artifacts", backend.name()))?;
                Ok::<_, eyre::Report>(results
                    .into_iter()
                    .map(|(path, result)| WrittenFile {
                        backend: backend.name(),
                        path,
                        status: result.into(),
                    })
                    .collect::<Vec<_>>())
            })
            .collect::<Result<Vec<_>>>()?;

        let files: Vec<WrittenFile> = written.into_iter().flatten().collect();
        tracing::info!(
            written = files.iter().filter(|f| f.status == FileStatus::Written).count(),
            unchanged = files.iter().filter(|f| f.status == FileStatus::Unchanged).count(),
            output = %opts.output_dir.display(),
            "generation complete"
        );
        GenerationResult::Written(WrittenResult {
            output_dir: opts.output_dir.to_path_buf(),
            files,
        })
    };

    Ok(GenerateReport {
        view_model: ir.view_model.full_name(),
        package: ir.meta.package.clone(),
        diagnostics: model.diagnostics.clone(),
        result,
    })
}

#[cfg(test)]
mod tests {
    use vmbridge_codegen::testing;
    use vmbridge_source::GenerateConfig;

    use super::*;
    use crate::backends;

    fn model() -> Extracted {
        Extracted {
            ir: testing::sample_model(),
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let backends = backends::selected(&GenerateConfig::default());

        let report = generate(
            &model(),
            &backends,
            GenerateOptions {
                output_dir: dir.path(),
                dry_run: true,
            },
        )
        .unwrap();

        let GenerationResult::Preview(preview) = report.result else {
            panic!("expected a preview");
        };
        let paths: Vec<&str> = preview.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "main_view_model.proto",
                "server/MainViewModelGrpcServiceImpl.cs",
                "client/MainViewModelRemoteClient.cs",
                "ts/MainViewModelRemoteClient.ts",
            ]
        );
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_second_run_leaves_files_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let backends = backends::selected(&GenerateConfig::default());
        let run = || {
            generate(
                &model(),
                &backends,
                GenerateOptions {
                    output_dir: dir.path(),
                    dry_run: false,
                },
            )
            .unwrap()
        };

        let GenerationResult::Written(first) = run().result else {
            panic!("expected written files");
        };
        assert_eq!(first.files.len(), 4);
        assert!(first.files.iter().all(|f| f.status == FileStatus::Written));
        assert!(dir.path().join("main_view_model.proto").is_file());

        let GenerationResult::Written(second) = run().result else {
            panic!("expected written files");
        };
        assert!(second.files.iter().all(|f| f.status == FileStatus::Unchanged));
    }
}
