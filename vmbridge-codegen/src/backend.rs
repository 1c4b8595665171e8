//! Backend abstraction.

use std::path::{Path, PathBuf};

use eyre::Result;
use vmbridge_core::{File, GeneratedFile, WriteResult};
use vmbridge_ir::ModelIR;

/// Header written at the top of every generated file.
pub const GENERATED_HEADER: &str = "// <auto-generated>\n//     Generated by vmbridge. Do not edit.\n// </auto-generated>";

/// A pure IR → text emitter producing one or more artifacts.
///
/// Backends only read the frozen IR, so several can run concurrently.
pub trait Backend: Send + Sync {
    /// Backend identifier (e.g., "schema", "server").
    fn name(&self) -> &'static str;

    /// The artifacts for `ir`.
    fn files<'a>(&self, ir: &'a ModelIR) -> Vec<Box<dyn GeneratedFile + 'a>>;

    /// Render every artifact without writing to disk.
    fn preview(&self, ir: &ModelIR) -> Vec<PreviewFile> {
        self.files(ir)
            .iter()
            .map(|file| PreviewFile {
                path: file.path(Path::new("")).to_string_lossy().replace('\\', "/"),
                content: file.render_with_header(),
            })
            .collect()
    }

    /// Write every artifact under `output_dir`.
    fn generate(&self, ir: &ModelIR, output_dir: &Path) -> Result<Vec<(PathBuf, WriteResult)>> {
        self.files(ir)
            .iter()
            .map(|generated| {
                let file = File::from_generated(output_dir, generated.as_ref());
                let result = file.write()?;
                tracing::debug!(backend = self.name(), path = %file.path().display(), ?result, "wrote artifact");
                Ok((file.path().to_path_buf(), result))
            })
            .collect()
    }
}

/// A generated file for preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewFile {
    /// Relative path from the output directory.
    pub path: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use vmbridge_core::FileRules;

    use super::*;
    use crate::testing;

    struct Listing<'a>(&'a ModelIR);

    impl GeneratedFile for Listing<'_> {
        fn path(&self, base: &Path) -> PathBuf {
            base.join("listing").join("properties.txt")
        }

        fn rules(&self) -> FileRules {
            FileRules::always_overwrite().with_header("# generated")
        }

        fn render(&self) -> String {
            self.0
                .view_model
                .numbered_properties()
                .map(|(n, p)| format!("{} {}\n", n, p.name))
                .collect()
        }
    }

    struct ListingBackend;

    impl Backend for ListingBackend {
        fn name(&self) -> &'static str {
            "listing"
        }

        fn files<'a>(&self, ir: &'a ModelIR) -> Vec<Box<dyn GeneratedFile + 'a>> {
            vec![Box::new(Listing(ir))]
        }
    }

    #[test]
    fn test_preview_uses_relative_paths() {
        let ir = testing::sample_model();
        let files = ListingBackend.preview(&ir);

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "listing/properties.txt");
        assert_eq!(files[0].content, "# generated\n1 Name\n2 Count\n3 Active\n");
    }

    #[test]
    fn test_generate_writes_and_skips_unchanged() {
        let ir = testing::sample_model();
        let dir = tempfile::tempdir().unwrap();

        let first = ListingBackend.generate(&ir, dir.path()).unwrap();
        assert_eq!(first[0].1, WriteResult::Written);
        assert!(first[0].0.ends_with("listing/properties.txt"));

        let second = ListingBackend.generate(&ir, dir.path()).unwrap();
        assert_eq!(second[0].1, WriteResult::Unchanged);
    }
}
