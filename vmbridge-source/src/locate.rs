//! Discovery of declaration sources on disk.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::{Error, Result, parse_file, parse_source, syntax::SourceFile};

/// Extension of declaration source files.
pub const SOURCE_EXTENSION: &str = "cs";

/// Finds the source that declares a type which is referenced but not yet known.
pub trait TypeSourceLocator: Send + Sync {
    /// Locate and parse the file declaring `simple_name`.
    ///
    /// Returns `None` when no candidate file exists.
    fn locate(&self, simple_name: &str) -> Option<Result<SourceFile>>;
}

/// Searches directories recursively for `<SimpleName>.cs`.
///
/// Directories are searched in the configured order; within a directory,
/// entries are visited sorted by file name and the first match wins.
#[derive(Debug, Clone, Default)]
pub struct DirectoryLocator {
    roots: Vec<PathBuf>,
}

impl DirectoryLocator {
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn find(&self, simple_name: &str) -> Option<PathBuf> {
        let file_name = format!("{}.{}", simple_name, SOURCE_EXTENSION);
        self.roots.iter().find_map(|root| {
            WalkDir::new(root)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| entry.ok())
                .find(|entry| entry.file_type().is_file() && entry.file_name() == file_name.as_str())
                .map(|entry| entry.into_path())
        })
    }
}

impl TypeSourceLocator for DirectoryLocator {
    fn locate(&self, simple_name: &str) -> Option<Result<SourceFile>> {
        let path = self.find(simple_name)?;
        tracing::debug!(name = simple_name, path = %path.display(), "located dependent type source");
        Some(parse_file(&path))
    }
}

/// In-memory sources keyed by simple type name.
#[derive(Debug, Clone, Default)]
pub struct MemoryLocator {
    sources: HashMap<String, (PathBuf, String)>,
}

impl MemoryLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `src` as the file declaring `simple_name`.
    pub fn with_source(mut self, simple_name: &str, src: impl Into<String>) -> Self {
        let path = PathBuf::from(format!("{}.{}", simple_name, SOURCE_EXTENSION));
        self.sources
            .insert(simple_name.to_string(), (path, src.into()));
        self
    }
}

impl TypeSourceLocator for MemoryLocator {
    fn locate(&self, simple_name: &str) -> Option<Result<SourceFile>> {
        let (path, src) = self.sources.get(simple_name)?;
        Some(parse_source(src, path))
    }
}

/// Expand configured source paths into a sorted, de-duplicated file list.
///
/// Files are taken as given; directories contribute every `.cs` file below them.
pub fn collect_sources(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.is_dir() {
            return Err(Error::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
            ));
        }

        let mut found: Vec<PathBuf> = WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file() && has_source_extension(entry.path()))
            .map(|entry| entry.into_path())
            .collect();
        files.append(&mut found);
    }

    let mut seen = std::collections::HashSet::new();
    files.retain(|file| seen.insert(file.clone()));
    Ok(files)
}

fn has_source_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}
