use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;
use walkdir::WalkDir;

use crate::base::FileId;
use crate::ide::AnalysisHost;
use crate::syntax::{Language, SourceFile, parse};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("directory not found: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// What a directory load did.
#[derive(Debug, Default)]
pub struct LoadSummary {
    /// Files parsed and indexed.
    pub loaded: usize,
    /// Indexed files that had parse errors.
    pub with_errors: usize,
    /// Files that could not be read; the rest of the load continues.
    pub failures: Vec<LoadError>,
}

/// Loads source trees into an [`AnalysisHost`].
#[derive(Clone, Copy, Debug, Default)]
pub struct WorkspaceLoader;

impl WorkspaceLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load every `.hx` and `.as` file under `path`.
    ///
    /// Files are read and parsed in parallel, then indexed in path order.
    pub fn load_directory_into_host<P: AsRef<Path>>(
        &self,
        path: P,
        host: &mut AnalysisHost,
    ) -> Result<LoadSummary, LoadError> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(LoadError::NotADirectory(path.to_path_buf()));
        }

        let mut summary = LoadSummary::default();
        let paths = collect_source_paths(path, &mut summary.failures);

        let files = host.files();
        let parsed: Vec<_> = paths
            .par_iter()
            .map(|(path, language)| {
                read_and_parse(path).map(|(text, source)| (files.file_id(path), *language, text, source))
            })
            .collect();

        for result in parsed {
            match result {
                Ok((file, language, text, source)) => {
                    if source.has_errors() {
                        summary.with_errors += 1;
                    }
                    host.set_parsed_file(file, language, text, &source);
                    summary.loaded += 1;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable file");
                    summary.failures.push(err);
                }
            }
        }

        tracing::debug!(
            root = %path.display(),
            loaded = summary.loaded,
            failed = summary.failures.len(),
            "loaded directory"
        );
        Ok(summary)
    }

    /// Load a single file.
    pub fn load_file_into_host<P: AsRef<Path>>(
        &self,
        path: P,
        host: &mut AnalysisHost,
    ) -> Result<FileId, LoadError> {
        let path = path.as_ref();
        let language = Language::from_path(path).unwrap_or(host.options().default_language);
        let (text, source) = read_and_parse(path)?;
        let file = host.files().file_id(path);
        host.set_parsed_file(file, language, text, &source);
        Ok(file)
    }
}

/// Source files under `root` with their language, sorted by path.
fn collect_source_paths(root: &Path, failures: &mut Vec<LoadError>) -> Vec<(PathBuf, Language)> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                if let Some(language) = Language::from_path(entry.path()) {
                    paths.push((entry.into_path(), language));
                }
            }
            Ok(_) => {}
            Err(source) => failures.push(LoadError::Walk {
                path: root.to_path_buf(),
                source,
            }),
        }
    }
    paths
}

fn read_and_parse(path: &Path) -> Result<(Arc<str>, SourceFile), LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let source = parse(&text);
    Ok((Arc::from(text), source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, text: &str) {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn test_load_directory_indexes_sources() {
        let dir = TempDir::new().unwrap();
        write(&dir, "app/Main.hx", "package app;\nclass Main {}\n");
        write(&dir, "lib/Tool.as", "package lib {\n  public class Tool {}\n}\n");
        write(&dir, "README.md", "# not source\n");

        let mut host = AnalysisHost::new();
        let summary = WorkspaceLoader::new()
            .load_directory_into_host(dir.path(), &mut host)
            .unwrap();

        assert_eq!(summary.loaded, 2);
        assert!(summary.failures.is_empty());
        assert!(host.symbol_table().lookup_qualified("app.Main").is_some());
        assert!(host.symbol_table().lookup_qualified("lib.Tool").is_some());
        assert_eq!(host.files().len(), 2);
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let mut host = AnalysisHost::new();
        let err = WorkspaceLoader::new()
            .load_directory_into_host(dir.path().join("nope"), &mut host)
            .unwrap_err();
        assert!(matches!(err, LoadError::NotADirectory(_)));
    }

    #[test]
    fn test_load_single_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "Solo.hx", "class Solo {}\n");
        let mut host = AnalysisHost::new();
        let file = WorkspaceLoader::new()
            .load_file_into_host(dir.path().join("Solo.hx"), &mut host)
            .unwrap();
        assert_eq!(host.symbol_table().symbols_in_file(file).len(), 1);
    }

    #[test]
    fn test_counts_files_with_parse_errors() {
        let dir = TempDir::new().unwrap();
        write(&dir, "Broken.hx", "class Broken {\n  var x:Int;\n");
        let mut host = AnalysisHost::new();
        let summary = WorkspaceLoader::new()
            .load_directory_into_host(dir.path(), &mut host)
            .unwrap();
        assert_eq!(summary.loaded, 1);
        assert_eq!(summary.with_errors, 1);
    }
}
