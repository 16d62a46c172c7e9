//! Finds triple documents under a productions directory.
//!
//! Two layouts are recognized:
//! - current: `output.ttl` inside per-language subdirectories
//! - legacy: flat `triples_<start>_to_<end>.ttl` files

use std::path::{Path, PathBuf};

use anyhow::Result;
use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::RunError;

/// File name of current-layout documents.
pub const OUTPUT_FILE_NAME: &str = "output.ttl";

/// Pattern of legacy document names.
pub const LEGACY_FILE_PATTERN: &str = r"^triples_\d+_to_\d+\.ttl$";

/// Returns every triple document under `root`, sorted by path.
///
/// # Errors
///
/// Returns [`RunError::DirectoryNotFound`] if `root` is not a directory.
pub fn discover(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(RunError::DirectoryNotFound(root.to_path_buf()).into());
    }
    let legacy = Regex::new(LEGACY_FILE_PATTERN)?;

    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            name == OUTPUT_FILE_NAME || legacy.is_match(&name)
        })
        .map(|e| e.into_path())
        .collect();
    paths.sort();

    debug!(root = %root.display(), documents = paths.len(), "discovered triple documents");
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let _ = fs::write(path, "");
    }

    #[test]
    fn finds_current_and_legacy_layouts() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let root = dir.path();
        touch(&root.join("verse_1_to_50/english/output.ttl"));
        touch(&root.join("verse_1_to_50/greek/output.ttl"));
        touch(&root.join("verse_51_to_99/triples_51_to_99.ttl"));
        touch(&root.join("verse_51_to_99/notes.ttl"));
        touch(&root.join("verse_51_to_99/triples_51_to_99.ttl.bak"));
        touch(&root.join("verse_51_to_99/english/prompt.txt"));

        let found = discover(root).unwrap_or_default();
        let relative: Vec<String> = found
            .iter()
            .filter_map(|p| p.strip_prefix(root).ok())
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            relative,
            vec![
                "verse_1_to_50/english/output.ttl",
                "verse_1_to_50/greek/output.ttl",
                "verse_51_to_99/triples_51_to_99.ttl",
            ]
        );
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let err = discover(&dir.path().join("[PRODUCTIONS]"));
        assert!(matches!(
            err.map_err(|e| e.downcast::<RunError>()),
            Err(Ok(RunError::DirectoryNotFound(_)))
        ));
    }
}
