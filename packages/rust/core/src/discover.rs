//! Input file discovery.

use std::path::{Path, PathBuf};

use tracing::debug;

use tablesift_shared::{Result, TableSiftError};

/// List files in `dir` whose extension is one of `extensions`.
///
/// Non-recursive; extensions compare case-insensitively and without the dot.
/// Results are sorted by file name so runs are reproducible. A missing or
/// non-directory `dir` is a [`TableSiftError::Setup`] error.
pub fn discover_files(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(TableSiftError::setup(format!(
            "input folder {} does not exist or is not a directory",
            dir.display()
        )));
    }

    let entries = std::fs::read_dir(dir).map_err(|e| {
        TableSiftError::setup(format!("cannot list input folder {}: {e}", dir.display()))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| TableSiftError::io(dir, e))?.path();
        if path.is_file() && has_extension(&path, extensions) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(dir = %dir.display(), count = files.len(), "input files discovered");

    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn exts() -> Vec<String> {
        vec!["html".into(), "htm".into()]
    }

    #[test]
    fn finds_html_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.html", "a.HTM", "c.txt", "notes.html.bak"] {
            fs::write(dir.path().join(name), "<html></html>").unwrap();
        }
        fs::create_dir(dir.path().join("nested.html")).unwrap();

        let files = discover_files(dir.path(), &exts()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.HTM", "b.html"]);
    }

    #[test]
    fn empty_folder_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_files(dir.path(), &exts()).unwrap().is_empty());
    }

    #[test]
    fn missing_folder_is_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_files(&dir.path().join("nope"), &exts()).unwrap_err();
        assert!(matches!(err, TableSiftError::Setup { .. }));
    }

    #[test]
    fn file_instead_of_folder_is_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("report.html");
        fs::write(&file, "").unwrap();
        assert!(discover_files(&file, &exts()).unwrap_err().is_fatal());
    }
}
