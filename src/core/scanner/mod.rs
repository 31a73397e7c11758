//! # Scanner Module
//!
//! Lists candidate files in the input directory.
//!
//! The listing is non-recursive and applies no extension filtering:
//! every regular file is a candidate, and non-image files are expected to
//! fail at decode time and be skipped there. Paths are returned sorted so
//! downstream processing order is deterministic.

use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// List the regular files directly inside `dir`, sorted by path.
///
/// Fails with a [`ScanError`] when the directory is missing or unreadable;
/// this aborts the run before any signature work.
pub fn list_regular_files(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    list_regular_files_with_events(dir, &crate::events::null_sender())
}

/// List regular files with progress reporting via events.
pub fn list_regular_files_with_events(
    dir: &Path,
    events: &EventSender,
) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.exists() {
        return Err(ScanError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(ScanError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    events.send(Event::Scan(ScanEvent::Started {
        dir: dir.to_path_buf(),
    }));

    let mut files = Vec::new();

    for entry_result in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
    {
        let entry = entry_result.map_err(|e| {
            let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
            ScanError::ReadDirectory { path, source }
        })?;

        if entry.file_type().is_file() {
            let path = entry.into_path();
            events.send(Event::Scan(ScanEvent::FileFound { path: path.clone() }));
            files.push(path);
        }
    }

    files.sort();

    events.send(Event::Scan(ScanEvent::Completed {
        total_files: files.len(),
    }));

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    #[test]
    fn empty_directory_returns_empty_vec() {
        let temp_dir = TempDir::new().unwrap();
        let files = list_regular_files(temp_dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn lists_all_regular_files_regardless_of_extension() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("a.jpg")).unwrap();
        File::create(temp_dir.path().join("b.png")).unwrap();
        File::create(temp_dir.path().join("notes.txt")).unwrap();
        File::create(temp_dir.path().join("no_extension")).unwrap();

        let files = list_regular_files(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 4);
    }

    #[test]
    fn listing_is_sorted() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("c.jpg")).unwrap();
        File::create(temp_dir.path().join("a.jpg")).unwrap();
        File::create(temp_dir.path().join("b.jpg")).unwrap();

        let files = list_regular_files(temp_dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn does_not_recurse_into_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("top.jpg")).unwrap();

        let subdir = temp_dir.path().join("nested");
        fs::create_dir(&subdir).unwrap();
        File::create(subdir.join("deep.jpg")).unwrap();

        let files = list_regular_files(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("top.jpg"));
    }

    #[test]
    fn nonexistent_directory_is_an_error() {
        let result = list_regular_files(Path::new("/nonexistent/path/12345"));
        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }

    #[test]
    fn file_path_is_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("file.jpg");
        File::create(&file_path).unwrap();

        let result = list_regular_files(&file_path);
        assert!(matches!(result, Err(ScanError::NotADirectory { .. })));
    }
}
