//! Reading and writing result files

use crate::error::ReportError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use studio_domain::AnnotatedDocument;

/// Create `dir` and any missing parents
pub fn ensure_dir(dir: &Path) -> Result<(), ReportError> {
    fs::create_dir_all(dir).map_err(|source| ReportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write `value` as pretty-printed JSON with a trailing newline
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ReportError> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    write_file(path, &json)
}

/// Write documents in native form, one per line
pub fn write_jsonl(path: &Path, documents: &[AnnotatedDocument]) -> Result<(), ReportError> {
    let mut out = String::new();
    for document in documents {
        out.push_str(&serde_json::to_string(document)?);
        out.push('\n');
    }
    write_file(path, &out)
}

/// Read documents written by [`write_jsonl`]; blank lines are ignored
pub fn read_jsonl(path: &Path) -> Result<Vec<AnnotatedDocument>, ReportError> {
    let content = fs::read_to_string(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(ReportError::from))
        .collect()
}

/// Write a text file
pub fn write_file(path: &Path, content: &str) -> Result<(), ReportError> {
    fs::write(path, content).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Files directly inside `dir` with their sizes in bytes, sorted by name
pub fn list_files(dir: &Path) -> Result<Vec<(PathBuf, u64)>, ReportError> {
    let io_err = |source| ReportError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let metadata = entry.metadata().map_err(io_err)?;
        if metadata.is_file() {
            files.push((entry.path(), metadata.len()));
        }
    }
    files.sort();
    Ok(files)
}
