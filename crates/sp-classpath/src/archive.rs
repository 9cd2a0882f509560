//! Read-only archive and directory inspection, plus the entry copy helper.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use sp_core::error::{Result, ShrinkError};
use sp_core::{CompiledFilter, KnowledgeSet};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

fn archive_error(path: &Path, err: impl std::fmt::Display) -> ShrinkError {
    ShrinkError::Archive { path: path.to_path_buf(), reason: err.to_string() }
}

fn open(path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(path)?;
    ZipArchive::new(file).map_err(|e| archive_error(path, e))
}

/// Entry names of an archive, or `/`-separated relative file paths of a
/// directory, in table-of-contents (respectively sorted) order.
pub fn entry_names(path: &Path) -> Result<Vec<String>> {
    if path.is_dir() {
        let mut names = Vec::new();
        walk(path, path, &mut names)?;
        names.sort();
        return Ok(names);
    }
    let archive = open(path)?;
    Ok(archive.file_names().map(str::to_string).collect())
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            walk(root, &path, out)?;
        } else if let Ok(rel) = path.strip_prefix(root) {
            let parts: Vec<String> =
                rel.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
            out.push(parts.join("/"));
        }
    }
    Ok(())
}

/// Whether `path` holds the compiled class of at least one knowledge entry.
///
/// Directories are probed by file existence at the expected relative path;
/// archives by an exact, case-sensitive scan of every entry name.
pub fn contains_any_class(path: &Path, knowledge: &KnowledgeSet) -> Result<bool> {
    if knowledge.is_empty() {
        return Ok(false);
    }
    let expected = knowledge.class_entry_paths();
    if path.is_dir() {
        return Ok(expected.iter().any(|entry| path.join(entry).is_file()));
    }
    let expected: HashSet<&str> = expected.iter().map(String::as_str).collect();
    let archive = open(path)?;
    let found = archive.file_names().any(|name| expected.contains(name));
    Ok(found)
}

/// Copy the entries of `src` into `writer`.
///
/// Entries rejected by `filter`, directory entries and names already present
/// in `written` are skipped. Returns the number of entries copied. Any failure
/// reading or writing an entry aborts the copy.
pub fn copy_entries<W: Write + Seek>(
    src: &Path,
    writer: &mut ZipWriter<W>,
    filter: Option<&CompiledFilter>,
    written: &mut HashSet<String>,
) -> Result<usize> {
    let mut archive = open(src)?;
    let mut copied = 0;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| archive_error(src, e))?;
        let name = entry.name().to_string();
        if entry.is_dir() || filter.is_some_and(|f| !f.accepts(&name)) || written.contains(&name) {
            continue;
        }
        writer
            .start_file(name.as_str(), SimpleFileOptions::default())
            .map_err(|e| archive_error(src, format!("{name}: {e}")))?;
        std::io::copy(&mut entry, writer)
            .map_err(|e| archive_error(src, format!("{name}: {e}")))?;
        written.insert(name);
        copied += 1;
    }
    Ok(copied)
}
