//! Filesystem-backed note host.
//!
//! # Responsibility
//! - Expose a directory tree of markdown files as a [`NoteStore`].
//! - Keep vault-relative `/`-separated paths at the API boundary.
//!
//! # Invariants
//! - Hidden entries (names starting with `.`) are never listed.
//! - Listing order is deterministic (sorted by file name per directory).
//! - `create_note` never overwrites an existing file.

use crate::model::note::Note;
use crate::repo::host::{validate_note_path, NoteStore, StoreError, StoreResult};
use log::debug;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Vault rooted at one directory.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    /// Opens a vault rooted at `root`.
    ///
    /// # Errors
    /// - `NotFound` when `root` is not an existing directory.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::NotFound(root.display().to_string()));
        }
        Ok(Self { root })
    }

    /// Vault root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a vault-relative path.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .fold(self.root.clone(), |path, component| path.join(component))
    }

    fn relative_path(&self, absolute: &Path) -> Option<String> {
        let relative = absolute.strip_prefix(&self.root).ok()?;
        let components: Option<Vec<&str>> = relative
            .components()
            .map(|component| component.as_os_str().to_str())
            .collect();
        Some(components?.join("/"))
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

fn io_error(path: &str, source: std::io::Error) -> StoreError {
    if source.kind() == ErrorKind::NotFound {
        StoreError::NotFound(path.to_string())
    } else {
        StoreError::Io {
            path: path.to_string(),
            source,
        }
    }
}

impl NoteStore for FsVault {
    fn list_notes(&self) -> StoreResult<Vec<Note>> {
        let mut notes = Vec::new();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_hidden(entry));
        for entry in walker {
            let entry = entry.map_err(|err| {
                let path = err
                    .path()
                    .map_or_else(|| self.root.display().to_string(), |p| p.display().to_string());
                match err.into_io_error() {
                    Some(source) => io_error(&path, source),
                    None => StoreError::InvalidPath(path),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(relative) = self.relative_path(entry.path()) else {
                debug!(
                    "event=vault_scan module=fs_vault status=skip reason=non_utf8_path"
                );
                continue;
            };
            let note = Note::from_path(relative);
            if note.is_markdown() {
                notes.push(note);
            }
        }
        Ok(notes)
    }

    fn read_note(&self, note: &Note) -> StoreResult<String> {
        fs::read_to_string(self.resolve(&note.path)).map_err(|err| io_error(&note.path, err))
    }

    fn write_note(&self, note: &Note, content: &str) -> StoreResult<()> {
        let target = self.resolve(&note.path);
        if !target.is_file() {
            return Err(StoreError::NotFound(note.path.clone()));
        }
        fs::write(target, content).map_err(|err| io_error(&note.path, err))
    }

    fn create_note(&self, path: &str, content: &str) -> StoreResult<Note> {
        validate_note_path(path)?;
        let target = self.resolve(path);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .map_err(|err| match err.kind() {
                ErrorKind::AlreadyExists => StoreError::AlreadyExists(path.to_string()),
                _ => io_error(path, err),
            })?;
        file.write_all(content.as_bytes())
            .map_err(|err| io_error(path, err))?;
        Ok(Note::from_path(path))
    }
}
