//! Host collaborator contracts.
//!
//! # Responsibility
//! - Define the storage surface the core needs from a note host.
//! - Define the user-facing surface (notices, confirmation, opening notes).
//! - Define lifecycle events a host delivers to the core.
//!
//! # Invariants
//! - `list_notes` returns markdown notes only, in a stable scan order.
//! - `write_note` fully replaces note content.
//! - `create_note` fails instead of overwriting an occupied path.

use crate::model::note::Note;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::time::Duration;

/// Result type used by note store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by host storage.
#[derive(Debug)]
pub enum StoreError {
    /// Target note does not exist.
    NotFound(String),
    /// Creation target is already occupied.
    AlreadyExists(String),
    /// Path is empty, escapes the vault, or is otherwise unusable.
    InvalidPath(String),
    /// Underlying I/O failure.
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "note not found: {path}"),
            Self::AlreadyExists(path) => write!(f, "note already exists: {path}"),
            Self::InvalidPath(path) => write!(f, "invalid note path: `{path}`"),
            Self::Io { path, source } => write!(f, "i/o failure on {path}: {source}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Note lifecycle event delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    /// A note was created.
    Created(Note),
    /// A note moved from `old_path` to `note.path`.
    Renamed { note: Note, old_path: String },
    /// A note's content changed.
    Modified(Note),
}

/// Storage surface of the host.
pub trait NoteStore {
    /// Lists every markdown note in the vault.
    fn list_notes(&self) -> StoreResult<Vec<Note>>;
    /// Reads full note content.
    fn read_note(&self, note: &Note) -> StoreResult<String>;
    /// Replaces full note content.
    fn write_note(&self, note: &Note, content: &str) -> StoreResult<()>;
    /// Creates a new note at a vault-relative path.
    fn create_note(&self, path: &str, content: &str) -> StoreResult<Note>;
}

/// User-facing surface of the host.
pub trait HostUi {
    /// Shows a non-blocking notice; `duration` is a display hint.
    fn notify(&self, message: &str, duration: Option<Duration>);
    /// Asks a blocking yes/no question. Returns `true` to proceed.
    fn confirm(&self, prompt: &str) -> bool;
    /// Opens a note in the host editor. Fire-and-forget.
    fn open_note(&self, note: &Note);
}

impl<T: NoteStore + ?Sized> NoteStore for &T {
    fn list_notes(&self) -> StoreResult<Vec<Note>> {
        (**self).list_notes()
    }

    fn read_note(&self, note: &Note) -> StoreResult<String> {
        (**self).read_note(note)
    }

    fn write_note(&self, note: &Note, content: &str) -> StoreResult<()> {
        (**self).write_note(note, content)
    }

    fn create_note(&self, path: &str, content: &str) -> StoreResult<Note> {
        (**self).create_note(path, content)
    }
}

impl<T: NoteStore + ?Sized> NoteStore for Rc<T> {
    fn list_notes(&self) -> StoreResult<Vec<Note>> {
        (**self).list_notes()
    }

    fn read_note(&self, note: &Note) -> StoreResult<String> {
        (**self).read_note(note)
    }

    fn write_note(&self, note: &Note, content: &str) -> StoreResult<()> {
        (**self).write_note(note, content)
    }

    fn create_note(&self, path: &str, content: &str) -> StoreResult<Note> {
        (**self).create_note(path, content)
    }
}

impl<T: HostUi + ?Sized> HostUi for &T {
    fn notify(&self, message: &str, duration: Option<Duration>) {
        (**self).notify(message, duration)
    }

    fn confirm(&self, prompt: &str) -> bool {
        (**self).confirm(prompt)
    }

    fn open_note(&self, note: &Note) {
        (**self).open_note(note)
    }
}

impl<T: HostUi + ?Sized> HostUi for Rc<T> {
    fn notify(&self, message: &str, duration: Option<Duration>) {
        (**self).notify(message, duration)
    }

    fn confirm(&self, prompt: &str) -> bool {
        (**self).confirm(prompt)
    }

    fn open_note(&self, note: &Note) {
        (**self).open_note(note)
    }
}

/// Validates a vault-relative note path for creation.
///
/// Rejects empty paths, absolute paths, `..`/`.` components and non-markdown
/// file names.
pub fn validate_note_path(path: &str) -> StoreResult<()> {
    let invalid = || StoreError::InvalidPath(path.to_string());
    if path.trim().is_empty() || path.starts_with('/') || path.contains('\\') {
        return Err(invalid());
    }
    if path
        .split('/')
        .any(|component| component.is_empty() || component == "." || component == "..")
    {
        return Err(invalid());
    }
    if !Note::from_path(path).is_markdown() {
        return Err(invalid());
    }
    Ok(())
}
