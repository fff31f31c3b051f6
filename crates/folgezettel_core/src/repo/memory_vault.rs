//! In-memory note host.
//!
//! # Responsibility
//! - Provide a complete [`NoteStore`] + [`HostUi`] host without a filesystem.
//! - Deliver lifecycle events synchronously to an attached observer.
//!
//! # Invariants
//! - Events fire after the storage change is applied and no borrow is held,
//!   so observers may call back into the vault.
//! - Scan order is insertion order.
//! - `insert` seeds content silently; `create_note`, `write_note` and
//!   `rename_note` emit events.

use crate::model::note::Note;
use crate::repo::host::{validate_note_path, HostUi, NoteStore, StoreError, StoreResult, VaultEvent};
use std::cell::{Cell, RefCell};
use std::time::Duration;

type Observer = Box<dyn Fn(&VaultEvent)>;

struct StoredNote {
    note: Note,
    content: String,
}

/// Vault kept entirely in memory, with recorded UI interactions.
pub struct MemoryVault {
    notes: RefCell<Vec<StoredNote>>,
    observer: RefCell<Option<Observer>>,
    notices: RefCell<Vec<String>>,
    prompts: RefCell<Vec<String>>,
    opened: RefCell<Vec<String>>,
    writes: RefCell<Vec<String>>,
    confirm_answer: Cell<bool>,
    failing_path: RefCell<Option<String>>,
}

impl Default for MemoryVault {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryVault {
    /// Creates an empty vault that confirms every prompt.
    pub fn new() -> Self {
        Self {
            notes: RefCell::new(Vec::new()),
            observer: RefCell::new(None),
            notices: RefCell::new(Vec::new()),
            prompts: RefCell::new(Vec::new()),
            opened: RefCell::new(Vec::new()),
            writes: RefCell::new(Vec::new()),
            confirm_answer: Cell::new(true),
            failing_path: RefCell::new(None),
        }
    }

    /// Attaches the event observer, replacing any previous one.
    pub fn set_observer(&self, observer: impl Fn(&VaultEvent) + 'static) {
        *self.observer.borrow_mut() = Some(Box::new(observer));
    }

    /// Seeds or replaces a note without emitting events.
    pub fn insert(&self, path: &str, content: &str) -> Note {
        let note = Note::from_path(path);
        let mut notes = self.notes.borrow_mut();
        match notes.iter_mut().find(|stored| stored.note.path == path) {
            Some(stored) => stored.content = content.to_string(),
            None => notes.push(StoredNote {
                note: note.clone(),
                content: content.to_string(),
            }),
        }
        note
    }

    /// Current content of the note at `path`.
    pub fn content(&self, path: &str) -> Option<String> {
        self.notes
            .borrow()
            .iter()
            .find(|stored| stored.note.path == path)
            .map(|stored| stored.content.clone())
    }

    /// Handle for the note at `path`.
    pub fn note(&self, path: &str) -> Option<Note> {
        self.notes
            .borrow()
            .iter()
            .find(|stored| stored.note.path == path)
            .map(|stored| stored.note.clone())
    }

    /// Simulates a user edit: replaces content and emits `Modified`.
    pub fn edit(&self, path: &str, content: &str) -> StoreResult<Note> {
        let note = self
            .note(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        self.write_note(&note, content)?;
        Ok(note)
    }

    /// Moves a note and emits `Renamed`.
    pub fn rename_note(&self, old_path: &str, new_path: &str) -> StoreResult<Note> {
        validate_note_path(new_path)?;
        let renamed = Note::from_path(new_path);
        {
            let mut notes = self.notes.borrow_mut();
            if notes.iter().any(|stored| stored.note.path == new_path) {
                return Err(StoreError::AlreadyExists(new_path.to_string()));
            }
            let stored = notes
                .iter_mut()
                .find(|stored| stored.note.path == old_path)
                .ok_or_else(|| StoreError::NotFound(old_path.to_string()))?;
            stored.note = renamed.clone();
        }
        self.emit(&VaultEvent::Renamed {
            note: renamed.clone(),
            old_path: old_path.to_string(),
        });
        Ok(renamed)
    }

    /// Makes every write to `path` fail with an I/O error; `None` clears it.
    pub fn fail_writes_to(&self, path: Option<&str>) {
        *self.failing_path.borrow_mut() = path.map(str::to_string);
    }

    /// Answer returned by subsequent [`HostUi::confirm`] calls.
    pub fn set_confirm_answer(&self, answer: bool) {
        self.confirm_answer.set(answer);
    }

    /// Notices shown so far, oldest first.
    pub fn notices(&self) -> Vec<String> {
        self.notices.borrow().clone()
    }

    /// Confirmation prompts shown so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    /// Paths opened in the editor so far.
    pub fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }

    /// Paths written through [`NoteStore::write_note`], oldest first.
    pub fn writes(&self) -> Vec<String> {
        self.writes.borrow().clone()
    }

    fn emit(&self, event: &VaultEvent) {
        if let Some(observer) = self.observer.borrow().as_ref() {
            observer(event);
        }
    }
}

impl NoteStore for MemoryVault {
    fn list_notes(&self) -> StoreResult<Vec<Note>> {
        Ok(self
            .notes
            .borrow()
            .iter()
            .map(|stored| stored.note.clone())
            .filter(Note::is_markdown)
            .collect())
    }

    fn read_note(&self, note: &Note) -> StoreResult<String> {
        self.content(&note.path)
            .ok_or_else(|| StoreError::NotFound(note.path.clone()))
    }

    fn write_note(&self, note: &Note, content: &str) -> StoreResult<()> {
        if self.failing_path.borrow().as_deref() == Some(note.path.as_str()) {
            return Err(StoreError::Io {
                path: note.path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        {
            let mut notes = self.notes.borrow_mut();
            let stored = notes
                .iter_mut()
                .find(|stored| stored.note.path == note.path)
                .ok_or_else(|| StoreError::NotFound(note.path.clone()))?;
            stored.content = content.to_string();
        }
        self.writes.borrow_mut().push(note.path.clone());
        self.emit(&VaultEvent::Modified(note.clone()));
        Ok(())
    }

    fn create_note(&self, path: &str, content: &str) -> StoreResult<Note> {
        validate_note_path(path)?;
        if self.note(path).is_some() {
            return Err(StoreError::AlreadyExists(path.to_string()));
        }
        let note = self.insert(path, content);
        self.emit(&VaultEvent::Created(note.clone()));
        Ok(note)
    }
}

impl HostUi for MemoryVault {
    fn notify(&self, message: &str, _duration: Option<Duration>) {
        self.notices.borrow_mut().push(message.to_string());
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.confirm_answer.get()
    }

    fn open_note(&self, note: &Note) {
        self.opened.borrow_mut().push(note.path.clone());
    }
}
