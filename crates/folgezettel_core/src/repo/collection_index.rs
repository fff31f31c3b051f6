//! Address-aware queries over the note collection.
//!
//! # Responsibility
//! - Resolve notes by address and by basename.
//! - List child addresses and detect address collisions.
//!
//! # Invariants
//! - Every query rescans the store; nothing is cached between calls.
//! - Addresses are compared by their canonical rendering.

use crate::model::address::Address;
use crate::model::note::Note;
use crate::repo::host::{NoteStore, StoreResult};

/// Notes sharing one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Canonical address shared by every note in `notes`.
    pub address: String,
    /// Colliding notes in scan order.
    pub notes: Vec<Note>,
}

/// Read-only query surface over a [`NoteStore`].
pub struct CollectionIndex<'a, S: NoteStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: NoteStore + ?Sized> CollectionIndex<'a, S> {
    /// Creates an index view over `store`.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// First note whose basename carries exactly `address`.
    pub fn find_by_exact_address(&self, address: &Address) -> StoreResult<Option<Note>> {
        let target = address.canonical();
        Ok(self
            .store
            .list_notes()?
            .into_iter()
            .find(|note| carries_address(note, &target)))
    }

    /// First note whose basename equals `name`, ignoring case.
    pub fn find_by_basename(&self, name: &str) -> StoreResult<Option<Note>> {
        let wanted = name.to_lowercase();
        Ok(self
            .store
            .list_notes()?
            .into_iter()
            .find(|note| note.basename.to_lowercase() == wanted))
    }

    /// Addresses of every note whose parent address is `address`.
    pub fn children_of(&self, address: &Address) -> StoreResult<Vec<Address>> {
        let target = address.canonical();
        Ok(self
            .store
            .list_notes()?
            .iter()
            .filter_map(Note::address)
            .filter(|child| {
                child
                    .parent()
                    .is_some_and(|parent| parent.canonical() == target)
            })
            .collect())
    }

    /// First other note carrying the same address as `note`.
    pub fn find_conflict(&self, note: &Note) -> StoreResult<Option<Note>> {
        let Some(address) = note.address() else {
            return Ok(None);
        };
        let target = address.canonical();
        Ok(self
            .store
            .list_notes()?
            .into_iter()
            .find(|other| other.path != note.path && carries_address(other, &target)))
    }

    /// Every address used by more than one note, in first-seen order.
    pub fn duplicate_groups(&self) -> StoreResult<Vec<DuplicateGroup>> {
        let mut groups: Vec<DuplicateGroup> = Vec::new();
        for note in self.store.list_notes()? {
            let Some(address) = note.address() else {
                continue;
            };
            let canonical = address.canonical();
            match groups.iter_mut().find(|group| group.address == canonical) {
                Some(group) => group.notes.push(note),
                None => groups.push(DuplicateGroup {
                    address: canonical,
                    notes: vec![note],
                }),
            }
        }
        groups.retain(|group| group.notes.len() > 1);
        Ok(groups)
    }
}

fn carries_address(note: &Note, canonical: &str) -> bool {
    note.address()
        .is_some_and(|address| address.canonical() == canonical)
}
