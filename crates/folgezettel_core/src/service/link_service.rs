//! Folgezettel linking use-case service.
//!
//! # Responsibility
//! - React to note lifecycle events: parent/child auto-linking, duplicate
//!   address warnings, reciprocal cross-links for manually added links.
//! - Provide the manual commands exposed to a host UI.
//!
//! # Invariants
//! - Link insertion is idempotent; a link already present is never written
//!   twice.
//! - Paths written by this service are marked in-flight for the duration of
//!   the write, and modification events for in-flight paths are ignored.
//!   The mark is released on every exit path.
//! - Failures are scoped to one note and reported; `dispatch` never fails.

use crate::markdown::links::{contains_link, extract_links};
use crate::markdown::section::insert_under_heading;
use crate::model::address::Address;
use crate::model::note::Note;
use crate::repo::collection_index::CollectionIndex;
use crate::repo::host::{HostUi, NoteStore, StoreError, VaultEvent};
use crate::service::link_snapshots::LinkSnapshots;
use crate::service::suggestion::{suggest_from_collection, validate_address, AddressValidation};
use crate::settings::{Settings, CROSS_LINK_DESCRIPTION};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::time::Duration;

const DUPLICATE_NOTICE_DURATION: Duration = Duration::from_secs(15);

/// Errors from linking use-cases.
#[derive(Debug)]
pub enum LinkServiceError {
    /// Note title carries no address.
    NoAddress { basename: String },
    /// Address has a single segment and therefore no parent.
    RootAddress { address: String },
    /// No note carries the computed parent address.
    ParentNotFound { parent_address: String },
    /// Host storage failure.
    Store(StoreError),
}

impl Display for LinkServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoAddress { .. } => write!(f, "No folgezettel address found in note title"),
            Self::RootAddress { .. } => write!(f, "This appears to be a root note (no parent)"),
            Self::ParentNotFound { parent_address } => {
                write!(f, "Parent note not found for address: {parent_address}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LinkServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for LinkServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Result of linking a note with its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLinks {
    /// Resolved parent note.
    pub parent: Note,
    /// Whether the child gained a link to the parent.
    pub backlink_inserted: bool,
    /// Whether the parent gained a link to the child.
    pub forward_link_inserted: bool,
}

impl ParentLinks {
    /// Whether either side changed.
    pub fn inserted_any(&self) -> bool {
        self.backlink_inserted || self.forward_link_inserted
    }
}

/// Proposed next child of a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildSuggestion {
    /// Address of the note the child hangs under.
    pub parent_address: Address,
    /// Proposed child address.
    pub address: Address,
    /// Collision check for `address`.
    pub validation: AddressValidation,
}

/// Outcome of the create-next-child command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildCreation {
    /// The note was created (and handed to the editor).
    Created(Note),
    /// The user declined to reuse an occupied address.
    Cancelled { address: String },
}

/// Marks a path as being written by the service until dropped.
struct InFlightGuard<'a> {
    paths: &'a RefCell<HashMap<String, usize>>,
    path: String,
}

impl<'a> InFlightGuard<'a> {
    fn enter(paths: &'a RefCell<HashMap<String, usize>>, path: &str) -> Self {
        *paths.borrow_mut().entry(path.to_string()).or_insert(0) += 1;
        Self {
            paths,
            path: path.to_string(),
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut paths = self.paths.borrow_mut();
        if let Some(count) = paths.get_mut(&self.path) {
            *count -= 1;
            if *count == 0 {
                paths.remove(&self.path);
            }
        }
    }
}

/// Linking service over a note store and a host UI.
pub struct LinkService<S: NoteStore, U: HostUi> {
    store: S,
    ui: U,
    settings: RefCell<Settings>,
    snapshots: RefCell<LinkSnapshots>,
    in_flight: RefCell<HashMap<String, usize>>,
}

impl<S: NoteStore, U: HostUi> LinkService<S, U> {
    /// Creates a service with empty link snapshots.
    pub fn new(store: S, ui: U, settings: Settings) -> Self {
        Self {
            store,
            ui,
            settings: RefCell::new(settings),
            snapshots: RefCell::new(LinkSnapshots::new()),
            in_flight: RefCell::new(HashMap::new()),
        }
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> Settings {
        self.settings.borrow().clone()
    }

    /// Replaces the settings used by subsequent calls.
    pub fn replace_settings(&self, settings: Settings) {
        *self.settings.borrow_mut() = settings;
    }

    /// Whether `path` is currently being written by this service.
    pub fn is_in_flight(&self, path: &str) -> bool {
        self.in_flight.borrow().contains_key(path)
    }

    /// Routes one host event to its handler, reporting failures.
    pub fn dispatch(&self, event: &VaultEvent) {
        let (kind, path, result) = match event {
            VaultEvent::Created(note) => ("created", &note.path, self.on_created(note)),
            VaultEvent::Renamed { note, old_path } => {
                ("renamed", &note.path, self.on_renamed(note, old_path))
            }
            VaultEvent::Modified(note) => ("modified", &note.path, self.on_modified(note)),
        };
        if let Err(err) = result {
            warn!(
                "event=note_event module=link_service status=error kind={} path={} error={}",
                kind, path, err
            );
            self.ui
                .notify(&format!("Folgezettel update failed for {path}: {err}"), None);
        }
    }

    /// Handles a newly created note.
    ///
    /// Warns about address collisions, then links the note with its parent
    /// when auto-processing is enabled.
    pub fn on_created(&self, note: &Note) -> Result<(), LinkServiceError> {
        if !note.is_markdown() {
            return Ok(());
        }
        self.warn_if_duplicate(note)?;
        if !self.settings.borrow().auto_process {
            return Ok(());
        }
        self.auto_link_parent(note)
    }

    /// Handles a rename; the new title may have gained an address.
    pub fn on_renamed(&self, note: &Note, old_path: &str) -> Result<(), LinkServiceError> {
        self.snapshots.borrow_mut().rename(old_path, &note.path);
        debug!(
            "event=note_renamed module=link_service status=ok old_path={} path={}",
            old_path, note.path
        );
        self.on_created(note)
    }

    /// Handles a content change by reciprocating newly added links.
    pub fn on_modified(&self, note: &Note) -> Result<(), LinkServiceError> {
        let settings = self.settings();
        if !settings.auto_bidirectional_links || !note.is_markdown() {
            return Ok(());
        }
        if self.is_in_flight(&note.path) {
            debug!(
                "event=note_modified module=link_service status=skip reason=in_flight path={}",
                note.path
            );
            return Ok(());
        }

        let content = self.store.read_note(note)?;
        let added = self
            .snapshots
            .borrow_mut()
            .record(&note.path, extract_links(&content));
        if added.is_empty() {
            return Ok(());
        }

        let index = CollectionIndex::new(&self.store);
        for target_name in added {
            let outcome = index
                .find_by_basename(&target_name)
                .and_then(|target| match target {
                    Some(target) if target.path != note.path => {
                        self.reciprocate(&target, note, &settings)
                    }
                    _ => Ok(false),
                });
            if let Err(err) = outcome {
                warn!(
                    "event=cross_link module=link_service status=error source={} target={} error={}",
                    note.path, target_name, err
                );
                self.ui.notify(
                    &format!("Failed to add reciprocal link in {target_name}: {err}"),
                    None,
                );
            }
        }
        Ok(())
    }

    /// Command: link the note with its parent in both directions.
    pub fn add_backlink_to_parent(&self, note: &Note) -> Result<ParentLinks, LinkServiceError> {
        match self.link_to_parent(note) {
            Ok(links) => {
                let message = if links.inserted_any() {
                    format!("Links created: {} ↔ {}", note.basename, links.parent.basename)
                } else {
                    "Links already exist".to_string()
                };
                self.ui.notify(&message, None);
                Ok(links)
            }
            Err(err) => {
                self.ui.notify(&err.to_string(), None);
                Err(err)
            }
        }
    }

    /// Command: report the next child address and whether it collides.
    pub fn suggest_next_child(&self, note: &Note) -> Result<ChildSuggestion, LinkServiceError> {
        let suggestion = self.plan_child(note).inspect_err(|err| {
            self.ui.notify(&err.to_string(), None);
        })?;
        let message = match &suggestion.validation {
            AddressValidation::Duplicate { existing } => format!(
                "Warning: {} already exists in {}",
                suggestion.address, existing.path
            ),
            _ => format!("Next child address: {}", suggestion.address),
        };
        self.ui.notify(&message, None);
        Ok(suggestion)
    }

    /// Command: create the next child note next to `note`.
    ///
    /// An occupied address requires explicit confirmation; declining cancels
    /// the creation without touching the vault.
    pub fn create_next_child(&self, note: &Note) -> Result<ChildCreation, LinkServiceError> {
        let suggestion = self.plan_child(note).inspect_err(|err| {
            self.ui.notify(&err.to_string(), None);
        })?;
        let address = suggestion.address.canonical();

        if let AddressValidation::Duplicate { existing } = &suggestion.validation {
            let prompt = format!(
                "The folgezettel address \"{address}\" is already used by:\n{}\n\n\
                 Creating another note with the same address may cause confusion in your \
                 Zettelkasten. Do you want to proceed anyway?",
                existing.path
            );
            if !self.ui.confirm(&prompt) {
                info!(
                    "event=child_create module=link_service status=skip reason=cancelled address={}",
                    address
                );
                self.ui.notify("Note creation cancelled", None);
                return Ok(ChildCreation::Cancelled { address });
            }
        }

        let path = match note.folder() {
            Some(folder) => format!("{folder}/{address}.md"),
            None => format!("{address}.md"),
        };
        match self.store.create_note(&path, "") {
            Ok(created) => {
                info!(
                    "event=child_create module=link_service status=ok path={}",
                    created.path
                );
                self.ui.open_note(&created);
                self.ui.notify(&format!("Created note: {address}"), None);
                Ok(ChildCreation::Created(created))
            }
            Err(err) => {
                warn!(
                    "event=child_create module=link_service status=error path={} error={}",
                    path, err
                );
                self.ui.notify(&format!("Failed to create note: {err}"), None);
                Err(err.into())
            }
        }
    }

    fn plan_child(&self, note: &Note) -> Result<ChildSuggestion, LinkServiceError> {
        let parent_address = note.address().ok_or_else(|| LinkServiceError::NoAddress {
            basename: note.basename.clone(),
        })?;
        let index = CollectionIndex::new(&self.store);
        let address = suggest_from_collection(&index, &parent_address)?;
        let validation = validate_address(&index, &address.canonical())?;
        Ok(ChildSuggestion {
            parent_address,
            address,
            validation,
        })
    }

    fn warn_if_duplicate(&self, note: &Note) -> Result<(), LinkServiceError> {
        let Some(existing) = CollectionIndex::new(&self.store).find_conflict(note)? else {
            return Ok(());
        };
        let address = note
            .address()
            .map(|address| address.canonical())
            .unwrap_or_default();
        warn!(
            "event=duplicate_address module=link_service status=warn address={} path={} existing={}",
            address, note.path, existing.path
        );
        self.ui.notify(
            &format!(
                "Duplicate folgezettel address!\n\n\"{address}\" is already used by:\n{}\n\n\
                 Consider using a different address.",
                existing.path
            ),
            Some(DUPLICATE_NOTICE_DURATION),
        );
        Ok(())
    }

    fn auto_link_parent(&self, note: &Note) -> Result<(), LinkServiceError> {
        let show_notifications = self.settings.borrow().show_notifications;
        match self.link_to_parent(note) {
            Ok(links) => {
                if show_notifications && links.inserted_any() {
                    self.ui.notify(
                        &format!("Folgezettel links created for {}", note.basename),
                        None,
                    );
                }
                Ok(())
            }
            Err(LinkServiceError::NoAddress { .. } | LinkServiceError::RootAddress { .. }) => {
                Ok(())
            }
            Err(err @ LinkServiceError::ParentNotFound { .. }) => {
                info!(
                    "event=parent_link module=link_service status=skip reason=parent_not_found path={}",
                    note.path
                );
                if show_notifications {
                    self.ui.notify(&err.to_string(), None);
                }
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn link_to_parent(&self, note: &Note) -> Result<ParentLinks, LinkServiceError> {
        let address = note.address().ok_or_else(|| LinkServiceError::NoAddress {
            basename: note.basename.clone(),
        })?;
        let parent_address = address
            .parent()
            .ok_or_else(|| LinkServiceError::RootAddress {
                address: address.canonical(),
            })?;
        let parent = CollectionIndex::new(&self.store)
            .find_by_exact_address(&parent_address)?
            .ok_or_else(|| LinkServiceError::ParentNotFound {
                parent_address: parent_address.canonical(),
            })?;

        let settings = self.settings();
        let backlink_inserted = self.insert_link(
            note,
            &parent,
            &settings.backlink_heading,
            &settings.parent_link_description,
        )?;
        let forward_link_inserted = self.insert_link(
            &parent,
            note,
            &settings.forward_link_heading,
            &settings.child_link_description,
        )?;
        info!(
            "event=parent_link module=link_service status=ok path={} parent={} backlink={} forward_link={}",
            note.path, parent.path, backlink_inserted, forward_link_inserted
        );
        Ok(ParentLinks {
            parent,
            backlink_inserted,
            forward_link_inserted,
        })
    }

    fn reciprocate(
        &self,
        target: &Note,
        source: &Note,
        settings: &Settings,
    ) -> Result<bool, StoreError> {
        let target_content = self.store.read_note(target)?;
        if contains_link(&target_content, &source.basename) {
            return Ok(false);
        }
        let inserted = self.insert_link(
            target,
            source,
            &settings.cross_link_heading,
            CROSS_LINK_DESCRIPTION,
        )?;
        if inserted {
            info!(
                "event=cross_link module=link_service status=ok source={} target={}",
                source.path, target.path
            );
            if settings.show_notifications {
                self.ui.notify(
                    &format!(
                        "Reciprocal link added: {} → {}",
                        source.basename, target.basename
                    ),
                    None,
                );
            }
        }
        Ok(inserted)
    }

    /// Inserts a link to `linked` into `note`; `Ok(false)` when already there.
    fn insert_link(
        &self,
        note: &Note,
        linked: &Note,
        heading: &str,
        annotation: &str,
    ) -> Result<bool, StoreError> {
        let content = self.store.read_note(note)?;
        let edit = insert_under_heading(&content, &linked.basename, heading, annotation);
        if !edit.inserted {
            return Ok(false);
        }
        let _guard = InFlightGuard::enter(&self.in_flight, &note.path);
        self.store.write_note(note, &edit.text)?;
        Ok(true)
    }
}

impl<S: NoteStore + 'static, U: HostUi + 'static> LinkService<S, U> {
    /// Event callback that forwards to this service while it is alive.
    ///
    /// Holds only a weak reference, so a host may keep the callback without
    /// creating a cycle.
    pub fn event_handler(self: &Rc<Self>) -> impl Fn(&VaultEvent) + 'static {
        let service = Rc::downgrade(self);
        move |event: &VaultEvent| {
            if let Some(service) = service.upgrade() {
                service.dispatch(event);
            }
        }
    }
}
