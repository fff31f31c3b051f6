//! Core domain logic for folgezettel note collections.
//! This crate is the single source of truth for address and linking
//! invariants; hosts plug in through the traits in [`repo::host`].

pub mod logging;
pub mod markdown;
pub mod model;
pub mod repo;
pub mod service;
pub mod settings;

pub use logging::{default_log_level, init_logging, logging_status, LogTarget, LoggingError};
pub use model::address::{extract_address, Address, AddressParseError, Segment, SegmentKind};
pub use model::note::Note;
pub use repo::collection_index::{CollectionIndex, DuplicateGroup};
pub use repo::fs_vault::FsVault;
pub use repo::host::{HostUi, NoteStore, StoreError, StoreResult, VaultEvent};
pub use repo::memory_vault::MemoryVault;
pub use service::link_service::{
    ChildCreation, ChildSuggestion, LinkService, LinkServiceError, ParentLinks,
};
pub use service::suggestion::AddressValidation;
pub use settings::{Settings, SettingsError, SettingsStore};
