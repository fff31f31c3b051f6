//! Domain model for addressed notes.
//!
//! # Responsibility
//! - Define the address value type and its pure algebra.
//! - Define the note handle shared with host collaborators.
//!
//! # Invariants
//! - Addresses are derived from note basenames on every query, never cached.
//! - Notes are identified by their vault-relative path.

pub mod address;
pub mod note;
