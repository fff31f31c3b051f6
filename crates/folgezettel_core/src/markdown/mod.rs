//! Markdown text helpers for wiki-link maintenance.
//!
//! # Responsibility
//! - Scan note text for wiki-link targets.
//! - Insert link lines under second-level section headings.
//!
//! # Invariants
//! - All functions are pure over text; no I/O happens here.
//! - Insertions always emit the plain `[[basename]]` form.

pub mod links;
pub mod section;
