//! Host contracts and note store implementations.
//!
//! # Responsibility
//! - Define the storage and UI surface a note host provides.
//! - Answer address-aware queries over whatever store is plugged in.
//! - Ship an in-memory host (tests, embedding) and a filesystem host (CLI).
//!
//! # Invariants
//! - Stores list markdown notes only, in a stable order.
//! - Store APIs return semantic errors (`NotFound`, `AlreadyExists`) in
//!   addition to I/O failures.

pub mod collection_index;
pub mod fs_vault;
pub mod host;
pub mod memory_vault;
