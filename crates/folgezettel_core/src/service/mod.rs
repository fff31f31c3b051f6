//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store queries and section edits into linking use-cases.
//! - Keep host/UI layers decoupled from address and markdown details.

pub mod link_service;
pub mod link_snapshots;
pub mod suggestion;
