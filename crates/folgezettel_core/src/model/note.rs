//! Note handle owned by the host collaborator.

use crate::model::address::{extract_address, Address};

/// Markdown note extension, without the leading dot.
pub const MARKDOWN_EXTENSION: &str = "md";

/// Lightweight reference to one note in the vault.
///
/// Content is never cached here; it is always read through the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Note {
    /// Vault-relative path using `/` separators, e.g. `zettel/1.2a.md`.
    pub path: String,
    /// File name without extension; doubles as the display title.
    pub basename: String,
    /// File extension without the leading dot; empty when absent.
    pub extension: String,
}

impl Note {
    /// Builds a note handle from a vault-relative path.
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let file_name = path.rsplit('/').next().unwrap_or(path.as_str());
        let (basename, extension) = match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), ext.to_string()),
            _ => (file_name.to_string(), String::new()),
        };
        Self {
            path,
            basename,
            extension,
        }
    }

    /// Folder part of the path, `None` for notes at the vault root.
    pub fn folder(&self) -> Option<&str> {
        self.path
            .rsplit_once('/')
            .map(|(folder, _)| folder)
            .filter(|folder| !folder.is_empty())
    }

    /// Whether this note is a markdown document.
    pub fn is_markdown(&self) -> bool {
        self.extension == MARKDOWN_EXTENSION
    }

    /// Address carried by the basename, if any.
    pub fn address(&self) -> Option<Address> {
        extract_address(&self.basename)
    }
}
