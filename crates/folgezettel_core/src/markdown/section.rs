//! Idempotent link insertion under second-level headings.

use crate::markdown::links::{contains_link, wiki_link};

const SECTION_PREFIX: &str = "## ";
const NEXT_SECTION_MARKER: &str = "\n## ";

/// Result of one [`insert_under_heading`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionEdit {
    /// Document text after the edit (unchanged when nothing was inserted).
    pub text: String,
    /// `false` when the document already linked to the target.
    pub inserted: bool,
}

/// Inserts `- [[target]] (annotation)` at the end of the `## heading` section.
///
/// # Contract
/// - A document that already contains `[[target]]` anywhere is returned
///   unchanged with `inserted = false`.
/// - The section runs from the heading line to the next `## ` line or the end
///   of the document; trailing blank lines of the section are collapsed
///   before the new link line.
/// - A missing heading is appended as a new section, separated from existing
///   content by one blank line.
/// - `heading` is trimmed before both lookup and writing.
pub fn insert_under_heading(
    document: &str,
    target_basename: &str,
    heading: &str,
    annotation: &str,
) -> SectionEdit {
    if contains_link(document, target_basename) {
        return SectionEdit {
            text: document.to_string(),
            inserted: false,
        };
    }

    let heading = heading.trim();
    let line = link_line(target_basename, annotation);
    let text = match find_heading_line_end(document, heading) {
        Some(heading_end) => {
            let section_end = document[heading_end..]
                .find(NEXT_SECTION_MARKER)
                .map_or(document.len(), |offset| heading_end + offset);
            let before = document[..section_end].trim_end();
            format!("{before}\n{line}\n{}", &document[section_end..])
        }
        None => {
            let before = document.trim_end();
            if before.is_empty() {
                format!("{SECTION_PREFIX}{heading}\n{line}\n")
            } else {
                format!("{before}\n\n{SECTION_PREFIX}{heading}\n{line}\n")
            }
        }
    };

    SectionEdit {
        text,
        inserted: true,
    }
}

/// Renders one bulleted link line.
pub fn link_line(target_basename: &str, annotation: &str) -> String {
    let annotation = annotation.trim();
    if annotation.is_empty() {
        format!("- {}", wiki_link(target_basename))
    } else {
        format!("- {} ({annotation})", wiki_link(target_basename))
    }
}

/// Byte offset just past the heading text (before its line break).
fn find_heading_line_end(document: &str, heading: &str) -> Option<usize> {
    let mut offset = 0;
    for line in document.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        let matches = content
            .strip_prefix(SECTION_PREFIX)
            .is_some_and(|title| title.trim_end() == heading);
        if matches {
            return Some(offset + content.len());
        }
        offset += line.len();
    }
    None
}
