//! Next-child address suggestion and collision validation.
//!
//! # Responsibility
//! - Compute the next unused child address under number/letter alternation.
//! - Check a proposed address against the whole collection.
//!
//! # Invariants
//! - A parent ending in letters gets a numeric child, and vice versa.
//! - A collision is reported, never silently resolved.

use crate::model::address::{next_letter_sequence, Address, Segment, SegmentKind};
use crate::model::note::Note;
use crate::repo::collection_index::CollectionIndex;
use crate::repo::host::{NoteStore, StoreResult};

/// Outcome of checking a proposed address against the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressValidation {
    /// The proposal does not parse as an address.
    Invalid { message: String },
    /// No note carries the address yet.
    Available,
    /// `existing` already carries the address.
    Duplicate { existing: Note },
}

impl AddressValidation {
    /// Whether creating a note at this address needs explicit confirmation.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

/// Computes the next child of `parent` given its existing `children`.
///
/// Letter runs are compared as plain strings when looking for the current
/// maximum, so `"z"` sorts after `"aa"`.
pub fn suggest_next_child(parent: &Address, children: &[Address]) -> Address {
    let last_segments = children.iter().map(Address::last_segment);
    let segment = match parent.last_segment_kind() {
        SegmentKind::Letters => {
            let max = last_segments
                .filter_map(|segment| match segment {
                    Segment::Number(value) => Some(*value),
                    Segment::Letters(_) => None,
                })
                .max()
                .unwrap_or(0);
            Segment::Number(max.saturating_add(1))
        }
        SegmentKind::Number => {
            let max = last_segments
                .filter_map(|segment| match segment {
                    Segment::Letters(value) => Some(value.as_str()),
                    Segment::Number(_) => None,
                })
                .max()
                .unwrap_or("");
            Segment::Letters(next_letter_sequence(max))
        }
    };
    parent.child(segment)
}

/// Scans the collection for children of `parent` and suggests the next one.
pub fn suggest_from_collection<S: NoteStore + ?Sized>(
    index: &CollectionIndex<'_, S>,
    parent: &Address,
) -> StoreResult<Address> {
    let children = index.children_of(parent)?;
    Ok(suggest_next_child(parent, &children))
}

/// Checks `raw` for parse errors and exact collisions.
pub fn validate_address<S: NoteStore + ?Sized>(
    index: &CollectionIndex<'_, S>,
    raw: &str,
) -> StoreResult<AddressValidation> {
    let address = match Address::parse(raw) {
        Ok(address) => address,
        Err(err) => {
            return Ok(AddressValidation::Invalid {
                message: format!("Invalid folgezettel address: \"{raw}\" ({err})"),
            })
        }
    };
    Ok(match index.find_by_exact_address(&address)? {
        Some(existing) => AddressValidation::Duplicate { existing },
        None => AddressValidation::Available,
    })
}
