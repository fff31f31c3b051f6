//! Folgezettel address model and algebra.
//!
//! # Responsibility
//! - Parse raw address strings into typed segments.
//! - Render segments back into canonical address strings.
//! - Derive parent addresses, last-segment kinds and letter-run successors.
//! - Extract the address carried by a note title.
//!
//! # Invariants
//! - A parsed `Address` has at least one segment and the first one is numeric.
//! - Letter segments are non-empty lowercase ASCII runs.
//! - `Address::parse(&render(a.segments()))` yields the same segments as `a`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One atomic component of an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Numeric run such as the `12` in `1.12a`.
    Number(u64),
    /// Lowercase letter run such as the `ab` in `3ab`.
    Letters(String),
}

impl Segment {
    /// Returns the kind tag of this segment.
    pub fn kind(&self) -> SegmentKind {
        match self {
            Self::Number(_) => SegmentKind::Number,
            Self::Letters(_) => SegmentKind::Letters,
        }
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Letters(value) => f.write_str(value),
        }
    }
}

/// Kind tag for [`Segment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Number,
    Letters,
}

/// Errors from address parsing.
///
/// Callers normally treat any of these as "note has no address".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    /// Input is blank after trimming.
    Empty,
    /// Input does not start with a digit.
    LeadingNonDigit(String),
    /// A numeric run does not fit into `u64`.
    NumberOverflow(String),
}

impl Display for AddressParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "address must not be blank"),
            Self::LeadingNonDigit(raw) => write!(f, "address must start with a digit: `{raw}`"),
            Self::NumberOverflow(raw) => write!(f, "address segment out of range: `{raw}`"),
        }
    }
}

impl Error for AddressParseError {}

/// Parsed folgezettel address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    segments: Vec<Segment>,
    raw: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Digit,
    Letter,
    Dot,
    Other,
}

impl CharClass {
    fn of(ch: char) -> Self {
        if ch.is_ascii_digit() {
            Self::Digit
        } else if ch.is_ascii_alphabetic() {
            Self::Letter
        } else if ch == '.' {
            Self::Dot
        } else {
            Self::Other
        }
    }
}

impl Address {
    /// Parses a raw address such as `1.2a3c5`.
    ///
    /// Scanning stops silently at the first character that is neither a
    /// digit, an ASCII letter nor a dot; segments collected so far are kept.
    ///
    /// # Errors
    /// - `Empty` when `raw` is blank.
    /// - `LeadingNonDigit` when the trimmed input does not start with a digit.
    /// - `NumberOverflow` when a numeric run exceeds `u64`.
    pub fn parse(raw: &str) -> Result<Self, AddressParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AddressParseError::Empty);
        }
        if !trimmed.starts_with(|ch: char| ch.is_ascii_digit()) {
            return Err(AddressParseError::LeadingNonDigit(trimmed.to_string()));
        }

        let mut segments = Vec::new();
        let mut current = String::new();
        let mut in_number = true;

        for ch in trimmed.chars() {
            match CharClass::of(ch) {
                CharClass::Dot => {
                    flush_segment(&mut segments, &mut current, in_number, trimmed)?;
                    in_number = true;
                }
                CharClass::Digit => {
                    if !in_number {
                        flush_segment(&mut segments, &mut current, false, trimmed)?;
                    }
                    in_number = true;
                    current.push(ch);
                }
                CharClass::Letter => {
                    if in_number {
                        flush_segment(&mut segments, &mut current, true, trimmed)?;
                    }
                    in_number = false;
                    current.push(ch.to_ascii_lowercase());
                }
                CharClass::Other => break,
            }
        }
        flush_segment(&mut segments, &mut current, in_number, trimmed)?;

        // Unreachable in practice: the leading digit always yields a segment.
        if segments.is_empty() {
            return Err(AddressParseError::Empty);
        }

        Ok(Self {
            segments,
            raw: trimmed.to_string(),
        })
    }

    fn from_segments(segments: Vec<Segment>) -> Self {
        let raw = render(&segments);
        Self { segments, raw }
    }

    /// Ordered segment list; the semantic source of truth.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Trimmed input as given to [`Address::parse`].
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Canonical string form (lowercase, no redundant separators).
    pub fn canonical(&self) -> String {
        render(&self.segments)
    }

    /// Final segment of the address.
    pub fn last_segment(&self) -> &Segment {
        // `segments` is never empty after construction.
        &self.segments[self.segments.len() - 1]
    }

    /// Kind of the final segment.
    pub fn last_segment_kind(&self) -> SegmentKind {
        self.last_segment().kind()
    }

    /// Returns the parent address, or `None` for a root address.
    ///
    /// `1.2a3` -> `1.2a`, `1.2a` -> `1.2`, `1` -> `None`.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() <= 1 {
            return None;
        }
        let parent_segments = self.segments[..self.segments.len() - 1].to_vec();
        Some(Self::from_segments(parent_segments))
    }

    /// Returns a new address with `segment` appended.
    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self::from_segments(segments)
    }
}

fn flush_segment(
    segments: &mut Vec<Segment>,
    current: &mut String,
    is_number: bool,
    raw: &str,
) -> Result<(), AddressParseError> {
    if current.is_empty() {
        return Ok(());
    }
    let segment = if is_number {
        let value = current
            .parse::<u64>()
            .map_err(|_| AddressParseError::NumberOverflow(raw.to_string()))?;
        Segment::Number(value)
    } else {
        Segment::Letters(current.clone())
    };
    segments.push(segment);
    current.clear();
    Ok(())
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Renders segments as an address string.
///
/// A numeric segment is prefixed with `.` only when the previous segment is
/// also numeric; letter runs are always concatenated directly.
pub fn render(segments: &[Segment]) -> String {
    let mut out = String::new();
    let mut previous_was_number = false;
    for (index, segment) in segments.iter().enumerate() {
        let is_number = matches!(segment, Segment::Number(_));
        if index > 0 && is_number && previous_was_number {
            out.push('.');
        }
        out.push_str(&segment.to_string());
        previous_was_number = is_number;
    }
    out
}

/// Last-segment kind for a raw address, `None` when it does not parse.
pub fn last_segment_kind(raw: &str) -> Option<SegmentKind> {
    Address::parse(raw)
        .ok()
        .map(|address| address.last_segment_kind())
}

/// Successor of a lowercase letter run, odometer style.
///
/// `"" -> "a"`, `"a" -> "b"`, `"z" -> "aa"`, `"az" -> "ba"`, `"zz" -> "aaa"`.
pub fn next_letter_sequence(letters: &str) -> String {
    let mut chars: Vec<u8> = letters.bytes().collect();
    let mut index = chars.len();
    while index > 0 {
        index -= 1;
        if chars[index] == b'z' {
            chars[index] = b'a';
        } else {
            chars[index] += 1;
            return String::from_utf8_lossy(&chars).into_owned();
        }
    }
    chars.insert(0, b'a');
    String::from_utf8_lossy(&chars).into_owned()
}

/// Extracts the address carried by a note title.
///
/// The first digit in the title starts the candidate, which then extends
/// over `digits ('.' digits)* (letters digits*)*`. Dots are only accepted
/// between numeric runs, before any letter run.
pub fn extract_address(title: &str) -> Option<Address> {
    let start = title.find(|ch: char| ch.is_ascii_digit())?;
    let candidate = &title[start..];
    let bytes = candidate.as_bytes();

    let mut end = skip_while(bytes, 0, u8::is_ascii_digit);
    while bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
        end = skip_while(bytes, end + 1, u8::is_ascii_digit);
    }
    while bytes.get(end).is_some_and(u8::is_ascii_alphabetic) {
        end = skip_while(bytes, end, u8::is_ascii_alphabetic);
        end = skip_while(bytes, end, u8::is_ascii_digit);
    }

    Address::parse(&candidate[..end]).ok()
}

fn skip_while(bytes: &[u8], mut index: usize, predicate: fn(&u8) -> bool) -> usize {
    while bytes.get(index).is_some_and(predicate) {
        index += 1;
    }
    index
}
