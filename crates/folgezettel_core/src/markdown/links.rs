//! Wiki-link scanning.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static WIKI_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]|#]+)(?:[|#][^\]]+)?\]\]").expect("valid wiki-link regex"));

/// Returns the set of link targets in `content`.
///
/// Alias (`[[a|b]]`) and section (`[[a#b]]`) suffixes are dropped; only the
/// trimmed target basename is kept.
pub fn extract_links(content: &str) -> BTreeSet<String> {
    WIKI_LINK_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|target| target.as_str().trim().to_string())
        .filter(|target| !target.is_empty())
        .collect()
}

/// Plain wiki-link literal for `basename`.
pub fn wiki_link(basename: &str) -> String {
    format!("[[{basename}]]")
}

/// Whether `content` already contains the plain literal `[[basename]]`.
pub fn contains_link(content: &str, basename: &str) -> bool {
    content.contains(&wiki_link(basename))
}
