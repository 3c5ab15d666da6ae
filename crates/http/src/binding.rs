//! Parsing of comma-separated identifier lists carried in a path segment,
//! e.g. `(id1, id2, id3)`.

use thiserror::Error;

/// An element of an identifier list could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed identifier list: element {position} ('{element}') is not a valid identifier")]
pub struct MalformedInput {
    /// Zero-based position among the non-empty elements
    pub position: usize,
    pub element: String,
}

/// Split `raw` on commas and parse every element with `parse`.
///
/// Empty segments between consecutive commas are skipped and the rest are
/// trimmed before parsing. Blank input yields an empty list. A single
/// unparseable element fails the whole list.
pub fn parse_id_list<T, E, F>(raw: &str, parse: F) -> Result<Vec<T>, MalformedInput>
where
    F: Fn(&str) -> Result<T, E>,
{
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    raw.split(',')
        .filter(|segment| !segment.is_empty())
        .map(str::trim)
        .enumerate()
        .map(|(position, element)| {
            parse(element).map_err(|_| MalformedInput {
                position,
                element: element.to_string(),
            })
        })
        .collect()
}

/// Strip the surrounding parentheses of a path segment such as `(a,b)`.
pub fn unwrap_parenthesized(segment: &str) -> Option<&str> {
    segment
        .trim()
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
}
