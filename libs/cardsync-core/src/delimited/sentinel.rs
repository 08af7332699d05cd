//! Card ids carried inside a text field.
//!
//! The export format has no id column, so the id rides at the start of
//! one designated field:
//!
//! ```text
//! 42 : DO NOT MODIFY THIS LINE
//! the rest of the field
//! ```

use crate::error::{Error, Result};
use crate::types::CardId;
use once_cell::sync::Lazy;
use regex::Regex;

const MARKER: &str = " : DO NOT MODIFY THIS LINE";

static SENTINEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\A(-?[0-9]+) : DO NOT MODIFY THIS LINE(?:\n|\z)").expect("valid sentinel regex")
});

/// Split a leading sentinel off `content`.
///
/// Returns the id, if one was present, and the content without it.
pub(crate) fn split_id(content: &str) -> Result<(Option<CardId>, &str)> {
    let Some(caps) = SENTINEL_RE.captures(content) else {
        return Ok((None, content));
    };
    let digits = &caps[1];
    let id = digits
        .parse::<CardId>()
        .map_err(|_| Error::InvalidId(digits.to_string()))?;
    let rest = &content[caps.get(0).map_or(0, |m| m.end())..];
    Ok((Some(id), rest))
}

/// Prefix `content` with the sentinel for `id`.
pub(crate) fn join_id(id: CardId, content: &str) -> String {
    if content.is_empty() {
        format!("{id}{MARKER}")
    } else {
        format!("{id}{MARKER}\n{content}")
    }
}
