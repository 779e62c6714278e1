//! Release notes merging and truncation.

use crate::config::ReleaseNotesMode;
use std::borrow::Cow;

/// Maximum release body length accepted by the remote, in characters.
pub const MAX_RELEASE_BODY_CHARS: usize = 125_000;

/// Appended to a body that had to be shortened.
const TRUNCATION_MARKER: &str = "\n\n...";

/// Combines the notes already on the remote with newly supplied ones.
#[must_use]
pub fn merge_release_notes(existing: &str, new: &str, mode: ReleaseNotesMode) -> String {
    match mode {
        ReleaseNotesMode::Append => format!("{}\n\n{}", existing.trim(), new.trim()),
        ReleaseNotesMode::Prepend => format!("{}\n\n{}", new.trim(), existing.trim()),
        ReleaseNotesMode::Replace => new.to_string(),
        ReleaseNotesMode::KeepExisting if existing.is_empty() => new.to_string(),
        ReleaseNotesMode::KeepExisting => existing.to_string(),
    }
}

/// Shortens `body` so it fits [`MAX_RELEASE_BODY_CHARS`].
///
/// The cut lands on a character boundary, and on the last line break when
/// one exists in the second half of the kept text, so markdown lists and
/// tables are not left with half a row. A marker is appended to show the
/// body was shortened.
#[must_use]
pub fn truncate_release_body(body: &str) -> Cow<'_, str> {
    if body.chars().count() <= MAX_RELEASE_BODY_CHARS {
        return Cow::Borrowed(body);
    }

    let keep = MAX_RELEASE_BODY_CHARS - TRUNCATION_MARKER.chars().count();
    let cut = body
        .char_indices()
        .nth(keep)
        .map_or(body.len(), |(idx, _)| idx);
    let mut head = &body[..cut];

    match head.rfind('\n') {
        Some(newline) if newline >= cut / 2 => head = &head[..newline],
        _ => {}
    }

    Cow::Owned(format!("{}{TRUNCATION_MARKER}", head.trim_end()))
}
