//! Server-supplied names made safe to join under the destination directory.

/// Longest name most Unix filesystems accept, in bytes.
const NAME_MAX: usize = 255;

/// Path separators, NUL and other control characters.
fn is_unsafe(c: char) -> bool {
    matches!(c, '/' | '\\') || c.is_control()
}

/// Turns a name from `Content-Disposition` into one path component.
///
/// Runs of unsafe characters and underscores become a single `_`. Spaces,
/// dots and underscores at either end are dropped, so `..` and hidden names
/// cannot appear. The result is cut to [`NAME_MAX`] bytes on a char
/// boundary. It may be empty; callers fall back to the index name.
pub fn sanitize_filename(name: &str) -> String {
    let collapsed = name
        .chars()
        .map(|c| if is_unsafe(c) { '_' } else { c })
        .fold(String::with_capacity(name.len()), |mut acc, c| {
            if !(c == '_' && acc.ends_with('_')) {
                acc.push(c);
            }
            acc
        });
    let trimmed = collapsed.trim_matches(|c| matches!(c, ' ' | '.' | '_'));

    let end = trimmed
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|&end| end <= NAME_MAX)
        .last()
        .unwrap_or(0);
    trimmed[..end].to_string()
}
