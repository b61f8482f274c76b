//! String conversion utilities.

/// Converts an empty string to `None`, otherwise returns `Some(value)`.
///
/// Metadata stores absent descriptors as empty strings; generation requests
/// want them as options.
///
/// # Examples
///
/// ```
/// use herostory_domain::common::none_if_empty;
///
/// assert_eq!(none_if_empty("hello"), Some("hello"));
/// assert_eq!(none_if_empty(""), None);
/// assert_eq!(none_if_empty(" "), Some(" ")); // Whitespace is not empty
/// ```
pub fn none_if_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Keeps at most `max_chars` characters, appending `...` when anything was cut.
///
/// Counts characters, not bytes, so Cyrillic text is never split mid-codepoint.
pub fn truncate_with_ellipsis(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &value[..byte_idx]),
        None => value.to_string(),
    }
}
