//! Opening marker parsing: `[name]`, `[name=argument]`.

/// Characters stripped from both ends of an argument.
const ARGUMENT_QUOTES: [char; 2] = ['\'', '"'];

/// Find the end (exclusive) of the opening marker starting at `open_start`.
///
/// The marker normally ends after the first `]`. A marker without one (a
/// smiley like `[:` or truncated input) ends at the next `[`, or at the end
/// of input.
pub(crate) fn marker_end(input: &str, open_start: usize) -> usize {
    if let Some(i) = input[open_start..].find(']') {
        return open_start + i + 1;
    }
    tracing::trace!(position = open_start, "Opening marker without closing bracket");
    let after = open_start + 1;
    input[after..].find('[').map_or(input.len(), |i| after + i)
}

/// Split a raw opening marker into tag name and argument.
///
/// Splits once on `=`, so arguments may contain further `=` characters
/// (query strings in links). Quotes around the argument are removed.
///
/// Returns `None` when the marker has no name (`[]`, `[=x]`).
pub(crate) fn parse_open_marker(raw: &str) -> Option<(String, Option<String>)> {
    let inner = raw.strip_prefix('[').unwrap_or(raw);
    let inner = inner.strip_suffix(']').unwrap_or(inner);

    let (name, argument) = match inner.split_once('=') {
        Some((name, argument)) => {
            let argument = argument.trim_matches(ARGUMENT_QUOTES).to_owned();
            (name, Some(argument))
        }
        None => (inner, None),
    };

    if name.is_empty() {
        return None;
    }
    Some((name.to_owned(), argument))
}
