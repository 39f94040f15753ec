//! Closing marker resolution.
//!
//! Finding where a tag ends is the ambiguous part of the markup: tags nest
//! inside tags of the same name, legacy editors emit duplicated openers, and
//! some tags (list items, `[hr]`, bracketed prose) are never closed at all.
//!
//! [`CloseTagSearch`] resolves a node's extent in three steps:
//!
//! 1. **Balanced search**: walk the candidate closing markers `[/name]` and
//!    stop at the first one where the span from the opener to the candidate
//!    holds as many `[name` prefixes as `[/name]` markers. If none balances,
//!    the last candidate is kept.
//! 2. **Unclosed fallback**: without any candidate, the node ends at the next
//!    identical opener, else the next `[`, else the end of input.
//! 3. **Dangling opener check**: while the content of a closed node still holds
//!    an opener of the same tag but no closing prefix, move on to the next
//!    closing marker. If there is none, the node falls back to unclosed.
//!
//! All searches ignore ASCII case.

use crate::source::Source;

/// Byte extent of a tagged node within its source.
///
/// The content runs from `content_start` to `content_end`. The closing marker
/// occupies `close_start..close_end` and is empty for unclosed nodes, in which
/// case all three boundaries coincide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Extent {
    pub content_start: usize,
    pub content_end: usize,
    pub close_start: usize,
    pub close_end: usize,
}

impl Extent {
    pub(crate) fn is_closed(&self) -> bool {
        self.close_end > self.close_start
    }
}

/// Search state for one opening marker.
pub(crate) struct CloseTagSearch<'s, 'a> {
    source: &'s Source<'a>,
    tag_name: &'s str,
    open_start: usize,
    open_end: usize,
    /// Folded opening marker with argument, e.g. `[list=1]`.
    open_marker: String,
    /// Folded opener prefix without argument, e.g. `[list`.
    open_prefix: String,
    /// Folded closing marker, e.g. `[/list]`.
    close_marker: String,
    /// Folded closing prefix, e.g. `[/list`.
    close_prefix: String,
}

impl<'s, 'a> CloseTagSearch<'s, 'a> {
    /// Prepare a search for the opener occupying `open_start..open_end`.
    pub(crate) fn new(
        source: &'s Source<'a>,
        tag_name: &'s str,
        open_start: usize,
        open_end: usize,
    ) -> Self {
        let name = tag_name.to_ascii_lowercase();
        Self {
            source,
            tag_name,
            open_start,
            open_end,
            open_marker: source.folded(open_start, open_end).to_owned(),
            open_prefix: format!("[{name}"),
            close_marker: format!("[/{name}]"),
            close_prefix: format!("[/{name}"),
        }
    }

    /// Resolve the node's extent.
    pub(crate) fn resolve(&self) -> Extent {
        let mut extent = match self.balanced_close() {
            Some(close_start) => self.closed_at(close_start),
            None => return self.unclosed(),
        };

        while self.has_dangling_opener(&extent) {
            match self.source.find_folded(&self.close_marker, extent.close_end) {
                Some(close_start) => extent = self.closed_at(close_start),
                None => return self.unclosed(),
            }
        }

        extent
    }

    /// Find the closing marker whose span balances openers and closers.
    ///
    /// Returns the last candidate when no candidate balances, `None` when there
    /// is no candidate at all.
    ///
    /// The counts run over the span from the opener to the candidate's end.
    /// Each step only scans the slice added since the previous candidate: a
    /// slice ends right after a `]`, and neither marker holds a `]` before its
    /// last byte, so no match straddles two slices.
    pub(crate) fn balanced_close(&self) -> Option<usize> {
        let mut search_from = self.open_end;
        let mut counted_to = self.open_start;
        let mut opened = 0;
        let mut closed = 0;
        let mut candidate = None;

        while let Some(close_start) = self.source.find_folded(&self.close_marker, search_from) {
            candidate = Some(close_start);

            let close_end = close_start + self.close_marker.len();
            let slice = self.source.folded(counted_to, close_end);
            opened += slice.matches(self.open_prefix.as_str()).count();
            closed += slice.matches(self.close_marker.as_str()).count();
            if opened == closed {
                break;
            }

            counted_to = close_end;
            search_from = close_end;
        }

        candidate
    }

    /// Whether the content of a closed extent holds an opener of this tag
    /// without any closing marker for it.
    fn has_dangling_opener(&self, extent: &Extent) -> bool {
        if !extent.is_closed() {
            return false;
        }
        let content = self.source.folded(extent.content_start, extent.content_end);
        content.contains(self.open_prefix.as_str()) && !content.contains(self.close_prefix.as_str())
    }

    fn closed_at(&self, close_start: usize) -> Extent {
        Extent {
            content_start: self.open_end,
            content_end: close_start,
            close_start,
            close_end: close_start + self.close_marker.len(),
        }
    }

    /// Extent of a node without closing marker.
    ///
    /// Ends at the next identical opener (repeated `[*]` items), else at the
    /// next opener of any tag, else at the end of input.
    pub(crate) fn unclosed(&self) -> Extent {
        let boundary = self
            .source
            .find_folded(&self.open_marker, self.open_end)
            .or_else(|| self.source.find_char('[', self.open_end))
            .unwrap_or(self.source.len());

        tracing::trace!(tag = %self.tag_name, boundary, "Unclosed tag");

        Extent {
            content_start: self.open_end,
            content_end: boundary,
            close_start: boundary,
            close_end: boundary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::marker_end;

    /// Resolve the extent of the opener at `open_start` and return
    /// `(content, close marker)`.
    fn resolve_at<'a>(input: &'a str, open_start: usize, tag_name: &str) -> (&'a str, &'a str) {
        let source = Source::new(input);
        let open_end = marker_end(input, open_start);
        let extent = CloseTagSearch::new(&source, tag_name, open_start, open_end).resolve();
        (
            &input[extent.content_start..extent.content_end],
            &input[extent.close_start..extent.close_end],
        )
    }

    #[test]
    fn test_simple_close() {
        assert_eq!(resolve_at("[b]bold[/b] rest", 0, "b"), ("bold", "[/b]"));
    }

    #[test]
    fn test_close_ignores_case() {
        assert_eq!(
            resolve_at("[QUOTE]text[/quote]", 0, "QUOTE"),
            ("text", "[/quote]")
        );
    }

    #[test]
    fn test_nested_same_name_pairs_outer_with_last_close() {
        assert_eq!(
            resolve_at("[x][x]a[/x]b[/x]", 0, "x"),
            ("[x]a[/x]b", "[/x]")
        );
    }

    #[test]
    fn test_nested_siblings_inside_same_name() {
        let input = "[spoiler][spoiler]a[/spoiler][spoiler]b[/spoiler][/spoiler]";
        assert_eq!(
            resolve_at(input, 0, "spoiler"),
            ("[spoiler]a[/spoiler][spoiler]b[/spoiler]", "[/spoiler]")
        );
    }

    #[test]
    fn test_nested_openers_with_arguments_are_counted() {
        assert_eq!(
            resolve_at("[size=3][size=2]xx[/size]yy[/size]", 0, "size"),
            ("[size=2]xx[/size]yy", "[/size]")
        );
    }

    #[test]
    fn test_balance_accumulates_over_candidates() {
        let input = "[q][q=1]a[/q][Q]b[/q]c[/q]d[/q]";
        assert_eq!(
            resolve_at(input, 0, "q"),
            ("[q=1]a[/q][Q]b[/q]c", "[/q]")
        );
        let source = Source::new(input);
        let search = CloseTagSearch::new(&source, "q", 0, 3);
        assert_eq!(search.balanced_close(), Some(22));
    }

    #[test]
    fn test_duplicated_opener() {
        assert_eq!(
            resolve_at("[center][center]x[/center] y[/center]", 0, "center"),
            ("[center]x[/center] y", "[/center]")
        );
    }

    #[test]
    fn test_dangling_duplicate_falls_back_to_unclosed() {
        // No second closing marker: the outer opener gives up and ends at the
        // inner one, which then pairs normally.
        assert_eq!(
            resolve_at("[center][center]x[/center] y", 0, "center"),
            ("", "")
        );
        assert_eq!(
            resolve_at("[center][center]x[/center] y", 8, "center"),
            ("x", "[/center]")
        );
    }

    #[test]
    fn test_unbalanced_keeps_last_candidate() {
        let source = Source::new("[c][c][c]x[/c]y[/c]z");
        let search = CloseTagSearch::new(&source, "c", 0, 3);
        assert_eq!(search.balanced_close(), Some(15));
    }

    #[test]
    fn test_unclosed_ends_at_same_opener() {
        assert_eq!(resolve_at("[*]a[b]x[/b][*]b", 0, "*"), ("a[b]x[/b]", ""));
    }

    #[test]
    fn test_unclosed_ends_at_any_opener() {
        assert_eq!(resolve_at("[hr]text[b]x[/b]", 0, "hr"), ("text", ""));
    }

    #[test]
    fn test_unclosed_ends_at_end_of_input() {
        assert_eq!(
            resolve_at("[Help] XYZ not working", 0, "Help"),
            (" XYZ not working", "")
        );
    }

    #[test]
    fn test_extent_is_closed() {
        let closed = Extent {
            content_start: 3,
            content_end: 7,
            close_start: 7,
            close_end: 11,
        };
        let open = Extent {
            content_start: 3,
            content_end: 7,
            close_start: 7,
            close_end: 7,
        };
        assert!(closed.is_closed());
        assert!(!open.is_closed());
    }
}
