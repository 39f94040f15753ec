//! Line break handling: conversion to HTML breaks and trimming around block tags.

use std::borrow::Cow;
use std::sync::LazyLock;

use bb_parser::Node;
use regex::{Captures, Regex};

/// Replacement for two or more consecutive line breaks.
pub const PARAGRAPH_BREAK: &str = "<br /><br />";

/// Replacement for a single line break.
pub const LINE_BREAK: &str = "<br />";

const LINE_BREAK_CHARS: [char; 2] = ['\r', '\n'];

static LINE_BREAK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\r\n|\r|\n)+").unwrap());

/// Convert line breaks in text to HTML breaks.
///
/// `\r\n`, `\r` and `\n` each count as one break. A run of two or more breaks
/// becomes a single [`PARAGRAPH_BREAK`], a lone break becomes [`LINE_BREAK`].
///
/// ```
/// use bb_renderer::normalize_line_breaks;
///
/// assert_eq!(normalize_line_breaks("a\r\nb"), "a<br />b");
/// assert_eq!(normalize_line_breaks("a\n\n\nb"), "a<br /><br />b");
/// ```
pub fn normalize_line_breaks(text: &str) -> Cow<'_, str> {
    LINE_BREAK_RUN.replace_all(text, |caps: &Captures<'_>| {
        if break_count(&caps[0]) >= 2 {
            PARAGRAPH_BREAK
        } else {
            LINE_BREAK
        }
    })
}

/// Number of line breaks in a run of `\r` and `\n` characters.
fn break_count(run: &str) -> usize {
    run.len() - run.matches("\r\n").count()
}

/// Line breaks to strip from the edges of a node's content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Trim {
    pub leading: bool,
    pub trailing: bool,
}

impl Trim {
    pub const BOTH: Self = Self {
        leading: true,
        trailing: true,
    };

    pub(crate) fn apply(self, text: &str) -> &str {
        let text = if self.leading {
            text.trim_start_matches(LINE_BREAK_CHARS)
        } else {
            text
        };
        if self.trailing {
            text.trim_end_matches(LINE_BREAK_CHARS)
        } else {
            text
        }
    }

    #[must_use]
    pub(crate) fn union(self, other: Self) -> Self {
        Self {
            leading: self.leading || other.leading,
            trailing: self.trailing || other.trailing,
        }
    }
}

/// Trim flags for a sibling list.
///
/// A block node loses line breaks on both edges of its content, its previous
/// sibling loses trailing breaks and its next sibling loses leading breaks.
pub(crate) fn sibling_trims(nodes: &[Node], is_block: impl Fn(&Node) -> bool) -> Vec<Trim> {
    let mut trims = vec![Trim::default(); nodes.len()];
    for (i, node) in nodes.iter().enumerate() {
        if !is_block(node) {
            continue;
        }
        trims[i] = Trim::BOTH;
        if let Some(previous) = i.checked_sub(1) {
            trims[previous].trailing = true;
        }
        if let Some(next) = trims.get_mut(i + 1) {
            next.leading = true;
        }
    }
    trims
}
