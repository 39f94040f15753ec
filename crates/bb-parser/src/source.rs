//! Input text with a case-folded shadow copy for marker searches.

/// Parser input paired with an ASCII-lowercased copy.
///
/// ASCII folding keeps byte offsets identical between the two strings, so a
/// match found in the folded copy can be sliced out of the raw input directly.
pub(crate) struct Source<'a> {
    raw: &'a str,
    folded: String,
}

impl<'a> Source<'a> {
    pub(crate) fn new(raw: &'a str) -> Self {
        Self {
            raw,
            folded: raw.to_ascii_lowercase(),
        }
    }

    pub(crate) fn raw(&self) -> &'a str {
        self.raw
    }

    pub(crate) fn len(&self) -> usize {
        self.raw.len()
    }

    /// Slice of the folded copy.
    pub(crate) fn folded(&self, start: usize, end: usize) -> &str {
        &self.folded[start..end]
    }

    /// Position of the next `c` at or after `from`.
    pub(crate) fn find_char(&self, c: char, from: usize) -> Option<usize> {
        if from > self.raw.len() {
            return None;
        }
        self.raw[from..].find(c).map(|i| from + i)
    }

    /// Case-insensitive search for an already folded `needle` at or after `from`.
    pub(crate) fn find_folded(&self, needle: &str, from: usize) -> Option<usize> {
        if from > self.folded.len() {
            return None;
        }
        self.folded[from..].find(needle).map(|i| from + i)
    }
}
