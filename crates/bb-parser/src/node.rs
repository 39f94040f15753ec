//! Parse tree node.

use std::fmt;

/// A unit of the parse tree: either a text leaf or a tagged container.
///
/// Nodes are created by [`parse`](crate::parse) and are immutable afterwards.
/// A node without a tag name is plain text: it has no argument, no markers and
/// no children, and its text lives in [`inner_content`](Self::inner_content).
///
/// A tagged node is *closed* when its closing marker was found in the input.
/// Unclosed nodes (list items, stray brackets, truncated markup) keep an empty
/// [`close_raw`](Self::close_raw).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Node {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    tag_name: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "String::is_empty"))]
    open_raw: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "String::is_empty"))]
    close_raw: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    argument: Option<String>,
    inner_content: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    children: Vec<Node>,
}

impl Node {
    /// Create a text leaf.
    pub(crate) fn text(content: impl Into<String>) -> Self {
        Self {
            tag_name: None,
            open_raw: String::new(),
            close_raw: String::new(),
            argument: None,
            inner_content: content.into(),
            children: Vec::new(),
        }
    }

    /// Create a tagged node from its opening marker.
    ///
    /// Content, closing marker and children are filled in by the parser once
    /// the node's extent is resolved.
    pub(crate) fn tag(
        tag_name: impl Into<String>,
        argument: Option<String>,
        open_raw: impl Into<String>,
    ) -> Self {
        Self {
            tag_name: Some(tag_name.into()),
            open_raw: open_raw.into(),
            close_raw: String::new(),
            argument,
            inner_content: String::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn set_extent(&mut self, inner_content: &str, close_raw: &str) {
        inner_content.clone_into(&mut self.inner_content);
        close_raw.clone_into(&mut self.close_raw);
    }

    pub(crate) fn set_children(&mut self, children: Vec<Node>) {
        self.children = children;
    }

    /// Tag name as written in the input (case preserved), `None` for text.
    pub fn tag_name(&self) -> Option<&str> {
        self.tag_name.as_deref()
    }

    /// Whether this node carries a tag.
    pub fn has_tag(&self) -> bool {
        self.tag_name.is_some()
    }

    /// Whether this node is a plain text leaf.
    pub fn is_text(&self) -> bool {
        self.tag_name.is_none()
    }

    /// Raw opening marker, e.g. `[url="https://example.org"]`.
    pub fn open_raw(&self) -> &str {
        &self.open_raw
    }

    /// Raw closing marker as written in the input, empty if unclosed.
    pub fn close_raw(&self) -> &str {
        &self.close_raw
    }

    /// Whether a closing marker was found.
    pub fn is_closed(&self) -> bool {
        !self.close_raw.is_empty()
    }

    /// Argument after `=` in the opening marker, with surrounding quotes removed.
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// Raw text between the markers (or the whole text of a text leaf).
    pub fn inner_content(&self) -> &str {
        &self.inner_content
    }

    /// Child nodes, non-empty only when the inner content contains markup.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Whether the inner content was parsed into children.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Reconstructs the node's source text: opening marker, content, closing marker.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.open_raw, self.inner_content, self.close_raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_node_has_no_tag() {
        let node = Node::text("hello");
        assert!(node.is_text());
        assert!(!node.has_tag());
        assert!(!node.is_closed());
        assert_eq!(node.argument(), None);
        assert_eq!(node.inner_content(), "hello");
    }

    #[test]
    fn test_closed_when_close_marker_present() {
        let mut node = Node::tag("b", None, "[b]");
        assert!(!node.is_closed());
        node.set_extent("bold", "[/B]");
        assert!(node.is_closed());
        assert_eq!(node.close_raw(), "[/B]");
    }

    #[test]
    fn test_display_reconstructs_source() {
        let mut node = Node::tag(
            "url",
            Some("https://example.org".to_owned()),
            "[url='https://example.org']",
        );
        node.set_extent("link", "[/url]");
        assert_eq!(node.to_string(), "[url='https://example.org']link[/url]");

        let mut item = Node::tag("*", None, "[*]");
        item.set_extent("item", "");
        assert_eq!(item.to_string(), "[*]item");
    }
}
