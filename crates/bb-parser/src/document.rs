//! Parsed document.

use crate::node::Node;
use crate::parser::parse;

/// Raw markup together with its parse tree.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Document {
    raw: String,
    nodes: Vec<Node>,
}

impl Document {
    /// Parse `raw` into a document.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let nodes = parse(&raw);
        Self { raw, nodes }
    }

    /// Input the document was parsed from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Top-level nodes in input order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Top-level nodes that carry a tag.
    pub fn tag_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|node| node.has_tag())
    }

    /// Consume the document and return its nodes.
    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }
}
