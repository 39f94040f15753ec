//! Markup scanner.
//!
//! Walks the input from one `[` to the next, resolving each opening marker
//! into a node and emitting the text between nodes as text leaves.

use crate::close_tag::CloseTagSearch;
use crate::marker::{marker_end, parse_open_marker};
use crate::node::Node;
use crate::source::Source;

/// Parse tag markup into an ordered sequence of nodes.
///
/// Never fails: malformed markup degrades to unclosed nodes or text.
///
/// - Input without any `[` becomes a single text node.
/// - Whitespace-only text before the first marker is dropped. All other text
///   is kept verbatim, including whitespace between nodes.
/// - A node's content is parsed into children when it contains further markup.
///
/// # Example
///
/// ```
/// let nodes = bb_parser::parse("Hello [b]world[/b]!");
/// assert_eq!(nodes.len(), 3);
/// assert_eq!(nodes[1].tag_name(), Some("b"));
/// assert_eq!(nodes[1].inner_content(), "world");
/// ```
pub fn parse(input: &str) -> Vec<Node> {
    let Some(first) = input.find('[') else {
        return vec![Node::text(input)];
    };

    let source = Source::new(input);
    let mut nodes = Vec::new();

    let leading = &input[..first];
    if !leading.trim().is_empty() {
        nodes.push(Node::text(leading));
    }

    let mut cursor = first;
    while let Some(open_start) = source.find_char('[', cursor) {
        let (node, node_end) = parse_node(&source, open_start);
        nodes.push(node);

        let text_end = source.find_char('[', node_end).unwrap_or(input.len());
        if text_end > node_end {
            nodes.push(Node::text(&input[node_end..text_end]));
        }

        cursor = if node_end > open_start {
            node_end
        } else {
            open_start + 1
        };
    }

    nodes
}

/// Parse the node whose opening marker starts at `open_start`.
///
/// Returns the node and the position right after it.
fn parse_node(source: &Source<'_>, open_start: usize) -> (Node, usize) {
    let input = source.raw();
    let open_end = marker_end(input, open_start);
    let open_raw = &input[open_start..open_end];

    let Some((tag_name, argument)) = parse_open_marker(open_raw) else {
        // `[]`, `[=x]`: not a tag, keep the brackets as text
        let end = source
            .find_char('[', open_start + 1)
            .unwrap_or(input.len());
        return (Node::text(&input[open_start..end]), end);
    };

    let extent = CloseTagSearch::new(source, &tag_name, open_start, open_end).resolve();
    let content = &input[extent.content_start..extent.content_end];

    let mut node = Node::tag(tag_name, argument, open_raw);
    node.set_extent(content, &input[extent.close_start..extent.close_end]);
    if content.contains('[') {
        node.set_children(parse(content));
    }

    (node, extent.close_end)
}
