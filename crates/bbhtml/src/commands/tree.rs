//! `bbhtml tree` command implementation.

use std::fmt::Write as _;
use std::path::PathBuf;

use bb_parser::{Document, Node};
use clap::Args;

use super::{read_input, write_output};
use crate::error::CliError;

/// Arguments for the tree command.
#[derive(Args)]
pub(crate) struct TreeArgs {
    /// BBCode input file (`-` or omitted reads stdin).
    input: Option<PathBuf>,

    /// Print the tree as JSON.
    #[arg(long)]
    json: bool,
}

impl TreeArgs {
    /// Execute the tree command.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let document = Document::parse(read_input(self.input.as_deref())?);
        let dump = if self.json {
            serde_json::to_string_pretty(document.nodes())?
        } else {
            format_tree(document.nodes())
        };
        write_output(None, &dump)?;
        Ok(())
    }
}

/// Indented text dump, one node per line.
///
/// Leaf tags show their content as a text line below them.
fn format_tree(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        format_node(&mut out, node, 0);
    }
    out
}

fn format_node(out: &mut String, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    let Some(name) = node.tag_name() else {
        let _ = writeln!(out, "{indent}text {:?}", node.inner_content());
        return;
    };

    let _ = write!(out, "{indent}tag {name} open={:?}", node.open_raw());
    if let Some(argument) = node.argument() {
        let _ = write!(out, " argument={argument:?}");
    }
    if node.is_closed() {
        let _ = writeln!(out, " close={:?}", node.close_raw());
    } else {
        let _ = writeln!(out, " unclosed");
    }

    if node.has_children() {
        for child in node.children() {
            format_node(out, child, depth + 1);
        }
    } else if !node.inner_content().is_empty() {
        let _ = writeln!(out, "{indent}  text {:?}", node.inner_content());
    }
}
