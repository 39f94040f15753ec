//! Tolerant parser for bracket-tag markup (BBCode).
//!
//! Legacy forum markup is human-authored and frequently broken: tags are left
//! unclosed, duplicated, nested inside themselves or truncated. This crate turns
//! such input into an ordered tree of [`Node`]s without ever failing. Every
//! byte of the input ends up in exactly one node, so the source text can be
//! reconstructed from the tree.
//!
//! # Architecture
//!
//! - [`parse`] scans the input from one opening marker to the next and emits
//!   tagged nodes and the text between them.
//! - Closing markers are resolved by a dedicated search that balances nested
//!   same-name tags, recovers from duplicated openers and falls back to a fixed
//!   boundary for unclosed tags.
//! - [`Document`] keeps the raw input next to its parsed nodes.
//!
//! The parser has no notion of output formats; see the `bb-renderer` crate.
//!
//! # Example
//!
//! ```
//! use bb_parser::parse;
//!
//! let nodes = parse("[quote][b]Hi[/b] there[/quote]");
//! let quote = &nodes[0];
//! assert_eq!(quote.tag_name(), Some("quote"));
//! assert_eq!(quote.children().len(), 2);
//! assert_eq!(quote.children()[0].inner_content(), "Hi");
//! ```

mod close_tag;
mod document;
mod marker;
mod node;
mod parser;
mod source;

pub use document::Document;
pub use node::Node;
pub use parser::parse;
