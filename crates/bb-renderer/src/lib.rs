//! Sanitized HTML rendering for BBCode parse trees.
//!
//! This crate walks a tree produced by [`bb_parser`] and turns it into HTML
//! that is safe to embed in a page.
//!
//! # Architecture
//!
//! - [`TagRegistry`]: ordered [`TagRule`]s mapping tag markers to output. A
//!   rule either wraps content in an [`Element`] or hands the node to a
//!   transformation callable through a [`TagContext`].
//! - [`HtmlRenderer`]: resolves each node against the registry, converts line
//!   breaks, trims breaks around block tags and sanitizes every top-level
//!   fragment.
//! - [`Sanitizer`]: allow-list filter, implemented by [`HtmlSanitizer`].
//! - [`TemplateRenderer`]: optional template collaborator for complex output,
//!   implemented by [`TemplateEngine`].
//!
//! Unknown tags and malformed markup are never errors: they are rendered back
//! as the markup they came from, with their content still rendered.
//!
//! # Example
//!
//! ```
//! use bb_renderer::HtmlRenderer;
//!
//! let renderer = HtmlRenderer::with_defaults();
//! let html = renderer
//!     .render("[quote=Anna]Hello\n[url=https://example.org]there[/url][/quote]")
//!     .unwrap();
//! assert!(html.starts_with(r#"<blockquote class="blockquote">Hello<br>"#));
//! ```

mod context;
mod defaults;
mod error;
mod line_breaks;
mod registry;
mod renderer;
mod rule;
mod sanitize;
mod template;

pub use context::TagContext;
pub use defaults::{SPOILER_TEMPLATE, default_rules};
pub use error::RenderError;
pub use line_breaks::{LINE_BREAK, PARAGRAPH_BREAK, normalize_line_breaks};
pub use registry::TagRegistry;
pub use renderer::{DEFAULT_BLOCK_TAGS, HtmlRenderer};
pub use rule::{Element, TagOutput, TagRule, TransformFn};
pub use sanitize::{
    CLEAN_CONTENT_TAGS, DEFAULT_ADDED_TAGS, DEFAULT_REMOVED_TAGS, HtmlSanitizer, Sanitizer,
    SanitizerPolicy, strip_tags,
};
pub use template::{TemplateEngine, TemplateRenderer};
