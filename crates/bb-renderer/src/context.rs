//! Render-time context handed to tag transformations.

use bb_parser::Node;

use crate::error::RenderError;
use crate::template::TemplateRenderer;

/// Node being rendered together with its already rendered inner HTML.
///
/// The parse tree stays immutable: everything computed while rendering a node
/// travels in this context instead of being written back into the node.
///
/// # Example
///
/// ```
/// use bb_renderer::{HtmlRenderer, RenderError, TagRegistry, TagRule};
///
/// let registry = TagRegistry::new().with_rule(TagRule::transform("[shout]", |ctx| {
///     Ok(format!("<strong>{}!</strong>", ctx.inner_html()))
/// }));
/// let renderer = HtmlRenderer::new(registry, |html: &str| {
///     Ok::<_, RenderError>(html.to_owned())
/// });
///
/// assert_eq!(renderer.render("[shout]hey[/shout]").unwrap(), "<strong>hey!</strong>");
/// ```
#[derive(Clone, Copy)]
pub struct TagContext<'a> {
    node: &'a Node,
    inner_html: &'a str,
    templates: Option<&'a dyn TemplateRenderer>,
}

impl<'a> TagContext<'a> {
    /// Create a context without template support.
    pub fn new(node: &'a Node, inner_html: &'a str) -> Self {
        Self {
            node,
            inner_html,
            templates: None,
        }
    }

    #[must_use]
    pub(crate) fn with_templates(mut self, templates: Option<&'a dyn TemplateRenderer>) -> Self {
        self.templates = templates;
        self
    }

    pub fn node(&self) -> &'a Node {
        self.node
    }

    /// Tag name as written in the input, empty for text nodes.
    pub fn tag_name(&self) -> &'a str {
        self.node.tag_name().unwrap_or_default()
    }

    pub fn argument(&self) -> Option<&'a str> {
        self.node.argument()
    }

    /// Raw text between the markers, before any rendering.
    pub fn inner_content(&self) -> &'a str {
        self.node.inner_content()
    }

    /// Rendered HTML of the node's content (children or normalized text).
    pub fn inner_html(&self) -> &'a str {
        self.inner_html
    }

    /// Raw markup of the node with its content rendered, used when a rule
    /// declines to handle a node.
    pub fn pass_through(&self) -> String {
        format!(
            "{}{}{}",
            self.node.open_raw(),
            self.inner_html,
            self.node.close_raw()
        )
    }

    /// Render a named template for this node.
    pub fn render_template(&self, name: &str) -> Result<String, RenderError> {
        let templates = self
            .templates
            .ok_or_else(|| RenderError::TemplateUnavailable(name.to_owned()))?;
        templates.render_template(name, self)
    }
}

impl std::fmt::Debug for TagContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagContext")
            .field("node", self.node)
            .field("inner_html", &self.inner_html)
            .field("templates", &self.templates.is_some())
            .finish()
    }
}
