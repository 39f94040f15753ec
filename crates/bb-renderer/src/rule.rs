//! Tag rules: how a tag identity maps to output.

use std::fmt;
use std::sync::Arc;

use bb_parser::Node;
use html_escape::encode_double_quoted_attribute;

use crate::context::TagContext;
use crate::error::RenderError;

/// Callable producing the whole output of a node.
pub type TransformFn = dyn Fn(&TagContext<'_>) -> Result<String, RenderError> + Send + Sync;

/// HTML element wrapped around a node's rendered content.
///
/// ```
/// use bb_renderer::Element;
///
/// let link = Element::new("a").with_argument_attribute("href");
/// assert_eq!(link.name(), "a");
/// assert_eq!(link.close_tag(), "</a>");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    argument_attribute: Option<String>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            argument_attribute: None,
        }
    }

    /// Add a fixed attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Bind the node's argument to an attribute.
    ///
    /// A node without argument binds its raw inner content instead, as long as
    /// that content is plain text (`[url]https://example.org[/url]`).
    #[must_use]
    pub fn with_argument_attribute(mut self, name: impl Into<String>) -> Self {
        self.argument_attribute = Some(name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Opening tag for `node`, attribute values escaped.
    pub fn open_tag(&self, node: &Node) -> String {
        let mut tag = format!("<{}", self.name);
        for (name, value) in &self.attributes {
            push_attribute(&mut tag, name, value);
        }
        if let Some(name) = &self.argument_attribute {
            let value = match node.argument() {
                Some(argument) => Some(argument),
                None if !node.has_children() => Some(node.inner_content().trim()),
                None => None,
            };
            if let Some(value) = value {
                push_attribute(&mut tag, name, value);
            }
        }
        tag.push('>');
        tag
    }

    pub fn close_tag(&self) -> String {
        format!("</{}>", self.name)
    }
}

fn push_attribute(tag: &mut String, name: &str, value: &str) {
    tag.push(' ');
    tag.push_str(name);
    tag.push_str("=\"");
    tag.push_str(&encode_double_quoted_attribute(value));
    tag.push('"');
}

/// Output strategy of a rule.
#[derive(Clone)]
pub enum TagOutput {
    /// Wrap the rendered content in an element.
    Element(Element),
    /// Hand the node and its rendered content to a callable whose result is
    /// used verbatim.
    Transform(Arc<TransformFn>),
}

impl fmt::Debug for TagOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(element) => f.debug_tuple("Element").field(element).finish(),
            Self::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

/// Registry entry mapping a tag identity to its output.
///
/// The identity is the canonical opening marker, e.g. `[b]` or `[list=1]`.
/// Markers with a fixed argument let variants of one tag render differently.
#[derive(Clone, Debug)]
pub struct TagRule {
    tag: String,
    output: TagOutput,
    nested_child: Option<Box<TagRule>>,
}

impl TagRule {
    /// Rule rendering the node as `element`.
    pub fn element(tag: impl AsRef<str>, element: Element) -> Self {
        Self::with_output(tag, TagOutput::Element(element))
    }

    /// Rule rendering the node through `transform`.
    pub fn transform<F>(tag: impl AsRef<str>, transform: F) -> Self
    where
        F: Fn(&TagContext<'_>) -> Result<String, RenderError> + Send + Sync + 'static,
    {
        Self::with_output(tag, TagOutput::Transform(Arc::new(transform)))
    }

    /// Rule rendering the node through the named template.
    pub fn template(tag: impl AsRef<str>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self::transform(tag, move |ctx| ctx.render_template(&name))
    }

    fn with_output(tag: impl AsRef<str>, output: TagOutput) -> Self {
        Self {
            tag: tag.as_ref().to_lowercase(),
            output,
            nested_child: None,
        }
    }

    /// Rule applied to direct children of a matching node instead of the
    /// registry (`[*]` inside `[list]`).
    #[must_use]
    pub fn with_nested_child(mut self, child: TagRule) -> Self {
        self.nested_child = Some(Box::new(child));
        self
    }

    /// Canonical opening marker, lowercase.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Marker without brackets, e.g. `list=1` for `[list=1]`.
    pub fn name(&self) -> &str {
        self.tag
            .strip_prefix('[')
            .and_then(|tag| tag.strip_suffix(']'))
            .unwrap_or(&self.tag)
    }

    pub fn output(&self) -> &TagOutput {
        &self.output
    }

    pub fn nested_child(&self) -> Option<&TagRule> {
        self.nested_child.as_deref()
    }

    /// Whether the node's full opening marker equals this rule's marker.
    pub(crate) fn matches_marker(&self, node: &Node) -> bool {
        node.open_raw().to_lowercase() == self.tag
    }

    /// Whether the node's tag name equals this rule's name.
    pub(crate) fn matches_name(&self, node: &Node) -> bool {
        node.tag_name()
            .is_some_and(|name| name.to_lowercase() == self.name())
    }

    pub(crate) fn matches(&self, node: &Node) -> bool {
        self.matches_marker(node) || self.matches_name(node)
    }
}
