//! Render engine: parse tree to sanitized HTML.

use std::sync::Arc;

use bb_parser::{Node, parse};

use crate::context::TagContext;
use crate::error::RenderError;
use crate::line_breaks::{Trim, normalize_line_breaks, sibling_trims};
use crate::registry::TagRegistry;
use crate::rule::{TagOutput, TagRule};
use crate::sanitize::{HtmlSanitizer, Sanitizer};
use crate::template::{TemplateEngine, TemplateRenderer};

/// Tags whose surrounding line breaks are trimmed by default.
pub const DEFAULT_BLOCK_TAGS: [&str; 4] = ["quote", "spoiler", "code", "center"];

/// Renders tag markup to sanitized HTML.
///
/// The renderer holds only shared, read-only state and can be used from many
/// threads at once. Each top-level node is rendered and sanitized on its own,
/// and the sanitized fragments are concatenated.
///
/// # Example
///
/// ```
/// use bb_renderer::HtmlRenderer;
///
/// let renderer = HtmlRenderer::with_defaults();
/// let html = renderer.render("[b]Hello[/b] [unknown]world[/unknown]").unwrap();
/// assert_eq!(html, "<strong>Hello</strong> [unknown]world[/unknown]");
/// ```
#[derive(Clone)]
pub struct HtmlRenderer {
    registry: Arc<TagRegistry>,
    sanitizer: Arc<dyn Sanitizer>,
    templates: Option<Arc<dyn TemplateRenderer>>,
    block_tags: Vec<String>,
}

impl HtmlRenderer {
    /// Create a renderer without template support and with the default
    /// block tags.
    pub fn new(registry: TagRegistry, sanitizer: impl Sanitizer + 'static) -> Self {
        Self {
            registry: Arc::new(registry),
            sanitizer: Arc::new(sanitizer),
            templates: None,
            block_tags: DEFAULT_BLOCK_TAGS.iter().map(|&tag| tag.to_owned()).collect(),
        }
    }

    /// Default tag set, default sanitizer policy and built-in templates.
    pub fn with_defaults() -> Self {
        Self::new(TagRegistry::with_defaults(), HtmlSanitizer::default())
            .with_templates(TemplateEngine::new())
    }

    #[must_use]
    pub fn with_templates(mut self, templates: impl TemplateRenderer + 'static) -> Self {
        self.templates = Some(Arc::new(templates));
        self
    }

    /// Replace the set of block tags. Names are matched case-insensitively.
    #[must_use]
    pub fn with_block_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.block_tags = tags
            .into_iter()
            .map(|tag| tag.as_ref().to_lowercase())
            .collect();
        self
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    pub fn block_tags(&self) -> &[String] {
        &self.block_tags
    }

    /// Parse and render `input`.
    pub fn render(&self, input: &str) -> Result<String, RenderError> {
        self.render_nodes(&parse(input))
    }

    /// Render an already parsed sequence of nodes.
    pub fn render_nodes(&self, nodes: &[Node]) -> Result<String, RenderError> {
        let trims = sibling_trims(nodes, |node| self.is_block(node));
        let mut html = String::new();
        for (node, trim) in nodes.iter().zip(trims) {
            let fragment = self.render_node(node, None, trim)?;
            html.push_str(&self.sanitizer.sanitize(&fragment)?);
        }
        Ok(html)
    }

    fn is_block(&self, node: &Node) -> bool {
        node.tag_name()
            .is_some_and(|name| self.block_tags.iter().any(|tag| tag.eq_ignore_ascii_case(name)))
    }

    /// Render one node. `nested` is the enclosing rule's child override.
    fn render_node(
        &self,
        node: &Node,
        nested: Option<&TagRule>,
        trim: Trim,
    ) -> Result<String, RenderError> {
        if node.is_text() {
            return Ok(normalize_line_breaks(trim.apply(node.inner_content())).into_owned());
        }

        let rule = nested
            .filter(|rule| rule.matches(node))
            .or_else(|| self.registry.resolve(node));

        let Some(rule) = rule else {
            tracing::debug!(tag = node.open_raw(), "No rule for tag, passing through");
            let inner = self.render_inner(node, None, trim)?;
            return Ok(format!("{}{inner}{}", node.open_raw(), node.close_raw()));
        };

        let inner = self.render_inner(node, rule.nested_child(), trim)?;
        match rule.output() {
            TagOutput::Element(element) => Ok(format!(
                "{}{inner}{}",
                element.open_tag(node),
                element.close_tag()
            )),
            TagOutput::Transform(transform) => {
                let ctx = TagContext::new(node, &inner).with_templates(self.templates.as_deref());
                transform(&ctx)
            }
        }
    }

    /// Render a node's content: its children, or its normalized text.
    fn render_inner(
        &self,
        node: &Node,
        nested: Option<&TagRule>,
        trim: Trim,
    ) -> Result<String, RenderError> {
        let is_block = self.is_block(node);
        let trim = if is_block { trim.union(Trim::BOTH) } else { trim };

        if !node.has_children() {
            return Ok(normalize_line_breaks(trim.apply(node.inner_content())).into_owned());
        }

        // Only blocks pass their trim on to boundary children
        let children = node.children();
        let trims = if is_block {
            let mut trims = sibling_trims(children, |child| self.is_block(child));
            if let Some(first) = trims.first_mut() {
                first.leading |= trim.leading;
            }
            if let Some(last) = trims.last_mut() {
                last.trailing |= trim.trailing;
            }
            trims
        } else {
            vec![Trim::default(); children.len()]
        };

        children
            .iter()
            .zip(trims)
            .map(|(child, trim)| self.render_node(child, nested, trim))
            .collect()
    }
}

impl std::fmt::Debug for HtmlRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlRenderer")
            .field("registry", &self.registry)
            .field("templates", &self.templates.is_some())
            .field("block_tags", &self.block_tags)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::rule::Element;

    static_assertions::assert_impl_all!(HtmlRenderer: Send, Sync);

    #[allow(clippy::unnecessary_wraps)]
    fn passthrough(html: &str) -> Result<String, RenderError> {
        Ok(html.to_owned())
    }

    /// Default tags, no sanitization, to inspect raw structure.
    fn raw_renderer() -> HtmlRenderer {
        HtmlRenderer::new(TagRegistry::with_defaults(), passthrough)
            .with_templates(TemplateEngine::new())
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(raw_renderer().render("hello").unwrap(), "hello");
    }

    #[test]
    fn test_simple_elements() {
        assert_eq!(
            raw_renderer().render("[b]b[/b][i]i[/i][u]u[/u][s]s[/s]").unwrap(),
            "<strong>b</strong><i>i</i><u>u</u><strike>s</strike>"
        );
    }

    #[test]
    fn test_unknown_tag_round_trip() {
        let input = "He [mr xyz] said that [foo=bar]x[/FOO]";
        assert_eq!(raw_renderer().render(input).unwrap(), input);
    }

    #[test]
    fn test_unknown_tag_pass_through_with_children() {
        assert_eq!(
            raw_renderer().render("[foo]a[b]c[/b]d[/foo]").unwrap(),
            "[foo]a<strong>c</strong>d[/foo]"
        );
    }

    #[test]
    fn test_three_newlines_become_one_paragraph() {
        assert_eq!(
            raw_renderer().render("a\n\n\nb").unwrap(),
            "a<br /><br />b"
        );
    }

    #[test]
    fn test_line_breaks_inside_tags() {
        assert_eq!(
            raw_renderer().render("[b]a\nb[/b]").unwrap(),
            "<strong>a<br />b</strong>"
        );
    }

    #[test]
    fn test_block_trims_surrounding_breaks() {
        assert_eq!(
            raw_renderer()
                .render("before\r\n[quote]\r\nquoted\r\n[/quote]\r\n\r\nafter")
                .unwrap(),
            r#"before<blockquote class="blockquote">quoted</blockquote>after"#
        );
    }

    #[test]
    fn test_block_trims_reach_boundary_children() {
        assert_eq!(
            raw_renderer()
                .render("[center]\n[b]x[/b]\n[/center]")
                .unwrap(),
            "<center><strong>x</strong></center>"
        );
    }

    #[test]
    fn test_block_trims_nested_blocks() {
        assert_eq!(
            raw_renderer()
                .render("[quote]a\n[code]x[/code]\nb[/quote]")
                .unwrap(),
            r#"<blockquote class="blockquote">a<pre>x</pre>b</blockquote>"#
        );
    }

    #[test]
    fn test_block_neighbor_trims_leaf_content_only() {
        assert_eq!(
            raw_renderer().render("[i]x\n[/i][quote]q[/quote]").unwrap(),
            r#"<i>x</i><blockquote class="blockquote">q</blockquote>"#
        );
        assert_eq!(
            raw_renderer()
                .render("[i][b]x[/b]\n[/i][quote]q[/quote]")
                .unwrap(),
            r#"<i><strong>x</strong><br /></i><blockquote class="blockquote">q</blockquote>"#
        );
    }

    #[test]
    fn test_non_block_keeps_breaks() {
        assert_eq!(
            raw_renderer().render("a\n[b]x[/b]\nb").unwrap(),
            "a<br /><strong>x</strong><br />b"
        );
    }

    #[test]
    fn test_custom_block_tags() {
        let renderer = raw_renderer().with_block_tags(["B"]);
        assert_eq!(renderer.render("a\n[b]x[/b]\nb").unwrap(), "a<strong>x</strong>b");
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            raw_renderer()
                .render("[list][*]one[*]two[/list][list=1][*]three[/list]")
                .unwrap(),
            "<ul><li>one</li><li>two</li></ul><ol><li>three</li></ol>"
        );
    }

    #[test]
    fn test_list_item_outside_list_passes_through() {
        assert_eq!(raw_renderer().render("[*]stray").unwrap(), "[*]stray");
    }

    #[test]
    fn test_nested_override_only_for_matching_children() {
        assert_eq!(
            raw_renderer()
                .render("[list][*]a [b]x[/b][*]b[/list]")
                .unwrap(),
            "<ul><li>a <strong>x</strong></li><li>b</li></ul>"
        );
    }

    #[test]
    fn test_nested_override_does_not_leak_to_grandchildren() {
        let registry = TagRegistry::new().with_rule(
            TagRule::element("[outer]", Element::new("div"))
                .with_nested_child(TagRule::element("[x]", Element::new("em"))),
        );
        let renderer = HtmlRenderer::new(registry, passthrough);
        assert_eq!(
            renderer.render("[outer][x]a[/x][y][x]b[/x][/y][/outer]").unwrap(),
            "<div><em>a</em>[y][x]b[/x][/y]</div>"
        );
    }

    #[test]
    fn test_url_with_and_without_argument() {
        assert_eq!(
            raw_renderer()
                .render("[url=https://example.org]site[/url] [url]https://a.example[/url]")
                .unwrap(),
            r#"<a href="https://example.org">site</a> <a href="https://a.example">https://a.example</a>"#
        );
    }

    #[test]
    fn test_exact_marker_rule() {
        let registry = TagRegistry::new()
            .with_rule(TagRule::element("[h]", Element::new("h4")))
            .with_rule(TagRule::element("[h=big]", Element::new("h2")));
        let renderer = HtmlRenderer::new(registry, passthrough);
        assert_eq!(
            renderer.render("[H=BIG]a[/h][h=small]b[/h]").unwrap(),
            "<h2>a</h2><h4>b</h4>"
        );
    }

    #[test]
    fn test_transform_receives_rendered_inner_html() {
        let registry = TagRegistry::with_defaults().with_rule(TagRule::transform("[attach]", |ctx| {
            Ok(format!("<b>Attachment {}: {}</b>", ctx.inner_content(), ctx.inner_html()))
        }));
        let renderer = HtmlRenderer::new(registry, passthrough);
        assert_eq!(
            renderer.render("[attach]7[/attach]").unwrap(),
            "<b>Attachment 7: 7</b>"
        );
    }

    #[test]
    fn test_transform_error_propagates() {
        let registry = TagRegistry::new().with_rule(TagRule::transform("[fail]", |ctx| {
            Err(RenderError::Transform {
                tag: ctx.tag_name().to_owned(),
                message: "boom".to_owned(),
            })
        }));
        let renderer = HtmlRenderer::new(registry, passthrough);
        let err = renderer.render("ok [fail]x[/fail]").unwrap_err();
        assert!(matches!(err, RenderError::Transform { tag, .. } if tag == "fail"));
    }

    #[test]
    fn test_sanitizer_error_propagates() {
        let renderer = HtmlRenderer::new(TagRegistry::with_defaults(), |_: &str| {
            Err::<String, _>(RenderError::Sanitizer("rejected".to_owned()))
        });
        let err = renderer.render("[b]x[/b]").unwrap_err();
        assert!(matches!(err, RenderError::Sanitizer(message) if message == "rejected"));
    }

    #[test]
    fn test_sanitizer_runs_per_top_level_fragment() {
        let renderer = HtmlRenderer::new(TagRegistry::with_defaults(), |html: &str| {
            Ok::<_, RenderError>(format!("({html})"))
        });
        assert_eq!(
            renderer.render("a[b]x[/b]c").unwrap(),
            "(a)(<strong>x</strong>)(c)"
        );
    }

    #[test]
    fn test_spoiler_without_templates_fails() {
        let renderer = HtmlRenderer::new(TagRegistry::with_defaults(), passthrough);
        let err = renderer.render("[spoiler]x[/spoiler]").unwrap_err();
        assert!(matches!(err, RenderError::TemplateUnavailable(_)));
    }

    #[test]
    fn test_spoiler_with_templates() {
        let html = HtmlRenderer::with_defaults()
            .render("[spoiler=Plot]it was [b]him[/b][/spoiler]")
            .unwrap();
        assert!(html.contains(r#"class="spoiler card""#));
        assert!(html.contains("it was <strong>him</strong>"));
        assert!(html.contains(">Plot</div>"));
    }

    #[test]
    fn test_sanitized_output() {
        let html = HtmlRenderer::with_defaults()
            .render("[b]x[/b]\n<script>alert(1)</script>[url=javascript:alert(1)]y[/url]")
            .unwrap();
        assert_eq!(
            html,
            r#"<strong>x</strong><br><a rel="noopener noreferrer">y</a>"#
        );
    }

    #[test]
    fn test_quote_with_author_survives_sanitizer() {
        let html = HtmlRenderer::with_defaults()
            .render("[quote=Anna;12]hi[/quote]")
            .unwrap();
        assert_eq!(
            html,
            r##"<blockquote class="blockquote">hi<footer class="blockquote-footer"><a href="#post12" rel="noopener noreferrer">Anna</a></footer></blockquote>"##
        );
    }

    #[test]
    fn test_render_is_idempotent_under_sanitizer() {
        let sanitizer = HtmlSanitizer::default();
        let html = HtmlRenderer::with_defaults()
            .render("[color=red]x[/color] [size=1]s[/size] [img]a.png[/img]")
            .unwrap();
        assert_eq!(sanitizer.sanitize(&html).unwrap(), html);
    }

    #[test]
    fn test_concurrent_rendering() {
        let renderer = HtmlRenderer::with_defaults();
        std::thread::scope(|scope| {
            for i in 0..4 {
                let renderer = &renderer;
                scope.spawn(move || {
                    let html = renderer.render(&format!("[b]{i}[/b]")).unwrap();
                    assert_eq!(html, format!("<strong>{i}</strong>"));
                });
            }
        });
    }
}
