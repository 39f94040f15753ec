//! Allow-list HTML sanitization.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;

use ammonia::Builder;
use regex::Regex;

use crate::error::RenderError;

/// Sanitizer applied to every rendered top-level fragment.
///
/// Implementations must be idempotent on their own output. Plain functions
/// and closures with the matching signature implement the trait.
pub trait Sanitizer: Send + Sync {
    fn sanitize(&self, html: &str) -> Result<String, RenderError>;
}

impl<F> Sanitizer for F
where
    F: Fn(&str) -> Result<String, RenderError> + Send + Sync,
{
    fn sanitize(&self, html: &str) -> Result<String, RenderError> {
        self(html)
    }
}

/// Tags removed from the allow-list by default: document structure and form
/// elements that could fake site UI inside a post.
pub const DEFAULT_REMOVED_TAGS: [&str; 8] = [
    "form", "input", "html", "body", "option", "textarea", "header", "head",
];

/// Tags added to the allow-list by default for the built-in tag set.
pub const DEFAULT_ADDED_TAGS: [&str; 2] = ["font", "video"];

/// Tags removed together with their content. They can never be allow-listed.
pub const CLEAN_CONTENT_TAGS: [&str; 2] = ["script", "style"];

/// Style properties kept in `style` attributes.
const ALLOWED_STYLE_PROPERTIES: [&str; 2] = ["color", "font-family"];

static STYLE_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^[#\w\s,.'"-]+$"#).unwrap());

/// Immutable sanitizer settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SanitizerPolicy {
    /// Tags removed from the base allow-list.
    pub remove_tags: Vec<String>,
    /// Tags added to the base allow-list.
    pub add_tags: Vec<String>,
    /// Attributes allowed on every tag.
    pub allow_attributes: Vec<String>,
    /// Whether `data-*` attributes are kept.
    pub allow_data_attributes: bool,
    /// `rel` value forced on links, `None` to leave links untouched.
    pub link_rel: Option<String>,
}

impl Default for SanitizerPolicy {
    fn default() -> Self {
        Self {
            remove_tags: to_strings(&DEFAULT_REMOVED_TAGS),
            add_tags: to_strings(&DEFAULT_ADDED_TAGS),
            allow_attributes: to_strings(&["class", "id"]),
            allow_data_attributes: true,
            link_rel: Some("noopener noreferrer".to_owned()),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|&item| item.to_owned()).collect()
}

/// ammonia-backed [`Sanitizer`].
///
/// Starts from ammonia's default allow-list, applies the policy on top and
/// keeps `style` attributes restricted to text color and font family.
///
/// ```
/// use bb_renderer::{HtmlSanitizer, Sanitizer};
///
/// let sanitizer = HtmlSanitizer::default();
/// let html = sanitizer
///     .sanitize(r#"<b class="x" onclick="evil()">hi</b><form><input></form>"#)
///     .unwrap();
/// assert_eq!(html, r#"<b class="x">hi</b>"#);
/// ```
#[derive(Clone, Debug, Default)]
pub struct HtmlSanitizer {
    policy: SanitizerPolicy,
}

impl HtmlSanitizer {
    /// Create a sanitizer for `policy`.
    ///
    /// Entries that contradict fixed rules are dropped: [`CLEAN_CONTENT_TAGS`]
    /// from `add_tags`, and a generic `rel` attribute while `link_rel` is set.
    pub fn new(mut policy: SanitizerPolicy) -> Self {
        policy.add_tags.retain(|tag| {
            let keep = !is_clean_content_tag(tag);
            if !keep {
                tracing::warn!(tag = %tag, "Ignoring clean-content tag in allow-list");
            }
            keep
        });
        if policy.link_rel.is_some() {
            policy.allow_attributes.retain(|attribute| {
                let keep = !attribute.eq_ignore_ascii_case("rel");
                if !keep {
                    tracing::warn!("Ignoring generic rel attribute, link_rel is set");
                }
                keep
            });
        }
        Self { policy }
    }

    pub fn policy(&self) -> &SanitizerPolicy {
        &self.policy
    }

    fn builder(&self) -> Builder<'_> {
        let policy = &self.policy;
        let mut builder = Builder::default();
        builder
            .add_tags(policy.add_tags.iter().map(String::as_str))
            .rm_tags(policy.remove_tags.iter().map(String::as_str))
            .add_tag_attributes("font", ["size", "face"])
            .add_tag_attributes("video", ["src", "controls"])
            .add_generic_attributes(policy.allow_attributes.iter().map(String::as_str))
            .add_generic_attributes(["style"])
            .attribute_filter(filter_style)
            .link_rel(policy.link_rel.as_deref());
        if policy.allow_data_attributes {
            builder.add_generic_attribute_prefixes(["data-"]);
        }
        builder
    }
}

impl Sanitizer for HtmlSanitizer {
    fn sanitize(&self, html: &str) -> Result<String, RenderError> {
        Ok(self.builder().clean(html).to_string())
    }
}

fn is_clean_content_tag(tag: &str) -> bool {
    CLEAN_CONTENT_TAGS
        .iter()
        .any(|clean| clean.eq_ignore_ascii_case(tag))
}

/// Keep only safe declarations of allowed properties in `style` attributes.
fn filter_style<'u>(_element: &str, attribute: &str, value: &'u str) -> Option<Cow<'u, str>> {
    if attribute != "style" {
        return Some(Cow::Borrowed(value));
    }

    let declarations: Vec<String> = value
        .split(';')
        .filter_map(|declaration| {
            let (property, value) = declaration.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim();
            let allowed = ALLOWED_STYLE_PROPERTIES.contains(&property.as_str())
                && STYLE_VALUE.is_match(value);
            allowed.then(|| format!("{property}: {value}"))
        })
        .collect();

    if declarations.is_empty() {
        tracing::debug!(style = value, "Dropped style attribute");
        return None;
    }
    Some(Cow::Owned(declarations.join("; ")))
}

/// Remove all markup from `html` and return its decoded text.
///
/// Script and style contents are dropped along with their tags.
///
/// ```
/// assert_eq!(bb_renderer::strip_tags("<b>Test</b> 1 &amp; 2"), "Test 1 & 2");
/// ```
pub fn strip_tags(html: &str) -> String {
    let text = Builder::empty()
        .clean_content_tags(HashSet::from(CLEAN_CONTENT_TAGS))
        .clean(html)
        .to_string();
    html_escape::decode_html_entities(&text).into_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sanitize(html: &str) -> String {
        HtmlSanitizer::default().sanitize(html).unwrap()
    }

    #[test]
    fn test_removes_form_elements() {
        assert_eq!(sanitize("<form action=\"/x\"><textarea>a</textarea></form>b"), "ab");
    }

    #[test]
    fn test_keeps_class_id_and_data_attributes() {
        assert_eq!(
            sanitize(r#"<div class="spoiler" id="s1" data-toggle="collapse">x</div>"#),
            r#"<div class="spoiler" id="s1" data-toggle="collapse">x</div>"#
        );
    }

    #[test]
    fn test_data_attributes_can_be_disabled() {
        let sanitizer = HtmlSanitizer::new(SanitizerPolicy {
            allow_data_attributes: false,
            ..SanitizerPolicy::default()
        });
        assert_eq!(
            sanitizer.sanitize(r#"<div data-x="1">x</div>"#).unwrap(),
            "<div>x</div>"
        );
    }

    #[test]
    fn test_removes_scripts_and_handlers() {
        assert_eq!(
            sanitize(r#"<a href="javascript:alert(1)" onclick="x()">l</a><script>bad()</script>"#),
            r#"<a rel="noopener noreferrer">l</a>"#
        );
    }

    #[test]
    fn test_keeps_footer_and_builtin_extras() {
        assert_eq!(
            sanitize(r#"<blockquote class="blockquote">q<footer class="blockquote-footer">me</footer></blockquote>"#),
            r#"<blockquote class="blockquote">q<footer class="blockquote-footer">me</footer></blockquote>"#
        );
        assert_eq!(sanitize(r#"<font size="3">x</font>"#), r#"<font size="3">x</font>"#);
    }

    #[test]
    fn test_style_restricted_to_color_and_font() {
        assert_eq!(
            sanitize(r#"<span style="color: red">x</span>"#),
            r#"<span style="color: red">x</span>"#
        );
        assert_eq!(
            sanitize(r#"<span style="position: fixed; color: #f00">x</span>"#),
            r#"<span style="color: #f00">x</span>"#
        );
        assert_eq!(
            sanitize(r#"<span style="background: url(evil)">x</span>"#),
            "<span>x</span>"
        );
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            r#"<strong>b</strong><br><br><i>i</i>"#,
            r#"<span style="font-family: 'Courier New'">x</span><img src="a.png" onerror="x()">"#,
            r#"<ul><li>1<li>2</ul><form><input></form><a href="https://example.org">l</a>"#,
            "a < b & c > d",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_generic_rel_yields_to_link_rel() {
        let sanitizer = HtmlSanitizer::new(SanitizerPolicy {
            allow_attributes: ["class", "id", "rel"].map(str::to_owned).to_vec(),
            ..SanitizerPolicy::default()
        });
        assert_eq!(sanitizer.policy().allow_attributes, ["class", "id"]);
        assert_eq!(
            sanitizer
                .sanitize(r#"<a href="https://example.org" rel="nofollow">l</a>"#)
                .unwrap(),
            r#"<a href="https://example.org" rel="noopener noreferrer">l</a>"#
        );
    }

    #[test]
    fn test_generic_rel_kept_without_link_rel() {
        let sanitizer = HtmlSanitizer::new(SanitizerPolicy {
            allow_attributes: ["rel"].map(str::to_owned).to_vec(),
            link_rel: None,
            ..SanitizerPolicy::default()
        });
        assert_eq!(sanitizer.policy().allow_attributes, ["rel"]);
        assert_eq!(
            sanitizer
                .sanitize(r#"<a href="https://example.org" rel="nofollow">l</a>"#)
                .unwrap(),
            r#"<a href="https://example.org" rel="nofollow">l</a>"#
        );
    }

    #[test]
    fn test_clean_content_tags_cannot_be_added() {
        let sanitizer = HtmlSanitizer::new(SanitizerPolicy {
            add_tags: ["font", "script", "Style", "video"].map(str::to_owned).to_vec(),
            ..SanitizerPolicy::default()
        });
        assert_eq!(sanitizer.policy().add_tags, ["font", "video"]);
        assert_eq!(
            sanitizer
                .sanitize("<script>bad()</script><style>p{}</style>ok")
                .unwrap(),
            "ok"
        );
    }

    #[test]
    fn test_closure_sanitizer() {
        let upper = |html: &str| Ok::<_, RenderError>(html.to_uppercase());
        assert_eq!(upper.sanitize("<b>x</b>").unwrap(), "<B>X</B>");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<b>Test</b>123"), "Test123");
        assert_eq!(strip_tags("<p>a<script>evil()</script></p>b"), "ab");
        assert_eq!(strip_tags("no tags"), "no tags");
        assert_eq!(strip_tags(""), "");
    }
}
