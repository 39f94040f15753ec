//! Built-in forum tag set.
//!
//! Output relies on Bootstrap classes (`blockquote`, `text-muted`, ...) and is
//! sanitized afterwards, so transformations only escape attribute values.

use std::sync::LazyLock;

use html_escape::{encode_double_quoted_attribute, encode_text};
use regex::Regex;

use crate::context::TagContext;
use crate::error::RenderError;
use crate::rule::{Element, TagRule};

/// Template used by `[spoiler]`.
pub const SPOILER_TEMPLATE: &str = "spoiler.html";

static YOUTUBE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:youtube\.com/(?:watch\?(?:[^#]*&)?v=|embed/|shorts/)|youtu\.be/)([A-Za-z0-9_-]{11})",
    )
    .unwrap()
});

static YOUTUBE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

/// Default rules in lookup order.
pub fn default_rules() -> Vec<TagRule> {
    vec![
        TagRule::element("[b]", Element::new("strong")),
        TagRule::element("[i]", Element::new("i")),
        TagRule::element("[u]", Element::new("u")),
        TagRule::element("[s]", Element::new("strike")),
        TagRule::element("[center]", Element::new("center")),
        TagRule::element(
            "[right]",
            Element::new("span").with_attribute("class", "text-xs-right"),
        ),
        TagRule::element("[code]", Element::new("pre")),
        TagRule::transform("[quote]", quote),
        TagRule::transform("[color]", |ctx| Ok(style_span("color", ctx))),
        TagRule::element("[url]", Element::new("a").with_argument_attribute("href")),
        TagRule::transform("[img]", image),
        TagRule::element("[list]", Element::new("ul")).with_nested_child(list_item()),
        TagRule::element("[list=1]", Element::new("ol")).with_nested_child(list_item()),
        TagRule::transform("[size]", size),
        TagRule::element("[sup]", Element::new("sup")),
        TagRule::transform("[font]", |ctx| Ok(style_span("font-family", ctx))),
        TagRule::element(
            "[shadow]",
            Element::new("span").with_attribute("class", "text-shadow"),
        ),
        TagRule::template("[spoiler]", SPOILER_TEMPLATE),
        TagRule::transform("[video]", video),
        TagRule::transform("[youtube]", youtube),
    ]
}

fn list_item() -> TagRule {
    TagRule::element("[*]", Element::new("li"))
}

/// `[quote]`, `[quote=author]` or `[quote=author;postid]`.
fn quote(ctx: &TagContext<'_>) -> Result<String, RenderError> {
    let mut html = format!(r#"<blockquote class="blockquote">{}"#, ctx.inner_html());

    if let Some(argument) = ctx.argument().filter(|argument| !argument.is_empty()) {
        let mut segments = argument.split(';');
        let author = encode_text(segments.next().unwrap_or_default());
        let author = match segments.next() {
            Some(post_id) => format!(
                r##"<a href="#post{}">{author}</a>"##,
                encode_double_quoted_attribute(post_id.trim())
            ),
            None => author.into_owned(),
        };
        html.push_str(r#"<footer class="blockquote-footer">"#);
        html.push_str(&author);
        html.push_str("</footer>");
    }

    html.push_str("</blockquote>");
    Ok(html)
}

/// `[size=1]` is a muted small block, other integers map to `<font size>`.
/// Anything else is left as markup.
fn size(ctx: &TagContext<'_>) -> Result<String, RenderError> {
    let Some(size) = ctx.argument().and_then(|argument| argument.trim().parse::<i32>().ok())
    else {
        return Ok(ctx.pass_through());
    };

    let html = if size == 1 {
        format!(
            r#"<small class="text-muted d-block">{}</small>"#,
            ctx.inner_html()
        )
    } else {
        format!(r#"<font size="{size}">{}</font>"#, ctx.inner_html())
    };
    Ok(html)
}

fn style_span(property: &str, ctx: &TagContext<'_>) -> String {
    let value = ctx.argument().unwrap_or_default();
    format!(
        r#"<span style="{property}: {}">{}</span>"#,
        encode_double_quoted_attribute(value),
        ctx.inner_html()
    )
}

/// `[img]` takes its source from the raw content.
fn image(ctx: &TagContext<'_>) -> Result<String, RenderError> {
    Ok(format!(
        r#"<img src="{}" />"#,
        encode_double_quoted_attribute(ctx.inner_content().trim())
    ))
}

fn video(ctx: &TagContext<'_>) -> Result<String, RenderError> {
    let src = ctx.argument().unwrap_or(ctx.inner_content()).trim();
    Ok(format!(
        r#"<video controls src="{}"></video>"#,
        encode_double_quoted_attribute(src)
    ))
}

/// `[youtube]` accepts a watch, short or embed URL, or a bare video id.
fn youtube(ctx: &TagContext<'_>) -> Result<String, RenderError> {
    let source = ctx.argument().unwrap_or(ctx.inner_content()).trim();
    let Some(id) = youtube_id(source) else {
        tracing::debug!(source, "Unrecognized YouTube reference");
        return Ok(ctx.pass_through());
    };

    Ok(format!(
        r#"<div class="embed-video" data-provider="youtube" data-video-id="{id}"><a href="https://www.youtube.com/watch?v={id}">https://www.youtube.com/watch?v={id}</a></div>"#
    ))
}

fn youtube_id(source: &str) -> Option<&str> {
    if YOUTUBE_ID.is_match(source) {
        return Some(source);
    }
    YOUTUBE_URL
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str())
}
