//! Template collaborator for complex tag output.
//!
//! [`TemplateEngine`] renders minijinja templates. Templates are looked up in
//! an optional directory first, then among the built-in templates compiled
//! into the crate, so a directory can override `spoiler.html` or add new
//! templates for custom tags.
//!
//! Every template receives:
//!
//! | variable        | value                                       |
//! |-----------------|---------------------------------------------|
//! | `tag`           | tag name as written                         |
//! | `argument`      | argument after `=`, or none                 |
//! | `inner_content` | raw content between the markers             |
//! | `inner_html`    | rendered content, inserted without escaping |
//! | `id`            | fresh identifier, unique per render         |

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use minijinja::{Environment, ErrorKind, Value, context};
use uuid::Uuid;

use crate::context::TagContext;
use crate::error::RenderError;

/// Synchronous template renderer consulted by template-backed tag rules.
pub trait TemplateRenderer: Send + Sync {
    fn render_template(&self, name: &str, ctx: &TagContext<'_>) -> Result<String, RenderError>;
}

/// Built-in template sources.
fn builtin_template(name: &str) -> Option<&'static str> {
    match name {
        "spoiler.html" => Some(include_str!("templates/spoiler.html")),
        _ => None,
    }
}

/// minijinja-backed [`TemplateRenderer`].
pub struct TemplateEngine {
    env: Environment<'static>,
    dir: Option<PathBuf>,
}

impl TemplateEngine {
    /// Engine serving the built-in templates only.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Engine looking up templates in `dir` before the built-in ones.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self::build(Some(dir.into()))
    }

    fn build(dir: Option<PathBuf>) -> Self {
        let mut env = Environment::new();
        let lookup_dir = dir.clone();
        env.set_loader(move |name| {
            if let Some(dir) = &lookup_dir
                && let Some(source) = read_template(dir, name)?
            {
                return Ok(Some(source));
            }
            Ok(builtin_template(name).map(str::to_owned))
        });
        Self { env, dir }
    }

    /// Directory consulted before the built-in templates.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Read `name` from `dir`, `None` if the file does not exist.
fn read_template(dir: &Path, name: &str) -> Result<Option<String>, minijinja::Error> {
    if name.split(['/', '\\']).any(|segment| segment == "..") {
        return Ok(None);
    }
    let path = dir.join(name);
    match fs::read_to_string(&path) {
        Ok(source) => {
            tracing::debug!(path = %path.display(), "Loaded template from directory");
            Ok(Some(source))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("failed to read template {}", path.display()),
        )
        .with_source(e)),
    }
}

impl TemplateRenderer for TemplateEngine {
    fn render_template(&self, name: &str, ctx: &TagContext<'_>) -> Result<String, RenderError> {
        let to_error = |source| RenderError::Template {
            name: name.to_owned(),
            source,
        };

        let template = self.env.get_template(name).map_err(to_error)?;
        template
            .render(context! {
                tag => ctx.tag_name(),
                argument => ctx.argument(),
                inner_content => ctx.inner_content(),
                inner_html => Value::from_safe_string(ctx.inner_html().to_owned()),
                id => Uuid::new_v4().simple().to_string(),
            })
            .map_err(to_error)
    }
}
