//! Configuration management for bbhtml.
//!
//! Parses `bbhtml.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `templates.dir`
//! - `sanitizer.link_rel`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "bbhtml.toml";

/// Tags the sanitizer always drops together with their content.
const CLEAN_CONTENT_TAGS: [&str; 2] = ["script", "style"];

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the template directory.
    pub templates_dir: Option<PathBuf>,
    /// Override the block tag list.
    pub block_tags: Option<Vec<String>>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Render engine settings.
    pub render: RenderConfig,
    /// Tag registry settings.
    pub tags: TagsConfig,
    /// Sanitizer policy.
    pub sanitizer: SanitizerConfig,
    /// Template settings as written in TOML.
    templates: TemplatesConfigRaw,

    /// Resolved template settings (set after loading).
    #[serde(skip)]
    pub templates_resolved: TemplatesConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Render engine settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Tags whose surrounding line breaks are trimmed.
    pub block_tags: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            block_tags: ["quote", "spoiler", "code", "center"]
                .map(str::to_owned)
                .to_vec(),
        }
    }
}

/// Tag registry settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TagsConfig {
    /// Replace the built-in tag set instead of extending it.
    pub override_defaults: bool,
    /// Additional tags.
    pub custom: Vec<CustomTag>,
}

/// A custom tag declared in configuration.
///
/// Exactly one of `element` and `template` must be set.
#[derive(Debug, Deserialize)]
pub struct CustomTag {
    /// Opening marker, e.g. `[attach]` or `[list=a]`.
    pub tag: String,
    /// HTML element wrapping the content.
    pub element: Option<String>,
    /// Attribute receiving the tag argument (element tags only).
    pub attribute: Option<String>,
    /// Template rendering the tag.
    pub template: Option<String>,
}

/// Output of a validated [`CustomTag`].
#[derive(Debug, PartialEq, Eq)]
pub enum CustomTagOutput<'a> {
    Element {
        name: &'a str,
        attribute: Option<&'a str>,
    },
    Template(&'a str),
}

impl CustomTag {
    /// Validate the declaration and return its output kind.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the marker is not bracketed or
    /// the output is ambiguous.
    pub fn output(&self) -> Result<CustomTagOutput<'_>, ConfigError> {
        let field = format!("tags.custom '{}'", self.tag);
        if self.tag.len() < 3 || !self.tag.starts_with('[') || !self.tag.ends_with(']') {
            return Err(ConfigError::Validation(format!(
                "{field}: tag must be a bracketed marker like [name]"
            )));
        }

        match (&self.element, &self.template) {
            (Some(element), None) => {
                require_non_empty(element, &format!("{field}.element"))?;
                Ok(CustomTagOutput::Element {
                    name: element,
                    attribute: self.attribute.as_deref(),
                })
            }
            (None, Some(template)) => {
                require_non_empty(template, &format!("{field}.template"))?;
                if self.attribute.is_some() {
                    return Err(ConfigError::Validation(format!(
                        "{field}: attribute is only valid with element"
                    )));
                }
                Ok(CustomTagOutput::Template(template))
            }
            _ => Err(ConfigError::Validation(format!(
                "{field}: set exactly one of element or template"
            ))),
        }
    }
}

/// Sanitizer policy settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// Tags removed from the allow-list.
    pub remove_tags: Vec<String>,
    /// Tags added to the allow-list, on top of the ones the built-in tags need.
    pub add_tags: Vec<String>,
    /// Attributes allowed on every tag.
    pub allow_attributes: Vec<String>,
    /// Whether `data-*` attributes are kept.
    pub allow_data_attributes: bool,
    /// `rel` value forced on links. Empty disables it.
    pub link_rel: String,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            remove_tags: [
                "form", "input", "html", "body", "option", "textarea", "header", "head",
            ]
            .map(str::to_owned)
            .to_vec(),
            add_tags: Vec::new(),
            allow_attributes: ["class", "id"].map(str::to_owned).to_vec(),
            allow_data_attributes: true,
            link_rel: "noopener noreferrer".to_owned(),
        }
    }
}

impl SanitizerConfig {
    /// `rel` value to force on links, `None` when disabled.
    pub fn link_rel(&self) -> Option<&str> {
        Some(self.link_rel.as_str()).filter(|rel| !rel.is_empty())
    }

    /// Reject allow-list entries the sanitizer cannot honor.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(tag) = self.add_tags.iter().find(|tag| {
            CLEAN_CONTENT_TAGS
                .iter()
                .any(|clean| clean.eq_ignore_ascii_case(tag))
        }) {
            return Err(ConfigError::Validation(format!(
                "sanitizer.add_tags: '{tag}' is always removed with its content"
            )));
        }
        if self.link_rel().is_some()
            && self
                .allow_attributes
                .iter()
                .any(|attribute| attribute.eq_ignore_ascii_case("rel"))
        {
            return Err(ConfigError::Validation(
                "sanitizer.allow_attributes: 'rel' conflicts with sanitizer.link_rel, \
                 set link_rel = \"\" to keep rel values"
                    .to_owned(),
            ));
        }
        Ok(())
    }
}

/// Raw template settings as parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TemplatesConfigRaw {
    dir: Option<String>,
}

/// Resolved template settings with absolute paths.
#[derive(Debug, Default)]
pub struct TemplatesConfig {
    /// Directory searched before the built-in templates.
    pub dir: Option<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`templates.dir`").
        field: String,
        /// Error message (e.g., "${`BBHTML_TEMPLATES`}: environment variable not found").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `bbhtml.toml` in the current directory and its parents, falling
    /// back to defaults.
    ///
    /// CLI settings are applied last and take precedence over file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails
    /// or the configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(dir) = &settings.templates_dir {
            self.templates_resolved.dir = Some(dir.clone());
        }
        if let Some(block_tags) = &settings.block_tags {
            self.render.block_tags.clone_from(block_tags);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        Self::discover_from(&cwd)
    }

    /// Search for config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for tag in &self.render.block_tags {
            require_non_empty(tag, "render.block_tags")?;
        }
        for tag in &self.tags.custom {
            tag.output()?;
        }
        for tag in self.sanitizer.add_tags.iter().chain(&self.sanitizer.remove_tags) {
            require_non_empty(tag, "sanitizer tags")?;
        }
        self.sanitizer.validate()?;
        if let Some(dir) = &self.templates_resolved.dir
            && !dir.is_dir()
        {
            return Err(ConfigError::Validation(format!(
                "templates.dir {} is not a directory",
                dir.display()
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.templates.dir {
            self.templates.dir = Some(expand::expand_env(dir, "templates.dir")?);
        }
        self.sanitizer.link_rel =
            expand::expand_env(&self.sanitizer.link_rel, "sanitizer.link_rel")?;
        Ok(())
    }

    /// Resolve relative paths against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.templates_resolved = TemplatesConfig {
            dir: self.templates.dir.as_deref().map(|dir| config_dir.join(dir)),
        };
    }
}
