//! Render engine assembly from loaded configuration.

use bb_config::{Config, CustomTag, CustomTagOutput, SanitizerConfig, TagsConfig};
use bb_renderer::{
    DEFAULT_ADDED_TAGS, Element, HtmlRenderer, HtmlSanitizer, SanitizerPolicy, TagRegistry,
    TagRule, TemplateEngine,
};

use crate::error::CliError;

/// Build a renderer for `config`.
pub(crate) fn renderer_from_config(config: &Config) -> Result<HtmlRenderer, CliError> {
    let registry = tag_registry(&config.tags)?;
    let sanitizer = HtmlSanitizer::new(sanitizer_policy(&config.sanitizer));
    let templates = match &config.templates_resolved.dir {
        Some(dir) => TemplateEngine::with_dir(dir),
        None => TemplateEngine::new(),
    };

    tracing::debug!(
        rules = registry.len(),
        templates_dir = ?templates.dir(),
        "Assembled renderer"
    );

    Ok(HtmlRenderer::new(registry, sanitizer)
        .with_templates(templates)
        .with_block_tags(&config.render.block_tags))
}

/// Sanitizer policy for `config`.
///
/// Configured `add_tags` extend the tags the built-in rules emit.
pub(crate) fn sanitizer_policy(config: &SanitizerConfig) -> SanitizerPolicy {
    let add_tags = DEFAULT_ADDED_TAGS
        .iter()
        .map(|&tag| tag.to_owned())
        .chain(config.add_tags.iter().cloned())
        .collect();

    SanitizerPolicy {
        remove_tags: config.remove_tags.clone(),
        add_tags,
        allow_attributes: config.allow_attributes.clone(),
        allow_data_attributes: config.allow_data_attributes,
        link_rel: config.link_rel().map(str::to_owned),
    }
}

fn tag_registry(config: &TagsConfig) -> Result<TagRegistry, CliError> {
    let rules = config
        .custom
        .iter()
        .map(custom_rule)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TagRegistry::from_rules(rules, config.override_defaults))
}

fn custom_rule(tag: &CustomTag) -> Result<TagRule, CliError> {
    let rule = match tag.output()? {
        CustomTagOutput::Element { name, attribute } => {
            let mut element = Element::new(name);
            if let Some(attribute) = attribute {
                element = element.with_argument_attribute(attribute);
            }
            TagRule::element(&tag.tag, element)
        }
        CustomTagOutput::Template(name) => TagRule::template(&tag.tag, name),
    };
    Ok(rule)
}
