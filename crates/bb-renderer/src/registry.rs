//! Ordered tag rule registry.

use bb_parser::Node;

use crate::defaults::default_rules;
use crate::rule::TagRule;

/// Ordered collection of [`TagRule`]s.
///
/// Lookup first searches for a rule whose marker equals the node's full
/// opening marker, then for a rule whose name equals the node's tag name.
/// Both searches ignore case and return the first match in registry order,
/// so `[list=1]` finds its own rule before falling back to `[list]`.
#[derive(Clone, Debug, Default)]
pub struct TagRegistry {
    rules: Vec<TagRule>,
}

impl TagRegistry {
    /// Empty registry: every tag passes through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in forum tag set.
    pub fn with_defaults() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Registry built from caller rules.
    ///
    /// The rules are appended to the built-in set, or replace it entirely
    /// when `override_defaults` is set.
    pub fn from_rules(rules: impl IntoIterator<Item = TagRule>, override_defaults: bool) -> Self {
        let mut registry = if override_defaults {
            Self::new()
        } else {
            Self::with_defaults()
        };
        registry.rules.extend(rules);
        registry
    }

    #[must_use]
    pub fn with_rule(mut self, rule: TagRule) -> Self {
        self.push(rule);
        self
    }

    pub fn push(&mut self, rule: TagRule) {
        self.rules.push(rule);
    }

    /// Find the rule for a tagged node.
    pub fn resolve(&self, node: &Node) -> Option<&TagRule> {
        if node.is_text() {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches_marker(node))
            .or_else(|| self.rules.iter().find(|rule| rule.matches_name(node)))
    }

    pub fn rules(&self) -> &[TagRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
