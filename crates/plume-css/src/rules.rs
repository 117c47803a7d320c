//! Stylesheet data model
//!
//! Rules live in one flat array owned by the stylesheet; `rules[i].id == i`
//! always holds. Nesting is a `parent_rule_id` back-reference into the same
//! array, never an ownership edge.

use crate::specificity::calculate_specificity;

/// Property declaration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Declaration {
    /// Property name (lower-cased unless a `--custom` property)
    pub property: String,
    /// Property value, without `!important`
    pub value: String,
    /// Is important
    pub important: bool,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>, important: bool) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            important,
        }
    }

    /// Custom properties (`--name`) keep their case.
    pub fn is_custom_property(&self) -> bool {
        self.property.starts_with("--")
    }

    /// `property: value` with an optional ` !important` suffix, no terminator.
    pub fn to_css(&self) -> String {
        if self.important {
            format!("{}: {} !important", self.property, self.value)
        } else {
            format!("{}: {}", self.property, self.value)
        }
    }
}

/// How a nested rule referenced its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NestingStyle {
    /// `.parent { .child { } }`: joined with a descendant combinator
    Implicit,
    /// `.parent { &:hover { } }`: `&` replaced by the parent selector
    Explicit,
}

/// Style rule
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    /// Position in the owning stylesheet
    pub id: usize,
    /// Selector text, fully resolved against any parent
    pub selector: String,
    pub declarations: Vec<Declaration>,
    /// Cached specificity, computed on demand when absent
    pub specificity: Option<u32>,
    pub parent_rule_id: Option<usize>,
    /// `None` for top-level rules and for nested `@media` blocks
    pub nesting_style: Option<NestingStyle>,
    pub selector_list_id: Option<usize>,
    pub media_query_id: Option<usize>,
}

impl Rule {
    pub fn new(id: usize, selector: impl Into<String>) -> Self {
        Self {
            id,
            selector: selector.into(),
            declarations: Vec::new(),
            specificity: None,
            parent_rule_id: None,
            nesting_style: None,
            selector_list_id: None,
            media_query_id: None,
        }
    }

    /// Last declaration of `property`.
    pub fn get(&self, property: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .rev()
            .find(|decl| property_matches(&decl.property, property))
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.get(property).is_some()
    }

    pub fn has_important(&self) -> bool {
        self.declarations.iter().any(|decl| decl.important)
    }

    pub fn specificity_or_compute(&self) -> u32 {
        self.specificity
            .unwrap_or_else(|| calculate_specificity(&self.selector))
    }

    /// Nested `@media` block: a child without its own selector fragment.
    pub fn is_nested_media(&self) -> bool {
        self.parent_rule_id.is_some() && self.nesting_style.is_none() && self.media_query_id.is_some()
    }
}

/// Custom properties compare exactly, everything else ASCII case-insensitively.
fn property_matches(stored: &str, wanted: &str) -> bool {
    if wanted.starts_with("--") {
        stored == wanted
    } else {
        stored.eq_ignore_ascii_case(wanted)
    }
}

/// Body of an at-rule kept verbatim through the cascade
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AtRuleContent {
    /// Keyframe steps (`from`, `50%`, `to`)
    Rules(Vec<Rule>),
    /// Flat declaration list (`@font-face`)
    Declarations(Vec<Declaration>),
}

/// `@keyframes` or `@font-face` block
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AtRule {
    pub id: usize,
    /// Head text, e.g. `@keyframes fade`
    pub selector: String,
    pub content: AtRuleContent,
    pub media_query_id: Option<usize>,
}

/// Entry of the stylesheet's rule array
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StyleNode {
    Rule(Rule),
    AtRule(AtRule),
}

impl StyleNode {
    pub fn id(&self) -> usize {
        match self {
            Self::Rule(rule) => rule.id,
            Self::AtRule(at_rule) => at_rule.id,
        }
    }

    pub(crate) fn set_id(&mut self, id: usize) {
        match self {
            Self::Rule(rule) => rule.id = id,
            Self::AtRule(at_rule) => at_rule.id = id,
        }
    }

    pub fn selector(&self) -> &str {
        match self {
            Self::Rule(rule) => &rule.selector,
            Self::AtRule(at_rule) => &at_rule.selector,
        }
    }

    pub fn media_query_id(&self) -> Option<usize> {
        match self {
            Self::Rule(rule) => rule.media_query_id,
            Self::AtRule(at_rule) => at_rule.media_query_id,
        }
    }

    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Self::Rule(rule) => Some(rule),
            Self::AtRule(_) => None,
        }
    }

    pub fn as_rule_mut(&mut self) -> Option<&mut Rule> {
        match self {
            Self::Rule(rule) => Some(rule),
            Self::AtRule(_) => None,
        }
    }

    pub fn parent_rule_id(&self) -> Option<usize> {
        self.as_rule().and_then(|rule| rule.parent_rule_id)
    }
}

/// `@import` statement, recorded but never fetched
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImportStatement {
    pub id: usize,
    pub url: String,
    /// Media query text after the URL
    pub media: Option<String>,
    pub resolved: bool,
}

impl ImportStatement {
    pub fn to_css(&self) -> String {
        let url = self.url.replace('"', "\\\"");
        match &self.media {
            Some(media) => format!("@import \"{url}\" {media};"),
            None => format!("@import \"{url}\";"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_last() {
        let mut rule = Rule::new(0, "p");
        rule.declarations.push(Declaration::new("color", "red", false));
        rule.declarations.push(Declaration::new("color", "blue", false));
        assert_eq!(rule.get("COLOR").map(|d| d.value.as_str()), Some("blue"));
        assert!(!rule.has_property("margin"));
    }

    #[test]
    fn test_custom_property_case() {
        let mut rule = Rule::new(0, ":root");
        rule.declarations.push(Declaration::new("--Main", "1px", false));
        assert!(rule.has_property("--Main"));
        assert!(!rule.has_property("--main"));
    }

    #[test]
    fn test_declaration_css() {
        assert_eq!(Declaration::new("color", "red", true).to_css(), "color: red !important");
    }

    #[test]
    fn test_specificity_cached_or_computed() {
        let mut rule = Rule::new(0, "#a .b");
        assert_eq!(rule.specificity_or_compute(), 110);
        rule.specificity = Some(1);
        assert_eq!(rule.specificity_or_compute(), 1);
    }

    #[test]
    fn test_import_css() {
        let import = ImportStatement {
            id: 0,
            url: "print.css".into(),
            media: Some("print".into()),
            resolved: false,
        };
        assert_eq!(import.to_css(), "@import \"print.css\" print;");
    }
}
