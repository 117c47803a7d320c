//! Color rewriting over a parsed stylesheet

use plume_color::ColorConversion;

use crate::error::CssError;
use crate::rules::{AtRuleContent, Declaration, StyleNode};
use crate::stylesheet::Stylesheet;

/// Properties whose values hold names, not colors
const NAME_PROPERTIES: &[&str] = &[
    "animation",
    "animation-name",
    "content",
    "counter-increment",
    "counter-reset",
    "font",
    "font-family",
    "grid-area",
    "grid-template-areas",
    "src",
    "transition-property",
    "unicode-range",
    "will-change",
];

impl Stylesheet {
    /// Rewrite every color literal in every declaration, at-rule content
    /// included. Returns the number of declarations whose value changed.
    pub fn convert_colors(&mut self, conversion: &ColorConversion) -> Result<usize, CssError> {
        let mut rewritten = 0;
        for node in &mut self.rules {
            match node {
                StyleNode::Rule(rule) => rewritten += convert_declarations(&mut rule.declarations, conversion)?,
                StyleNode::AtRule(at_rule) => match &mut at_rule.content {
                    AtRuleContent::Rules(steps) => {
                        for step in steps {
                            rewritten += convert_declarations(&mut step.declarations, conversion)?;
                        }
                    }
                    AtRuleContent::Declarations(declarations) => {
                        rewritten += convert_declarations(declarations, conversion)?;
                    }
                },
            }
        }
        tracing::debug!(to = %conversion.to, rewritten, "converted colors");
        Ok(rewritten)
    }
}

fn convert_declarations(declarations: &mut [Declaration], conversion: &ColorConversion) -> Result<usize, CssError> {
    let mut rewritten = 0;
    for decl in declarations {
        if NAME_PROPERTIES.binary_search(&decl.property.as_str()).is_ok() {
            continue;
        }
        let value = conversion.convert(&decl.value)?;
        if value != decl.value {
            decl.value = value;
            rewritten += 1;
        }
    }
    Ok(rewritten)
}
