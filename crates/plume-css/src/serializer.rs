//! CSS Serializer
//!
//! Writes a stylesheet back to CSS text, either compact (one rule per line)
//! or formatted (one declaration per line, two-space indent). Both modes run
//! the same walk; only the separators differ.
//!
//! Consecutive nodes under the same media query share one `@media` block,
//! unchanged selector-list members are written under one comma-joined
//! header, and nested rules are written inside their parent with `&`
//! restored where the source used it.

use crate::media::{MediaIdentity, media_identity};
use crate::parser::parent_reference;
use crate::rules::{AtRuleContent, Declaration, NestingStyle, Rule, StyleNode};
use crate::scanner::{is_ident_char, split_top_level_commas};
use crate::stylesheet::Stylesheet;

/// Separator set for one output mode
#[derive(Debug, Clone, Copy)]
struct Layout {
    /// One indentation level
    indent: &'static str,
    /// Between the items of a block
    separator: &'static str,
}

const COMPACT: Layout = Layout {
    indent: "",
    separator: " ",
};

const FORMATTED: Layout = Layout {
    indent: "  ",
    separator: "\n",
};

impl Stylesheet {
    /// Compact CSS: one rule per line, `selector { a: b; c: d; }`.
    pub fn to_css(&self) -> String {
        Writer::new(self, COMPACT).write()
    }

    /// Indented CSS with one declaration per line.
    pub fn to_formatted_css(&self) -> String {
        Writer::new(self, FORMATTED).write()
    }
}

struct Writer<'s> {
    sheet: &'s Stylesheet,
    layout: Layout,
    processed: Vec<bool>,
    out: String,
}

impl<'s> Writer<'s> {
    fn new(sheet: &'s Stylesheet, layout: Layout) -> Self {
        Self {
            sheet,
            layout,
            processed: vec![false; sheet.rules.len()],
            out: String::new(),
        }
    }

    fn write(mut self) -> String {
        let sheet = self.sheet;

        if let Some(charset) = &sheet.charset {
            self.out.push_str(&format!("@charset \"{charset}\";\n"));
        }
        for import in &sheet.imports {
            self.out.push_str(&import.to_css());
            self.out.push('\n');
        }

        let mut open_media: Option<MediaIdentity> = None;
        for node in &sheet.rules {
            let id = node.id();
            if self.processed[id] || node.parent_rule_id().is_some() {
                continue;
            }

            let identity = node.media_query_id().map(|query_id| media_identity(&sheet.media_queries, query_id));
            if identity != open_media {
                if open_media.is_some() {
                    self.out.push_str("}\n");
                }
                if let Some(query_id) = node.media_query_id() {
                    let text = sheet.media_text(query_id).unwrap_or_default();
                    self.out.push_str(&format!("@media {text} {{\n"));
                }
                open_media = identity;
            }

            let depth = usize::from(open_media.is_some());
            self.indent(depth);
            match node {
                StyleNode::Rule(rule) => {
                    let header = self.coalesced_header(rule, identity);
                    self.rule_block(&header, rule, depth);
                }
                StyleNode::AtRule(at_rule) => {
                    self.processed[id] = true;
                    self.open(&at_rule.selector);
                    match &at_rule.content {
                        AtRuleContent::Rules(steps) => {
                            for step in steps {
                                self.item_start(depth + 1);
                                self.open(&step.selector);
                                self.declarations(&step.declarations, depth + 1);
                                self.close(depth + 1);
                            }
                        }
                        AtRuleContent::Declarations(declarations) => {
                            self.declarations(declarations, depth);
                        }
                    }
                    self.close(depth);
                }
            }
            self.out.push('\n');
        }
        if open_media.is_some() {
            self.out.push_str("}\n");
        }

        tracing::debug!(rules = sheet.rules.len(), bytes = self.out.len(), "serialized stylesheet");
        self.out
    }

    /// Header for `rule`, joined with every list member that can share it.
    fn coalesced_header(&mut self, rule: &Rule, identity: Option<MediaIdentity>) -> String {
        let sheet = self.sheet;
        self.processed[rule.id] = true;

        let members = match rule.selector_list_id {
            Some(list_id) if sheet.selector_lists_enabled() && sheet.children(rule.id).is_empty() => {
                sheet.selector_lists.get(&list_id)
            }
            _ => None,
        };
        let Some(members) = members else {
            return rule.selector.clone();
        };

        let mut selectors = vec![rule.selector.as_str()];
        for &member_id in members {
            if member_id == rule.id || self.processed.get(member_id).copied().unwrap_or(true) {
                continue;
            }
            let Some(member) = sheet.rules.get(member_id).and_then(StyleNode::as_rule) else {
                continue;
            };
            let member_identity = member
                .media_query_id
                .map(|query_id| media_identity(&sheet.media_queries, query_id));
            if member.selector_list_id == rule.selector_list_id
                && member.parent_rule_id.is_none()
                && member_identity == identity
                && member.declarations == rule.declarations
                && sheet.children(member_id).is_empty()
            {
                self.processed[member_id] = true;
                selectors.push(&member.selector);
            }
        }
        selectors.join(", ")
    }

    /// Block for a style rule: its declarations, then its nested rules.
    fn rule_block(&mut self, header: &str, rule: &Rule, depth: usize) {
        let sheet = self.sheet;
        self.open(header);
        self.declarations(&rule.declarations, depth);

        for &child_id in sheet.children(rule.id) {
            let Some(child) = sheet.rules.get(child_id).and_then(StyleNode::as_rule) else {
                continue;
            };
            self.processed[child_id] = true;
            self.item_start(depth + 1);
            if child.is_nested_media() {
                let header = format!("@media {}", self.relative_media(rule, child));
                self.rule_block(&header, child, depth + 1);
            } else {
                let header = reconstruct_nested_selector(&rule.selector, child);
                self.rule_block(&header, child, depth + 1);
            }
        }
        self.close(depth);
    }

    /// Query text of a nested `@media` block relative to its parent's query.
    fn relative_media(&self, parent: &Rule, child: &Rule) -> String {
        let sheet = self.sheet;
        let child_text = child
            .media_query_id
            .and_then(|query_id| sheet.media_text(query_id))
            .unwrap_or_default();
        let Some(parent_text) = parent.media_query_id.and_then(|query_id| sheet.media_text(query_id)) else {
            return child_text;
        };

        let parent_first = split_top_level_commas(&parent_text).first().copied().unwrap_or_default();
        let prefix = format!("{parent_first} and ");
        if split_top_level_commas(&parent_text).len() > 1 {
            let child_first = split_top_level_commas(&child_text).first().copied().unwrap_or_default();
            if let Some(relative) = child_first.strip_prefix(&prefix) {
                return relative.to_string();
            }
        } else if let Some(relative) = child_text.strip_prefix(&prefix) {
            return relative.to_string();
        }
        child_text
    }

    fn declarations(&mut self, declarations: &[Declaration], depth: usize) {
        for decl in declarations {
            self.item_start(depth + 1);
            self.out.push_str(&decl.to_css());
            self.out.push(';');
        }
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str(self.layout.indent);
        }
    }

    fn item_start(&mut self, depth: usize) {
        self.out.push_str(self.layout.separator);
        self.indent(depth);
    }

    fn open(&mut self, header: &str) {
        self.out.push_str(header);
        self.out.push_str(" {");
    }

    fn close(&mut self, depth: usize) {
        self.item_start(depth);
        self.out.push('}');
    }
}

/// Selector a nested rule was written with, given its parent's selector.
///
/// Explicit rules get `&` back in place of the parent; implicit rules lose
/// the parent prefix. Falls back to `&` replacement when the prefix is absent.
pub fn reconstruct_nested_selector(parent: &str, child: &Rule) -> String {
    let reference = parent_reference(parent);
    if child.nesting_style == Some(NestingStyle::Implicit) {
        let prefix = format!("{reference} ");
        let members: Option<Vec<&str>> = split_top_level_commas(&child.selector)
            .into_iter()
            .map(|member| member.strip_prefix(prefix.as_str()).map(str::trim_start))
            .collect();
        if let Some(members) = members {
            return members.join(", ");
        }
    }
    replace_reference(&child.selector, &reference)
}

/// Replace whole-selector occurrences of `reference` with `&`.
fn replace_reference(selector: &str, reference: &str) -> String {
    if reference.is_empty() {
        return selector.to_string();
    }
    let bytes = selector.as_bytes();
    let first = reference.as_bytes()[0];
    let mut out = String::with_capacity(selector.len());
    let mut last = 0;
    let mut search = 0;

    while let Some(found) = selector[search..].find(reference) {
        let start = search + found;
        let end = start + reference.len();
        let before_ok = match start.checked_sub(1).map(|i| bytes[i]) {
            None => true,
            Some(prev) => !is_ident_char(prev) && !(is_ident_char(first) && matches!(prev, b'.' | b'#' | b':' | b'\\')),
        };
        let after_ok = bytes.get(end).is_none_or(|&next| !is_ident_char(next));

        if before_ok && after_ok {
            out.push_str(&selector[last..start]);
            out.push('&');
            last = end;
            search = end;
        } else {
            search = start + selector[start..].chars().next().map_or(1, char::len_utf8);
        }
    }
    out.push_str(&selector[last..]);
    out
}
