//! Cascade flattening
//!
//! Collapses every group of style rules sharing a selector and media query
//! into one rule holding the winning declaration per property. Winners are
//! picked by importance, then specificity, then source order
//! `(rule id, declaration index)`.

use std::collections::{BTreeMap, HashMap};

use crate::rules::{AtRule, Declaration, Rule, StyleNode};
use crate::shorthand;
use crate::stylesheet::Stylesheet;

/// Cascade key of one declaration; larger wins.
type Precedence = (bool, u32, (usize, usize));

struct Group<'s> {
    selector: &'s str,
    media_query_id: Option<usize>,
    members: Vec<&'s Rule>,
}

/// Flatten `sheet` into a new stylesheet with dense ids and rebuilt indices.
pub fn flatten(sheet: &Stylesheet) -> Stylesheet {
    let mut groups: Vec<Group<'_>> = Vec::new();
    let mut group_index: HashMap<(&str, Option<usize>), usize> = HashMap::new();
    let mut at_rules: Vec<AtRule> = Vec::new();

    for node in &sheet.rules {
        match node {
            StyleNode::AtRule(at_rule) => at_rules.push(at_rule.clone()),
            StyleNode::Rule(rule) => {
                let key = (rule.selector.as_str(), rule.media_query_id);
                let index = *group_index.entry(key).or_insert_with(|| {
                    groups.push(Group {
                        selector: &rule.selector,
                        media_query_id: rule.media_query_id,
                        members: Vec::new(),
                    });
                    groups.len() - 1
                });
                groups[index].members.push(rule);
            }
        }
    }

    let mut nodes: Vec<StyleNode> = Vec::with_capacity(groups.len() + at_rules.len());
    for group in &groups {
        if let Some(rule) = merge_group(group, nodes.len()) {
            nodes.push(StyleNode::Rule(rule));
        }
    }
    for mut at_rule in at_rules {
        at_rule.id = nodes.len();
        nodes.push(StyleNode::AtRule(at_rule));
    }

    let selector_lists = if sheet.selector_lists_enabled() {
        resolve_divergence(&mut nodes)
    } else {
        BTreeMap::new()
    };

    let mut flat = Stylesheet::with_options(sheet.options().clone());
    flat.rules = nodes;
    flat.selector_lists = selector_lists;
    flat.media_queries = sheet.media_queries.clone();
    flat.media_query_lists = sheet.media_query_lists.clone();
    flat.imports = sheet.imports.clone();
    flat.charset = sheet.charset.clone();
    flat.warnings = sheet.warnings.clone();
    flat.rebuild_indices();

    tracing::debug!(
        before = sheet.rules.len(),
        after = flat.rules.len(),
        selector_lists = flat.selector_lists.len(),
        "flattened stylesheet"
    );
    flat
}

impl Stylesheet {
    /// Cascade-flattened copy of this stylesheet.
    pub fn flatten(&self) -> Stylesheet {
        flatten(self)
    }

    pub fn flatten_in_place(&mut self) {
        *self = flatten(self);
    }
}

/// Merge one group; `None` when no declaration survives.
fn merge_group(group: &Group<'_>, id: usize) -> Option<Rule> {
    let mut merged: Vec<(Declaration, Precedence)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for member in &group.members {
        let specificity = member.specificity_or_compute();
        for (index, decl) in shorthand::expand_all(&member.declarations).into_iter().enumerate() {
            let precedence = (decl.important, specificity, (member.id, index));
            match positions.get(&decl.property) {
                Some(&slot) => {
                    if precedence > merged[slot].1 {
                        merged[slot] = (decl, precedence);
                    }
                }
                None => {
                    positions.insert(decl.property.clone(), merged.len());
                    merged.push((decl, precedence));
                }
            }
        }
    }

    let declarations = shorthand::recreate(merged.into_iter().map(|(decl, _)| decl).collect());
    if declarations.is_empty() {
        tracing::trace!(selector = group.selector, "dropped empty rule");
        return None;
    }

    let first = group.members.first()?;
    let list_id = first
        .selector_list_id
        .filter(|&list_id| group.members.iter().all(|member| member.selector_list_id == Some(list_id)));

    let mut rule = Rule::new(id, group.selector);
    rule.declarations = declarations;
    rule.specificity = first.specificity;
    rule.media_query_id = group.media_query_id;
    rule.selector_list_id = list_id;
    Some(rule)
}

/// Drop list membership from members that no longer match their list's first
/// member. Returns the surviving lists.
fn resolve_divergence(nodes: &mut [StyleNode]) -> BTreeMap<usize, Vec<usize>> {
    let mut candidates: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for node in nodes.iter() {
        if let Some(list_id) = node.as_rule().and_then(|rule| rule.selector_list_id) {
            candidates.entry(list_id).or_default().push(node.id());
        }
    }

    let mut lists = BTreeMap::new();
    for (list_id, members) in candidates {
        let Some(reference) = nodes[members[0]].as_rule().map(|rule| rule.declarations.clone()) else {
            continue;
        };
        let (matching, diverged): (Vec<usize>, Vec<usize>) = members
            .into_iter()
            .partition(|&id| nodes[id].as_rule().is_some_and(|rule| rule.declarations == reference));

        let dropped = if matching.len() >= 2 {
            lists.insert(list_id, matching);
            diverged
        } else {
            matching.into_iter().chain(diverged).collect()
        };
        for id in dropped {
            if let Some(rule) = nodes[id].as_rule_mut() {
                tracing::trace!(list_id, selector = %rule.selector, "selector list member diverged");
                rule.selector_list_id = None;
            }
        }
    }
    lists
}
