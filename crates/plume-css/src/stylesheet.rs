//! Parsed stylesheet
//!
//! The aggregate every pass works on: the flat node array plus the indices
//! derived from it. Indices are rebuilt whenever the node array changes
//! shape (parse, append, removal, flatten).

use std::collections::BTreeMap;

use crate::error::{CssError, ParseWarning};
use crate::media::{MediaQuery, MediaRegistry, media_text};
use crate::parser::{ParseOutput, ParserOptions, offset_node, parse_css};
use crate::rules::{ImportStatement, Rule, StyleNode};
use crate::scanner::normalize_whitespace;

/// Parse a CSS stylesheet with default options
pub fn parse_stylesheet(css: &str) -> Result<Stylesheet, CssError> {
    Stylesheet::parse(css)
}

/// Parsed stylesheet
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stylesheet {
    /// Style rules and at-rules in source order; `rules[i].id() == i`
    pub rules: Vec<StyleNode>,
    /// Media type (and combined list text) to rule ids
    pub media_index: BTreeMap<String, Vec<usize>>,
    /// Selector list id to member rule ids
    pub selector_lists: BTreeMap<usize, Vec<usize>>,
    /// Interned media queries, indexed by id
    pub media_queries: Vec<MediaQuery>,
    /// Media query list id to member query ids
    pub media_query_lists: BTreeMap<usize, Vec<usize>>,
    pub imports: Vec<ImportStatement>,
    pub charset: Option<String>,
    pub has_nesting: bool,
    /// Recovered parse problems
    pub warnings: Vec<ParseWarning>,
    children: BTreeMap<usize, Vec<usize>>,
    options: ParserOptions,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty stylesheet that parses appended blocks with `options`.
    pub fn with_options(options: ParserOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn parse(css: &str) -> Result<Self, CssError> {
        Self::parse_with_options(css, ParserOptions::default())
    }

    pub fn parse_with_options(css: &str, options: ParserOptions) -> Result<Self, CssError> {
        let mut sheet = Self::with_options(options);
        sheet.add_block(css)?;
        Ok(sheet)
    }

    /// Parse more CSS and append it after the existing rules.
    ///
    /// `@import` is only honored while the stylesheet is still empty.
    pub fn add_block(&mut self, css: &str) -> Result<(), CssError> {
        let media = MediaRegistry::from_parts(self.media_queries.clone(), self.media_query_lists.clone());
        let output = parse_css(css, &self.options, media, self.rules.is_empty())?;
        self.append(output);

        tracing::debug!(
            bytes = css.len(),
            rules = self.rules.len(),
            selector_lists = self.selector_lists.len(),
            media_queries = self.media_queries.len(),
            warnings = self.warnings.len(),
            "parsed stylesheet"
        );
        Ok(())
    }

    fn append(&mut self, output: ParseOutput) {
        let offset = self.rules.len();
        let list_offset = self.next_list_id();
        let import_offset = self.imports.len();

        for mut node in output.nodes {
            offset_node(&mut node, offset, list_offset);
            self.rules.push(node);
        }
        for (list_id, members) in output.selector_lists {
            let members = members.into_iter().map(|id| id + offset).collect();
            self.selector_lists.insert(list_id + list_offset, members);
        }
        for mut import in output.imports {
            import.id += import_offset;
            self.imports.push(import);
        }
        if self.charset.is_none() {
            self.charset = output.charset;
        }
        self.has_nesting |= output.has_nesting;
        self.warnings.extend(output.warnings);
        self.media_queries = output.media.queries;
        self.media_query_lists = output.media.lists;
        self.rebuild_indices();
    }

    /// First selector list id not used by any rule.
    fn next_list_id(&self) -> usize {
        let from_rules = self
            .iter_rules()
            .filter_map(|rule| rule.selector_list_id)
            .max()
            .map_or(0, |id| id + 1);
        let from_lists = self.selector_lists.keys().next_back().map_or(0, |id| id + 1);
        from_rules.max(from_lists)
    }

    /// Rebuild the children adjacency and the media index from `rules`.
    pub(crate) fn rebuild_indices(&mut self) {
        self.children.clear();
        self.media_index.clear();

        for node in &self.rules {
            let id = node.id();
            if let Some(parent) = node.parent_rule_id() {
                self.children.entry(parent).or_default().push(id);
            }
            let Some(query_id) = node.media_query_id() else {
                continue;
            };
            let Some(query) = self.media_queries.get(query_id) else {
                continue;
            };

            let mut keys = Vec::new();
            match query.list_id.and_then(|list_id| self.media_query_lists.get(&list_id)) {
                Some(members) => {
                    for &member in members {
                        if let Some(member) = self.media_queries.get(member) {
                            keys.push(member.media_type.clone());
                        }
                    }
                    if let Some(text) = media_text(&self.media_queries, &self.media_query_lists, query_id) {
                        keys.push(text);
                    }
                }
                None => keys.push(query.media_type.clone()),
            }

            for key in keys {
                let ids = self.media_index.entry(key).or_default();
                if ids.last() != Some(&id) {
                    ids.push(id);
                }
            }
        }
    }

    /// Number of nodes (style rules and at-rules)
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[StyleNode] {
        &self.rules
    }

    /// Style rules only
    pub fn iter_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter_map(StyleNode::as_rule)
    }

    /// Style rules whose selector equals `selector` (whitespace-insensitive).
    pub fn find_by_selector(&self, selector: &str) -> Vec<&Rule> {
        let selector = normalize_whitespace(selector);
        self.iter_rules().filter(|rule| rule.selector == selector).collect()
    }

    /// Nodes under a media type, or under the full text of a query list.
    pub fn rules_for_media(&self, media_type: &str) -> Vec<&StyleNode> {
        let key = media_type.trim().to_ascii_lowercase();
        self.media_index
            .get(&key)
            .or_else(|| self.media_index.get(media_type.trim()))
            .map(|ids| ids.iter().filter_map(|&id| self.rules.get(id)).collect())
            .unwrap_or_default()
    }

    /// Distinct media types any node is qualified by.
    pub fn media_types(&self) -> Vec<&str> {
        self.media_index
            .keys()
            .filter(|key| !key.contains([',', ' ']))
            .map(String::as_str)
            .collect()
    }

    /// Ordered ids of the rules nested directly in `id`.
    pub fn children(&self, id: usize) -> &[usize] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Header text of the media query (or query list) `query_id` belongs to.
    pub fn media_text(&self, query_id: usize) -> Option<String> {
        media_text(&self.media_queries, &self.media_query_lists, query_id)
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn selector_lists_enabled(&self) -> bool {
        self.options.selector_lists
    }

    /// Remove style rules matching `selector` together with everything
    /// nested in them. Returns the number of nodes removed.
    pub fn remove_rules(&mut self, selector: &str) -> usize {
        let selector = normalize_whitespace(selector);
        let mut removed = vec![false; self.rules.len()];
        for node in &self.rules {
            let id = node.id();
            let matches = match node {
                StyleNode::Rule(rule) => {
                    rule.selector == selector || rule.parent_rule_id.is_some_and(|parent| removed[parent])
                }
                StyleNode::AtRule(_) => false,
            };
            removed[id] = matches;
        }

        let count = removed.iter().filter(|&&r| r).count();
        if count == 0 {
            return 0;
        }

        let mut remap = vec![None; self.rules.len()];
        let mut kept = Vec::with_capacity(self.rules.len() - count);
        for node in std::mem::take(&mut self.rules) {
            let old = node.id();
            if removed[old] {
                continue;
            }
            remap[old] = Some(kept.len());
            kept.push(node);
        }

        for node in &mut kept {
            if let Some(new_id) = remap[node.id()] {
                node.set_id(new_id);
            }
            if let StyleNode::Rule(rule) = node {
                rule.parent_rule_id = rule.parent_rule_id.and_then(|parent| remap[parent]);
            }
        }

        let mut lists = BTreeMap::new();
        for (list_id, members) in std::mem::take(&mut self.selector_lists) {
            let members: Vec<usize> = members.into_iter().filter_map(|id| remap[id]).collect();
            if members.len() >= 2 {
                lists.insert(list_id, members);
            } else {
                for id in members {
                    if let Some(rule) = kept[id].as_rule_mut() {
                        rule.selector_list_id = None;
                    }
                }
            }
        }

        self.rules = kept;
        self.selector_lists = lists;
        self.rebuild_indices();
        tracing::debug!(%selector, removed = count, remaining = self.rules.len(), "removed rules");
        count
    }
}
