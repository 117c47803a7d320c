//! CSS Parser
//!
//! Recursive-descent parser over the raw bytes of a stylesheet. Produces a
//! flat rule array in which parents always precede their nested children,
//! plus the selector-list, media and import tables.
//!
//! `@media` and grouping at-rules are parsed by a nested parser over the
//! block's byte range; its output is merged back with explicit id and
//! list-id offsets.

use std::collections::BTreeMap;

use crate::error::{CssError, ParseWarning, WarningKind};
use crate::media::{MediaRegistry, combine_media_queries, media_text};
use crate::rules::{AtRule, AtRuleContent, Declaration, ImportStatement, NestingStyle, Rule, StyleNode};
use crate::scanner::{
    find_matching_brace, find_matching_paren, find_top_level, is_ident_char,
    normalize_whitespace, skip_whitespace_and_comments, split_top_level_commas,
    starts_with_ignore_case,
};

/// Parser configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParserOptions {
    /// Fan comma-separated selectors out into linked rules
    pub selector_lists: bool,
    /// Deepest block nesting accepted (rules, `@media`, grouping at-rules)
    pub max_nesting_depth: usize,
    /// Distinct media queries per stylesheet
    pub max_media_queries: usize,
    pub max_property_name_length: usize,
    pub max_property_value_length: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            selector_lists: true,
            max_nesting_depth: 10,
            max_media_queries: 1000,
            max_property_name_length: 256,
            max_property_value_length: 32 * 1024,
        }
    }
}

impl ParserOptions {
    pub fn with_selector_lists(mut self, enabled: bool) -> Self {
        self.selector_lists = enabled;
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }
}

/// Everything one parse pass produces
#[derive(Debug, Default)]
pub(crate) struct ParseOutput {
    pub nodes: Vec<StyleNode>,
    pub selector_lists: BTreeMap<usize, Vec<usize>>,
    pub imports: Vec<ImportStatement>,
    pub charset: Option<String>,
    pub has_nesting: bool,
    pub warnings: Vec<ParseWarning>,
    pub media: MediaRegistry,
}

/// Parse `css` against an existing media registry.
///
/// `allow_imports` is false when appending to a stylesheet that already has rules.
pub(crate) fn parse_css(
    css: &str,
    options: &ParserOptions,
    media: MediaRegistry,
    allow_imports: bool,
) -> Result<ParseOutput, CssError> {
    let mut parser = Parser::new(css, options, media);
    parser.allow_imports = allow_imports;
    parser.run()?;
    Ok(parser.finish())
}

/// Move a node to a new position, shifting its references along.
pub(crate) fn offset_node(node: &mut StyleNode, offset: usize, list_offset: usize) {
    node.set_id(node.id() + offset);
    if let StyleNode::Rule(rule) = node {
        if let Some(parent) = rule.parent_rule_id.as_mut() {
            *parent += offset;
        }
        if let Some(list_id) = rule.selector_list_id.as_mut() {
            *list_id += list_offset;
        }
    }
}

/// Resolve one nested selector against its parent.
///
/// With `&` every occurrence is replaced by the parent (a leading combinator
/// additionally prefixes the parent); without `&` the parent is joined with a
/// descendant combinator.
pub fn resolve_nested_selector(parent: &str, nested: &str) -> (String, NestingStyle) {
    let nested = nested.trim();
    if nested.contains('&') {
        let replaced = nested.replace('&', parent);
        let resolved = if nested.starts_with(['>', '+', '~']) {
            format!("{parent} {replaced}")
        } else {
            replaced
        };
        (resolved, NestingStyle::Explicit)
    } else {
        (format!("{parent} {nested}"), NestingStyle::Implicit)
    }
}

/// How a nested selector refers to its parent: the parent itself, or
/// `:is(parent)` when the parent is a selector list.
pub fn parent_reference(parent: &str) -> String {
    if split_top_level_commas(parent).len() > 1 {
        format!(":is({parent})")
    } else {
        parent.to_string()
    }
}

/// Resolve a possibly comma-separated nested selector, member by member.
fn resolve_selector_list(parent: &str, nested: &str) -> (String, NestingStyle) {
    let reference = parent_reference(parent);
    let mut style = NestingStyle::Implicit;
    let members: Vec<String> = split_top_level_commas(nested)
        .into_iter()
        .map(|member| {
            let (resolved, member_style) = resolve_nested_selector(&reference, member);
            if member_style == NestingStyle::Explicit {
                style = NestingStyle::Explicit;
            }
            resolved
        })
        .collect();
    (members.join(", "), style)
}

/// Strip a trailing `!important` (any case, optional whitespace around `!`).
fn strip_important(value: &str) -> Option<&str> {
    const IMPORTANT: &[u8] = b"important";
    let trimmed = value.trim_end();
    let bytes = trimmed.as_bytes();
    if bytes.len() < IMPORTANT.len() || !bytes[bytes.len() - IMPORTANT.len()..].eq_ignore_ascii_case(IMPORTANT) {
        return None;
    }
    let rest = trimmed[..bytes.len() - IMPORTANT.len()].trim_end();
    let rest = rest.strip_suffix('!')?;
    Some(rest.trim_end())
}

/// Read a quoted string starting at its opening quote, unescaping `\x`.
/// Returns the text and the number of bytes consumed.
fn read_quoted(text: &str) -> Option<(String, usize)> {
    let mut chars = text.char_indices();
    let (_, quote) = chars.next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let mut out = String::new();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                if let Some((_, escaped)) = chars.next() {
                    out.push(escaped);
                }
            }
            c if c == quote => return Some((out, i + 1)),
            c => out.push(c),
        }
    }
    None
}

/// `url(...)` or a quoted string, followed by optional media text.
fn parse_import_target(text: &str) -> Option<(String, Option<String>)> {
    let text = text.trim();
    let (url, rest) = if starts_with_ignore_case(text.as_bytes(), b"url(") {
        let bytes = text.as_bytes();
        let close = find_matching_paren(bytes, 4, bytes.len())?;
        let inner = text[4..close].trim();
        let url = match read_quoted(inner) {
            Some((url, _)) => url,
            None => inner.to_string(),
        };
        (url, &text[close + 1..])
    } else {
        let (url, consumed) = read_quoted(text)?;
        (url, &text[consumed..])
    };
    let media = rest.trim();
    Some((url, (!media.is_empty()).then(|| media.to_string())))
}

/// Media context a parser instance runs in
#[derive(Debug, Clone)]
struct MediaContext {
    text: String,
    id: usize,
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    end: usize,
    /// Block depth of this parser's content
    depth: usize,
    options: &'a ParserOptions,
    media_context: Option<MediaContext>,
    allow_imports: bool,

    nodes: Vec<Option<StyleNode>>,
    selector_lists: BTreeMap<usize, Vec<usize>>,
    next_list_id: usize,
    imports: Vec<ImportStatement>,
    charset: Option<String>,
    has_nesting: bool,
    warnings: Vec<ParseWarning>,
    media: MediaRegistry,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, options: &'a ParserOptions, media: MediaRegistry) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            end: input.len(),
            depth: 0,
            options,
            media_context: None,
            allow_imports: true,
            nodes: Vec::new(),
            selector_lists: BTreeMap::new(),
            next_list_id: 0,
            imports: Vec::new(),
            charset: None,
            has_nesting: false,
            warnings: Vec::new(),
            media,
        }
    }

    /// Nested parser over `[start, end)` of the same input.
    fn nested(&mut self, start: usize, end: usize, depth: usize, media_context: Option<MediaContext>) -> Parser<'a> {
        let mut child = Parser::new(self.input, self.options, std::mem::take(&mut self.media));
        child.pos = start;
        child.end = end;
        child.depth = depth;
        child.media_context = media_context;
        child.allow_imports = false;
        child
    }

    /// Append a finished nested parser's output.
    fn merge(&mut self, child: Parser<'a>) {
        let offset = self.nodes.len();
        let list_offset = self.next_list_id;

        for mut node in child.nodes.into_iter().flatten() {
            offset_node(&mut node, offset, list_offset);
            self.nodes.push(Some(node));
        }
        for (list_id, members) in child.selector_lists {
            let members = members.into_iter().map(|id| id + offset).collect();
            self.selector_lists.insert(list_id + list_offset, members);
        }
        self.next_list_id += child.next_list_id;
        self.has_nesting |= child.has_nesting;
        self.warnings.extend(child.warnings);
        if self.charset.is_none() {
            self.charset = child.charset;
        }
        self.media = child.media;
    }

    fn finish(self) -> ParseOutput {
        ParseOutput {
            nodes: self.nodes.into_iter().flatten().collect(),
            selector_lists: self.selector_lists,
            imports: self.imports,
            charset: self.charset,
            has_nesting: self.has_nesting,
            warnings: self.warnings,
            media: self.media,
        }
    }

    fn warn(&mut self, pos: usize, kind: WarningKind) {
        let warning = ParseWarning::at(self.input, pos, kind);
        tracing::warn!(line = warning.line, column = warning.column, "{}", warning.kind);
        self.warnings.push(warning);
    }

    /// Depth of a block opened inside content at `depth`.
    fn enter(&self, depth: usize) -> Result<usize, CssError> {
        let depth = depth + 1;
        if depth > self.options.max_nesting_depth {
            return Err(CssError::TooDeep {
                limit: self.options.max_nesting_depth,
            });
        }
        Ok(depth)
    }

    fn reserve(&mut self) -> usize {
        self.nodes.push(None);
        self.nodes.len() - 1
    }

    fn fill(&mut self, id: usize, node: StyleNode) {
        self.nodes[id] = Some(node);
    }

    fn push(&mut self, node: StyleNode) {
        self.nodes.push(Some(node));
    }

    fn media_id(&self) -> Option<usize> {
        self.media_context.as_ref().map(|context| context.id)
    }

    /// Matching `}` for a block opened at `open`, or the end of the range
    /// with a warning. Returns (body end, resume position).
    fn block_bounds(&mut self, open: usize, end: usize, head: &str) -> (usize, usize) {
        match find_matching_brace(self.bytes, open + 1, end) {
            Some(close) => (close, close + 1),
            None => {
                self.warn(open, WarningKind::UnterminatedBlock {
                    selector: head.to_string(),
                });
                (end, end)
            }
        }
    }

    fn run(&mut self) -> Result<(), CssError> {
        loop {
            self.pos = skip_whitespace_and_comments(self.bytes, self.pos, self.end);
            if self.pos >= self.end {
                return Ok(());
            }
            match self.bytes[self.pos] {
                b'@' => self.parse_at_rule()?,
                b';' | b'}' => self.pos += 1,
                _ => self.parse_style_rule()?,
            }
        }
    }

    fn parse_style_rule(&mut self) -> Result<(), CssError> {
        let input = self.input;
        let start = self.pos;

        match find_top_level(self.bytes, start, self.end, b"{;}") {
            Some(open) if self.bytes[open] == b'{' => {
                let selector = normalize_whitespace(&input[start..open]);
                let (body_end, next) = self.block_bounds(open, self.end, &selector);
                self.pos = next;
                if selector.is_empty() {
                    self.warn(start, WarningKind::EmptySelector);
                    return Ok(());
                }
                self.style_rule(selector, open + 1, body_end, true)
            }
            Some(stop) => {
                self.warn(start, WarningKind::UnexpectedText {
                    text: input[start..stop].trim().to_string(),
                });
                self.pos = stop + 1;
                Ok(())
            }
            None => {
                self.warn(start, WarningKind::UnterminatedBlock {
                    selector: normalize_whitespace(&input[start..self.end]),
                });
                self.pos = self.end;
                Ok(())
            }
        }
    }

    /// Top-level style rule (or unknown block at-rule) with body `[start, end)`.
    fn style_rule(&mut self, selector: String, start: usize, end: usize, split_lists: bool) -> Result<(), CssError> {
        let depth = self.enter(self.depth)?;
        let media_id = self.media_id();

        if find_top_level(self.bytes, start, end, b"{").is_some() {
            let id = self.reserve();
            let mut rule = Rule::new(id, selector);
            rule.media_query_id = media_id;
            self.parse_mixed_block(&mut rule, start, end, depth)?;
            self.fill(id, StyleNode::Rule(rule));
            return Ok(());
        }

        let declarations = self.parse_declarations(start, end, true)?;
        let members = split_top_level_commas(&selector);

        if split_lists && self.options.selector_lists && members.len() > 1 {
            let list_id = self.next_list_id;
            self.next_list_id += 1;
            let mut ids = Vec::with_capacity(members.len());
            for member in members {
                let id = self.nodes.len();
                let mut rule = Rule::new(id, member);
                // Each member owns its copy
                rule.declarations = declarations.clone();
                rule.selector_list_id = Some(list_id);
                rule.media_query_id = media_id;
                self.push(StyleNode::Rule(rule));
                ids.push(id);
            }
            self.selector_lists.insert(list_id, ids);
        } else {
            let id = self.nodes.len();
            let mut rule = Rule::new(id, selector);
            rule.declarations = declarations;
            rule.media_query_id = media_id;
            self.push(StyleNode::Rule(rule));
        }
        Ok(())
    }

    /// Body mixing declarations (appended to `parent`) with nested rules and
    /// nested at-rules.
    fn parse_mixed_block(&mut self, parent: &mut Rule, start: usize, end: usize, depth: usize) -> Result<(), CssError> {
        let input = self.input;
        let bytes = self.bytes;
        let mut pos = start;

        loop {
            pos = skip_whitespace_and_comments(bytes, pos, end);
            if pos >= end {
                return Ok(());
            }
            if bytes[pos] == b';' {
                pos += 1;
                continue;
            }
            if bytes[pos] == b'@' {
                pos = self.nested_at_rule(parent, pos, end, depth)?;
                continue;
            }

            match find_top_level(bytes, pos, end, b"{;") {
                Some(open) if bytes[open] == b'{' => {
                    let head = normalize_whitespace(&input[pos..open]);
                    let (body_end, next) = self.block_bounds(open, end, &head);
                    if head.is_empty() {
                        self.warn(pos, WarningKind::EmptySelector);
                    } else {
                        self.nested_rule(parent, &head, open + 1, body_end, depth)?;
                    }
                    pos = next;
                }
                Some(semicolon) => {
                    if let Some(decl) = self.declaration(pos, semicolon, true)? {
                        parent.declarations.push(decl);
                    }
                    pos = semicolon + 1;
                }
                None => {
                    if let Some(decl) = self.declaration(pos, end, true)? {
                        parent.declarations.push(decl);
                    }
                    pos = end;
                }
            }
        }
    }

    fn nested_rule(&mut self, parent: &Rule, head: &str, start: usize, end: usize, depth: usize) -> Result<(), CssError> {
        let depth = self.enter(depth)?;
        let (selector, style) = resolve_selector_list(&parent.selector, head);
        self.has_nesting = true;

        let id = self.reserve();
        let mut rule = Rule::new(id, selector);
        rule.parent_rule_id = Some(parent.id);
        rule.nesting_style = Some(style);
        rule.media_query_id = parent.media_query_id;
        self.parse_mixed_block(&mut rule, start, end, depth)?;
        self.fill(id, StyleNode::Rule(rule));
        Ok(())
    }

    /// At-rule inside a style rule body. Returns the position after it.
    fn nested_at_rule(&mut self, parent: &mut Rule, pos: usize, end: usize, depth: usize) -> Result<usize, CssError> {
        let input = self.input;
        let bytes = self.bytes;
        let name_end = scan_name(bytes, pos + 1, end);
        let name = input[pos + 1..name_end].to_ascii_lowercase();

        let Some(stop) = find_top_level(bytes, name_end, end, b"{;") else {
            self.warn(pos, WarningKind::DroppedAtRule { name });
            return Ok(end);
        };
        if bytes[stop] == b';' {
            self.warn(pos, WarningKind::DroppedAtRule { name });
            return Ok(stop + 1);
        }

        let prelude = normalize_whitespace(&input[name_end..stop]);
        let (body_end, next) = self.block_bounds(stop, end, &format!("@{name} {prelude}"));

        match name.as_str() {
            "media" => {
                let depth = self.enter(depth)?;
                let parent_media = parent
                    .media_query_id
                    .and_then(|id| media_text(&self.media.queries, &self.media.lists, id));
                let media_id = match combine_media_queries(parent_media.as_deref(), Some(&prelude)) {
                    Some(text) => Some(self.media.intern(&text, self.options.max_media_queries)?),
                    None => parent.media_query_id,
                };
                self.has_nesting = true;

                let id = self.reserve();
                let mut block = Rule::new(id, parent.selector.clone());
                block.parent_rule_id = Some(parent.id);
                block.media_query_id = media_id;
                self.parse_mixed_block(&mut block, stop + 1, body_end, depth)?;
                self.fill(id, StyleNode::Rule(block));
            }
            "supports" | "layer" | "container" | "scope" => {
                let depth = self.enter(depth)?;
                self.parse_mixed_block(parent, stop + 1, body_end, depth)?;
            }
            _ => self.warn(pos, WarningKind::DroppedAtRule { name }),
        }
        Ok(next)
    }

    fn parse_at_rule(&mut self) -> Result<(), CssError> {
        let input = self.input;
        let bytes = self.bytes;
        let start = self.pos;
        let name_end = scan_name(bytes, start + 1, self.end);
        let name = input[start + 1..name_end].to_ascii_lowercase();
        let stop = find_top_level(bytes, name_end, self.end, b"{;");

        match (name.as_str(), stop) {
            ("charset", _) => {
                let stmt_end = stop.unwrap_or(self.end);
                let value = input[name_end..stmt_end].trim().trim_matches(['"', '\'']);
                if self.charset.is_none() && !value.is_empty() {
                    self.charset = Some(value.to_string());
                }
                self.pos = (stmt_end + 1).min(self.end);
            }
            ("import", _) => {
                let stmt_end = stop.filter(|&s| bytes[s] == b';').unwrap_or(self.end);
                self.parse_import(start, name_end, stmt_end);
                self.pos = (stmt_end + 1).min(self.end);
            }
            (_, Some(open)) if bytes[open] == b'{' => {
                let prelude = normalize_whitespace(&input[name_end..open]);
                let head = if prelude.is_empty() {
                    format!("@{name}")
                } else {
                    format!("@{name} {prelude}")
                };
                let (body_end, next) = self.block_bounds(open, self.end, &head);
                self.pos = next;
                let body_start = open + 1;

                match name.as_str() {
                    "media" => self.media_block(&prelude, body_start, body_end)?,
                    "supports" | "layer" | "container" | "scope" => {
                        let depth = self.enter(self.depth)?;
                        let mut child = self.nested(body_start, body_end, depth, self.media_context.clone());
                        child.run()?;
                        self.merge(child);
                    }
                    "keyframes" | "-webkit-keyframes" | "-moz-keyframes" => {
                        self.keyframes(head, body_start, body_end)?;
                    }
                    "font-face" => {
                        self.enter(self.depth)?;
                        let declarations = self.parse_declarations(body_start, body_end, false)?;
                        let id = self.nodes.len();
                        self.push(StyleNode::AtRule(AtRule {
                            id,
                            selector: head,
                            content: AtRuleContent::Declarations(declarations),
                            media_query_id: self.media_id(),
                        }));
                    }
                    _ => {
                        let selector = normalize_whitespace(&input[start..open]);
                        self.style_rule(selector, body_start, body_end, false)?;
                    }
                }
            }
            (_, stop) => {
                self.warn(start, WarningKind::DroppedAtRule { name });
                self.pos = stop.map_or(self.end, |s| s + 1);
            }
        }
        Ok(())
    }

    fn parse_import(&mut self, start: usize, text_start: usize, text_end: usize) {
        let input = self.input;
        let text = &input[text_start..text_end];
        match parse_import_target(text) {
            Some((url, _)) if !self.allow_imports || !self.nodes.is_empty() => {
                self.warn(start, WarningKind::LateImport { url });
            }
            Some((url, media)) => {
                let id = self.imports.len();
                self.imports.push(ImportStatement {
                    id,
                    url,
                    media,
                    resolved: false,
                });
            }
            None => self.warn(start, WarningKind::MalformedImport {
                text: text.trim().to_string(),
            }),
        }
    }

    fn media_block(&mut self, prelude: &str, start: usize, end: usize) -> Result<(), CssError> {
        let depth = self.enter(self.depth)?;
        let parent = self.media_context.as_ref().map(|context| context.text.as_str());
        let context = match combine_media_queries(parent, Some(prelude)) {
            Some(text) => {
                let id = self.media.intern(&text, self.options.max_media_queries)?;
                Some(MediaContext { text, id })
            }
            None => self.media_context.clone(),
        };
        let mut child = self.nested(start, end, depth, context);
        child.run()?;
        self.merge(child);
        Ok(())
    }

    fn keyframes(&mut self, selector: String, start: usize, end: usize) -> Result<(), CssError> {
        let depth = self.enter(self.depth)?;
        let input = self.input;
        let bytes = self.bytes;
        let mut steps = Vec::new();
        let mut pos = start;

        loop {
            pos = skip_whitespace_and_comments(bytes, pos, end);
            if pos >= end {
                break;
            }
            match find_top_level(bytes, pos, end, b"{;") {
                Some(open) if bytes[open] == b'{' => {
                    let head = normalize_whitespace(&input[pos..open]);
                    let (body_end, next) = self.block_bounds(open, end, &head);
                    self.enter(depth)?;
                    let mut step = Rule::new(steps.len(), head);
                    step.declarations = self.parse_declarations(open + 1, body_end, true)?;
                    steps.push(step);
                    pos = next;
                }
                stop => {
                    let stop = stop.unwrap_or(end);
                    self.warn(pos, WarningKind::UnexpectedText {
                        text: input[pos..stop].trim().to_string(),
                    });
                    pos = (stop + 1).min(end);
                }
            }
        }

        let id = self.nodes.len();
        self.push(StyleNode::AtRule(AtRule {
            id,
            selector,
            content: AtRuleContent::Rules(steps),
            media_query_id: self.media_id(),
        }));
        Ok(())
    }

    /// Flat declaration list in `[start, end)`.
    fn parse_declarations(&mut self, start: usize, end: usize, detect_important: bool) -> Result<Vec<Declaration>, CssError> {
        let mut declarations = Vec::new();
        let mut pos = start;
        while pos < end {
            let stop = find_top_level(self.bytes, pos, end, b";").unwrap_or(end);
            if let Some(decl) = self.declaration(pos, stop, detect_important)? {
                declarations.push(decl);
            }
            pos = stop + 1;
        }
        Ok(declarations)
    }

    /// One `name: value[ !important]` segment; `None` when skipped.
    fn declaration(&mut self, start: usize, end: usize, detect_important: bool) -> Result<Option<Declaration>, CssError> {
        let input = self.input;
        let start = skip_whitespace_and_comments(self.bytes, start, end);
        if start >= end {
            return Ok(None);
        }

        let Some(colon) = find_top_level(self.bytes, start, end, b":") else {
            self.warn(start, WarningKind::MissingColon {
                text: input[start..end].trim().to_string(),
            });
            return Ok(None);
        };

        let name = input[start..colon].trim();
        if name.is_empty() {
            self.warn(start, WarningKind::MissingColon {
                text: input[start..end].trim().to_string(),
            });
            return Ok(None);
        }
        if name.len() > self.options.max_property_name_length {
            return Err(CssError::PropertyNameTooLong {
                length: name.len(),
                limit: self.options.max_property_name_length,
            });
        }

        let mut value = input[colon + 1..end].trim();
        if value.len() > self.options.max_property_value_length {
            return Err(CssError::PropertyValueTooLong {
                length: value.len(),
                limit: self.options.max_property_value_length,
            });
        }

        let mut important = false;
        if detect_important {
            if let Some(stripped) = strip_important(value) {
                value = stripped;
                important = true;
            }
        }

        let custom = name.starts_with("--");
        if value.is_empty() && !custom {
            self.warn(start, WarningKind::MissingValue {
                property: name.to_string(),
            });
            return Ok(None);
        }

        let property = if custom {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        };
        Ok(Some(Declaration::new(property, value, important)))
    }
}

/// End of an at-rule name starting at `pos`.
fn scan_name(bytes: &[u8], mut pos: usize, end: usize) -> usize {
    while pos < end && is_ident_char(bytes[pos]) {
        pos += 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(css: &str) -> ParseOutput {
        parse_css(css, &ParserOptions::default(), MediaRegistry::default(), true).unwrap()
    }

    fn rule(output: &ParseOutput, id: usize) -> &Rule {
        output.nodes[id].as_rule().unwrap()
    }

    #[test]
    fn test_parse_simple_rule() {
        let output = parse("div { color: red; }");
        assert_eq!(output.nodes.len(), 1);
        let rule = rule(&output, 0);
        assert_eq!(rule.selector, "div");
        assert_eq!(rule.declarations, vec![Declaration::new("color", "red", false)]);
    }

    #[test]
    fn test_parse_multiple_selectors() {
        let output = parse("h1, h2, h3 { font-weight: bold; }");
        assert_eq!(output.nodes.len(), 3);
        assert_eq!(output.selector_lists.get(&0), Some(&vec![0, 1, 2]));
        for id in 0..3 {
            assert_eq!(rule(&output, id).selector_list_id, Some(0));
        }
    }

    #[test]
    fn test_selector_lists_disabled() {
        let options = ParserOptions::default().with_selector_lists(false);
        let output = parse_css("h1, h2 { x: 1 }", &options, MediaRegistry::default(), true).unwrap();
        assert_eq!(output.nodes.len(), 1);
        assert_eq!(rule(&output, 0).selector, "h1, h2");
        assert!(output.selector_lists.is_empty());
    }

    #[test]
    fn test_important_and_case() {
        let output = parse("P { COLOR: Red ! IMPORTANT; --Brand-Color: Blue }");
        let rule = rule(&output, 0);
        assert_eq!(rule.declarations[0], Declaration::new("color", "Red", true));
        assert_eq!(rule.declarations[1], Declaration::new("--Brand-Color", "Blue", false));
    }

    #[test]
    fn test_value_with_semicolon_in_string_and_url() {
        let output = parse("a { content: \"a;b\"; background: url(x;y.png) }");
        let rule = rule(&output, 0);
        assert_eq!(rule.declarations[0].value, "\"a;b\"");
        assert_eq!(rule.declarations[1].value, "url(x;y.png)");
    }

    #[test]
    fn test_brace_inside_string() {
        let output = parse("a { content: \"}\"; } b { color: red }");
        assert_eq!(output.nodes.len(), 2);
        assert_eq!(rule(&output, 1).selector, "b");
    }

    #[test]
    fn test_media_rule() {
        let output = parse("@media screen and (min-width: 768px) { body { font-size: 16px; } }");
        assert_eq!(output.nodes.len(), 1);
        let media_id = rule(&output, 0).media_query_id.unwrap();
        let query = &output.media.queries[media_id];
        assert_eq!(query.media_type, "screen");
        assert_eq!(query.conditions.as_deref(), Some("(min-width: 768px)"));
    }

    #[test]
    fn test_nested_media_combines() {
        let output = parse("@media screen { @media (color) { a { x: 1 } } }");
        let media_id = rule(&output, 0).media_query_id.unwrap();
        assert_eq!(output.media.queries[media_id].to_css(), "screen and (color)");
    }

    #[test]
    fn test_media_list_offsets_merge() {
        let output = parse("a, b { x: 1 } @media print { c, d { y: 2 } }");
        assert_eq!(output.nodes.len(), 4);
        assert_eq!(output.selector_lists.get(&0), Some(&vec![0, 1]));
        assert_eq!(output.selector_lists.get(&1), Some(&vec![2, 3]));
        assert_eq!(rule(&output, 3).id, 3);
        assert_eq!(rule(&output, 3).selector_list_id, Some(1));
    }

    #[test]
    fn test_supports_is_transparent() {
        let output = parse("@supports (display: grid) { .g { display: grid } }");
        assert_eq!(output.nodes.len(), 1);
        assert_eq!(rule(&output, 0).selector, ".g");
        assert_eq!(rule(&output, 0).media_query_id, None);
    }

    #[test]
    fn test_import() {
        let output = parse("@charset \"UTF-8\"; @import url(\"reset.css\") screen; @import 'a\\'b.css';");
        assert_eq!(output.charset.as_deref(), Some("UTF-8"));
        assert_eq!(output.imports.len(), 2);
        assert_eq!(output.imports[0].url, "reset.css");
        assert_eq!(output.imports[0].media.as_deref(), Some("screen"));
        assert_eq!(output.imports[1].url, "a'b.css");
    }

    #[test]
    fn test_late_import_warns() {
        let output = parse("a { x: 1 } @import \"late.css\";");
        assert!(output.imports.is_empty());
        assert_eq!(
            output.warnings[0].kind,
            WarningKind::LateImport { url: "late.css".into() }
        );
    }

    #[test]
    fn test_keyframes() {
        let output = parse("@-webkit-keyframes fade { from { opacity: 0; } to { opacity: 1; } }");
        let StyleNode::AtRule(at_rule) = &output.nodes[0] else {
            panic!("Expected at-rule");
        };
        assert_eq!(at_rule.selector, "@-webkit-keyframes fade");
        let AtRuleContent::Rules(steps) = &at_rule.content else {
            panic!("Expected keyframe steps");
        };
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].selector, "to");
    }

    #[test]
    fn test_font_face_keeps_important_text() {
        let output = parse("@font-face { font-family: X; src: url(x.woff) !important }");
        let StyleNode::AtRule(at_rule) = &output.nodes[0] else {
            panic!("Expected at-rule");
        };
        let AtRuleContent::Declarations(decls) = &at_rule.content else {
            panic!("Expected declarations");
        };
        assert_eq!(decls[1].value, "url(x.woff) !important");
        assert!(!decls[1].important);
    }

    #[test]
    fn test_unknown_block_at_rule_is_rule() {
        let output = parse("@page :first { margin: 1in; }");
        assert_eq!(rule(&output, 0).selector, "@page :first");
    }

    #[test]
    fn test_statement_at_rule_dropped() {
        let output = parse("@layer base, theme; a { x: 1 }");
        assert_eq!(output.nodes.len(), 1);
        assert_eq!(
            output.warnings[0].kind,
            WarningKind::DroppedAtRule { name: "layer".into() }
        );
    }

    #[test]
    fn test_nesting_explicit_and_implicit() {
        let output = parse(".p { color: blue; &:hover { color: red } .c { x: 1 } > .d { y: 2 } }");
        assert!(output.has_nesting);
        assert_eq!(output.nodes.len(), 4);
        assert_eq!(rule(&output, 0).declarations.len(), 1);
        assert_eq!(rule(&output, 1).selector, ".p:hover");
        assert_eq!(rule(&output, 1).nesting_style, Some(NestingStyle::Explicit));
        assert_eq!(rule(&output, 1).parent_rule_id, Some(0));
        assert_eq!(rule(&output, 2).selector, ".p .c");
        assert_eq!(rule(&output, 2).nesting_style, Some(NestingStyle::Implicit));
        assert_eq!(rule(&output, 3).selector, ".p > .d");
    }

    #[test]
    fn test_parent_precedes_children() {
        let output = parse(".a { .b { .c { x: 1 } } .d { y: 2 } }");
        let selectors: Vec<&str> = output.nodes.iter().map(StyleNode::selector).collect();
        assert_eq!(selectors, vec![".a", ".a .b", ".a .b .c", ".a .d"]);
        assert_eq!(rule(&output, 2).parent_rule_id, Some(1));
        assert_eq!(rule(&output, 3).parent_rule_id, Some(0));
    }

    #[test]
    fn test_nested_media_in_rule() {
        let output = parse("@media screen { .a { color: red; @media (min-width: 500px) { color: blue } } }");
        let block = rule(&output, 1);
        assert!(block.is_nested_media());
        assert_eq!(block.selector, ".a");
        let id = block.media_query_id.unwrap();
        assert_eq!(output.media.queries[id].to_css(), "screen and (min-width: 500px)");
    }

    #[test]
    fn test_list_parent_uses_is() {
        let output = parse(".a, .b { &:hover { x: 1 } }");
        assert_eq!(rule(&output, 0).selector, ".a, .b");
        assert_eq!(rule(&output, 1).selector, ":is(.a, .b):hover");
    }

    #[test]
    fn test_nested_selector_list() {
        let output = parse(".a { .b, &.c { x: 1 } }");
        assert_eq!(rule(&output, 1).selector, ".a .b, .a.c");
        assert_eq!(rule(&output, 1).nesting_style, Some(NestingStyle::Explicit));
    }

    #[test]
    fn test_depth_guard() {
        let nest = |levels: usize| {
            let mut css = String::new();
            for _ in 0..levels {
                css.push_str("& .x { ");
            }
            css.push_str("color: red; ");
            for _ in 0..levels {
                css.push_str("} ");
            }
            format!(".root {{ {css}}}")
        };
        // The outer rule is one level
        assert!(parse_css(&nest(8), &ParserOptions::default(), MediaRegistry::default(), true).is_ok());
        let err = parse_css(&nest(10), &ParserOptions::default(), MediaRegistry::default(), true).unwrap_err();
        assert_eq!(err, CssError::TooDeep { limit: 10 });
    }

    #[test]
    fn test_missing_colon_recovers() {
        let output = parse("a { color red; margin: 0 }");
        assert_eq!(rule(&output, 0).declarations.len(), 1);
        assert!(matches!(output.warnings[0].kind, WarningKind::MissingColon { .. }));
    }

    #[test]
    fn test_property_name_limit() {
        let css = format!("a {{ {}: 1 }}", "x".repeat(300));
        let err = parse_css(&css, &ParserOptions::default(), MediaRegistry::default(), true).unwrap_err();
        assert!(matches!(err, CssError::PropertyNameTooLong { length: 300, limit: 256 }));
    }

    #[test]
    fn test_unterminated_block_warns() {
        let output = parse("a { color: red");
        assert_eq!(rule(&output, 0).declarations.len(), 1);
        assert!(matches!(output.warnings[0].kind, WarningKind::UnterminatedBlock { .. }));
    }

    #[test]
    fn test_strip_important() {
        assert_eq!(strip_important("red !important"), Some("red"));
        assert_eq!(strip_important("red!IMPORTANT  "), Some("red"));
        assert_eq!(strip_important("red important"), None);
    }

    #[test]
    fn test_resolve_nested_selector() {
        assert_eq!(
            resolve_nested_selector(".p", "& + &"),
            (".p + .p".to_string(), NestingStyle::Explicit)
        );
        assert_eq!(
            resolve_nested_selector(".p", "> &.x"),
            (".p > .p.x".to_string(), NestingStyle::Explicit)
        );
        assert_eq!(
            resolve_nested_selector(".p", "  span"),
            (".p span".to_string(), NestingStyle::Implicit)
        );
    }

    #[test]
    fn test_multibyte_values() {
        let output = parse("p::after { content: \"→ é\"; } .ü { x: 1 }");
        assert_eq!(rule(&output, 0).declarations[0].value, "\"→ é\"");
        assert_eq!(rule(&output, 1).selector, ".ü");
    }

    #[test]
    fn test_multibyte_import_target() {
        let output = parse("@import \"ab→.css\"; @import url(ü.css) print;");
        assert_eq!(output.imports[0].url, "ab→.css");
        assert_eq!(output.imports[1].url, "ü.css");
        assert_eq!(output.imports[1].media.as_deref(), Some("print"));

        let output = parse("@import ab→;");
        assert!(output.imports.is_empty());
        assert!(matches!(output.warnings[0].kind, WarningKind::MalformedImport { .. }));
    }

    #[test]
    fn test_escaped_multibyte_selector() {
        let output = parse(".a\\é { color: red }");
        assert_eq!(rule(&output, 0).selector, ".a\\é");
    }
}
