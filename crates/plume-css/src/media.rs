//! Media queries
//!
//! `@media` headers are split into queries of the form
//! `[only|not] type [and conditions]` or bare `conditions`. Queries are
//! interned in a registry so identical headers share one id; comma-separated
//! headers additionally form a media query list.

use std::collections::{BTreeMap, HashMap};

use crate::error::CssError;
use crate::scanner::{is_whitespace, split_top_level_commas, starts_with_ignore_case};

/// `only` / `not` prefix of a media query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MediaQualifier {
    Only,
    Not,
}

/// One media query
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaQuery {
    pub id: usize,
    /// Lower-cased media type; `all` when the query only has conditions
    pub media_type: String,
    /// Feature expression, verbatim
    pub conditions: Option<String>,
    pub qualifier: Option<MediaQualifier>,
    /// Owning media query list for comma-separated headers
    pub list_id: Option<usize>,
}

impl MediaQuery {
    /// Query text: `screen and (min-width: 500px)`, `(hover)`, `not print`.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        match self.qualifier {
            Some(MediaQualifier::Only) => out.push_str("only "),
            Some(MediaQualifier::Not) => out.push_str("not "),
            None => {}
        }
        match &self.conditions {
            Some(conditions) if self.qualifier.is_none() && self.media_type == "all" => {
                out.push_str(conditions);
            }
            Some(conditions) => {
                out.push_str(&self.media_type);
                out.push_str(" and ");
                out.push_str(conditions);
            }
            None => out.push_str(&self.media_type),
        }
        out
    }
}

/// Parsed shape of a single query before it gets an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QueryParts {
    pub media_type: String,
    pub conditions: Option<String>,
    pub qualifier: Option<MediaQualifier>,
}

/// Split one query into qualifier, type and conditions.
pub(crate) fn parse_query(text: &str) -> QueryParts {
    let mut rest = text.trim();
    let mut qualifier = None;

    for (keyword, value) in [("only", MediaQualifier::Only), ("not", MediaQualifier::Not)] {
        let bytes = rest.as_bytes();
        if starts_with_ignore_case(bytes, keyword.as_bytes())
            && bytes.get(keyword.len()).is_some_and(|&b| is_whitespace(b))
        {
            qualifier = Some(value);
            rest = rest[keyword.len()..].trim_start();
            break;
        }
    }

    if rest.starts_with('(') {
        return QueryParts {
            media_type: "all".to_string(),
            conditions: Some(rest.to_string()),
            qualifier,
        };
    }

    let type_end = rest
        .bytes()
        .position(|b| is_whitespace(b) || b == b'(')
        .unwrap_or(rest.len());
    let media_type = rest[..type_end].to_ascii_lowercase();
    let mut tail = rest[type_end..].trim_start();
    if starts_with_ignore_case(tail.as_bytes(), b"and")
        && tail.as_bytes().get(3).is_some_and(|&b| is_whitespace(b) || b == b'(')
    {
        tail = tail[3..].trim_start();
    }

    QueryParts {
        media_type: if media_type.is_empty() { "all".to_string() } else { media_type },
        conditions: (!tail.is_empty()).then(|| tail.to_string()),
        qualifier,
    }
}

/// Combine an enclosing media context with a nested query.
///
/// `parent and child`, with the child parenthesized when it is a bare
/// feature expression. Parent lists distribute: `screen, print` with
/// `(color)` gives `screen and (color), print and (color)`.
pub fn combine_media_queries(parent: Option<&str>, child: Option<&str>) -> Option<String> {
    let child = child.map(str::trim).filter(|c| !c.is_empty());
    let parent = parent.map(str::trim).filter(|p| !p.is_empty());

    let combined = match (parent, child) {
        (None, None) => return None,
        (Some(parent), None) => parent.to_string(),
        (None, Some(child)) => child.to_string(),
        (Some(parent), Some(child)) => {
            let child = if child.contains(':') && !child.contains('(') {
                format!("({child})")
            } else {
                child.to_string()
            };
            split_top_level_commas(parent)
                .into_iter()
                .map(|member| format!("{member} and {child}"))
                .collect::<Vec<_>>()
                .join(", ")
        }
    };
    tracing::trace!(?parent, ?child, %combined, "combined media queries");
    Some(combined)
}

/// Interned media queries and query lists
#[derive(Debug, Clone, Default)]
pub(crate) struct MediaRegistry {
    pub queries: Vec<MediaQuery>,
    pub lists: BTreeMap<usize, Vec<usize>>,
    next_list_id: usize,
    by_text: HashMap<String, usize>,
}

impl MediaRegistry {
    /// Rebuild a registry over an existing query table.
    pub fn from_parts(queries: Vec<MediaQuery>, lists: BTreeMap<usize, Vec<usize>>) -> Self {
        let mut registry = Self {
            next_list_id: lists.keys().next_back().map_or(0, |id| id + 1),
            queries,
            lists,
            by_text: HashMap::new(),
        };
        for query in &registry.queries {
            if query.list_id.is_none() {
                registry.by_text.insert(query.to_css(), query.id);
            }
        }
        for members in registry.lists.values() {
            if let Some(&first) = members.first() {
                let text = members
                    .iter()
                    .filter_map(|&id| registry.queries.get(id))
                    .map(MediaQuery::to_css)
                    .collect::<Vec<_>>()
                    .join(", ");
                registry.by_text.insert(text, first);
            }
        }
        registry
    }

    /// Intern a full `@media` header and return the id rules should carry.
    ///
    /// For a list this is the id of its first query.
    pub fn intern(&mut self, text: &str, limit: usize) -> Result<usize, CssError> {
        let members = split_top_level_commas(text);
        let parts: Vec<QueryParts> = members.iter().map(|member| parse_query(member)).collect();

        let key = parts
            .iter()
            .map(|part| self.preview(part).to_css())
            .collect::<Vec<_>>()
            .join(", ");
        if let Some(&id) = self.by_text.get(&key) {
            return Ok(id);
        }

        if self.queries.len() + parts.len().max(1) > limit {
            return Err(CssError::TooManyMediaQueries { limit });
        }

        let list_id = if parts.len() > 1 {
            let id = self.next_list_id;
            self.next_list_id += 1;
            Some(id)
        } else {
            None
        };

        let mut ids = Vec::with_capacity(parts.len());
        for part in parts {
            let id = self.queries.len();
            self.queries.push(MediaQuery {
                id,
                media_type: part.media_type,
                conditions: part.conditions,
                qualifier: part.qualifier,
                list_id,
            });
            ids.push(id);
        }

        if ids.is_empty() {
            let id = self.queries.len();
            self.queries.push(MediaQuery {
                id,
                media_type: "all".to_string(),
                conditions: None,
                qualifier: None,
                list_id: None,
            });
            ids.push(id);
        }

        let first = ids[0];
        if let Some(list_id) = list_id {
            self.lists.insert(list_id, ids);
        }
        self.by_text.insert(key, first);
        Ok(first)
    }

    fn preview(&self, part: &QueryParts) -> MediaQuery {
        MediaQuery {
            id: 0,
            media_type: part.media_type.clone(),
            conditions: part.conditions.clone(),
            qualifier: part.qualifier,
            list_id: None,
        }
    }
}

/// Full header text for the query (or query list) a rule points at.
pub fn media_text(
    queries: &[MediaQuery],
    lists: &BTreeMap<usize, Vec<usize>>,
    query_id: usize,
) -> Option<String> {
    let query = queries.get(query_id)?;
    match query.list_id.and_then(|list_id| lists.get(&list_id)) {
        Some(members) => Some(
            members
                .iter()
                .filter_map(|&id| queries.get(id))
                .map(MediaQuery::to_css)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        None => Some(query.to_css()),
    }
}

/// Grouping identity: the list for compound headers, else the query itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum MediaIdentity {
    Query(usize),
    List(usize),
}

pub(crate) fn media_identity(queries: &[MediaQuery], query_id: usize) -> MediaIdentity {
    match queries.get(query_id).and_then(|query| query.list_id) {
        Some(list_id) => MediaIdentity::List(list_id),
        None => MediaIdentity::Query(query_id),
    }
}
