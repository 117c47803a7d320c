//! Selector specificity
//!
//! Collapses the (ids, classes, types) triple into `ids * 100 + classes * 10
//! + types`. A selector list scores as its most specific member.

use crate::scanner::{find_matching_paren, is_ident_char, skip_string, split_top_level_commas};

/// Legacy pseudo-elements that may be written with a single colon
const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter", "selection"];

/// Specificity of a selector (or the maximum over a selector list).
pub fn calculate_specificity(selector: &str) -> u32 {
    split_top_level_commas(selector)
        .into_iter()
        .map(single_specificity)
        .max()
        .unwrap_or(0)
}

#[derive(Debug, Default, Clone, Copy)]
struct Counts {
    ids: u32,
    classes: u32,
    types: u32,
}

impl Counts {
    fn total(self) -> u32 {
        self.ids * 100 + self.classes * 10 + self.types
    }

    /// Add a collapsed specificity back component-wise.
    fn add_collapsed(&mut self, value: u32) {
        self.ids += value / 100;
        self.classes += value / 10 % 10;
        self.types += value % 10;
    }
}

fn single_specificity(selector: &str) -> u32 {
    let bytes = selector.as_bytes();
    let mut counts = Counts::default();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'#' => {
                counts.ids += 1;
                i = skip_ident(bytes, i + 1);
            }
            b'.' => {
                counts.classes += 1;
                i = skip_ident(bytes, i + 1);
            }
            b'[' => {
                counts.classes += 1;
                i = skip_attribute(bytes, i + 1);
            }
            b':' if bytes.get(i + 1) == Some(&b':') => {
                counts.types += 1;
                i = skip_arguments(bytes, skip_ident(bytes, i + 2));
            }
            b':' => {
                let name_start = i + 1;
                let name_end = skip_ident(bytes, name_start);
                let name = selector[name_start..name_end].to_ascii_lowercase();

                if name == "not" && bytes.get(name_end) == Some(&b'(') {
                    let close = find_matching_paren(bytes, name_end + 1, bytes.len()).unwrap_or(bytes.len());
                    let argument = &selector[name_end + 1..close];
                    counts.add_collapsed(calculate_specificity(argument));
                    i = (close + 1).min(bytes.len());
                    continue;
                }

                if LEGACY_PSEUDO_ELEMENTS.contains(&name.as_str()) {
                    counts.types += 1;
                } else {
                    counts.classes += 1;
                }
                i = skip_arguments(bytes, name_end);
            }
            b'*' => i += 1,
            b'\\' => {
                counts.types += 1;
                i = skip_ident(bytes, i);
            }
            b if b.is_ascii_alphabetic() || b == b'_' || b >= 0x80 => {
                counts.types += 1;
                i = skip_ident(bytes, i);
            }
            b'-' if bytes.get(i + 1).is_some_and(|&b| b.is_ascii_alphabetic() || b == b'-') => {
                counts.types += 1;
                i = skip_ident(bytes, i);
            }
            // Combinators, whitespace and anything unknown
            _ => i += 1,
        }
    }

    counts.total()
}

/// Skip an identifier, honoring `\` escapes.
fn skip_ident(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
        } else if is_ident_char(bytes[i]) {
            i += 1;
        } else {
            break;
        }
    }
    i.min(bytes.len())
}

fn skip_attribute(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => i = skip_string(bytes, i, bytes.len()),
            b']' => return i + 1,
            _ => i += 1,
        }
    }
    i
}

fn skip_arguments(bytes: &[u8], i: usize) -> usize {
    if bytes.get(i) == Some(&b'(') {
        find_matching_paren(bytes, i + 1, bytes.len()).map_or(bytes.len(), |close| close + 1)
    } else {
        i
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_components() {
        assert_eq!(calculate_specificity("div"), 1);
        assert_eq!(calculate_specificity(".class"), 10);
        assert_eq!(calculate_specificity("#id"), 100);
        assert_eq!(calculate_specificity("div.class#id"), 111);
        assert_eq!(calculate_specificity("*"), 0);
    }

    #[test]
    fn test_attributes_and_pseudo_classes() {
        assert_eq!(calculate_specificity("a[href^=\"http\"]"), 11);
        assert_eq!(calculate_specificity("li:nth-child(2n+1)"), 11);
        assert_eq!(calculate_specificity("a:hover"), 11);
    }

    #[test]
    fn test_pseudo_elements() {
        assert_eq!(calculate_specificity("p::first-line"), 2);
        assert_eq!(calculate_specificity("p:before"), 2);
        assert_eq!(calculate_specificity("p::before"), 2);
    }

    #[test]
    fn test_not_counts_argument_only() {
        assert_eq!(calculate_specificity(":not(.a)"), 10);
        assert_eq!(calculate_specificity("div:not(#x .y)"), 111);
    }

    #[test]
    fn test_combinators_skipped() {
        assert_eq!(calculate_specificity("ul > li + li ~ p"), 4);
    }

    #[test]
    fn test_list_uses_max_member() {
        assert_eq!(calculate_specificity("h1, .title, #main"), 100);
    }

    #[test]
    fn test_keyframe_and_at_selectors() {
        assert_eq!(calculate_specificity("50%"), 0);
        assert_eq!(calculate_specificity("@page :first"), 11);
    }
}
