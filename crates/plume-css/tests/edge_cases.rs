//! Edge case and stress tests for plume-css
//!
//! Malformed input, recovery paths and resource limits.

use plume_css::{CssError, ParserOptions, StyleNode, Stylesheet, WarningKind};

// ============================================================================
// EMPTY AND MINIMAL INPUT
// ============================================================================

#[test]
fn test_parse_whitespace_only() {
    let sheet = Stylesheet::parse("   \t\n\r\n   ").unwrap();
    assert!(sheet.is_empty());
    assert_eq!(sheet.to_css(), "");
}

#[test]
fn test_parse_comment_only() {
    let sheet = Stylesheet::parse("/* comment 1 */ /* comment 2 */").unwrap();
    assert!(sheet.is_empty());
    assert!(sheet.warnings.is_empty());
}

#[test]
fn test_unterminated_comment() {
    let sheet = Stylesheet::parse("a { x: 1 } /* never closed").unwrap();
    assert_eq!(sheet.rule_count(), 1);
}

// ============================================================================
// SELECTOR EDGE CASES
// ============================================================================

#[test]
fn test_comments_inside_selector() {
    let sheet = Stylesheet::parse("div /* wrapper */ > p { color: red }").unwrap();
    assert_eq!(sheet.rules[0].selector(), "div > p");
}

#[test]
fn test_attribute_selector_with_braces_and_commas() {
    let sheet = Stylesheet::parse(r#"a[title="{x, y}"], b { color: red }"#).unwrap();
    assert_eq!(sheet.rule_count(), 2);
    assert_eq!(sheet.rules[0].selector(), r#"a[title="{x, y}"]"#);
}

#[test]
fn test_missing_selector_skipped() {
    let sheet = Stylesheet::parse("{ color: red } a { x: 1 }").unwrap();
    assert_eq!(sheet.rule_count(), 1);
    assert_eq!(sheet.warnings[0].kind, WarningKind::EmptySelector);
}

#[test]
fn test_stray_text_skipped() {
    let sheet = Stylesheet::parse("garbage; a { x: 1 }").unwrap();
    assert_eq!(sheet.rule_count(), 1);
    assert!(matches!(sheet.warnings[0].kind, WarningKind::UnexpectedText { .. }));
}

#[test]
fn test_stray_closing_brace() {
    let sheet = Stylesheet::parse("} a { x: 1 }").unwrap();
    assert_eq!(sheet.rule_count(), 1);
}

// ============================================================================
// DECLARATION EDGE CASES
// ============================================================================

#[test]
fn test_value_with_colons_and_urls() {
    let sheet = Stylesheet::parse("a { background: url(http://x.test/a;b.png) no-repeat }").unwrap();
    let rule = sheet.rules[0].as_rule().unwrap();
    assert_eq!(rule.declarations[0].value, "url(http://x.test/a;b.png) no-repeat");
}

#[test]
fn test_empty_value_skipped_but_custom_kept() {
    let sheet = Stylesheet::parse("a { color: ; --empty: ; }").unwrap();
    let rule = sheet.rules[0].as_rule().unwrap();
    assert_eq!(rule.declarations.len(), 1);
    assert_eq!(rule.declarations[0].property, "--empty");
    assert!(matches!(sheet.warnings[0].kind, WarningKind::MissingValue { .. }));
}

#[test]
fn test_important_with_spacing() {
    let sheet = Stylesheet::parse("a { color: red  !  Important }").unwrap();
    let rule = sheet.rules[0].as_rule().unwrap();
    assert!(rule.declarations[0].important);
    assert_eq!(rule.declarations[0].value, "red");
}

#[test]
fn test_property_value_limit() {
    let css = format!("a {{ content: \"{}\" }}", "x".repeat(40_000));
    assert!(matches!(
        Stylesheet::parse(&css),
        Err(CssError::PropertyValueTooLong { limit: 32768, .. })
    ));
}

// ============================================================================
// AT-RULE EDGE CASES
// ============================================================================

#[test]
fn test_malformed_import() {
    let sheet = Stylesheet::parse("@import ; a { x: 1 }").unwrap();
    assert!(sheet.imports.is_empty());
    assert!(matches!(sheet.warnings[0].kind, WarningKind::MalformedImport { .. }));
}

#[test]
fn test_import_after_charset_allowed() {
    let sheet = Stylesheet::parse("@charset \"utf-8\"; @import 'a.css'; @import url(b.css);").unwrap();
    assert_eq!(sheet.imports.len(), 2);
    assert_eq!(sheet.imports[1].id, 1);
    assert_eq!(sheet.imports[1].url, "b.css");
}

#[test]
fn test_namespace_dropped() {
    let sheet = Stylesheet::parse("@namespace svg url(http://www.w3.org/2000/svg); a { x: 1 }").unwrap();
    assert_eq!(sheet.rule_count(), 1);
    assert_eq!(
        sheet.warnings[0].kind,
        WarningKind::DroppedAtRule { name: "namespace".into() }
    );
}

#[test]
fn test_unknown_block_at_rule() {
    let sheet = Stylesheet::parse("@property --x { syntax: '<length>'; inherits: false }").unwrap();
    let rule = sheet.rules[0].as_rule().unwrap();
    assert_eq!(rule.selector, "@property --x");
    assert_eq!(rule.declarations.len(), 2);
}

#[test]
fn test_keyframes_inside_media() {
    let sheet = Stylesheet::parse("@media print { @keyframes k { 0% { top: 0 } 100% { top: 1px } } }").unwrap();
    let StyleNode::AtRule(at_rule) = &sheet.rules[0] else {
        panic!("Expected at-rule");
    };
    assert!(at_rule.media_query_id.is_some());
    assert_eq!(sheet.rules_for_media("print").len(), 1);
    assert_eq!(
        sheet.to_css(),
        "@media print {\n@keyframes k { 0% { top: 0; } 100% { top: 1px; } }\n}\n"
    );
}

#[test]
fn test_unterminated_media_block() {
    let sheet = Stylesheet::parse("@media screen { a { x: 1 }").unwrap();
    assert_eq!(sheet.rule_count(), 1);
    assert!(matches!(sheet.warnings[0].kind, WarningKind::UnterminatedBlock { .. }));
}

// ============================================================================
// UTF-8
// ============================================================================

#[test]
fn test_escaped_non_ascii_selector() {
    let sheet = Stylesheet::parse(".a\\é { color: red } .b\\→ > p { x: 1 }").unwrap();
    assert_eq!(sheet.rule_count(), 2);
    assert_eq!(sheet.rules[0].selector(), ".a\\é");
    assert_eq!(sheet.rules[1].selector(), ".b\\→ > p");
    assert_eq!(Stylesheet::parse(&sheet.to_css()).unwrap().rules, sheet.rules);
}

#[test]
fn test_non_ascii_import_urls() {
    let sheet = Stylesheet::parse("@import \"ab→.css\"; @import url('ü/ß.css') screen; a { x: 1 }").unwrap();
    assert_eq!(sheet.imports.len(), 2);
    assert_eq!(sheet.imports[0].url, "ab→.css");
    assert_eq!(sheet.imports[1].url, "ü/ß.css");
    assert_eq!(sheet.imports[1].media.as_deref(), Some("screen"));
    assert!(sheet.warnings.is_empty());
}

#[test]
fn test_unquoted_non_ascii_import_warns() {
    let sheet = Stylesheet::parse("@import ab→; a { x: 1 }").unwrap();
    assert!(sheet.imports.is_empty());
    assert!(matches!(sheet.warnings[0].kind, WarningKind::MalformedImport { .. }));
    assert_eq!(sheet.rule_count(), 1);
}

#[test]
fn test_non_ascii_at_rule_preludes() {
    let css = "@page :é { margin: 1in } \
               @supports (content: \"→\") { .ü { x: 1 } } \
               @keyframes ñ { from { top: 0 } }";
    let sheet = Stylesheet::parse(css).unwrap();
    assert_eq!(sheet.rule_count(), 3);
    assert_eq!(sheet.rules[0].selector(), "@page :é");
    assert_eq!(sheet.rules[1].selector(), ".ü");
    assert_eq!(sheet.rules[2].selector(), "@keyframes ñ");
}

// ============================================================================
// STRESS
// ============================================================================

#[test]
fn test_many_rules() {
    let css: String = (0..2000).map(|i| format!(".c{i} {{ width: {i}px }}\n")).collect();
    let sheet = Stylesheet::parse(&css).unwrap();
    assert_eq!(sheet.rule_count(), 2000);
    assert_eq!(sheet.rules[1999].id(), 1999);
}

#[test]
fn test_media_query_limit() {
    let css: String = (0..1001)
        .map(|i| format!("@media (min-width: {i}px) {{ a {{ x: 1 }} }}\n"))
        .collect();
    assert_eq!(
        Stylesheet::parse(&css).unwrap_err(),
        CssError::TooManyMediaQueries { limit: 1000 }
    );
}

#[test]
fn test_repeated_media_within_limit() {
    let css: String = (0..1500).map(|_| "@media print { a { x: 1 } }\n").collect();
    let sheet = Stylesheet::parse(&css).unwrap();
    assert_eq!(sheet.media_queries.len(), 1);
}

#[test]
fn test_wide_selector_list() {
    let selectors: Vec<String> = (0..100).map(|i| format!(".s{i}")).collect();
    let css = format!("{} {{ color: red }}", selectors.join(", "));
    let sheet = Stylesheet::parse(&css).unwrap();
    assert_eq!(sheet.rule_count(), 100);
    assert_eq!(sheet.to_css(), format!("{} {{ color: red; }}\n", selectors.join(", ")));

    let options = ParserOptions::default().with_selector_lists(false);
    let single = Stylesheet::parse_with_options(&css, options).unwrap();
    assert_eq!(single.rule_count(), 1);
}
