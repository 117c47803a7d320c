//! Comprehensive tests for plume-css
//!
//! Parse, flatten, serialize and color rewriting through the public API.

use plume_css::{
    ColorConversion, ColorFormat, CssError, Declaration, NestingStyle, ParserOptions, Stylesheet,
    WarningKind,
};
use std::sync::Once;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn parse(css: &str) -> Stylesheet {
    init_tracing();
    Stylesheet::parse(css).unwrap()
}

/// `levels` nested blocks, the outermost `.x` included.
fn nested_css(levels: usize) -> String {
    let mut css = String::from(".x { ");
    for _ in 1..levels {
        css.push_str("& .x { ");
    }
    css.push_str("color: red; ");
    for _ in 0..levels {
        css.push_str("} ");
    }
    css
}

// ============================================================================
// ROUND TRIP
// ============================================================================

const KITCHEN_SINK: &str = r#"
@charset "UTF-8";
@import url("base.css") screen;

:root { --Brand: #336699; }

h1, h2, h3 { color: red; margin: 0 auto; }

.card {
    padding: 4px;
    &:hover { color: blue; }
    .title { font-weight: bold; }
    > .icon { width: 16px }
    @media (min-width: 600px) { padding: 8px; }
}

@media screen, print {
    body { color: black; }
    a, b { text-decoration: none !important; }
}

@media screen {
    .nav { display: flex; @media (orientation: landscape) { gap: 2px } }
}

@keyframes fade { from { opacity: 0; } to { opacity: 1; } }
@font-face { font-family: "Plume Sans"; src: url(plume.woff2); }
@supports (display: grid) { .grid { display: grid; } }
@page :first { margin: 1in; }
"#;

#[test]
fn test_round_trip_is_idempotent() {
    let first = parse(KITCHEN_SINK).to_css();
    let second = parse(&first).to_css();
    assert_eq!(first, second);
}

#[test]
fn test_formatted_round_trip_is_idempotent() {
    let first = parse(KITCHEN_SINK).to_formatted_css();
    let second = parse(&first).to_formatted_css();
    assert_eq!(first, second);
}

#[test]
fn test_compact_and_formatted_parse_alike() {
    let sheet = parse(KITCHEN_SINK);
    assert_eq!(parse(&sheet.to_css()).rules, parse(&sheet.to_formatted_css()).rules);
}

#[test]
fn test_kitchen_sink_shape() {
    let sheet = parse(KITCHEN_SINK);
    assert_eq!(sheet.charset.as_deref(), Some("UTF-8"));
    assert_eq!(sheet.imports.len(), 1);
    assert_eq!(sheet.imports[0].media.as_deref(), Some("screen"));
    assert!(sheet.has_nesting);
    assert!(sheet.warnings.is_empty());
    assert_eq!(sheet.find_by_selector(".card > .icon").len(), 1);
    assert_eq!(sheet.find_by_selector("@page :first").len(), 1);
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_selector_list_scenario() {
    let sheet = parse("h1, h2, h3 { color: red; }");
    assert_eq!(sheet.rule_count(), 3);

    let list_ids: Vec<Option<usize>> = sheet.iter_rules().map(|rule| rule.selector_list_id).collect();
    assert!(list_ids[0].is_some());
    assert!(list_ids.iter().all(|&id| id == list_ids[0]));

    assert_eq!(sheet.selector_lists.len(), 1);
    assert_eq!(sheet.selector_lists.values().next().map(Vec::len), Some(3));
    assert_eq!(sheet.to_css(), "h1, h2, h3 { color: red; }\n");
}

#[test]
fn test_media_list_scenario() {
    let css = parse("@media screen, print { body { color: red; } }").to_css();
    assert_eq!(css.matches("@media").count(), 1);
    assert!(css.starts_with("@media screen, print {"));
}

#[test]
fn test_nesting_reconstruction() {
    let sheet = parse(".p{ &:hover{color:red} }");
    let hover = sheet.rules[1].as_rule().unwrap();
    assert_eq!(hover.selector, ".p:hover");
    assert_eq!(hover.nesting_style, Some(NestingStyle::Explicit));

    let css = sheet.to_css();
    assert!(css.contains("&:hover"));
    assert!(!css.contains(".p:hover"));
}

#[test]
fn test_depth_guard() {
    init_tracing();
    assert!(Stylesheet::parse(&nested_css(9)).is_ok());
    assert!(Stylesheet::parse(&nested_css(10)).is_ok());
    assert_eq!(
        Stylesheet::parse(&nested_css(11)).unwrap_err(),
        CssError::TooDeep { limit: 10 }
    );
}

#[test]
fn test_depth_guard_counts_media_and_grouping() {
    init_tracing();
    let mut css = String::new();
    for _ in 0..5 {
        css.push_str("@media screen { @supports (display: grid) { ");
    }
    css.push_str("a { x: 1 }");
    for _ in 0..10 {
        css.push_str(" }");
    }
    assert!(matches!(Stylesheet::parse(&css), Err(CssError::TooDeep { .. })));
}

#[test]
fn test_configured_depth_limit() {
    init_tracing();
    let options = ParserOptions::default().with_max_nesting_depth(3);
    assert!(Stylesheet::parse_with_options(&nested_css(3), options.clone()).is_ok());
    assert_eq!(
        Stylesheet::parse_with_options(&nested_css(4), options).unwrap_err(),
        CssError::TooDeep { limit: 3 }
    );
}

// ============================================================================
// CASCADE
// ============================================================================

#[test]
fn test_cascade_source_order() {
    let sheet = parse("A { color: red } A { color: blue }").flatten();
    assert_eq!(
        sheet.find_by_selector("A")[0].get("color"),
        Some(&Declaration::new("color", "blue", false))
    );
}

#[test]
fn test_cascade_important() {
    let sheet = parse(".a { color: red !important } .a { color: blue }").flatten();
    let rule = sheet.find_by_selector(".a")[0];
    assert_eq!(rule.get("color").map(|d| d.value.as_str()), Some("red"));
    assert!(rule.has_important());
}

#[test]
fn test_margin_recreated_in_short_form() {
    let sheet = parse(".m { margin: 10px 20px }").flatten();
    assert_eq!(
        sheet.find_by_selector(".m")[0].declarations,
        vec![Declaration::new("margin", "10px 20px", false)]
    );
    assert_eq!(sheet.to_css(), ".m { margin: 10px 20px; }\n");
}

#[test]
fn test_mixed_importance_not_recreated() {
    let sheet = parse(".m { margin: 0 } .m { margin-top: 5px !important }").flatten();
    let rule = sheet.find_by_selector(".m")[0];
    assert!(!rule.has_property("margin"));
    assert_eq!(rule.declarations.len(), 4);
}

#[test]
fn test_selector_list_divergence() {
    let sheet = parse("a,b,c{x:1} b{x:2}").flatten();
    let a = sheet.find_by_selector("a")[0];
    let b = sheet.find_by_selector("b")[0];
    let c = sheet.find_by_selector("c")[0];
    assert!(a.selector_list_id.is_some());
    assert_eq!(a.selector_list_id, c.selector_list_id);
    assert_eq!(b.selector_list_id, None);
    assert_eq!(sheet.to_css(), "a, c { x: 1; }\nb { x: 2; }\n");
}

#[test]
fn test_flatten_without_selector_lists() {
    init_tracing();
    let options = ParserOptions::default().with_selector_lists(false);
    let sheet = Stylesheet::parse_with_options("a, b { x: 1 } a, b { y: 2 }", options)
        .unwrap()
        .flatten();
    assert_eq!(sheet.rule_count(), 1);
    assert_eq!(sheet.rules[0].selector(), "a, b");
    assert!(sheet.selector_lists.is_empty());
}

#[test]
fn test_flatten_nested_media_keeps_context() {
    let sheet = parse(".a { color: red; @media print { color: blue } } .a { color: green }").flatten();
    assert_eq!(sheet.rule_count(), 2);
    let print = &sheet.rules_for_media("print");
    assert_eq!(print.len(), 1);
    assert_eq!(print[0].selector(), ".a");
    assert_eq!(sheet.rules[0].as_rule().unwrap().get("color").map(|d| d.value.as_str()), Some("green"));
}

// ============================================================================
// STYLESHEET API
// ============================================================================

#[test]
fn test_add_block_and_remove() {
    let mut sheet = parse(".a { x: 1 }");
    sheet.add_block(".b { .c { y: 2 } } .a { z: 3 }").unwrap();
    assert_eq!(sheet.rule_count(), 4);
    assert_eq!(sheet.children(1), &[2]);

    assert_eq!(sheet.remove_rules(".b"), 2);
    assert_eq!(sheet.rule_count(), 2);
    assert_eq!(sheet.find_by_selector(".a").len(), 2);
    assert_eq!(sheet.to_css(), ".a { x: 1; }\n.a { z: 3; }\n");
}

#[test]
fn test_media_queries_interned() {
    let sheet = parse("@media print { a { x: 1 } } @media PRINT { b { y: 2 } }");
    assert_eq!(sheet.media_queries.len(), 1);
    assert_eq!(sheet.media_types(), vec!["print"]);
    assert_eq!(sheet.to_css(), "@media print {\na { x: 1; }\nb { y: 2; }\n}\n");
}

#[test]
fn test_specificity_on_demand() {
    let sheet = parse("#main .item > a:hover { color: red }");
    assert_eq!(sheet.iter_rules().next().map(|rule| rule.specificity_or_compute()), Some(121));
}

// ============================================================================
// WARNINGS
// ============================================================================

#[test]
fn test_warnings_are_positioned() {
    let sheet = parse("a { x: 1 }\nb { color red; y: 2 }\n@import \"late.css\";");
    assert_eq!(sheet.warnings.len(), 2);
    assert!(matches!(sheet.warnings[0].kind, WarningKind::MissingColon { .. }));
    assert_eq!(sheet.warnings[0].line, 2);
    assert_eq!(sheet.warnings[0].column, 5);
    assert_eq!(
        sheet.warnings[1].kind,
        WarningKind::LateImport { url: "late.css".into() }
    );
    assert_eq!(sheet.warnings[1].line, 3);
    assert_eq!(sheet.find_by_selector("b")[0].declarations.len(), 1);
}

// ============================================================================
// COLORS
// ============================================================================

#[test]
fn test_convert_colors_to_hex() {
    let mut sheet = parse("a { color: rgb(255, 0, 0); background: url(red.png) blue }");
    let rewritten = sheet.convert_colors(&ColorConversion::new(ColorFormat::Hex)).unwrap();
    assert_eq!(rewritten, 2);
    assert_eq!(sheet.to_css(), "a { color: #ff0000; background: url(red.png) #0000ff; }\n");
}

#[test]
fn test_convert_oklch_to_rgb() {
    let mut sheet = parse("a { color: oklch(50% 0.2 270) }");
    sheet.convert_colors(&ColorConversion::new(ColorFormat::Rgb)).unwrap();
    let value = &sheet.rules[0].as_rule().unwrap().declarations[0].value;
    assert!(value.starts_with("rgb("));

    let rgb = plume_color::parse_color(value).unwrap().rgb8();
    for (channel, expected) in rgb.into_iter().zip([58.79, 80.91, 210.70]) {
        assert!((f64::from(channel) - expected).abs() <= 1.0, "{value}");
    }
}

#[test]
fn test_convert_colors_unknown_format_name() {
    let err = ColorConversion::from_names("cmyk", "any", "auto").unwrap_err();
    assert!(err.to_string().contains("cmyk"));
}

// ============================================================================
// SERDE
// ============================================================================

#[cfg(feature = "serde")]
#[test]
fn test_serde_round_trip() {
    let sheet = parse(KITCHEN_SINK);
    let json = serde_json::to_string(&sheet).unwrap();
    let back: Stylesheet = serde_json::from_str(&json).unwrap();
    assert_eq!(back, sheet);
    assert_eq!(back.to_css(), sheet.to_css());
}
