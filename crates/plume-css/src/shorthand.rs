//! Shorthand Properties
//!
//! Expansion of shorthands into longhands before the cascade merges rules,
//! and recreation of shorthands from complete longhand sets afterwards.
//!
//! Values that cannot be classified stay unexpanded. So do values holding
//! `var()` or a CSS-wide keyword, since their longhands are unknown until
//! computed-value time.

use crate::rules::Declaration;
use crate::scanner::{find_top_level, split_top_level_whitespace};

/// Every property `expand` understands, sorted for binary search
const SHORTHANDS: &[&str] = &[
    "background",
    "border",
    "border-bottom",
    "border-color",
    "border-left",
    "border-right",
    "border-style",
    "border-top",
    "border-width",
    "font",
    "list-style",
    "margin",
    "padding",
];

/// Four-side shorthands and their longhands in top/right/bottom/left order
const FOUR_SIDE: &[(&str, [&str; 4])] = &[
    ("margin", ["margin-top", "margin-right", "margin-bottom", "margin-left"]),
    ("padding", ["padding-top", "padding-right", "padding-bottom", "padding-left"]),
    (
        "border-width",
        ["border-top-width", "border-right-width", "border-bottom-width", "border-left-width"],
    ),
    (
        "border-style",
        ["border-top-style", "border-right-style", "border-bottom-style", "border-left-style"],
    ),
    (
        "border-color",
        ["border-top-color", "border-right-color", "border-bottom-color", "border-left-color"],
    ),
];

/// Per-side border shorthands: width, style, color
const BORDER_SIDES: &[(&str, [&str; 3])] = &[
    ("border-top", ["border-top-width", "border-top-style", "border-top-color"]),
    ("border-right", ["border-right-width", "border-right-style", "border-right-color"]),
    ("border-bottom", ["border-bottom-width", "border-bottom-style", "border-bottom-color"]),
    ("border-left", ["border-left-width", "border-left-style", "border-left-color"]),
];
const BORDER_DEFAULTS: [&str; 3] = ["medium", "none", "currentcolor"];

const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];
const BORDER_WIDTH_KEYWORDS: &[&str] = &["thin", "medium", "thick"];

const FONT_LONGHANDS: [&str; 6] = [
    "font-style",
    "font-variant",
    "font-weight",
    "font-size",
    "line-height",
    "font-family",
];
const FONT_SIZE_KEYWORDS: &[&str] = &[
    "xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large", "xxx-large", "larger",
    "smaller",
];

const BACKGROUND_LONGHANDS: [&str; 5] = [
    "background-color",
    "background-image",
    "background-repeat",
    "background-attachment",
    "background-position",
];
const BACKGROUND_DEFAULTS: [&str; 5] = ["transparent", "none", "repeat", "scroll", "0% 0%"];
const BACKGROUND_REPEATS: &[&str] = &["repeat", "repeat-x", "repeat-y", "no-repeat", "space", "round"];
const BACKGROUND_ATTACHMENTS: &[&str] = &["scroll", "fixed", "local"];
const POSITION_KEYWORDS: &[&str] = &["left", "right", "top", "bottom", "center"];

const LIST_STYLE_LONGHANDS: [&str; 3] = ["list-style-type", "list-style-position", "list-style-image"];
const LIST_STYLE_DEFAULTS: [&str; 3] = ["disc", "outside", "none"];

const CSS_WIDE_KEYWORDS: &[&str] = &["inherit", "initial", "unset", "revert", "revert-layer"];

/// Fast-path check before attempting expansion.
pub fn is_shorthand(property: &str) -> bool {
    SHORTHANDS.binary_search(&property).is_ok()
}

/// Expand a shorthand declaration into longhands.
///
/// Returns `None` for non-shorthands and for values that cannot be split.
pub fn expand(decl: &Declaration) -> Option<Vec<Declaration>> {
    if !is_shorthand(&decl.property) {
        return None;
    }
    let value = decl.value.trim();
    let lower = value.to_ascii_lowercase();
    if value.is_empty() || lower.contains("var(") || CSS_WIDE_KEYWORDS.contains(&lower.as_str()) {
        return None;
    }

    let pairs: Vec<(&str, String)> = match decl.property.as_str() {
        "border" => expand_border(value)?,
        "font" => expand_font(value)?,
        "background" => expand_background(value)?,
        "list-style" => expand_list_style(value)?,
        property => {
            if let Some((_, longhands)) = FOUR_SIDE.iter().find(|(name, _)| *name == property) {
                expand_four_sides(value, longhands)?
            } else {
                let (_, longhands) = BORDER_SIDES.iter().find(|(name, _)| *name == property)?;
                let [width, style, color] = classify_border(value)?;
                longhands.iter().copied().zip([width, style, color]).collect()
            }
        }
    };

    Some(
        pairs
            .into_iter()
            .map(|(property, value)| Declaration::new(property, value, decl.important))
            .collect(),
    )
}

/// Expand every shorthand in a declaration list, keeping order.
pub fn expand_all(declarations: &[Declaration]) -> Vec<Declaration> {
    let mut out = Vec::with_capacity(declarations.len());
    for decl in declarations {
        match expand(decl) {
            Some(longhands) => out.extend(longhands),
            None => out.push(decl.clone()),
        }
    }
    out
}

/// Per-side values for 1, 2, 3 or 4 tokens.
fn side_values(tokens: &[&str]) -> Option<[String; 4]> {
    let [top, right, bottom, left] = match *tokens {
        [all] => [all, all, all, all],
        [vertical, horizontal] => [vertical, horizontal, vertical, horizontal],
        [top, horizontal, bottom] => [top, horizontal, bottom, horizontal],
        [top, right, bottom, left] => [top, right, bottom, left],
        _ => return None,
    };
    Some([top, right, bottom, left].map(str::to_string))
}

/// Shortest four-side form: `a`, `a b`, `a b c` or `a b c d`.
pub fn compress_sides(values: [&str; 4]) -> String {
    let [top, right, bottom, left] = values;
    if top == right && right == bottom && bottom == left {
        top.to_string()
    } else if top == bottom && right == left {
        format!("{top} {right}")
    } else if right == left {
        format!("{top} {right} {bottom}")
    } else {
        format!("{top} {right} {bottom} {left}")
    }
}

fn expand_four_sides(value: &str, longhands: &[&'static str; 4]) -> Option<Vec<(&'static str, String)>> {
    let tokens = split_top_level_whitespace(value);
    let values = side_values(&tokens)?;
    Some(longhands.iter().copied().zip(values).collect())
}

fn is_numeric(token: &str) -> bool {
    let bytes = token.as_bytes();
    let start = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    matches!(bytes.get(start), Some(b) if b.is_ascii_digit() || *b == b'.')
}

fn is_math_function(lower: &str) -> bool {
    ["calc(", "min(", "max(", "clamp("]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// Classify border tokens into width, style and color, with initial values
/// for whatever is missing.
fn classify_border(value: &str) -> Option<[String; 3]> {
    let tokens = split_top_level_whitespace(value);
    if tokens.is_empty() || tokens.len() > 3 {
        return None;
    }

    let mut slots: [Option<String>; 3] = [None, None, None];
    for token in tokens {
        let lower = token.to_ascii_lowercase();
        let slot = if is_numeric(token)
            || is_math_function(&lower)
            || BORDER_WIDTH_KEYWORDS.contains(&lower.as_str())
        {
            0
        } else if BORDER_STYLES.contains(&lower.as_str()) {
            1
        } else {
            2
        };
        if slots[slot].replace(token.to_string()).is_some() {
            return None;
        }
    }

    let [width, style, color] = slots;
    Some([
        width.unwrap_or_else(|| BORDER_DEFAULTS[0].to_string()),
        style.unwrap_or_else(|| BORDER_DEFAULTS[1].to_string()),
        color.unwrap_or_else(|| BORDER_DEFAULTS[2].to_string()),
    ])
}

fn expand_border(value: &str) -> Option<Vec<(&'static str, String)>> {
    let values = classify_border(value)?;
    Some(
        BORDER_SIDES
            .iter()
            .flat_map(|(_, longhands)| longhands.iter().copied().zip(values.clone()))
            .collect(),
    )
}

fn is_font_weight(lower: &str) -> bool {
    matches!(lower, "bold" | "bolder" | "lighter")
        || (lower.bytes().all(|b| b.is_ascii_digit())
            && lower.parse::<u32>().is_ok_and(|weight| (1..=1000).contains(&weight)))
}

fn is_font_size(lower: &str) -> bool {
    is_numeric(lower) || is_math_function(lower) || FONT_SIZE_KEYWORDS.contains(&lower) || {
        let size = lower.split('/').next().unwrap_or(lower);
        FONT_SIZE_KEYWORDS.contains(&size)
    }
}

/// `[style] [variant] [weight] size[/line-height] family`
fn expand_font(value: &str) -> Option<Vec<(&'static str, String)>> {
    let tokens = split_top_level_whitespace(value);
    let mut style: Option<&str> = None;
    let mut variant: Option<&str> = None;
    let mut weight: Option<&str> = None;
    let mut index = 0;

    while index < tokens.len() {
        let token = tokens[index];
        let lower = token.to_ascii_lowercase();
        // Bare integers are weights; sizes always carry a unit
        if is_font_size(&lower) && !lower.bytes().all(|b| b.is_ascii_digit()) {
            break;
        }
        let slot = match lower.as_str() {
            "normal" => [&mut style, &mut variant, &mut weight]
                .into_iter()
                .find(|slot| slot.is_none())?,
            "italic" | "oblique" => &mut style,
            "small-caps" => &mut variant,
            _ if is_font_weight(&lower) => &mut weight,
            _ => return None,
        };
        if slot.replace(token).is_some() {
            return None;
        }
        index += 1;
    }

    let size_token = *tokens.get(index)?;
    index += 1;

    let (size, mut line_height) = match size_token.split_once('/') {
        Some((size, line_height)) => (size, (!line_height.is_empty()).then_some(line_height)),
        None => (size_token, None),
    };
    if line_height.is_none() {
        if size_token.ends_with('/') {
            line_height = tokens.get(index).copied();
            index += 1;
        } else if let Some(next) = tokens.get(index).and_then(|token| token.strip_prefix('/')) {
            if next.is_empty() {
                line_height = tokens.get(index + 1).copied();
                index += 2;
            } else {
                line_height = Some(next);
                index += 1;
            }
        }
    }

    if size.is_empty() || index > tokens.len() {
        return None;
    }
    let family = tokens[index..].join(" ");
    if family.is_empty() {
        return None;
    }

    let values = [
        style.unwrap_or("normal"),
        variant.unwrap_or("normal"),
        weight.unwrap_or("normal"),
        size,
        line_height.unwrap_or("normal"),
        family.as_str(),
    ];
    Some(
        FONT_LONGHANDS
            .iter()
            .copied()
            .zip(values.map(str::to_string))
            .collect(),
    )
}

fn is_image(lower: &str) -> bool {
    lower == "none" || lower.starts_with("url(") || lower.contains("gradient(") || lower.starts_with("image-set(")
}

fn expand_background(value: &str) -> Option<Vec<(&'static str, String)>> {
    // Multiple layers and background-size are not split
    let bytes = value.as_bytes();
    if find_top_level(bytes, 0, bytes.len(), b",/").is_some() {
        return None;
    }

    let mut color: Option<&str> = None;
    let mut image: Option<&str> = None;
    let mut repeat: Vec<&str> = Vec::new();
    let mut attachment: Option<&str> = None;
    let mut position: Vec<&str> = Vec::new();

    for token in split_top_level_whitespace(value) {
        let lower = token.to_ascii_lowercase();
        if is_image(&lower) {
            if image.replace(token).is_some() {
                return None;
            }
        } else if BACKGROUND_REPEATS.contains(&lower.as_str()) {
            repeat.push(token);
        } else if BACKGROUND_ATTACHMENTS.contains(&lower.as_str()) {
            if attachment.replace(token).is_some() {
                return None;
            }
        } else if POSITION_KEYWORDS.contains(&lower.as_str()) || is_numeric(token) || is_math_function(&lower) {
            position.push(token);
        } else if color.replace(token).is_some() {
            return None;
        }
    }

    if repeat.len() > 2 || position.len() > 4 {
        return None;
    }

    let repeat = repeat.join(" ");
    let position = position.join(" ");
    let values = [
        color.unwrap_or(BACKGROUND_DEFAULTS[0]),
        image.unwrap_or(BACKGROUND_DEFAULTS[1]),
        if repeat.is_empty() { BACKGROUND_DEFAULTS[2] } else { repeat.as_str() },
        attachment.unwrap_or(BACKGROUND_DEFAULTS[3]),
        if position.is_empty() { BACKGROUND_DEFAULTS[4] } else { position.as_str() },
    ];
    Some(
        BACKGROUND_LONGHANDS
            .iter()
            .copied()
            .zip(values.map(str::to_string))
            .collect(),
    )
}

fn expand_list_style(value: &str) -> Option<Vec<(&'static str, String)>> {
    let mut kind: Option<&str> = None;
    let mut position: Option<&str> = None;
    let mut image: Option<&str> = None;

    for token in split_top_level_whitespace(value) {
        let lower = token.to_ascii_lowercase();
        let slot = match lower.as_str() {
            "inside" | "outside" => &mut position,
            "none" if kind.is_none() => &mut kind,
            "none" => &mut image,
            _ if lower.starts_with("url(") || lower.contains("gradient(") => &mut image,
            _ => &mut kind,
        };
        if slot.replace(token).is_some() {
            return None;
        }
    }

    let values = [
        kind.unwrap_or(LIST_STYLE_DEFAULTS[0]),
        position.unwrap_or(LIST_STYLE_DEFAULTS[1]),
        image.unwrap_or(LIST_STYLE_DEFAULTS[2]),
    ];
    Some(
        LIST_STYLE_LONGHANDS
            .iter()
            .copied()
            .zip(values.map(str::to_string))
            .collect(),
    )
}

/// Declarations being folded back into shorthands
struct Slots {
    slots: Vec<Option<Declaration>>,
}

impl Slots {
    fn position(&self, property: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|decl| decl.property == property))
    }

    /// Positions of `properties` when every one is present with the same importance.
    fn complete(&self, properties: &[&str]) -> Option<(Vec<usize>, bool)> {
        let positions: Vec<usize> = properties
            .iter()
            .map(|property| self.position(property))
            .collect::<Option<_>>()?;
        let important = self.slots[positions[0]].as_ref()?.important;
        let uniform = positions
            .iter()
            .all(|&pos| self.slots[pos].as_ref().is_some_and(|decl| decl.important == important));
        uniform.then_some((positions, important))
    }

    fn value(&self, pos: usize) -> &str {
        self.slots[pos].as_ref().map_or("", |decl| decl.value.as_str())
    }

    /// Drop `positions` and put `decl` where the first of them was.
    fn replace(&mut self, positions: &[usize], decl: Declaration) {
        let first = positions.iter().copied().min().unwrap_or(0);
        for &pos in positions {
            self.slots[pos] = None;
        }
        tracing::trace!(property = %decl.property, value = %decl.value, "recreated shorthand");
        self.slots[first] = Some(decl);
    }
}

fn is_default(value: &str, default: &str) -> bool {
    value.eq_ignore_ascii_case(default)
}

/// Join the values that differ from their initial value, or `fallback`.
fn join_non_default(values: &[&str], defaults: &[&str], fallback: &str) -> String {
    let parts: Vec<&str> = values
        .iter()
        .zip(defaults)
        .filter(|(value, default)| !is_default(value, default))
        .map(|(value, _)| *value)
        .collect();
    if parts.is_empty() {
        fallback.to_string()
    } else {
        parts.join(" ")
    }
}

/// Fold complete longhand sets back into shorthands.
pub fn recreate(declarations: Vec<Declaration>) -> Vec<Declaration> {
    let mut slots = Slots {
        slots: declarations.into_iter().map(Some).collect(),
    };

    for (shorthand, longhands) in &FOUR_SIDE[..2] {
        recreate_four_sides(&mut slots, shorthand, longhands);
    }
    recreate_border(&mut slots);
    recreate_font(&mut slots);
    recreate_background(&mut slots);
    recreate_list_style(&mut slots);

    slots.slots.into_iter().flatten().collect()
}

fn recreate_four_sides(slots: &mut Slots, shorthand: &str, longhands: &[&str; 4]) -> bool {
    let Some((positions, important)) = slots.complete(longhands) else {
        return false;
    };
    let values = [0, 1, 2, 3].map(|side| slots.value(positions[side]));
    let value = compress_sides(values);
    slots.replace(&positions, Declaration::new(shorthand, value, important));
    true
}

/// `border`, else `border-width`/`-style`/`-color`, else per-side shorthands.
fn recreate_border(slots: &mut Slots) {
    let all: Vec<&str> = BORDER_SIDES
        .iter()
        .flat_map(|(_, longhands)| longhands.iter().copied())
        .collect();

    if let Some((positions, important)) = slots.complete(&all) {
        // positions are side-major: [top w, top s, top c, right w, ...]
        let uniform = (0..3).all(|attr| {
            let first = slots.value(positions[attr]);
            (1..4).all(|side| slots.value(positions[side * 3 + attr]) == first)
        });
        if uniform {
            let values = [0, 1, 2].map(|attr| slots.value(positions[attr]));
            let value = join_non_default(&values, &BORDER_DEFAULTS, "none");
            slots.replace(&positions, Declaration::new("border", value, important));
            return;
        }
    }

    for (shorthand, longhands) in &FOUR_SIDE[2..] {
        recreate_four_sides(slots, shorthand, longhands);
    }

    for (shorthand, longhands) in BORDER_SIDES {
        if let Some((positions, important)) = slots.complete(longhands) {
            let values = [0, 1, 2].map(|attr| slots.value(positions[attr]));
            let value = join_non_default(&values, &BORDER_DEFAULTS, "none");
            slots.replace(&positions, Declaration::new(*shorthand, value, important));
        }
    }
}

fn recreate_font(slots: &mut Slots) {
    let Some((required, important)) = slots.complete(&["font-size", "font-family"]) else {
        return;
    };

    let optional: Vec<Option<usize>> = ["font-style", "font-variant", "font-weight", "line-height"]
        .iter()
        .map(|property| slots.position(property))
        .collect();
    let consistent = optional
        .iter()
        .flatten()
        .all(|&pos| slots.slots[pos].as_ref().is_some_and(|decl| decl.important == important));
    if !consistent {
        return;
    }

    let whole_family = optional.iter().all(Option::is_some);
    let keep = |pos: usize| !whole_family || !is_default(slots.value(pos), "normal");

    let mut parts: Vec<String> = optional[..3]
        .iter()
        .flatten()
        .filter(|&&pos| keep(pos))
        .map(|&pos| slots.value(pos).to_string())
        .collect();

    let size = slots.value(required[0]);
    match optional[3] {
        Some(pos) if keep(pos) => parts.push(format!("{size}/{}", slots.value(pos))),
        _ => parts.push(size.to_string()),
    }
    parts.push(slots.value(required[1]).to_string());

    let mut positions = required;
    positions.extend(optional.into_iter().flatten());
    slots.replace(&positions, Declaration::new("font", parts.join(" "), important));
}

fn recreate_background(slots: &mut Slots) {
    let Some((positions, important)) = slots.complete(&BACKGROUND_LONGHANDS) else {
        return;
    };
    let values: Vec<&str> = positions.iter().map(|&pos| slots.value(pos)).collect();
    let value = join_non_default(&values, &BACKGROUND_DEFAULTS, "none");
    slots.replace(&positions, Declaration::new("background", value, important));
}

fn recreate_list_style(slots: &mut Slots) {
    let Some((positions, important)) = slots.complete(&LIST_STYLE_LONGHANDS) else {
        return;
    };
    let values: Vec<&str> = positions.iter().map(|&pos| slots.value(pos)).collect();
    let value = join_non_default(&values, &LIST_STYLE_DEFAULTS, LIST_STYLE_DEFAULTS[0]);
    slots.replace(&positions, Declaration::new("list-style", value, important));
}
