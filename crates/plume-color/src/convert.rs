//! Value Rewriting
//!
//! Scans a CSS value string and rewrites every recognized color literal
//! into the target notation. Everything else is copied through unchanged:
//! `url(...)` bodies, quoted strings, unknown identifiers and functions, and
//! color functions whose arguments cannot be resolved statically
//! (`calc()`, `var()`, `none`, relative `from` syntax, ...).

use crate::ir::ColorIr;
use crate::{ColorError, ColorFormat, SourceFormat, Variant};
use crate::{hex, hsl, hwb, lab, named, oklab, rgb};

/// A configured color conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorConversion {
    /// Output notation
    pub to: ColorFormat,
    /// Which literals are touched
    pub from: SourceFormat,
    /// Legacy or modern output syntax
    pub variant: Variant,
}

impl ColorConversion {
    pub fn new(to: ColorFormat) -> Self {
        Self {
            to,
            from: SourceFormat::Any,
            variant: Variant::Auto,
        }
    }

    /// Build a conversion from symbol names (`"hex"`, `":rgb"`, `"any"`, `"legacy"`).
    pub fn from_names(to: &str, from: &str, variant: &str) -> Result<Self, ColorError> {
        Ok(Self {
            to: to.parse()?,
            from: from.parse()?,
            variant: variant.parse()?,
        })
    }

    pub fn with_source(mut self, from: SourceFormat) -> Self {
        self.from = from;
        self
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Rewrite every accepted color literal in `value`.
    ///
    /// Returns the input unchanged when it holds no convertible literal. A
    /// color function with static arguments that fail to parse is an error.
    pub fn convert(&self, value: &str) -> Result<String, ColorError> {
        let bytes = value.as_bytes();
        let mut out = String::with_capacity(value.len());
        let mut last = 0;
        let mut pos = 0;
        let mut rewritten = 0usize;

        while pos < bytes.len() {
            let c = bytes[pos];

            if c == b'"' || c == b'\'' {
                pos = skip_string(bytes, pos);
                continue;
            }

            if c == b'#' && (pos == 0 || !is_word_byte(bytes[pos - 1])) {
                let start = pos + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end].is_ascii_hexdigit() {
                    end += 1;
                }
                let boundary = end >= bytes.len() || !is_word_byte(bytes[end]);
                if boundary
                    && matches!(end - start, 3 | 4 | 6 | 8)
                    && self.from.accepts(ColorFormat::Hex)
                {
                    let ir = hex::parse(&value[pos..end])?;
                    out.push_str(&value[last..pos]);
                    out.push_str(&format_color(&ir, self.to, self.variant));
                    rewritten += 1;
                    last = end;
                }
                pos = end.max(pos + 1);
                continue;
            }

            if is_ident_start(bytes, pos) && (pos == 0 || !is_word_byte(bytes[pos - 1])) {
                let start = pos;
                let mut end = pos;
                while end < bytes.len() && is_word_byte(bytes[end]) {
                    end += 1;
                }
                let name = &value[start..end];

                if bytes.get(end) == Some(&b'(') {
                    let Some(close) = find_closing_paren(bytes, end) else {
                        tracing::trace!(function = name, "unterminated function, copied as written");
                        break;
                    };

                    if name.eq_ignore_ascii_case("url") {
                        pos = close;
                        continue;
                    }

                    if let Some(format) = ColorFormat::from_function_name(name) {
                        let content = &value[end + 1..close - 1];
                        if is_dynamic(content) || !self.from.accepts(format) {
                            tracing::trace!(function = name, "leaving color function as written");
                            pos = close;
                            continue;
                        }
                        let ir = parse_function(format, content)?;
                        out.push_str(&value[last..start]);
                        out.push_str(&format_color(&ir, self.to, self.variant));
                        rewritten += 1;
                        last = close;
                        pos = close;
                        continue;
                    }

                    // Unknown function: keep scanning its arguments
                    pos = end + 1;
                    continue;
                }

                if self.from.accepts(ColorFormat::Named) {
                    if let Some(ir) = named::lookup(name) {
                        out.push_str(&value[last..start]);
                        out.push_str(&format_color(&ir, self.to, self.variant));
                        rewritten += 1;
                        last = end;
                    }
                }
                pos = end;
                continue;
            }

            pos += 1;
        }

        out.push_str(&value[last..]);
        if rewritten > 0 {
            tracing::trace!(count = rewritten, to = %self.to, "rewrote color literals");
        }
        Ok(out)
    }
}

/// Parse a single color literal: `#hex`, `fn(...)` or a named color.
pub fn parse_color(text: &str) -> Result<ColorIr, ColorError> {
    let text = text.trim();

    if text.starts_with('#') {
        return hex::parse(text);
    }

    if let Some(open) = text.find('(') {
        let name = &text[..open];
        let format = ColorFormat::from_function_name(name)
            .ok_or_else(|| ColorError::UnknownFormat(name.to_string()))?;
        let content = text[open + 1..]
            .strip_suffix(')')
            .ok_or_else(|| ColorError::invalid(format, text))?;
        return parse_function(format, content);
    }

    named::lookup(text).ok_or_else(|| ColorError::invalid(ColorFormat::Named, text))
}

/// Format an IR value in the requested notation.
pub fn format_color(ir: &ColorIr, to: ColorFormat, variant: Variant) -> String {
    let legacy = variant.is_legacy_for(to);
    match to {
        ColorFormat::Hex => hex::format(ir),
        ColorFormat::Rgb => rgb::format(ir, legacy, false),
        ColorFormat::Rgba => rgb::format(ir, legacy, legacy),
        ColorFormat::Hsl => hsl::format(ir, legacy, false),
        ColorFormat::Hsla => hsl::format(ir, legacy, legacy),
        ColorFormat::Hwb | ColorFormat::Hwba => hwb::format(ir, legacy, false),
        ColorFormat::Lab => lab::format_lab(ir),
        ColorFormat::Lch => lab::format_lch(ir),
        ColorFormat::Oklab => oklab::format_oklab(ir),
        ColorFormat::Oklch => oklab::format_oklch(ir),
        ColorFormat::Named => named::format(ir).unwrap_or_else(|| hex::format(ir)),
    }
}

fn parse_function(format: ColorFormat, content: &str) -> Result<ColorIr, ColorError> {
    match format {
        ColorFormat::Rgb | ColorFormat::Rgba => rgb::parse(format, content),
        ColorFormat::Hsl | ColorFormat::Hsla => hsl::parse(format, content),
        ColorFormat::Hwb | ColorFormat::Hwba => hwb::parse(format, content),
        ColorFormat::Lab => lab::parse_lab(content),
        ColorFormat::Lch => lab::parse_lch(content),
        ColorFormat::Oklab => oklab::parse_oklab(content),
        ColorFormat::Oklch => oklab::parse_oklch(content),
        ColorFormat::Hex | ColorFormat::Named => Err(ColorError::invalid(format, content)),
    }
}

/// Arguments that only resolve at computed-value time.
fn is_dynamic(content: &str) -> bool {
    let lower = content.to_ascii_lowercase();
    if lower.trim_start().starts_with("from ") {
        return true;
    }
    if ["calc(", "min(", "max(", "clamp(", "var("]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        return true;
    }
    lower
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .any(|word| matches!(word, "none" | "infinity" | "-infinity" | "nan"))
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b >= 0x80
}

fn is_ident_start(bytes: &[u8], pos: usize) -> bool {
    match bytes[pos] {
        b if b.is_ascii_alphabetic() => true,
        b'-' => bytes.get(pos + 1).is_some_and(|b| b.is_ascii_alphabetic() || *b == b'-'),
        _ => false,
    }
}

/// Position just past the closing quote (or the end of input).
fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b if b == quote => return pos + 1,
            _ => pos += 1,
        }
    }
    bytes.len()
}

/// Position just past the `)` matching the `(` at `open`, `None` when unbalanced.
fn find_closing_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut pos = open;
    while pos < bytes.len() {
        match bytes[pos] {
            b'"' | b'\'' => {
                pos = skip_string(bytes, pos);
                continue;
            }
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos + 1);
                }
            }
            _ => {}
        }
        pos += 1;
    }
    None
}
