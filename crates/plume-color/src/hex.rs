//! Hex notation: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.

use crate::ir::ColorIr;
use crate::{ColorError, ColorFormat};

/// Parse a hex literal, with or without the leading `#`.
pub(crate) fn parse(text: &str) -> Result<ColorIr, ColorError> {
    let digits = text.strip_prefix('#').unwrap_or(text);
    let invalid = || ColorError::invalid(ColorFormat::Hex, text);

    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let nibble = |index: usize| -> Result<u8, ColorError> {
        u8::from_str_radix(&digits[index..index + 1], 16)
            .map(|value| value * 17)
            .map_err(|_| invalid())
    };
    let byte = |index: usize| -> Result<u8, ColorError> {
        u8::from_str_radix(&digits[index..index + 2], 16).map_err(|_| invalid())
    };

    match digits.len() {
        3 => Ok(ColorIr::from_rgb8(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Ok(ColorIr::from_rgb8(nibble(0)?, nibble(1)?, nibble(2)?)
            .with_alpha(f64::from(nibble(3)?) / 255.0)),
        6 => Ok(ColorIr::from_rgb8(byte(0)?, byte(2)?, byte(4)?)),
        8 => Ok(ColorIr::from_rgb8(byte(0)?, byte(2)?, byte(4)?)
            .with_alpha(f64::from(byte(6)?) / 255.0)),
        _ => Err(invalid()),
    }
}

/// Lowercase `#rrggbb`, or `#rrggbbaa` when alpha is below 1.
pub(crate) fn format(ir: &ColorIr) -> String {
    let mut out = format!("#{:02x}{:02x}{:02x}", ir.red, ir.green, ir.blue);
    if let Some(alpha) = ir.visible_alpha() {
        let alpha = (alpha * 255.0).round() as u8;
        out.push_str(&format!("{alpha:02x}"));
    }
    out
}
