//! `oklab()` and `oklch()` notation.

use crate::ir::ColorIr;
use crate::number::{Arguments, format_alpha, format_number};
use crate::space;
use crate::{ColorError, ColorFormat};

/// Percentage reference for a/b and chroma: 100% = 0.4
const PERCENT_SCALE: f64 = 0.4;
/// At or below this chroma the hue is powerless
const POWERLESS_CHROMA: f64 = 0.000004;

pub(crate) fn parse_oklab(content: &str) -> Result<ColorIr, ColorError> {
    let invalid = || ColorError::invalid(ColorFormat::Oklab, content.trim());
    let args = Arguments::split(content).ok_or_else(invalid)?;
    let [l, a, b] = args.three().ok_or_else(invalid)?;
    let alpha = args.alpha().map_err(|()| invalid())?;

    let l = l.scaled(1.0).ok_or_else(invalid)?.clamp(0.0, 1.0);
    let a = a.scaled(PERCENT_SCALE).ok_or_else(invalid)?;
    let b = b.scaled(PERCENT_SCALE).ok_or_else(invalid)?;

    let linear = space::oklab_to_linear_srgb([l, a, b]);
    Ok(ColorIr::from_linear(linear).with_optional_alpha(alpha))
}

pub(crate) fn parse_oklch(content: &str) -> Result<ColorIr, ColorError> {
    let invalid = || ColorError::invalid(ColorFormat::Oklch, content.trim());
    let args = Arguments::split(content).ok_or_else(invalid)?;
    let [l, c, h] = args.three().ok_or_else(invalid)?;
    let alpha = args.alpha().map_err(|()| invalid())?;

    let l = l.scaled(1.0).ok_or_else(invalid)?.clamp(0.0, 1.0);
    let chroma = c.scaled(PERCENT_SCALE).ok_or_else(invalid)?.max(0.0);
    let hue = h.hue().ok_or_else(invalid)?;

    let (a, b) = space::from_polar(chroma, hue);
    let linear = space::oklab_to_linear_srgb([l, a, b]);
    Ok(ColorIr::from_linear(linear).with_optional_alpha(alpha))
}

fn alpha_suffix(ir: &ColorIr) -> String {
    match ir.visible_alpha() {
        Some(alpha) => format!(" / {}", format_alpha(alpha)),
        None => String::new(),
    }
}

pub(crate) fn format_oklab(ir: &ColorIr) -> String {
    let [l, a, b] = space::linear_srgb_to_oklab(ir.linear_rgb());
    format!(
        "oklab({} {} {}{})",
        format_number(l, 4),
        format_number(a, 4),
        format_number(b, 4),
        alpha_suffix(ir)
    )
}

pub(crate) fn format_oklch(ir: &ColorIr) -> String {
    let [l, a, b] = space::linear_srgb_to_oklab(ir.linear_rgb());
    let (chroma, hue) = space::to_polar(a, b);
    let hue = if chroma <= POWERLESS_CHROMA { 0.0 } else { hue };
    format!(
        "oklch({} {} {}{})",
        format_number(l, 4),
        format_number(chroma, 4),
        format_number(hue, 4),
        alpha_suffix(ir)
    )
}
