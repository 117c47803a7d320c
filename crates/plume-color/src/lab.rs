//! CIE `lab()` and `lch()` notation (D50 white point).

use crate::ir::ColorIr;
use crate::number::{Arguments, format_alpha, format_number};
use crate::space;
use crate::{ColorError, ColorFormat};

/// Percentage reference for a/b: 100% = 125
const AB_PERCENT_SCALE: f64 = 125.0;
/// Percentage reference for LCH chroma: 100% = 150
const CHROMA_PERCENT_SCALE: f64 = 150.0;
/// At or below this chroma the hue is powerless
const POWERLESS_CHROMA: f64 = 0.0015;

pub(crate) fn parse_lab(content: &str) -> Result<ColorIr, ColorError> {
    let invalid = || ColorError::invalid(ColorFormat::Lab, content.trim());
    let args = Arguments::split(content).ok_or_else(invalid)?;
    let [l, a, b] = args.three().ok_or_else(invalid)?;
    let alpha = args.alpha().map_err(|()| invalid())?;

    let l = l.scaled(100.0).ok_or_else(invalid)?.clamp(0.0, 100.0);
    let a = a.scaled(AB_PERCENT_SCALE).ok_or_else(invalid)?;
    let b = b.scaled(AB_PERCENT_SCALE).ok_or_else(invalid)?;

    let linear = space::lab_to_linear_srgb([l, a, b]);
    Ok(ColorIr::from_linear(linear).with_optional_alpha(alpha))
}

pub(crate) fn parse_lch(content: &str) -> Result<ColorIr, ColorError> {
    let invalid = || ColorError::invalid(ColorFormat::Lch, content.trim());
    let args = Arguments::split(content).ok_or_else(invalid)?;
    let [l, c, h] = args.three().ok_or_else(invalid)?;
    let alpha = args.alpha().map_err(|()| invalid())?;

    let l = l.scaled(100.0).ok_or_else(invalid)?.clamp(0.0, 100.0);
    let chroma = c.scaled(CHROMA_PERCENT_SCALE).ok_or_else(invalid)?.max(0.0);
    let hue = h.hue().ok_or_else(invalid)?;

    let (a, b) = space::from_polar(chroma, hue);
    let linear = space::lab_to_linear_srgb([l, a, b]);
    Ok(ColorIr::from_linear(linear).with_optional_alpha(alpha))
}

fn alpha_suffix(ir: &ColorIr) -> String {
    match ir.visible_alpha() {
        Some(alpha) => format!(" / {}", format_alpha(alpha)),
        None => String::new(),
    }
}

/// `lab(L a b)`, reading the linear channel when present.
pub(crate) fn format_lab(ir: &ColorIr) -> String {
    let [l, a, b] = space::linear_srgb_to_lab(ir.linear_rgb());
    format!(
        "lab({} {} {}{})",
        format_number(l, 4),
        format_number(a, 4),
        format_number(b, 4),
        alpha_suffix(ir)
    )
}

/// `lch(L C H)`; hue is reported as 0 when chroma is powerless.
pub(crate) fn format_lch(ir: &ColorIr) -> String {
    let [l, a, b] = space::linear_srgb_to_lab(ir.linear_rgb());
    let (chroma, hue) = space::to_polar(a, b);
    let hue = if chroma <= POWERLESS_CHROMA { 0.0 } else { hue };
    format!(
        "lch({} {} {}{})",
        format_number(l, 4),
        format_number(chroma, 4),
        format_number(hue, 4),
        alpha_suffix(ir)
    )
}
