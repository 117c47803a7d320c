//! `hsl()` / `hsla()` notation.

use crate::ir::ColorIr;
use crate::number::{Arguments, format_alpha, format_number};
use crate::space;
use crate::{ColorError, ColorFormat};

pub(crate) fn parse(format: ColorFormat, content: &str) -> Result<ColorIr, ColorError> {
    let invalid = || ColorError::invalid(format, content.trim());
    let args = Arguments::split(content).ok_or_else(invalid)?;
    let [hue, saturation, lightness] = args.three().ok_or_else(invalid)?;
    let alpha = args.alpha().map_err(|()| invalid())?;

    let hue = hue.hue().ok_or_else(invalid)?;
    // Bare numbers are accepted as percentages (modern syntax)
    let saturation = saturation.scaled(100.0).ok_or_else(invalid)? / 100.0;
    let lightness = lightness.scaled(100.0).ok_or_else(invalid)? / 100.0;

    let srgb = space::hsl_to_srgb([hue, saturation.clamp(0.0, 1.0), lightness.clamp(0.0, 1.0)]);
    Ok(ColorIr::from_srgb(srgb).with_optional_alpha(alpha))
}

/// Format as `hsl(h s% l%)`, `hsl(h, s%, l%)` or `hsla(h, s%, l%, a)`.
pub(crate) fn format(ir: &ColorIr, legacy: bool, force_alpha: bool) -> String {
    let [hue, saturation, lightness] = space::srgb_to_hsl(ir.srgb());
    let hue = if saturation <= 0.0 { 0.0 } else { hue };

    let h = format_number(hue, 4);
    let s = format_number(saturation * 100.0, 4);
    let l = format_number(lightness * 100.0, 4);
    let alpha = if force_alpha {
        Some(ir.alpha.unwrap_or(1.0))
    } else {
        ir.visible_alpha()
    };

    match (legacy, alpha) {
        (true, Some(alpha)) => format!("hsla({h}, {s}%, {l}%, {})", format_alpha(alpha)),
        (true, None) => format!("hsl({h}, {s}%, {l}%)"),
        (false, Some(alpha)) => format!("hsl({h} {s}% {l}% / {})", format_alpha(alpha)),
        (false, None) => format!("hsl({h} {s}% {l}%)"),
    }
}
