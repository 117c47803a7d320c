//! `hwb()` notation (and the comma-separated `hwba()` alias).

use crate::ir::ColorIr;
use crate::number::{Arguments, format_alpha, format_number};
use crate::space;
use crate::{ColorError, ColorFormat};

pub(crate) fn parse(format: ColorFormat, content: &str) -> Result<ColorIr, ColorError> {
    let invalid = || ColorError::invalid(format, content.trim());
    let args = Arguments::split(content).ok_or_else(invalid)?;
    let [hue, whiteness, blackness] = args.three().ok_or_else(invalid)?;
    let alpha = args.alpha().map_err(|()| invalid())?;

    let hue = hue.hue().ok_or_else(invalid)?;
    let whiteness = (whiteness.scaled(100.0).ok_or_else(invalid)? / 100.0).clamp(0.0, 1.0);
    let blackness = (blackness.scaled(100.0).ok_or_else(invalid)? / 100.0).clamp(0.0, 1.0);

    Ok(ColorIr::from_srgb(hwb_to_srgb(hue, whiteness, blackness)).with_optional_alpha(alpha))
}

fn hwb_to_srgb(hue: f64, whiteness: f64, blackness: f64) -> [f64; 3] {
    let sum = whiteness + blackness;
    if sum >= 1.0 {
        // Achromatic: normalized whiteness is the gray level
        let gray = whiteness / sum;
        return [gray; 3];
    }

    let pure = space::hsl_to_srgb([hue, 1.0, 0.5]);
    pure.map(|c| c * (1.0 - whiteness - blackness) + whiteness)
}

/// Format as `hwb(h w% b%)`; legacy output uses commas and the `hwba` name
/// when alpha is written.
pub(crate) fn format(ir: &ColorIr, legacy: bool, force_alpha: bool) -> String {
    let srgb = ir.srgb();
    let max = srgb[0].max(srgb[1]).max(srgb[2]);
    let min = srgb[0].min(srgb[1]).min(srgb[2]);
    let whiteness = min;
    let blackness = 1.0 - max;

    let hue = if whiteness + blackness >= 1.0 - 1e-9 {
        0.0
    } else {
        space::srgb_to_hsl(srgb)[0]
    };

    let h = format_number(hue, 4);
    let w = format_number(whiteness * 100.0, 4);
    let b = format_number(blackness * 100.0, 4);
    let alpha = if force_alpha {
        Some(ir.alpha.unwrap_or(1.0))
    } else {
        ir.visible_alpha()
    };

    match (legacy, alpha) {
        (true, Some(alpha)) => format!("hwba({h}, {w}%, {b}%, {})", format_alpha(alpha)),
        (true, None) => format!("hwb({h}, {w}%, {b}%)"),
        (false, Some(alpha)) => format!("hwb({h} {w}% {b}% / {})", format_alpha(alpha)),
        (false, None) => format!("hwb({h} {w}% {b}%)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pure_hue() {
        assert_eq!(parse(ColorFormat::Hwb, "0 0% 0%").unwrap().rgb8(), [255, 0, 0]);
        assert_eq!(parse(ColorFormat::Hwb, "120 0% 50%").unwrap().rgb8(), [0, 128, 0]);
    }

    #[test]
    fn test_achromatic_normalizes() {
        let ir = parse(ColorFormat::Hwb, "0 60% 60%").unwrap();
        assert_eq!(ir.rgb8(), [128, 128, 128]);

        let out = format(&ir, false, false);
        assert!(out.starts_with("hwb(0 "), "{out}");
    }

    #[test]
    fn test_achromatic_ignores_hue() {
        let a = parse(ColorFormat::Hwb, "90 70% 30%").unwrap();
        let b = parse(ColorFormat::Hwb, "270 70% 30%").unwrap();
        assert_eq!(a.rgb8(), b.rgb8());
    }

    #[test]
    fn test_format_red() {
        let ir = ColorIr::from_rgb8(255, 0, 0);
        assert_eq!(format(&ir, false, false), "hwb(0 0% 0%)");
        assert_eq!(format(&ir.with_alpha(0.5), true, false), "hwba(0, 0%, 0%, 0.5)");
    }
}
