//! `rgb()` / `rgba()` notation.

use crate::ir::ColorIr;
use crate::number::{Arguments, Component, format_alpha};
use crate::space;
use crate::{ColorError, ColorFormat};

/// Parse the argument list of `rgb(...)` / `rgba(...)`.
///
/// Integer channels are clamped to 0..=255. When every channel is a
/// percentage the linear side channel is filled so later high-precision
/// formatting does not go through the 8-bit values.
pub(crate) fn parse(format: ColorFormat, content: &str) -> Result<ColorIr, ColorError> {
    let invalid = || ColorError::invalid(format, content.trim());
    let args = Arguments::split(content).ok_or_else(invalid)?;
    let channels = args.three().ok_or_else(invalid)?;
    let alpha = args.alpha().map_err(|()| invalid())?;

    let all_percent = channels
        .iter()
        .all(|channel| matches!(channel, Component::Percent(_)));

    let ir = if all_percent {
        parse_percentages(channels).ok_or_else(invalid)?
    } else {
        let mut rgb = [0u8; 3];
        for (slot, channel) in rgb.iter_mut().zip(channels) {
            let value = match channel {
                Component::Number(value) => value,
                Component::Percent(value) => value * 2.55,
                Component::Angle(_) => return Err(invalid()),
            };
            *slot = value.round().clamp(0.0, 255.0) as u8;
        }
        ColorIr::from_rgb8(rgb[0], rgb[1], rgb[2])
    };

    Ok(ir.with_optional_alpha(alpha))
}

fn parse_percentages(channels: [Component; 3]) -> Option<ColorIr> {
    let mut srgb = [0.0; 3];
    for (slot, channel) in srgb.iter_mut().zip(channels) {
        *slot = channel.scaled(1.0)?.clamp(0.0, 1.0);
    }
    Some(ColorIr::from_linear(srgb.map(space::srgb_to_linear)))
}

/// Format as `rgb(r g b)`, `rgb(r g b / a)`, `rgb(r, g, b)` or `rgba(r, g, b, a)`.
///
/// `force_alpha` writes the alpha even when opaque (the `rgba` target).
pub(crate) fn format(ir: &ColorIr, legacy: bool, force_alpha: bool) -> String {
    let alpha = if force_alpha {
        Some(ir.alpha.unwrap_or(1.0))
    } else {
        ir.visible_alpha()
    };
    let [r, g, b] = ir.rgb8();

    match (legacy, alpha) {
        (true, Some(alpha)) => format!("rgba({r}, {g}, {b}, {})", format_alpha(alpha)),
        (true, None) => format!("rgb({r}, {g}, {b})"),
        (false, Some(alpha)) => format!("rgb({r} {g} {b} / {})", format_alpha(alpha)),
        (false, None) => format!("rgb({r} {g} {b})"),
    }
}
