//! Plume Color Conversion
//!
//! Converts CSS color literals between notations through a shared
//! intermediate representation ([`ColorIr`]).
//!
//! Supported notations: hex, rgb/rgba, hsl/hsla, hwb, lab, lch, oklab,
//! oklch and the CSS named colors. High-precision sources (lab, lch, oklab,
//! oklch, percentage rgb) carry linear RGB alongside the 8-bit channels so
//! chaining them does not quantize twice.
//!
//! # Example
//! ```
//! use plume_color::{ColorConversion, ColorFormat};
//!
//! let conversion = ColorConversion::new(ColorFormat::Hex);
//! let value = conversion.convert("1px solid rgb(255, 0, 0)").unwrap();
//! assert_eq!(value, "1px solid #ff0000");
//! ```

mod convert;
mod hex;
mod hsl;
mod hwb;
pub mod ir;
mod lab;
pub mod named;
mod number;
mod oklab;
mod rgb;
mod space;

use std::fmt;
use std::str::FromStr;

pub use convert::{ColorConversion, format_color, parse_color};
pub use ir::ColorIr;

/// Target or source notation of a color literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorFormat {
    Hex,
    Rgb,
    /// Legacy alias of `rgb`, always written with commas and alpha
    Rgba,
    Hsl,
    /// Legacy alias of `hsl`
    Hsla,
    Hwb,
    /// Legacy alias of `hwb`
    Hwba,
    Lab,
    Lch,
    Oklab,
    Oklch,
    Named,
}

impl ColorFormat {
    /// All formats, in the order they are documented.
    pub const ALL: [ColorFormat; 12] = [
        Self::Hex,
        Self::Rgb,
        Self::Rgba,
        Self::Hsl,
        Self::Hsla,
        Self::Hwb,
        Self::Hwba,
        Self::Lab,
        Self::Lch,
        Self::Oklab,
        Self::Oklch,
        Self::Named,
    ];

    /// Symbol name as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Hex => "hex",
            Self::Rgb => "rgb",
            Self::Rgba => "rgba",
            Self::Hsl => "hsl",
            Self::Hsla => "hsla",
            Self::Hwb => "hwb",
            Self::Hwba => "hwba",
            Self::Lab => "lab",
            Self::Lch => "lch",
            Self::Oklab => "oklab",
            Self::Oklch => "oklch",
            Self::Named => "named",
        }
    }

    /// Whether the symbol is a legacy alias (`rgba`, `hsla`, `hwba`).
    pub fn is_legacy_alias(self) -> bool {
        matches!(self, Self::Rgba | Self::Hsla | Self::Hwba)
    }

    /// Collapse legacy aliases onto their base notation.
    pub fn family(self) -> ColorFormat {
        match self {
            Self::Rgba => Self::Rgb,
            Self::Hsla => Self::Hsl,
            Self::Hwba => Self::Hwb,
            other => other,
        }
    }

    /// Map a CSS function name (`rgb`, `hsla`, ...) to its format.
    pub fn from_function_name(name: &str) -> Option<Self> {
        let format = match name.to_ascii_lowercase().as_str() {
            "rgb" => Self::Rgb,
            "rgba" => Self::Rgba,
            "hsl" => Self::Hsl,
            "hsla" => Self::Hsla,
            "hwb" => Self::Hwb,
            "hwba" => Self::Hwba,
            "lab" => Self::Lab,
            "lch" => Self::Lch,
            "oklab" => Self::Oklab,
            "oklch" => Self::Oklch,
            _ => return None,
        };
        Some(format)
    }
}

impl fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorFormat {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches(':');
        Self::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ColorError::UnknownFormat(s.to_string()))
    }
}

/// Which literals a conversion is allowed to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFormat {
    /// Every recognized notation
    #[default]
    Any,
    /// Only literals of this notation (aliases included)
    Only(ColorFormat),
}

impl SourceFormat {
    /// Whether a literal detected as `format` may be converted.
    pub fn accepts(self, format: ColorFormat) -> bool {
        match self {
            Self::Any => true,
            Self::Only(wanted) => wanted.family() == format.family(),
        }
    }
}

impl FromStr for SourceFormat {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches(':');
        if name.eq_ignore_ascii_case("any") {
            return Ok(Self::Any);
        }
        ColorFormat::from_str(s).map(Self::Only)
    }
}

/// Output syntax flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Legacy when the target is an alias (`rgba`, `hsla`, `hwba`), modern otherwise
    #[default]
    Auto,
    /// Comma-separated arguments: `rgb(255, 0, 0)`
    Legacy,
    /// Space-separated arguments with slash alpha: `rgb(255 0 0 / 0.5)`
    Modern,
}

impl Variant {
    /// Resolve `Auto` against the requested target.
    pub fn is_legacy_for(self, target: ColorFormat) -> bool {
        match self {
            Self::Auto => target.is_legacy_alias(),
            Self::Legacy => true,
            Self::Modern => false,
        }
    }
}

impl FromStr for Variant {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches(':').to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "legacy" => Ok(Self::Legacy),
            "modern" => Ok(Self::Modern),
            _ => Err(ColorError::UnknownVariant(s.to_string())),
        }
    }
}

/// Color conversion error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ColorError {
    #[error("Unsupported color format: {0}")]
    UnknownFormat(String),

    #[error("Unsupported color syntax variant: {0}")]
    UnknownVariant(String),

    #[error("Invalid {format} color: {text}")]
    InvalidColor { format: ColorFormat, text: String },
}

impl ColorError {
    pub(crate) fn invalid(format: ColorFormat, text: impl Into<String>) -> Self {
        Self::InvalidColor {
            format,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names_round_trip() {
        for format in ColorFormat::ALL {
            assert_eq!(format.name().parse::<ColorFormat>().unwrap(), format);
        }
        assert_eq!(":rgba".parse::<ColorFormat>().unwrap(), ColorFormat::Rgba);
    }

    #[test]
    fn test_unknown_format_names_symbol() {
        let err = "cmyk".parse::<ColorFormat>().unwrap_err();
        assert_eq!(err, ColorError::UnknownFormat("cmyk".to_string()));
        assert!(err.to_string().contains("cmyk"));
    }

    #[test]
    fn test_source_accepts_aliases() {
        let source: SourceFormat = "rgb".parse().unwrap();
        assert!(source.accepts(ColorFormat::Rgba));
        assert!(!source.accepts(ColorFormat::Hex));
        assert!(SourceFormat::Any.accepts(ColorFormat::Oklch));
    }

    #[test]
    fn test_variant_auto() {
        assert!(Variant::Auto.is_legacy_for(ColorFormat::Hsla));
        assert!(!Variant::Auto.is_legacy_for(ColorFormat::Hsl));
        assert!(Variant::Legacy.is_legacy_for(ColorFormat::Rgb));
    }
}
