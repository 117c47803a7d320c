//! Numeric Components
//!
//! Tokenizes color function arguments and parses the numbers inside them:
//! optional sign, optional fraction, optional exponent, and a `%` or angle
//! unit suffix.

use crate::space::normalize_hue;

/// A single numeric argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Component {
    Number(f64),
    Percent(f64),
    /// Angle already converted to degrees
    Angle(f64),
}

impl Component {
    /// Parse `12`, `-0.5`, `+.25`, `50%`, `1e2`, `90deg`, `0.5turn`, ...
    pub(crate) fn parse(token: &str) -> Option<Self> {
        let bytes = token.as_bytes();
        let mut pos = 0;

        if matches!(bytes.first(), Some(b'+' | b'-')) {
            pos += 1;
        }

        let digits_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        let mut digit_count = pos - digits_start;

        if pos < bytes.len() && bytes[pos] == b'.' {
            pos += 1;
            let fraction_start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            digit_count += pos - fraction_start;
        }

        if digit_count == 0 {
            return None;
        }

        // Exponent only when digits follow, so `1em`-like suffixes stay units
        if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
            let mut probe = pos + 1;
            if matches!(bytes.get(probe), Some(b'+' | b'-')) {
                probe += 1;
            }
            if bytes.get(probe).is_some_and(u8::is_ascii_digit) {
                pos = probe;
                while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                    pos += 1;
                }
            }
        }

        let value: f64 = token[..pos].parse().ok()?;
        if !value.is_finite() {
            return None;
        }

        let unit = &token[pos..];
        let component = if unit.is_empty() {
            Self::Number(value)
        } else if unit == "%" {
            Self::Percent(value)
        } else if unit.eq_ignore_ascii_case("deg") {
            Self::Angle(value)
        } else if unit.eq_ignore_ascii_case("rad") {
            Self::Angle(value.to_degrees())
        } else if unit.eq_ignore_ascii_case("grad") {
            Self::Angle(value * 0.9)
        } else if unit.eq_ignore_ascii_case("turn") {
            Self::Angle(value * 360.0)
        } else {
            return None;
        };
        Some(component)
    }

    /// Number as-is, percentage scaled so that 100% equals `scale`.
    pub(crate) fn scaled(self, scale: f64) -> Option<f64> {
        match self {
            Self::Number(value) => Some(value),
            Self::Percent(value) => Some(value / 100.0 * scale),
            Self::Angle(_) => None,
        }
    }

    /// Hue in degrees, normalized into [0, 360).
    pub(crate) fn hue(self) -> Option<f64> {
        match self {
            Self::Number(value) | Self::Angle(value) => Some(normalize_hue(value)),
            Self::Percent(_) => None,
        }
    }

    /// Alpha as 0..1 from a number or a percentage.
    pub(crate) fn alpha(self) -> Option<f64> {
        self.scaled(1.0).map(|alpha| alpha.clamp(0.0, 1.0))
    }
}

/// Arguments of a color function, split into channels and alpha.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Arguments<'a> {
    pub channels: Vec<&'a str>,
    pub alpha: Option<&'a str>,
    /// Comma-separated (legacy) syntax
    pub legacy: bool,
}

impl<'a> Arguments<'a> {
    /// Split `255, 0, 0, 0.5`, `255 0 0 / 50%` or `255 0 0`.
    pub(crate) fn split(content: &'a str) -> Option<Self> {
        let content = content.trim();

        if let Some((channels, alpha)) = content.split_once('/') {
            let channels: Vec<&str> = channels
                .split(|c: char| c == ',' || c.is_ascii_whitespace())
                .filter(|token| !token.is_empty())
                .collect();
            let alpha = alpha.trim();
            if alpha.is_empty() || alpha.contains('/') {
                return None;
            }
            return Some(Self {
                channels,
                alpha: Some(alpha),
                legacy: false,
            });
        }

        if content.contains(',') {
            let mut parts: Vec<&str> = content.split(',').map(str::trim).collect();
            if parts.iter().any(|part| part.is_empty()) {
                return None;
            }
            let alpha = if parts.len() == 4 { parts.pop() } else { None };
            return Some(Self {
                channels: parts,
                alpha,
                legacy: true,
            });
        }

        Some(Self {
            channels: content.split_ascii_whitespace().collect(),
            alpha: None,
            legacy: false,
        })
    }

    /// Parse exactly three channel components.
    pub(crate) fn three(&self) -> Option<[Component; 3]> {
        if self.channels.len() != 3 {
            return None;
        }
        Some([
            Component::parse(self.channels[0])?,
            Component::parse(self.channels[1])?,
            Component::parse(self.channels[2])?,
        ])
    }

    /// Parse the alpha component when one was given.
    pub(crate) fn alpha(&self) -> Result<Option<f64>, ()> {
        match self.alpha {
            Some(token) => Component::parse(token).and_then(Component::alpha).map(Some).ok_or(()),
            None => Ok(None),
        }
    }
}

/// Fixed-precision output with trailing zeros trimmed: `50`, `0.5`, `33.3333`.
pub(crate) fn format_number(value: f64, decimals: usize) -> String {
    let text = format!("{value:.decimals$}");
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };
    if text == "-0" { "0".to_string() } else { text }
}

/// Alpha suffix precision.
pub(crate) fn format_alpha(alpha: f64) -> String {
    format_number(alpha, 4)
}
