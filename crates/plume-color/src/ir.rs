//! Intermediate Color Representation
//!
//! Every notation parses into a [`ColorIr`] and every formatter reads from
//! one. The 8-bit channels are always populated; `linear` is only set by
//! high-precision sources and is preferred by formatters when present.

use crate::space;

/// sRGB color with optional alpha and optional linear-light side channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorIr {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// Alpha in 0.0..=1.0, `None` when the source had no alpha component
    pub alpha: Option<f64>,
    /// Linear sRGB channels (0.0..=1.0 nominal), unquantized
    pub linear: Option<[f64; 3]>,
}

impl ColorIr {
    /// Opaque color from 8-bit channels.
    pub fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: None,
            linear: None,
        }
    }

    /// Color from gamma-encoded sRGB floats (0..1). No linear channel is kept.
    pub fn from_srgb(rgb: [f64; 3]) -> Self {
        let [red, green, blue] = rgb.map(space::quantize);
        Self::from_rgb8(red, green, blue)
    }

    /// Color from linear-light sRGB floats, keeping them for later formatting.
    pub fn from_linear(linear: [f64; 3]) -> Self {
        let [red, green, blue] = linear.map(|c| space::quantize(space::linear_to_srgb(c)));
        Self {
            red,
            green,
            blue,
            alpha: None,
            linear: Some(linear),
        }
    }

    /// Attach an alpha component (clamped to 0..1).
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha.clamp(0.0, 1.0));
        self
    }

    /// Attach an optional alpha component.
    pub fn with_optional_alpha(self, alpha: Option<f64>) -> Self {
        match alpha {
            Some(alpha) => self.with_alpha(alpha),
            None => self,
        }
    }

    pub fn has_linear_rgb(&self) -> bool {
        self.linear.is_some()
    }

    pub fn rgb8(&self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }

    /// Linear-light channels, from the side channel when available.
    pub fn linear_rgb(&self) -> [f64; 3] {
        match self.linear {
            Some(linear) => linear,
            None => self
                .rgb8()
                .map(|c| space::srgb_to_linear(f64::from(c) / 255.0)),
        }
    }

    /// Gamma-encoded channels (0..1), unquantized when the side channel is set.
    pub fn srgb(&self) -> [f64; 3] {
        match self.linear {
            Some(linear) => linear.map(|c| space::linear_to_srgb(c).clamp(0.0, 1.0)),
            None => self.rgb8().map(|c| f64::from(c) / 255.0),
        }
    }

    /// Alpha below 1.0 that must be written out.
    pub fn visible_alpha(&self) -> Option<f64> {
        self.alpha.filter(|alpha| *alpha < 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_linear_quantizes() {
        let ir = ColorIr::from_linear([1.0, 0.0, 0.5]);
        assert_eq!(ir.rgb8(), [255, 0, 188]);
        assert!(ir.has_linear_rgb());
    }

    #[test]
    fn test_linear_preferred() {
        let linear = [0.5, 0.25, 0.125];
        let ir = ColorIr::from_linear(linear);
        assert_eq!(ir.linear_rgb(), linear);
    }

    #[test]
    fn test_visible_alpha() {
        let ir = ColorIr::from_rgb8(1, 2, 3);
        assert_eq!(ir.visible_alpha(), None);
        assert_eq!(ir.with_alpha(1.0).visible_alpha(), None);
        assert_eq!(ir.with_alpha(0.5).visible_alpha(), Some(0.5));
        assert_eq!(ir.with_alpha(4.0).alpha, Some(1.0));
    }
}
