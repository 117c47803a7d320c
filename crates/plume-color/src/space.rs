//! Color Space Math
//!
//! sRGB transfer functions, CIE XYZ/Lab (D50 with Bradford adaptation) and
//! Oklab. All channels are `f64`; sRGB and linear values are nominally 0..1.

/// CIE kappa (24389/27)
const KAPPA: f64 = 24389.0 / 27.0;
/// CIE epsilon (216/24389)
const EPSILON: f64 = 216.0 / 24389.0;

/// D50 reference white, from the chromaticity (0.3457, 0.3585)
const D50_WHITE: [f64; 3] = [0.3457 / 0.3585, 1.0, (1.0 - 0.3457 - 0.3585) / 0.3585];

type Matrix = [[f64; 3]; 3];

const LINEAR_SRGB_TO_XYZ_D65: Matrix = [
    [0.41239079926595934, 0.357584339383878, 0.1804807884018343],
    [0.21263900587151027, 0.715168678767756, 0.07219231536073371],
    [0.01933081871559182, 0.11919477979462598, 0.9505321522496607],
];

const XYZ_D65_TO_LINEAR_SRGB: Matrix = [
    [3.2409699419045226, -1.537383177570094, -0.4986107602930034],
    [-0.9692436362808796, 1.8759675015077202, 0.04155505740717559],
    [0.05563007969699366, -0.20397695888897652, 1.0569715142428786],
];

// Bradford chromatic adaptation
const D65_TO_D50: Matrix = [
    [1.0479298208405488, 0.022946793341019088, -0.05019222954313557],
    [0.029627815688159344, 0.990434484573249, -0.01707382502938514],
    [-0.009243058152591178, 0.015055144896577895, 0.7518742899580008],
];

const D50_TO_D65: Matrix = [
    [0.9554734527042182, -0.023098536874261423, 0.0632593086610217],
    [-0.028369706963208136, 1.0099954580106629, 0.021041398966943008],
    [0.012314001688319899, -0.020507696433477912, 1.3303659366080753],
];

// Ottosson M1: linear sRGB -> LMS
const LINEAR_SRGB_TO_LMS: Matrix = [
    [0.4122214708, 0.5363325363, 0.0514459929],
    [0.2119034982, 0.6806995451, 0.1073969566],
    [0.0883024619, 0.2817188376, 0.6299787005],
];

// Ottosson M2: LMS' -> Oklab
const LMS_TO_OKLAB: Matrix = [
    [0.2104542553, 0.7936177850, -0.0040720468],
    [1.9779984951, -2.4285922050, 0.4505937099],
    [0.0259040371, 0.7827717662, -0.8086757660],
];

const OKLAB_TO_LMS: Matrix = [
    [1.0, 0.3963377774, 0.2158037573],
    [1.0, -0.1055613458, -0.0638541728],
    [1.0, -0.0894841775, -1.2914855480],
];

const LMS_TO_LINEAR_SRGB: Matrix = [
    [4.0767416621, -3.3077115913, 0.2309699292],
    [-1.2684380046, 2.6097574011, -0.3413193965],
    [-0.0041960863, -0.7034186147, 1.7076147010],
];

fn multiply(m: &Matrix, v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Gamma-encoded sRGB channel -> linear light (sign-preserving).
pub(crate) fn srgb_to_linear(c: f64) -> f64 {
    let abs = c.abs();
    if abs <= 0.04045 {
        c / 12.92
    } else {
        c.signum() * ((abs + 0.055) / 1.055).powf(2.4)
    }
}

/// Linear light -> gamma-encoded sRGB channel (sign-preserving).
pub(crate) fn linear_to_srgb(c: f64) -> f64 {
    let abs = c.abs();
    if abs <= 0.0031308 {
        12.92 * c
    } else {
        c.signum() * (1.055 * abs.powf(1.0 / 2.4) - 0.055)
    }
}

/// Quantize a gamma-encoded channel (0..1) to 0..=255.
pub(crate) fn quantize(c: f64) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub(crate) fn linear_srgb_to_lab(rgb: [f64; 3]) -> [f64; 3] {
    let xyz_d65 = multiply(&LINEAR_SRGB_TO_XYZ_D65, rgb);
    let xyz_d50 = multiply(&D65_TO_D50, xyz_d65);
    xyz_d50_to_lab(xyz_d50)
}

pub(crate) fn lab_to_linear_srgb(lab: [f64; 3]) -> [f64; 3] {
    let xyz_d50 = lab_to_xyz_d50(lab);
    let xyz_d65 = multiply(&D50_TO_D65, xyz_d50);
    multiply(&XYZ_D65_TO_LINEAR_SRGB, xyz_d65)
}

fn xyz_d50_to_lab(xyz: [f64; 3]) -> [f64; 3] {
    let scaled = [
        xyz[0] / D50_WHITE[0],
        xyz[1] / D50_WHITE[1],
        xyz[2] / D50_WHITE[2],
    ];
    let f = scaled.map(|v| {
        if v > EPSILON {
            v.cbrt()
        } else {
            (KAPPA * v + 16.0) / 116.0
        }
    });

    [
        116.0 * f[1] - 16.0,
        500.0 * (f[0] - f[1]),
        200.0 * (f[1] - f[2]),
    ]
}

fn lab_to_xyz_d50(lab: [f64; 3]) -> [f64; 3] {
    let [l, a, b] = lab;
    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;

    let x = if fx.powi(3) > EPSILON {
        fx.powi(3)
    } else {
        (116.0 * fx - 16.0) / KAPPA
    };
    let y = if l > KAPPA * EPSILON {
        fy.powi(3)
    } else {
        l / KAPPA
    };
    let z = if fz.powi(3) > EPSILON {
        fz.powi(3)
    } else {
        (116.0 * fz - 16.0) / KAPPA
    };

    [x * D50_WHITE[0], y * D50_WHITE[1], z * D50_WHITE[2]]
}

pub(crate) fn linear_srgb_to_oklab(rgb: [f64; 3]) -> [f64; 3] {
    let lms = multiply(&LINEAR_SRGB_TO_LMS, rgb);
    multiply(&LMS_TO_OKLAB, lms.map(f64::cbrt))
}

pub(crate) fn oklab_to_linear_srgb(lab: [f64; 3]) -> [f64; 3] {
    let lms = multiply(&OKLAB_TO_LMS, lab).map(|v| v * v * v);
    multiply(&LMS_TO_LINEAR_SRGB, lms)
}

/// Cartesian (a, b) -> polar (chroma, hue in degrees 0..360).
pub(crate) fn to_polar(a: f64, b: f64) -> (f64, f64) {
    let chroma = (a * a + b * b).sqrt();
    let hue = normalize_hue(b.atan2(a).to_degrees());
    (chroma, hue)
}

/// Polar (chroma, hue degrees) -> cartesian (a, b).
pub(crate) fn from_polar(chroma: f64, hue: f64) -> (f64, f64) {
    let radians = hue.to_radians();
    (chroma * radians.cos(), chroma * radians.sin())
}

/// Wrap a hue into [0, 360).
pub(crate) fn normalize_hue(hue: f64) -> f64 {
    let wrapped = hue.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Gamma-encoded sRGB (0..1) -> (hue degrees, saturation 0..1, lightness 0..1).
pub(crate) fn srgb_to_hsl(rgb: [f64; 3]) -> [f64; 3] {
    let [r, g, b] = rgb;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let lightness = (max + min) / 2.0;
    let delta = max - min;

    if delta.abs() < 1e-12 {
        return [0.0, 0.0, lightness];
    }

    let saturation = if lightness <= 0.0 || lightness >= 1.0 {
        0.0
    } else {
        delta / (1.0 - (2.0 * lightness - 1.0).abs())
    };

    let hue = if max == r {
        60.0 * ((g - b) / delta)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    [normalize_hue(hue), saturation, lightness]
}

/// (hue degrees, saturation 0..1, lightness 0..1) -> gamma-encoded sRGB.
///
/// Chroma / intermediate-x / match formulation.
pub(crate) fn hsl_to_srgb(hsl: [f64; 3]) -> [f64; 3] {
    let [hue, saturation, lightness] = hsl;
    let hue = normalize_hue(hue);
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let m = lightness - chroma / 2.0;

    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    [r + m, g + m, b + m]
}
