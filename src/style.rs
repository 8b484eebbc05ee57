//! Colors, the auto-cycling series palette, strokes, and named color scales.
//!
//! - `Rgba` parses `#RRGGBB`, `#RRGGBBAA`, `#RGB` and a small set of color names
//! - `palette_color(i)` cycles through the Microsoft Office chart palette
//! - `ColorScale` maps a normalized magnitude (0..1) to a color, e.g. `Blues` or `rainbow`

use crate::error::{PlotError, Result};
use plotters::style::RGBAColor;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    /// Create a new RGBA color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parse a hex code or one of the supported color names (case-insensitive).
    pub fn parse(text: &str) -> Result<Self> {
        let t = text.trim();
        if let Some(hex) = t.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| PlotError::InvalidColor(text.to_string()));
        }
        named_color(&t.to_ascii_lowercase()).ok_or_else(|| PlotError::InvalidColor(text.to_string()))
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_plotters(self) -> RGBAColor {
        RGBAColor(self.r, self.g, self.b, self.a as f64 / 255.0)
    }

    fn lerp(self, other: Rgba, t: f64) -> Rgba {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgba::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.is_ascii() {
        return None;
    }
    let byte = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut it = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            Some(Rgba::rgb(it.next()??, it.next()??, it.next()??))
        }
        6 => Some(Rgba::rgb(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?)),
        8 => Some(Rgba::new(
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            byte(&hex[6..8])?,
        )),
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Rgba> {
    let c = match name {
        "b" | "blue" => Rgba::rgb(0, 0, 255),
        "g" | "green" => Rgba::rgb(0, 128, 0),
        "r" | "red" => Rgba::rgb(255, 0, 0),
        "c" | "cyan" => Rgba::rgb(0, 191, 191),
        "m" | "magenta" => Rgba::rgb(191, 0, 191),
        "y" | "yellow" => Rgba::rgb(191, 191, 0),
        "k" | "black" => Rgba::BLACK,
        "w" | "white" => Rgba::WHITE,
        "gray" | "grey" => Rgba::rgb(128, 128, 128),
        "orange" => Rgba::rgb(255, 165, 0),
        "purple" => Rgba::rgb(128, 0, 128),
        "brown" => Rgba::rgb(165, 42, 42),
        "pink" => Rgba::rgb(255, 192, 203),
        "navy" => Rgba::rgb(0, 0, 128),
        "teal" => Rgba::rgb(0, 128, 128),
        "olive" => Rgba::rgb(128, 128, 0),
        _ => return None,
    };
    Some(c)
}

/// Microsoft Office (2013+) chart series palette.
/// Order: Blue, Orange, Gray, Gold, Light Blue, Green, Dark Blue, Dark Orange, Dark Gray, Brownish Gold.
const OFFICE10: [Rgba; 10] = [
    Rgba::rgb(68, 114, 196),  // blue      (#4472C4)
    Rgba::rgb(237, 125, 49),  // orange    (#ED7D31)
    Rgba::rgb(165, 165, 165), // gray      (#A5A5A5)
    Rgba::rgb(255, 192, 0),   // gold      (#FFC000)
    Rgba::rgb(91, 155, 213),  // light blue(#5B9BD5)
    Rgba::rgb(112, 173, 71),  // green     (#70AD47)
    Rgba::rgb(38, 68, 120),   // dark blue (#264478)
    Rgba::rgb(158, 72, 14),   // dark org. (#9E480E)
    Rgba::rgb(99, 99, 99),    // dark gray (#636363)
    Rgba::rgb(153, 115, 0),   // brownish  (#997300)
];

/// Get a color from the auto-cycling series palette.
#[inline]
pub fn palette_color(idx: usize) -> Rgba {
    OFFICE10[idx % OFFICE10.len()]
}

/// Line stroke: color, width in points, optional dash pattern `(on, off)` in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f64,
    pub dash: Option<(f64, f64)>,
}

impl Stroke {
    pub fn solid(color: Rgba, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub fn dashed(color: Rgba, width: f64, on: f64, off: f64) -> Self {
        Self {
            color,
            width,
            dash: Some((on, off)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ScaleKind {
    Stops(&'static [(u8, u8, u8)]),
    Rainbow,
}

// ColorBrewer 9-class sequential schemes.
const BLUES: [(u8, u8, u8); 9] = [
    (0xf7, 0xfb, 0xff),
    (0xde, 0xeb, 0xf7),
    (0xc6, 0xdb, 0xef),
    (0x9e, 0xca, 0xe1),
    (0x6b, 0xae, 0xd6),
    (0x42, 0x92, 0xc6),
    (0x21, 0x71, 0xb5),
    (0x08, 0x51, 0x9c),
    (0x08, 0x30, 0x6b),
];
const GREENS: [(u8, u8, u8); 9] = [
    (0xf7, 0xfc, 0xf5),
    (0xe5, 0xf5, 0xe0),
    (0xc7, 0xe9, 0xc0),
    (0xa1, 0xd9, 0x9b),
    (0x74, 0xc4, 0x76),
    (0x41, 0xab, 0x5d),
    (0x23, 0x8b, 0x45),
    (0x00, 0x6d, 0x2c),
    (0x00, 0x44, 0x1b),
];
const REDS: [(u8, u8, u8); 9] = [
    (0xff, 0xf5, 0xf0),
    (0xfe, 0xe0, 0xd2),
    (0xfc, 0xbb, 0xa1),
    (0xfc, 0x92, 0x72),
    (0xfb, 0x6a, 0x4a),
    (0xef, 0x3b, 0x2c),
    (0xcb, 0x18, 0x1d),
    (0xa5, 0x0f, 0x15),
    (0x67, 0x00, 0x0d),
];
const GREYS: [(u8, u8, u8); 9] = [
    (0xff, 0xff, 0xff),
    (0xf0, 0xf0, 0xf0),
    (0xd9, 0xd9, 0xd9),
    (0xbd, 0xbd, 0xbd),
    (0x96, 0x96, 0x96),
    (0x73, 0x73, 0x73),
    (0x52, 0x52, 0x52),
    (0x25, 0x25, 0x25),
    (0x00, 0x00, 0x00),
];
const YLGNBU: [(u8, u8, u8); 9] = [
    (0xff, 0xff, 0xd9),
    (0xed, 0xf8, 0xb1),
    (0xc7, 0xe9, 0xb4),
    (0x7f, 0xcd, 0xbb),
    (0x41, 0xb6, 0xc4),
    (0x1d, 0x91, 0xc0),
    (0x22, 0x5e, 0xa8),
    (0x25, 0x34, 0x94),
    (0x08, 0x1d, 0x58),
];
const VIRIDIS: [(u8, u8, u8); 10] = [
    (0x44, 0x01, 0x54),
    (0x48, 0x28, 0x78),
    (0x3e, 0x49, 0x89),
    (0x31, 0x68, 0x8e),
    (0x26, 0x82, 0x8e),
    (0x1f, 0x9e, 0x89),
    (0x35, 0xb7, 0x79),
    (0x6e, 0xce, 0x58),
    (0xb5, 0xde, 0x2b),
    (0xfd, 0xe7, 0x25),
];

/// A named, continuous color scale. A `_r` suffix reverses any scale.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorScale {
    name: String,
    kind: ScaleKind,
    reversed: bool,
}

impl ColorScale {
    pub fn named(name: &str) -> Result<Self> {
        let (base, reversed) = match name.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (name, false),
        };
        let kind = match base.to_ascii_lowercase().as_str() {
            "blues" => ScaleKind::Stops(&BLUES),
            "greens" => ScaleKind::Stops(&GREENS),
            "reds" => ScaleKind::Stops(&REDS),
            "greys" | "grays" => ScaleKind::Stops(&GREYS),
            "ylgnbu" => ScaleKind::Stops(&YLGNBU),
            "viridis" => ScaleKind::Stops(&VIRIDIS),
            "rainbow" => ScaleKind::Rainbow,
            _ => return Err(PlotError::UnknownColorScale(name.to_string())),
        };
        Ok(Self {
            name: name.to_string(),
            kind,
            reversed,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color at `t` in `0..=1` (clamped; NaN maps to the low end).
    pub fn sample(&self, t: f64) -> Rgba {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let t = if self.reversed { 1.0 - t } else { t };
        match self.kind {
            ScaleKind::Rainbow => {
                let ch = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
                Rgba::rgb(
                    ch((2.0 * t - 0.5).abs()),
                    ch((std::f64::consts::PI * t).sin()),
                    ch((std::f64::consts::FRAC_PI_2 * t).cos()),
                )
            }
            ScaleKind::Stops(stops) => {
                let last = stops.len() - 1;
                let pos = t * last as f64;
                let i = (pos.floor() as usize).min(last);
                let lo = stops[i];
                let hi = stops[(i + 1).min(last)];
                Rgba::rgb(lo.0, lo.1, lo.2).lerp(Rgba::rgb(hi.0, hi.1, hi.2), pos - i as f64)
            }
        }
    }

    /// Color for `value` normalized linearly into `[min, max]`.
    pub fn map(&self, value: f64, min: f64, max: f64) -> Rgba {
        if (max - min).abs() < f64::EPSILON {
            return self.sample(1.0);
        }
        self.sample((value - min) / (max - min))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_creation() {
        let color = Rgba::rgb(255, 128, 64);
        assert_eq!(color.r, 255);
        assert_eq!(color.g, 128);
        assert_eq!(color.b, 64);
        assert_eq!(color.a, 255);
    }

    #[test]
    fn parses_hex_and_names() {
        assert_eq!(Rgba::parse("#60A0FF").unwrap(), Rgba::rgb(0x60, 0xA0, 0xFF));
        assert_eq!(Rgba::parse("#00000020").unwrap(), Rgba::new(0, 0, 0, 0x20));
        assert_eq!(Rgba::parse("#fff").unwrap(), Rgba::WHITE);
        assert_eq!(Rgba::parse("Blue").unwrap(), Rgba::rgb(0, 0, 255));
        assert!(matches!(Rgba::parse("#12"), Err(PlotError::InvalidColor(_))));
        assert!(matches!(Rgba::parse("chartreuse-ish"), Err(PlotError::InvalidColor(_))));
    }

    #[test]
    fn palette_cycles() {
        assert_eq!(palette_color(0), palette_color(10));
        assert_ne!(palette_color(0), palette_color(1));
    }

    #[test]
    fn scale_endpoints() {
        let blues = ColorScale::named("Blues").unwrap();
        assert_eq!(blues.sample(0.0), Rgba::rgb(0xf7, 0xfb, 0xff));
        assert_eq!(blues.sample(1.0), Rgba::rgb(0x08, 0x30, 0x6b));
        let rev = ColorScale::named("Blues_r").unwrap();
        assert_eq!(rev.sample(0.0), blues.sample(1.0));
        let rainbow = ColorScale::named("rainbow").unwrap();
        assert_eq!(rainbow.sample(1.0), Rgba::rgb(255, 0, 0));
        assert!(matches!(
            ColorScale::named("nope"),
            Err(PlotError::UnknownColorScale(_))
        ));
    }
}
