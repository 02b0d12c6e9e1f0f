//! Fixed category palettes.
//!
//! Each chart kind colours its categories from its own palette, by position in the
//! category list. Lists longer than a palette continue with hues spaced by the golden
//! angle, so colours stay distinct and stable for a given position.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Hsl {
    pub h_deg: f64, // 0..360
    pub s: f64,     // 0..1
    pub l: f64,     // 0..1
}

/// Set2 (ColorBrewer) for the distribution layers.
pub const SET2: [Rgb8; 8] = [
    Rgb8::new(0x66, 0xC2, 0xA5),
    Rgb8::new(0xFC, 0x8D, 0x62),
    Rgb8::new(0x8D, 0xA0, 0xCB),
    Rgb8::new(0xE7, 0x8A, 0xC3),
    Rgb8::new(0xA6, 0xD8, 0x54),
    Rgb8::new(0xFF, 0xD9, 0x2F),
    Rgb8::new(0xE5, 0xC4, 0x94),
    Rgb8::new(0xB3, 0xB3, 0xB3),
];

/// Category10 for scatter points and death-rate lines.
pub const CATEGORY10: [Rgb8; 10] = [
    Rgb8::new(0x1F, 0x77, 0xB4),
    Rgb8::new(0xFF, 0x7F, 0x0E),
    Rgb8::new(0x2C, 0xA0, 0x2C),
    Rgb8::new(0xD6, 0x27, 0x28),
    Rgb8::new(0x94, 0x67, 0xBD),
    Rgb8::new(0x8C, 0x56, 0x4B),
    Rgb8::new(0xE3, 0x77, 0xC2),
    Rgb8::new(0x7F, 0x7F, 0x7F),
    Rgb8::new(0xBC, 0xBD, 0x22),
    Rgb8::new(0x17, 0xBE, 0xCF),
];

pub const PIE_SELECTED: Rgb8 = Rgb8::new(0x2E, 0xCC, 0x71);
pub const PIE_OTHERS: Rgb8 = Rgb8::new(0xE6, 0x7E, 0x22);
/// Second "selected" slice in the sex split.
pub const PIE_SELECTED_MALE: Rgb8 = Rgb8::new(0x34, 0x98, 0xDB);

/// Colour of the probe marks.
pub const PROBE: Rgb8 = Rgb8::new(0xE7, 0x4C, 0x3C);
/// Colour of the "Other" legend entry.
pub const OTHER: Rgb8 = Rgb8::new(0xBD, 0xBD, 0xBD);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Palette {
    Set2,
    Category10,
}

impl Palette {
    fn colors(self) -> &'static [Rgb8] {
        match self {
            Palette::Set2 => &SET2,
            Palette::Category10 => &CATEGORY10,
        }
    }

    /// Colour for the `idx`-th category.
    pub fn color(self, idx: usize) -> Rgb8 {
        let colors = self.colors();
        if let Some(c) = colors.get(idx) {
            return *c;
        }
        let extra = (idx - colors.len()) as f64;
        hsl_to_rgb8(Hsl {
            h_deg: (extra * 137.508) % 360.0,
            s: 0.55,
            l: 0.55,
        })
    }
}

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

pub fn hsl_to_rgb8(hsl: Hsl) -> Rgb8 {
    let h = (hsl.h_deg.rem_euclid(360.0)) / 360.0;
    let s = clamp01(hsl.s);
    let l = clamp01(hsl.l);

    if s == 0.0 {
        let v = (l * 255.0).round() as u8;
        return Rgb8 { r: v, g: v, b: v };
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 1.0 / 2.0 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    }

    Rgb8 {
        r: (hue_to_rgb(p, q, h + 1.0 / 3.0) * 255.0).round() as u8,
        g: (hue_to_rgb(p, q, h) * 255.0).round() as u8,
        b: (hue_to_rgb(p, q, h - 1.0 / 3.0) * 255.0).round() as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_cycles_past_its_end() {
        assert_eq!(Palette::Category10.color(0).hex(), "#1F77B4");
        assert_eq!(Palette::Set2.color(1).hex(), "#FC8D62");
        let a = Palette::Set2.color(8);
        let b = Palette::Set2.color(9);
        assert_ne!(a, b);
        assert_eq!(a, Palette::Set2.color(8));
    }

    #[test]
    fn grey_when_unsaturated() {
        let c = hsl_to_rgb8(Hsl { h_deg: 200.0, s: 0.0, l: 0.5 });
        assert_eq!(c.r, c.g);
        assert_eq!(c.g, c.b);
    }
}
