//! Helpers shared by the chart renderers: colours, ranges, locale, label gutters.

use crate::palette::Rgb8;
use num_format::{Locale, ToFormattedString};
use plotters::prelude::*;

use super::text::estimate_text_width_px;

#[inline]
pub fn rgb(c: Rgb8) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator.
///
/// Supported tags (case-insensitive): `en`, `de`, `fr`, `es`, `it`, `pt`, `nl` and their
/// region variants. Anything else is English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'),
    }
}

/// Tick label for a count axis, grouped per locale.
pub fn format_count_tick(v: f64, locale: &Locale) -> String {
    if v < 0.0 || v.fract().abs() > 1e-9 {
        return String::new();
    }
    (v.round() as u64).to_formatted_string(locale)
}

/// Tick label for a continuous axis, with the locale's decimal separator.
pub fn format_value_tick(v: f64, dec_sep: char) -> String {
    let a = v.abs();
    let prec = if a >= 100.0 {
        0
    } else if a >= 10.0 {
        1
    } else {
        2
    };
    let s = format!("{:.*}", prec, v);
    if dec_sep == '.' {
        s
    } else {
        s.replace('.', &dec_sep.to_string())
    }
}

/// Widen `(min, max)` by `frac` of its span on both sides. A zero span becomes `±1`.
pub fn padded_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    if (max - min).abs() < f64::EPSILON {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * frac;
    (min - pad, max + pad)
}

/// Width of the left label gutter for y ticks sampled over `ymin..ymax`.
pub fn compute_left_label_area_px<F: Fn(f64) -> String>(
    ymin: f64,
    ymax: f64,
    ticks: usize,
    font_px: u32,
    fmt: F,
) -> u32 {
    let mut max_px = 0u32;
    for i in 0..=ticks {
        let t = if ticks == 0 {
            0.0
        } else {
            i as f64 / ticks as f64
        };
        let s = fmt(ymin + (ymax - ymin) * t);
        max_px = max_px.max(estimate_text_width_px(&s, font_px));
    }
    // tick marks plus the rotated axis title
    max_px.saturating_add(36).clamp(56, 150)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_ticks_skip_fractions() {
        let (en_loc, _) = map_locale("en");
        assert_eq!(format_count_tick(12000.0, en_loc), "12,000");
        assert_eq!(format_count_tick(2.5, en_loc), "");
        let (de_loc, sep) = map_locale("DE");
        assert_eq!(format_count_tick(12000.0, de_loc), "12.000");
        assert_eq!(format_value_tick(1.25, sep), "1,25");
    }

    #[test]
    fn flat_range_is_widened() {
        assert_eq!(padded_range(3.0, 3.0, 0.05), (2.0, 4.0));
        let (lo, hi) = padded_range(0.0, 10.0, 0.1);
        assert!((lo + 1.0).abs() < 1e-12 && (hi - 11.0).abs() < 1e-12);
    }
}
