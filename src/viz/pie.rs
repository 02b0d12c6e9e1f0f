//! Pie drawing in pixel space.
//!
//! Angles follow the view model: 0 rad at 12 o'clock, growing clockwise.

use anyhow::{Result, anyhow};
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::TAU;

use super::util::rgb;
use crate::view::PieView;

/// Largest angle between two arc vertices.
const ARC_STEP: f64 = TAU / 180.0;

/// Point at `angle` on a circle of radius `r` around `(cx, cy)`.
pub fn polar(cx: f64, cy: f64, r: f64, angle: f64) -> (f64, f64) {
    (cx + r * angle.sin(), cy - r * angle.cos())
}

/// Polygon outline of a wedge. A full turn yields the circle without the centre point.
pub fn wedge_points(cx: f64, cy: f64, r: f64, start: f64, end: f64) -> Vec<(i32, i32)> {
    let span = end - start;
    let full = span >= TAU - 1e-9;
    let steps = ((span / ARC_STEP).ceil() as usize).max(1);
    let mut pts = Vec::with_capacity(steps + 2);
    if !full {
        pts.push((cx.round() as i32, cy.round() as i32));
    }
    for i in 0..=steps {
        let a = start + span * i as f64 / steps as f64;
        let (x, y) = polar(cx, cy, r, a);
        pts.push((x.round() as i32, y.round() as i32));
    }
    pts
}

pub fn draw_pie<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    pie: &PieView,
) -> Result<()> {
    let (w, h) = area.dim_in_pixel();
    let caption_px = 22u32;
    let top = caption_px as i32 + 24;

    area.draw(&Text::new(
        title,
        (w as i32 / 2, 12),
        TextStyle::from((FontFamily::SansSerif, caption_px)).pos(Pos::new(HPos::Center, VPos::Top)),
    ))
    .map_err(|e| anyhow!("{:?}", e))?;

    let avail_h = (h as i32 - top).max(20) as f64;
    let cx = w as f64 / 2.0;
    let cy = top as f64 + avail_h / 2.0;
    let r = ((w as f64).min(avail_h) / 2.0 - 16.0).max(8.0);

    let label_style =
        TextStyle::from((FontFamily::SansSerif, 14)).pos(Pos::new(HPos::Center, VPos::Center));

    for (slice, color) in pie.chart.slices.iter().zip(&pie.colors) {
        let pts = wedge_points(cx, cy, r, slice.start_angle, slice.end_angle);
        let mut outline = pts.clone();
        if let Some(first) = pts.first() {
            outline.push(*first);
        }
        area.draw(&Polygon::new(pts, rgb(*color).filled()))
            .map_err(|e| anyhow!("{:?}", e))?;
        area.draw(&PathElement::new(outline, WHITE.stroke_width(2)))
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    // labels after all wedges so no wedge covers them
    for slice in pie.chart.slices.iter().filter(|s| s.show_label) {
        let mid = (slice.start_angle + slice.end_angle) / 2.0;
        let (lx, ly) = polar(cx, cy, r * 0.65, mid);
        area.draw(&Text::new(
            format!("{:.1}%", slice.pct),
            (lx.round() as i32, ly.round() as i32),
            label_style.clone(),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}
