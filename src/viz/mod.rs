//! Chart rendering: turn a [`View`] into an **SVG** document.
//!
//! - Distribution: stacked bars per bin, one layer per disease
//! - Scatter: row points or department means, with an optional probe star
//! - Pie: wedges drawn in pixel space (see [`pie`])
//! - Death rate: one line per disease over equal-width bins, with an optional probe line
//! - Empty states: the reason is written where the chart would be
//!
//! The legend and summary go into a separate panel on the right or at the bottom.
//! Drawing is generic over the plotters backend; the crate ships the SVG backend only.

pub mod legend;
pub mod pie;
pub mod text;
pub mod util;

use crate::config::{DashboardConfig, LegendPlacement};
use crate::palette;
use crate::view::{ChartView, DeathRateView, DistributionView, ScatterView, View};
use anyhow::{Context, Result, anyhow};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::LineSeries;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_svg::SVGBackend;

use std::path::Path;

use legend::{draw_legend_panel, estimate_bottom_legend_height_px};
use util::{
    compute_left_label_area_px, format_count_tick, format_value_tick, map_locale, padded_range,
    rgb,
};

const MARGIN: u32 = 16;
const CAPTION_PX: u32 = 22;
const TICK_PX: u32 = 12;
const DESC_PX: u32 = 15;
const Y_LABELS: usize = 10;
const EMPTY_GREY: RGBColor = RGBColor(110, 110, 110);

/// Render `view` to an SVG file at `out_path`, creating parent directories as needed.
pub fn render_svg<P: AsRef<Path>>(view: &View, config: &DashboardConfig, out_path: P) -> Result<()> {
    let out_path = out_path.as_ref();
    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    {
        let root = SVGBackend::new(out_path, (config.width, config.height)).into_drawing_area();
        draw_view(&root, view, config)?;
    }
    log::info!("Wrote {} chart to {}", view.kind.label(), out_path.display());
    Ok(())
}

/// Render `view` to an in-memory SVG document.
pub fn render_svg_string(view: &View, config: &DashboardConfig) -> Result<String> {
    let mut buf = String::new();
    {
        let root =
            SVGBackend::with_string(&mut buf, (config.width, config.height)).into_drawing_area();
        draw_view(&root, view, config)?;
    }
    Ok(buf)
}

/// Draw chart, legend and summary onto `root`.
pub fn draw_view<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    view: &View,
    config: &DashboardConfig,
) -> Result<()> {
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    let (w, h) = root.dim_in_pixel();
    let (w, h) = (w as i32, h as i32);

    let (plot_area, legend_area) = match config.legend {
        LegendPlacement::Right => {
            let legend_w = (w * 26 / 100).clamp(160.min(w / 2), (w / 2).max(1));
            root.split_horizontally(w - legend_w)
        }
        LegendPlacement::Bottom => {
            let need = estimate_bottom_legend_height_px(&view.legend, &view.summary, w);
            let band = need.clamp(40.min(h / 2), (h / 2).max(1));
            root.split_vertically(h - band)
        }
    };

    match &view.chart {
        ChartView::Empty(reason) => draw_empty(&plot_area, &view.title, &reason.message())?,
        ChartView::Distribution(d) => draw_distribution(&plot_area, view, d, config)?,
        ChartView::Scatter(s) => draw_scatter(&plot_area, view, s, config)?,
        ChartView::Pie(p) => pie::draw_pie(&plot_area, &view.title, p)?,
        ChartView::DeathRate(d) => draw_death_rate(&plot_area, view, d, config)?,
    }
    draw_legend_panel(&legend_area, &view.legend, &view.summary, config.legend)?;

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_empty<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    message: &str,
) -> Result<()> {
    let (w, h) = area.dim_in_pixel();
    area.draw(&Text::new(
        title,
        (w as i32 / 2, 12),
        TextStyle::from((FontFamily::SansSerif, CAPTION_PX)).pos(Pos::new(HPos::Center, VPos::Top)),
    ))
    .map_err(|e| anyhow!("{:?}", e))?;
    area.draw(&Text::new(
        message,
        (w as i32 / 2, h as i32 / 2),
        TextStyle::from((FontFamily::SansSerif, 18))
            .color(&EMPTY_GREY)
            .pos(Pos::new(HPos::Center, VPos::Center)),
    ))
    .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_distribution<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    view: &View,
    d: &DistributionView,
    config: &DashboardConfig,
) -> Result<()> {
    let (locale, _) = map_locale(&config.locale);
    let labels: Vec<String> = d.table.bins.iter().map(|b| b.label()).collect();
    let n = labels.len().max(1);
    let max_total = (0..d.table.bins.len())
        .map(|b| d.table.bin_total(b))
        .max()
        .unwrap_or(0)
        .max(1);
    let y_max = max_total as f64 * 1.1;

    let left_px = compute_left_label_area_px(0.0, y_max, Y_LABELS, TICK_PX, |v| {
        format_count_tick(v.round(), locale)
    });

    let mut chart = ChartBuilder::on(area)
        .margin(MARGIN)
        .caption(view.title.as_str(), (FontFamily::SansSerif, CAPTION_PX))
        .set_label_area_size(LabelAreaPosition::Left, left_px)
        .set_label_area_size(LabelAreaPosition::Bottom, 56)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)
        .map_err(|e| anyhow!("{:?}", e))?;

    // bins sit on integer x positions; other ticks stay blank
    let x_fmt = |x: &f64| {
        let i = x.round();
        if (x - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        labels.get(i as usize).cloned().unwrap_or_default()
    };
    let y_fmt = |v: &f64| format_count_tick(*v, locale);

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(view.x_label.as_deref().unwrap_or(""))
        .y_desc(view.y_label.as_deref().unwrap_or(""))
        .x_labels(n.min(20) + 1)
        .y_labels(Y_LABELS)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .label_style((FontFamily::SansSerif, TICK_PX))
        .axis_desc_style((FontFamily::SansSerif, DESC_PX))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    for (layer, color) in d.layers.iter().zip(&d.colors) {
        let fill = rgb(*color).mix(0.9).filled();
        chart
            .draw_series(
                layer
                    .segments
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.y1 > s.y0)
                    .map(|(i, s)| {
                        let x = i as f64;
                        Rectangle::new([(x - 0.4, s.y0), (x + 0.4, s.y1)], fill)
                    }),
            )
            .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}

/// Five-pointed star around the origin, in pixels.
fn star_vertices(outer: f64, inner: f64) -> Vec<(i32, i32)> {
    (0..10)
        .map(|k| {
            let r = if k % 2 == 0 { outer } else { inner };
            let a = k as f64 * std::f64::consts::PI / 5.0;
            ((r * a.sin()).round() as i32, (-r * a.cos()).round() as i32)
        })
        .collect()
}

fn draw_scatter<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    view: &View,
    s: &ScatterView,
    config: &DashboardConfig,
) -> Result<()> {
    let (_, dec_sep) = map_locale(&config.locale);
    let mut xs: Vec<f64> = s.set.points.iter().map(|p| p.x).collect();
    let mut ys: Vec<f64> = s.set.points.iter().map(|p| p.y).collect();
    if let Some((px, py)) = s.probe {
        xs.push(px);
        ys.push(py);
    }
    let (x_min, x_max) = crate::aggregate::scatter::extent(xs).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = crate::aggregate::scatter::extent(ys).unwrap_or((0.0, 1.0));
    let (x_min, x_max) = padded_range(x_min, x_max, 0.06);
    let (y_min, y_max) = padded_range(y_min, y_max, 0.08);

    let tick = |v: &f64| format_value_tick(*v, dec_sep);
    let left_px =
        compute_left_label_area_px(y_min, y_max, Y_LABELS, TICK_PX, |v| tick(&v));

    let mut chart = ChartBuilder::on(area)
        .margin(MARGIN)
        .caption(view.title.as_str(), (FontFamily::SansSerif, CAPTION_PX))
        .set_label_area_size(LabelAreaPosition::Left, left_px)
        .set_label_area_size(LabelAreaPosition::Bottom, 56)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .configure_mesh()
        .x_desc(view.x_label.as_deref().unwrap_or(""))
        .y_desc(view.y_label.as_deref().unwrap_or(""))
        .x_labels(10)
        .y_labels(Y_LABELS)
        .x_label_formatter(&tick)
        .y_label_formatter(&tick)
        .label_style((FontFamily::SansSerif, TICK_PX))
        .axis_desc_style((FontFamily::SansSerif, DESC_PX))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    for (p, color) in s.set.points.iter().zip(&s.colors) {
        let c = rgb(*color);
        let r = p.radius.round() as u32;
        chart
            .draw_series([
                Circle::new((p.x, p.y), r, c.mix(0.7).filled()),
                Circle::new((p.x, p.y), r, c.stroke_width(1)),
            ])
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    if let Some((px, py)) = s.probe {
        let probe = rgb(palette::PROBE);
        let marker = EmptyElement::at((px, py))
            + Polygon::new(star_vertices(11.0, 4.5), probe.filled())
            + Text::new(
                "Your Input",
                (14, -6),
                TextStyle::from((FontFamily::SansSerif, 13)).color(&probe),
            );
        chart
            .draw_series(std::iter::once(marker))
            .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}

fn draw_death_rate<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    view: &View,
    d: &DeathRateView,
    config: &DashboardConfig,
) -> Result<()> {
    let (_, dec_sep) = map_locale(&config.locale);
    let mut x_min = d.edges.first().copied().unwrap_or(0.0);
    let mut x_max = d.edges.last().copied().unwrap_or(1.0);
    if let Some(px) = d.probe_x {
        x_min = x_min.min(px);
        x_max = x_max.max(px);
    }
    let (x_min, x_max) = padded_range(x_min, x_max, 0.02);
    let peak = d
        .series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.rate * 100.0))
        .fold(0.0f64, f64::max);
    let y_max = (peak * 1.1).max(1.0);

    let tick = |v: &f64| format_value_tick(*v, dec_sep);
    let left_px = compute_left_label_area_px(0.0, y_max, Y_LABELS, TICK_PX, |v| tick(&v));

    let mut chart = ChartBuilder::on(area)
        .margin(MARGIN)
        .caption(view.title.as_str(), (FontFamily::SansSerif, CAPTION_PX))
        .set_label_area_size(LabelAreaPosition::Left, left_px)
        .set_label_area_size(LabelAreaPosition::Bottom, 56)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max)
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .configure_mesh()
        .x_desc(view.x_label.as_deref().unwrap_or(""))
        .y_desc(view.y_label.as_deref().unwrap_or(""))
        .x_labels(12)
        .y_labels(Y_LABELS)
        .x_label_formatter(&tick)
        .y_label_formatter(&tick)
        .label_style((FontFamily::SansSerif, TICK_PX))
        .axis_desc_style((FontFamily::SansSerif, DESC_PX))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    for series in &d.series {
        let color = rgb(series.color);
        let pts: Vec<(f64, f64)> = series
            .points
            .iter()
            .map(|p| (p.x_mid, p.rate * 100.0))
            .collect();
        let style = ShapeStyle {
            color: color.to_rgba(),
            filled: false,
            stroke_width: 2,
        };
        chart
            .draw_series(LineSeries::new(pts.clone(), style))
            .map_err(|e| anyhow!("{:?}", e))?;
        chart
            .draw_series(pts.iter().map(|&(x, y)| Circle::new((x, y), 4, color.filled())))
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    if let Some(px) = d.probe_x {
        let probe = rgb(palette::PROBE);
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(px, 0.0), (px, y_max)],
                probe.stroke_width(2),
            )))
            .map_err(|e| anyhow!("{:?}", e))?;
        let label = EmptyElement::at((px, y_max))
            + Text::new(
                "Input X",
                (5, 4),
                TextStyle::from((FontFamily::SansSerif, 12)).color(&probe),
            );
        chart
            .draw_series(std::iter::once(label))
            .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_has_ten_vertices_pointing_up() {
        let v = star_vertices(10.0, 4.0);
        assert_eq!(v.len(), 10);
        assert_eq!(v[0], (0, -10));
    }
}
