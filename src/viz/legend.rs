//! Legend and summary panel beside or below the chart.
//!
//! Layout is computed once as a list of positioned pieces. The same layout drives the
//! height estimate for a bottom band and the actual drawing, so the two never disagree.

use anyhow::{Result, anyhow};
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::text::{estimate_text_width_px, truncate_to_width, wrap_text_to_width};
use super::util::rgb;
use crate::config::LegendPlacement;
use crate::view::Legend;

const TITLE_PX: u32 = 15;
const ENTRY_PX: u32 = 13;
const SUMMARY_PX: u32 = 12;
const PAD: i32 = 10;
const SWATCH: i32 = 10;
const SWATCH_GAP: i32 = 8;
const ROW_GAP: i32 = 6;
const COL_GAP: i32 = 18;
const SUMMARY_GREY: RGBColor = RGBColor(80, 80, 80);

enum Piece {
    Title { x: i32, y: i32, text: String },
    Entry { x: i32, y: i32, color: RGBColor, lines: Vec<String> },
    Summary { x: i32, y: i32, text: String },
}

fn line_h(font_px: u32) -> i32 {
    font_px as i32 + 4
}

/// Position every piece for a panel `width` pixels wide. Returns the pieces and the used height.
fn layout(
    legend: &Legend,
    summary: &[String],
    placement: LegendPlacement,
    width: i32,
) -> (Vec<Piece>, i32) {
    let mut pieces = Vec::new();
    let inner_w = (width - 2 * PAD).max(40);
    let mut y = PAD;

    if let Some(title) = legend.title.as_deref().filter(|t| !t.is_empty()) {
        // one line only
        pieces.push(Piece::Title {
            x: PAD,
            y,
            text: truncate_to_width(title, TITLE_PX, inner_w as u32),
        });
        y += line_h(TITLE_PX) + ROW_GAP;
    }

    let text_cap = (inner_w - SWATCH - SWATCH_GAP).max(30) as u32;
    match placement {
        LegendPlacement::Right => {
            for e in &legend.entries {
                let lines = wrap_text_to_width(&e.label, ENTRY_PX, text_cap);
                let h = lines.len() as i32 * line_h(ENTRY_PX);
                pieces.push(Piece::Entry {
                    x: PAD,
                    y,
                    color: rgb(e.color),
                    lines,
                });
                y += h + ROW_GAP;
            }
        }
        LegendPlacement::Bottom => {
            let mut x = PAD;
            let mut row_h = 0;
            for e in &legend.entries {
                let lines = wrap_text_to_width(&e.label, ENTRY_PX, text_cap.min(260));
                let text_w = lines
                    .iter()
                    .map(|l| estimate_text_width_px(l, ENTRY_PX) as i32)
                    .max()
                    .unwrap_or(0);
                let block_w = SWATCH + SWATCH_GAP + text_w;
                if x > PAD && x + block_w > width - PAD {
                    x = PAD;
                    y += row_h + ROW_GAP;
                    row_h = 0;
                }
                row_h = row_h.max(lines.len() as i32 * line_h(ENTRY_PX));
                pieces.push(Piece::Entry {
                    x,
                    y,
                    color: rgb(e.color),
                    lines,
                });
                x += block_w + COL_GAP;
            }
            if row_h > 0 {
                y += row_h + ROW_GAP;
            }
        }
    }

    if !summary.is_empty() {
        y += ROW_GAP;
        for s in summary {
            for line in wrap_text_to_width(s, SUMMARY_PX, inner_w as u32) {
                pieces.push(Piece::Summary {
                    x: PAD,
                    y,
                    text: line,
                });
                y += line_h(SUMMARY_PX);
            }
        }
    }
    (pieces, y + PAD)
}

/// Height a bottom band needs to show `legend` and `summary` at `width`.
pub fn estimate_bottom_legend_height_px(legend: &Legend, summary: &[String], width: i32) -> i32 {
    layout(legend, summary, LegendPlacement::Bottom, width).1
}

/// Draw legend entries (swatch + wrapped label) followed by the summary lines.
pub fn draw_legend_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    legend: &Legend,
    summary: &[String],
    placement: LegendPlacement,
) -> Result<()> {
    area.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    let (w, _) = area.dim_in_pixel();
    let (pieces, _) = layout(legend, summary, placement, w as i32);

    let top_left = |px: u32| {
        TextStyle::from((FontFamily::SansSerif, px)).pos(Pos::new(HPos::Left, VPos::Top))
    };
    let title_style = top_left(TITLE_PX);
    let entry_style = top_left(ENTRY_PX);
    let summary_style = top_left(SUMMARY_PX).color(&SUMMARY_GREY);

    for piece in &pieces {
        match piece {
            Piece::Title { x, y, text } => {
                area.draw(&Text::new(text.as_str(), (*x, *y), title_style.clone()))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
            Piece::Entry { x, y, color, lines } => {
                let sy = *y + (line_h(ENTRY_PX) - SWATCH) / 2;
                area.draw(&Rectangle::new(
                    [(*x, sy), (*x + SWATCH, sy + SWATCH)],
                    color.filled(),
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
                let tx = *x + SWATCH + SWATCH_GAP;
                for (i, line) in lines.iter().enumerate() {
                    area.draw(&Text::new(
                        line.as_str(),
                        (tx, *y + 2 + i as i32 * line_h(ENTRY_PX)),
                        entry_style.clone(),
                    ))
                    .map_err(|e| anyhow!("{:?}", e))?;
                }
            }
            Piece::Summary { x, y, text } => {
                area.draw(&Text::new(text.as_str(), (*x, *y), summary_style.clone()))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
        }
    }
    Ok(())
}
