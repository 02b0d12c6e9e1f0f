//! Text measurement and wrapping for legend and label layout.
//!
//! The SVG backend writes `<text>` elements without measuring glyphs, so widths are
//! estimated from the character count.

/// Approximate pixel width of `text` at `font_px`.
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

/// Cut `text` so it fits `max_px`, ending with an ellipsis when shortened.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let per_char = (font_px as f32 * 0.60).max(1.0);
    let fit = ((max_px as f32 / per_char).floor() as usize).saturating_sub(1);
    let mut out: String = text.chars().take(fit).collect();
    out.push('…');
    out
}

/// Wrap `text` into lines no wider than `max_px`.
///
/// Explicit newlines always break. Words longer than a line are split by characters.
pub fn wrap_text_to_width(text: &str, font_px: u32, max_px: u32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(paragraph, font_px, max_px, &mut lines);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn wrap_paragraph(text: &str, font_px: u32, max_px: u32, out: &mut Vec<String>) {
    let fits = |s: &str| estimate_text_width_px(s, font_px) <= max_px;
    let mut cur = String::new();
    for word in text.split_whitespace() {
        let candidate = if cur.is_empty() {
            word.to_string()
        } else {
            format!("{cur} {word}")
        };
        if fits(&candidate) {
            cur = candidate;
            continue;
        }
        if !cur.is_empty() {
            out.push(std::mem::take(&mut cur));
        }
        if fits(word) {
            cur = word.to_string();
            continue;
        }
        for ch in word.chars() {
            cur.push(ch);
            if !fits(&cur) && cur.chars().count() > 1 {
                cur.pop();
                out.push(std::mem::take(&mut cur));
                cur.push(ch);
            }
        }
    }
    if !cur.is_empty() {
        out.push(cur);
    }
}
