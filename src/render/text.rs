//! Line fitting for labels: single-line ellipsis and word wrap.

use crate::render::surface::{DrawSurface, FontSpec};

/// Default suffix appended to truncated text.
pub(crate) const DEFAULT_ELLIPSIS: &str = "...";

/// One laid-out line of text.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TextLine {
    pub(crate) text: String,
    pub(crate) width: f64,
    pub(crate) ellipsized: bool,
}

impl TextLine {
    fn measured(text: String, font: &FontSpec, surface: &dyn DrawSurface) -> Self {
        let width = surface.measure_text(&text, font).width;
        Self {
            text,
            width,
            ellipsized: false,
        }
    }
}

/// Fit `text` on one line of at most `width`, cutting it and appending `ellipsis` if needed.
pub(crate) fn fit_line(
    text: &str,
    width: f64,
    ellipsis: &str,
    font: &FontSpec,
    surface: &dyn DrawSurface,
) -> TextLine {
    if surface.measure_text(text, font).width <= width {
        return TextLine::measured(text.to_owned(), font, surface);
    }
    let text = ellipsize_line(text, width, ellipsis, font, surface);
    let mut line = TextLine::measured(text, font, surface);
    line.ellipsized = true;
    line
}

/// Longest prefix of `line` that still fits in `width` once `ellipsis` is appended.
pub(crate) fn ellipsize_line(
    line: &str,
    width: f64,
    ellipsis: &str,
    font: &FontSpec,
    surface: &dyn DrawSurface,
) -> String {
    let full = format!("{line}{ellipsis}");
    if surface.measure_text(&full, font).width <= width {
        return full;
    }
    let mut kept = String::new();
    for ch in line.chars() {
        let candidate = format!("{kept}{ch}{ellipsis}");
        if surface.measure_text(&candidate, font).width > width {
            break;
        }
        kept.push(ch);
    }
    kept.push_str(ellipsis);
    kept
}

/// Split `text` into whitespace and `-` delimited tokens, keeping the delimiters.
fn tokens(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() || ch == '-' {
            if start < i {
                out.push(&text[start..i]);
            }
            out.push(&text[i..i + ch.len_utf8()]);
            start = i + ch.len_utf8();
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

/// Break a word wider than `width` into pieces that each fit.
fn break_long_word(word: &str, width: f64, font: &FontSpec, surface: &dyn DrawSurface) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        current.push(ch);
        if surface.measure_text(&current, font).width > width && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(ch);
        }
    }
    pieces.push(current);
    pieces
}

/// Greedy word wrap at `width`. A `\n` always starts a new line; words too long for a line are
/// split between characters.
pub(crate) fn break_into_lines(
    text: &str,
    width: f64,
    font: &FontSpec,
    surface: &dyn DrawSurface,
) -> Vec<TextLine> {
    if text.is_empty() || width <= 0.0 {
        return Vec::new();
    }
    if !text.contains('\n') && surface.measure_text(text, font).width <= width {
        return vec![TextLine::measured(text.to_owned(), font, surface)];
    }

    let fits = |s: &str| surface.measure_text(s, font).width <= width;
    let mut lines = Vec::new();
    let mut current = String::new();
    for token in tokens(text) {
        if token == "\n" {
            push_line(&mut lines, &mut current, font, surface);
            continue;
        }
        let candidate = format!("{current}{token}");
        if fits(&candidate) {
            current = candidate;
        } else if token.trim().is_empty() {
            // Whitespace that overflows ends the line and is dropped.
            push_line(&mut lines, &mut current, font, surface);
        } else if !fits(token) {
            for piece in break_long_word(token, width, font, surface) {
                let candidate = format!("{current}{piece}");
                if fits(&candidate) {
                    current = candidate;
                } else {
                    push_line(&mut lines, &mut current, font, surface);
                    current = piece;
                }
            }
        } else {
            push_line(&mut lines, &mut current, font, surface);
            current = token.to_owned();
        }
    }
    push_line(&mut lines, &mut current, font, surface);
    lines
}

fn push_line(lines: &mut Vec<TextLine>, current: &mut String, font: &FontSpec, surface: &dyn DrawSurface) {
    let text = std::mem::take(current);
    lines.push(TextLine::measured(text.trim_end().to_owned(), font, surface));
}

/// Keep at most `max_lines`, ellipsizing the last kept line when any were dropped.
pub(crate) fn limit_lines(
    mut lines: Vec<TextLine>,
    max_lines: usize,
    width: f64,
    ellipsis: &str,
    font: &FontSpec,
    surface: &dyn DrawSurface,
) -> Vec<TextLine> {
    if lines.len() <= max_lines {
        return lines;
    }
    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        let text = ellipsize_line(&last.text, width, ellipsis, font, surface);
        *last = TextLine::measured(text, font, surface);
        last.ellipsized = true;
    }
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
