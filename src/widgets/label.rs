use crate::field::observer::ScriptHost;
use crate::foundation::core::{Point, Rect2D};
use crate::foundation::error::SceneResult;
use crate::graph::SceneGraph;
use crate::node::NodeId;
use crate::render::surface::{DrawSurface, FontSpec};
use crate::render::text::{DEFAULT_ELLIPSIS, TextLine, break_into_lines, fit_line, limit_lines};
use crate::value::TypedValue;

/// Text layout inputs read from a Label's fields.
#[derive(Clone, Debug)]
struct LabelStyle {
    text: String,
    font: FontSpec,
    color: i32,
    horiz_align: String,
    vert_align: String,
    ellipsis: String,
    wrap: bool,
    num_lines: i64,
    max_lines: i64,
    line_spacing: f64,
    display_partial_lines: bool,
}

impl LabelStyle {
    fn read(graph: &SceneGraph, id: NodeId) -> Self {
        let ellipsis = graph.peek_str(id, "ellipsistext");
        Self {
            text: graph.peek_str(id, "text").to_owned(),
            font: FontSpec::resolve(graph.peek_str(id, "font"), graph.opts()),
            color: graph.peek_i64(id, "color") as i32,
            horiz_align: graph.peek_str(id, "horizalign").to_ascii_lowercase(),
            vert_align: graph.peek_str(id, "vertalign").to_ascii_lowercase(),
            ellipsis: if ellipsis.is_empty() {
                DEFAULT_ELLIPSIS.to_owned()
            } else {
                ellipsis.to_owned()
            },
            wrap: graph.peek_bool(id, "wrap", false),
            num_lines: graph.peek_i64(id, "numlines"),
            max_lines: graph.peek_i64(id, "maxlines"),
            line_spacing: graph.peek_f64(id, "linespacing"),
            display_partial_lines: graph.peek_bool(id, "displaypartiallines", false),
        }
    }

    fn horiz_offset(&self, available: f64, used: f64) -> f64 {
        if available <= used {
            return 0.0;
        }
        match self.horiz_align.as_str() {
            "center" => (available - used) / 2.0,
            "right" => available - used,
            _ => 0.0,
        }
    }

    fn vert_offset(&self, available: f64, used: f64) -> f64 {
        if available <= used {
            return 0.0;
        }
        match self.vert_align.as_str() {
            "center" => (available - used) / 2.0,
            "bottom" => available - used,
            _ => 0.0,
        }
    }
}

/// Lines chosen for a label and the height they occupy.
#[derive(Clone, Debug, Default)]
struct LabelLayout {
    lines: Vec<TextLine>,
    width: f64,
    height: f64,
}

impl LabelLayout {
    fn ellipsized(&self) -> bool {
        self.lines.iter().any(|l| l.ellipsized)
    }
}

fn stacked_height(lines: usize, line_height: f64, spacing: f64) -> f64 {
    match lines {
        0 => 0.0,
        n => n as f64 * line_height + (n - 1) as f64 * spacing,
    }
}

fn layout_single(style: &LabelStyle, rect: Rect2D, surface: &dyn DrawSurface) -> LabelLayout {
    let line = if rect.width == 0.0 {
        let first = style.text.split('\n').next().unwrap_or_default();
        let width = surface.measure_text(first, &style.font).width;
        TextLine {
            text: first.to_owned(),
            width,
            ellipsized: false,
        }
    } else {
        fit_line(&style.text, rect.width, &style.ellipsis, &style.font, surface)
    };
    let height = surface.measure_text(&line.text, &style.font).height;
    LabelLayout {
        width: line.width,
        height,
        lines: vec![line],
    }
}

fn layout_wrapped(style: &LabelStyle, rect: Rect2D, surface: &dyn DrawSurface) -> LabelLayout {
    if rect.width <= 0.0 {
        return LabelLayout::default();
    }
    let font = &style.font;
    let line_height = surface.line_height(font);
    let spacing = style.line_spacing;
    let lines = break_into_lines(&style.text, rect.width, font, surface);
    let all = lines.len();

    let (lines, height) = if rect.height > 0.0 {
        let fit = ((rect.height + spacing) / (line_height + spacing)).floor().max(0.0) as usize;
        let kept = limit_lines(lines, fit, rect.width, &style.ellipsis, font, surface);
        let height = if !style.display_partial_lines && kept.len() < all {
            stacked_height(kept.len(), line_height, spacing)
        } else {
            stacked_height(all, line_height, spacing).min(rect.height)
        };
        (kept, height)
    } else if style.num_lines > 0 || style.max_lines > 0 {
        let limit = if style.num_lines > 0 {
            style.num_lines
        } else {
            style.max_lines
        } as usize;
        let kept = limit_lines(lines, limit, rect.width, &style.ellipsis, font, surface);
        let height = stacked_height(all, line_height, spacing)
            .min(stacked_height(limit, line_height, spacing));
        (kept, height)
    } else {
        (lines, stacked_height(all, line_height, spacing))
    };

    LabelLayout {
        lines,
        width: rect.width,
        height,
    }
}

impl SceneGraph {
    /// Draw a Label into `rect` and return the rectangle it occupies.
    ///
    /// The occupied size is the larger of the declared and the measured size. The
    /// `isTextEllipsized` field is refreshed on every draw.
    pub(crate) fn draw_label(
        &mut self,
        id: NodeId,
        rect: Rect2D,
        rotation: f64,
        opacity: f64,
        surface: &mut dyn DrawSurface,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<Rect2D> {
        let style = LabelStyle::read(self, id);
        let layout = if style.wrap {
            layout_wrapped(&style, rect, surface)
        } else {
            layout_single(&style, rect, surface)
        };

        let line_height = surface.line_height(&style.font);
        let mut y = rect.y + style.vert_offset(rect.height, layout.height);
        for line in &layout.lines {
            if !line.text.is_empty() {
                let x = rect.x + style.horiz_offset(rect.width, line.width);
                surface.draw_rotated_text(
                    &line.text,
                    Point::new(x, y),
                    style.color,
                    opacity,
                    &style.font,
                    rotation,
                );
            }
            y += line_height + style.line_spacing;
        }

        self.publish_ellipsized(id, layout.ellipsized(), host)?;
        Ok(Rect2D::new(
            rect.x,
            rect.y,
            layout.width.max(rect.width),
            layout.height.max(rect.height),
        ))
    }

    fn publish_ellipsized(
        &mut self,
        id: NodeId,
        ellipsized: bool,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<()> {
        let key = "istextellipsized";
        let Some(field) = self.field_mut(id, key) else {
            return Ok(());
        };
        if field.set_value(TypedValue::Boolean(ellipsized), true, false) {
            self.notify(id, key, host)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/label.rs"]
mod tests;
