use crate::field::observer::ScriptHost;
use crate::foundation::error::SceneResult;
use crate::graph::SceneGraph;
use crate::node::{NodeId, NodeKind};
use crate::render::surface::FontSpec;
use crate::value::TypedValue;

/// Focus and rebuild bookkeeping of a ButtonGroup.
#[derive(Clone, Debug, Default)]
pub(crate) struct ButtonState {
    /// Index of the button that holds focus.
    pub(crate) focus_index: usize,
    /// Key whose press was handled; its release is swallowed.
    last_press_handled: Option<String>,
    /// The button labels must be rebuilt before the next render.
    pub(crate) refresh: bool,
}

impl SceneGraph {
    fn button_count(&self, id: NodeId) -> usize {
        self.peek(id, "buttons").map_or(0, |b| b.strings().len())
    }

    /// Rebuild one Label per entry of `buttons`, reusing existing children.
    pub(crate) fn refresh_buttons(&mut self, id: NodeId) -> SceneResult<()> {
        let Some(state) = self.node_mut(id)?.state.buttons_mut() else {
            return Ok(());
        };
        if !state.refresh {
            return Ok(());
        }
        state.refresh = false;
        let focus_index = state.focus_index;

        let texts = self
            .peek(id, "buttons")
            .map(TypedValue::strings)
            .unwrap_or_default();
        let text_font = self.peek_str(id, "textfont").to_owned();
        let focused_font = self.peek_str(id, "focusedtextfont").to_owned();
        let text_color = self.peek_i64(id, "textcolor") as i32;
        let focused_color = self.peek_i64(id, "focusedtextcolor") as i32;
        let height = self.peek_f64(id, "buttonheight");
        let align = if self.peek_bool(id, "rightjustify", false) {
            "right"
        } else {
            "left"
        };
        let width = self.button_width(id, &texts, &focused_font);
        let has_focus = self.is_in_focus_chain(id);

        let existing = self.node(id)?.children.clone();
        for (i, text) in texts.iter().enumerate() {
            let label = match existing.get(i) {
                Some(label) => *label,
                None => {
                    let label = self.create_node(NodeKind::Label);
                    self.append_child(id, label)?;
                    self.release(label)?;
                    label
                }
            };
            let focused = has_focus && i == focus_index;
            let (font, color) = if focused {
                (focused_font.as_str(), focused_color)
            } else {
                (text_font.as_str(), text_color)
            };
            self.put_if_changed(label, "text", TypedValue::string(text.as_str()));
            self.put_if_changed(label, "font", TypedValue::string(font));
            self.put_if_changed(label, "color", TypedValue::Color(color));
            self.put_if_changed(label, "width", TypedValue::Float(width as f32));
            self.put_if_changed(label, "height", TypedValue::Float(height as f32));
            self.put_if_changed(label, "horizalign", TypedValue::string(align));
            self.put_if_changed(label, "vertalign", TypedValue::string("center"));
        }
        if existing.len() > texts.len() {
            self.remove_children_at(id, texts.len(), existing.len() - texts.len())?;
        }
        tracing::trace!(node = %id, buttons = texts.len(), "buttons rebuilt");
        Ok(())
    }

    /// Common button width: the widest label plus margins, clamped to `minWidth..=maxWidth`.
    fn button_width(&self, id: NodeId, texts: &[String], font_ref: &str) -> f64 {
        let margin = self.opts().resolution.pick(24.0, 36.0);
        let min_width = self.peek_f64(id, "minwidth");
        let max_width = self.peek_f64(id, "maxwidth");
        let font = FontSpec::resolve(font_ref, self.opts());
        // Monospace estimate; labels re-measure with the real surface when drawn.
        let widest = texts
            .iter()
            .map(|t| t.chars().count() as f64 * font.size * 0.5)
            .fold(min_width - margin * 2.0, f64::max);
        (widest + margin * 2.0).min(max_width)
    }

    /// `focusButton` moves focus to a valid index and republishes it as `buttonFocused`.
    pub(crate) fn focus_button_changed(
        &mut self,
        id: NodeId,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<()> {
        let requested = self.peek_i64(id, "focusbutton");
        let Ok(index) = usize::try_from(requested) else {
            return Ok(());
        };
        if index >= self.button_count(id) {
            return Ok(());
        }
        if let Some(state) = self.node_mut(id)?.state.buttons_mut() {
            state.focus_index = index;
            state.refresh = true;
        }
        self.set(id, "buttonfocused", TypedValue::Int32(index as i32), host)?;
        Ok(())
    }

    /// `up`/`down` move focus, `OK` selects; the release of a handled press is swallowed.
    pub(crate) fn button_group_key(
        &mut self,
        id: NodeId,
        key: &str,
        press: bool,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<bool> {
        let Some(state) = self.node_mut(id)?.state.buttons_mut() else {
            return Ok(false);
        };
        if !press && state.last_press_handled.as_deref() == Some(key) {
            state.last_press_handled = None;
            return Ok(true);
        }
        let focus_index = state.focus_index;

        let count = self.button_count(id) as i64;
        let handled = match key {
            "up" | "down" if press && count > 0 => {
                let step = if key == "up" { -1 } else { 1 };
                let next = (self.peek_i64(id, "buttonfocused") + step).clamp(0, count - 1);
                if next as usize != focus_index {
                    self.set(id, "focusbutton", TypedValue::Int32(next as i32), host)?;
                    true
                } else {
                    false
                }
            }
            k if press && k.eq_ignore_ascii_case("ok") => {
                self.set(id, "buttonselected", TypedValue::Int32(focus_index as i32), host)?;
                true
            }
            _ => false,
        };

        if let Some(state) = self.node_mut(id)?.state.buttons_mut() {
            state.last_press_handled = handled.then(|| key.to_owned());
        }
        Ok(handled)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/button_group.rs"]
mod tests;
