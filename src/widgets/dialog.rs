use crate::field::observer::ScriptHost;
use crate::foundation::core::Rect2D;
use crate::foundation::error::SceneResult;
use crate::graph::SceneGraph;
use crate::node::{KindState, NodeId, NodeKind};
use crate::render::pipeline::Frame;
use crate::render::surface::DrawSurface;
use crate::value::TypedValue;

/// Internal parts of a Dialog and the focus it took over.
#[derive(Clone, Debug)]
pub(crate) struct DialogState {
    background: NodeId,
    content: NodeId,
    title: NodeId,
    message: NodeId,
    buttons: NodeId,
    /// Node that held focus before the dialog grabbed it.
    pub(crate) last_focus: Option<NodeId>,
}

/// Fields of a Dialog that alias fields of its internal parts.
const LINKS: &[(&str, Part, &str)] = &[
    ("title", Part::Title, "text"),
    ("message", Part::Message, "text"),
    ("buttons", Part::Buttons, "buttons"),
    ("buttonSelected", Part::Buttons, "buttonSelected"),
    ("buttonFocused", Part::Buttons, "buttonFocused"),
    ("focusButton", Part::Buttons, "focusButton"),
];

#[derive(Clone, Copy, Debug)]
enum Part {
    Title,
    Message,
    Buttons,
}

impl DialogState {
    fn part(&self, part: Part) -> NodeId {
        match part {
            Part::Title => self.title,
            Part::Message => self.message,
            Part::Buttons => self.buttons,
        }
    }
}

/// Backdrop dimming color, opaque black.
const BACKDROP_COLOR: i32 = 0x0000_00ff;

impl SceneGraph {
    /// Build the internal parts of a freshly created Dialog.
    pub(crate) fn build_dialog(&mut self, id: NodeId) {
        match self.assemble_dialog(id) {
            Ok(state) => {
                if let Some(data) = self.try_node_mut(id) {
                    data.state = KindState::Dialog(state);
                }
            }
            Err(err) => tracing::warn!(node = %id, error = %err, "dialog parts not built"),
        }
    }

    fn assemble_dialog(&mut self, id: NodeId) -> SceneResult<DialogState> {
        let res = self.opts().resolution;
        let gap = res.pick(12.0, 18.0);

        let background = self.create_node(NodeKind::Rectangle);
        let content = self.create_node(NodeKind::LayoutGroup);
        self.put_silent(content, "horizalignment", TypedValue::string("center"));
        self.put_silent(content, "focusable", TypedValue::Boolean(false));
        self.put_silent(
            content,
            "itemspacings",
            TypedValue::array(vec![TypedValue::Float(gap as f32)]),
        );

        let title = self.create_node(NodeKind::Label);
        self.put_silent(title, "horizalign", TypedValue::string("center"));
        self.put_silent(title, "font", TypedValue::string("font:LargeBoldSystemFont"));
        let message = self.create_node(NodeKind::Label);
        self.put_silent(message, "wrap", TypedValue::Boolean(true));
        let buttons = self.create_node(NodeKind::ButtonGroup);

        for (parent, child) in [
            (id, background),
            (id, content),
            (content, title),
            (content, message),
            (content, buttons),
        ] {
            self.append_child(parent, child)?;
            self.release(child)?;
        }
        self.put_silent(id, "buttongroup", TypedValue::Node(buttons));

        let state = DialogState {
            background,
            content,
            title,
            message,
            buttons,
            last_focus: None,
        };
        for (name, part, target) in LINKS {
            self.link_field(id, name, state.part(*part), target)?;
        }
        Ok(state)
    }

    fn dialog_state(&self, id: NodeId) -> Option<DialogState> {
        self.try_node(id)?.state.dialog().cloned()
    }

    fn dialog_has_buttons(&self, state: &DialogState) -> bool {
        self.peek(state.buttons, "buttons")
            .is_some_and(|b| !b.strings().is_empty())
    }

    /// Size and center the dialog around the content measured on the previous frame.
    pub(crate) fn dialog_before_render(
        &mut self,
        id: NodeId,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<()> {
        let Some(state) = self.dialog_state(id) else {
            return Ok(());
        };
        let res = self.opts().resolution;
        let scene = res.scene_rect();
        let pad = res.pick(30.0, 45.0);
        let min_height = res.pick(144.0, 216.0);

        let declared = self.peek_f64(id, "width");
        let width = if declared > 0.0 {
            declared
        } else {
            res.pick(700.0, 1050.0)
        };
        let inner = (width - pad * 2.0).max(0.0);

        let title_color = self.peek_i64(id, "titlecolor") as i32;
        let message_color = self.peek_i64(id, "messagecolor") as i32;
        self.put_if_changed(state.title, "width", TypedValue::Float(inner as f32));
        self.put_if_changed(state.title, "color", TypedValue::Color(title_color));
        self.put_if_changed(state.message, "width", TypedValue::Float(inner as f32));
        self.put_if_changed(state.message, "color", TypedValue::Color(message_color));
        self.put_if_changed(state.buttons, "minwidth", TypedValue::Float(inner as f32));
        self.put_if_changed(state.buttons, "maxwidth", TypedValue::Float(inner as f32));

        let content = self.node(state.content)?.rects.local;
        let content_height = if content.is_finite() {
            content.height
        } else {
            0.0
        };
        let mut height = (content_height + pad * 2.0).max(min_height);
        let max_height = self.peek_f64(id, "maxheight");
        if max_height > 0.0 {
            height = height.min(max_height);
        }
        let x = scene.x + (scene.width - width) / 2.0;
        let y = scene.y + (scene.height - height) / 2.0;

        let background_color = self.peek_i64(id, "backgroundcolor") as i32;
        self.put_if_changed(state.background, "width", TypedValue::Float(width as f32));
        self.put_if_changed(state.background, "height", TypedValue::Float(height as f32));
        self.put_if_changed(state.background, "color", TypedValue::Color(background_color));
        self.put_if_changed(state.background, "translation", TypedValue::vec2(x, y));
        self.put_if_changed(
            state.content,
            "translation",
            TypedValue::vec2(x + width / 2.0, y + pad),
        );

        let focused = self.focused();
        if self.dialog_has_buttons(&state)
            && state.last_focus.is_none()
            && focused.is_some_and(|f| !self.path_to_root(f).contains(&id))
        {
            self.set_focus(id, true, host)?;
        }
        Ok(())
    }

    /// Dim the whole scene behind the dialog.
    pub(crate) fn draw_dialog_backdrop(&self, frame: Frame, surface: &mut dyn DrawSurface) {
        let scene: Rect2D = self.opts().resolution.scene_rect();
        surface.draw_rotated_rect(
            scene,
            BACKDROP_COLOR,
            0.0,
            crate::foundation::core::Vec2::ZERO,
            0.5 * frame.opacity,
        );
    }

    /// Where focus goes when a Dialog is focused while `old` holds it.
    ///
    /// A dialog with buttons remembers `old` and hands focus to its ButtonGroup.
    pub(crate) fn dialog_focus_target(&mut self, id: NodeId, old: Option<NodeId>) -> Option<NodeId> {
        let old = old?;
        if self.path_to_root(old).contains(&id) {
            return None;
        }
        let state = self.dialog_state(id)?;
        if state.last_focus.is_some() || !self.dialog_has_buttons(&state) {
            return None;
        }
        let dialog = self.try_node_mut(id)?.state.dialog_mut()?;
        dialog.last_focus = Some(old);
        tracing::debug!(node = %id, previous = %old, "dialog took focus");
        Some(state.buttons)
    }

    /// Hide the dialog and give focus back to the node that held it before.
    pub(crate) fn close_dialog(&mut self, id: NodeId, host: &mut dyn ScriptHost) -> SceneResult<()> {
        self.set(id, "visible", TypedValue::Boolean(false), host)?;
        let last = self
            .node_mut(id)?
            .state
            .dialog_mut()
            .and_then(|d| d.last_focus.take());
        if let Some(last) = last
            && self.is_alive(last)
        {
            self.set_focus(last, true, host)?;
        }
        Ok(())
    }

    /// `back` (and `options` on an options dialog) closes; other keys go to the buttons.
    ///
    /// A dialog is modal, so every key stops here.
    pub(crate) fn dialog_key(
        &mut self,
        id: NodeId,
        key: &str,
        press: bool,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<bool> {
        let options = self.peek_bool(id, "optionsdialog", false);
        if press && (key == "back" || (key == "options" && options)) {
            self.set(id, "close", TypedValue::Boolean(true), host)?;
            return Ok(true);
        }
        if let Some(state) = self.dialog_state(id)
            && self.dialog_has_buttons(&state)
            && !self.is_in_focus_chain(state.buttons)
        {
            self.button_group_key(state.buttons, key, press, host)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/dialog.rs"]
mod tests;
