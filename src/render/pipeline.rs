use crate::field::observer::ScriptHost;
use crate::foundation::core::{Rect2D, Vec2, rotate_translation};
use crate::foundation::error::SceneResult;
use crate::graph::SceneGraph;
use crate::node::{BoundingRects, NodeId, NodeKind, RectSpace};
use crate::render::surface::{DrawSurface, MeasureOnly};

/// Transform state handed from a parent to its children.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Frame {
    pub(crate) origin: Vec2,
    pub(crate) angle: f64,
    pub(crate) opacity: f64,
}

impl Frame {
    const ROOT: Frame = Frame {
        origin: Vec2::ZERO,
        angle: 0.0,
        opacity: 1.0,
    };
}

impl SceneGraph {
    /// Render one frame of the tree rooted at `root`, starting from the scene origin.
    #[tracing::instrument(level = "debug", skip(self, surface, host))]
    pub fn render(
        &mut self,
        root: NodeId,
        surface: &mut dyn DrawSurface,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<()> {
        self.render_at(root, Frame::ROOT, surface, host)
    }

    /// Render `id` and its subtree with an explicit parent transform.
    pub fn render_node(
        &mut self,
        id: NodeId,
        origin: Vec2,
        angle: f64,
        opacity: f64,
        surface: &mut dyn DrawSurface,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<()> {
        let frame = Frame {
            origin,
            angle,
            opacity,
        };
        self.render_at(id, frame, surface, host)
    }

    fn render_at(
        &mut self,
        id: NodeId,
        frame: Frame,
        surface: &mut dyn DrawSurface,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<()> {
        let kind = self.node(id)?.kind;
        if kind == NodeKind::Node {
            return self.render_children(id, frame, surface, host);
        }
        if !self.peek_bool(id, "visible", true) {
            return Ok(());
        }
        match kind {
            NodeKind::Node | NodeKind::Group => self.render_container(id, frame, surface, host),
            NodeKind::LayoutGroup => {
                self.layout_before_render(id, host)?;
                self.render_container(id, frame, surface, host)?;
                self.layout_after_render(id);
                Ok(())
            }
            NodeKind::ButtonGroup => {
                self.refresh_buttons(id)?;
                self.layout_before_render(id, host)?;
                self.render_container(id, frame, surface, host)?;
                self.layout_after_render(id);
                Ok(())
            }
            NodeKind::Dialog => {
                self.dialog_before_render(id, host)?;
                self.draw_dialog_backdrop(frame, surface);
                self.render_container(id, frame, surface, host)
            }
            NodeKind::Rectangle | NodeKind::Label | NodeKind::Poster => {
                self.render_leaf(id, kind, frame, surface, host)
            }
        }
    }

    /// Render children in order, then clear the node's `changed` flag.
    fn render_children(
        &mut self,
        id: NodeId,
        frame: Frame,
        surface: &mut dyn DrawSurface,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<()> {
        let children = self.node(id)?.children.clone();
        for child in children {
            if self.is_alive(child) {
                self.render_at(child, frame, surface, host)?;
            }
        }
        if let Some(data) = self.try_node_mut(id) {
            data.changed = false;
        }
        Ok(())
    }

    /// Translation adjusted so that scaling pivots around `scaleRotateCenter`.
    pub(crate) fn effective_translation(&self, id: NodeId) -> Vec2 {
        let translation = self.peek_vec2(id, "translation", Vec2::ZERO);
        let scale = self.peek_vec2(id, "scale", Vec2::new(1.0, 1.0));
        let center = self.peek_vec2(id, "scalerotatecenter", Vec2::ZERO);
        Vec2::new(
            translation.x - center.x * (scale.x - 1.0),
            translation.y - center.y * (scale.y - 1.0),
        )
    }

    fn own_opacity(&self, id: NodeId) -> f64 {
        self.peek(id, "opacity")
            .and_then(crate::value::TypedValue::as_f64)
            .unwrap_or(1.0)
    }

    fn render_container(
        &mut self,
        id: NodeId,
        frame: Frame,
        surface: &mut dyn DrawSurface,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<()> {
        let node_trans = self.effective_translation(id);
        let draw_trans = node_trans + frame.origin;
        let inner = Frame {
            origin: draw_trans,
            angle: frame.angle + self.peek_f64(id, "rotation"),
            opacity: frame.opacity * self.own_opacity(id),
        };
        // Children union their parent-space extents into these seeds as they render.
        self.node_mut(id)?.rects = BoundingRects {
            local: Rect2D::UNBOUNDED,
            to_parent: Rect2D::new(node_trans.x, node_trans.y, 0.0, 0.0),
            to_scene: Rect2D::new(draw_trans.x, draw_trans.y, 0.0, 0.0),
        };

        let clip = self
            .peek(id, "clippingrect")
            .and_then(crate::value::TypedValue::as_rect)
            .filter(Rect2D::has_area)
            .map(|r| r.translate(draw_trans));
        if let Some(rect) = clip {
            surface.push_clip(rect);
        }
        self.render_children(id, inner, surface, host)?;
        if clip.is_some() {
            surface.pop_clip();
        }

        self.update_parent_rects(id, frame);
        self.node_mut(id)?.dirty = false;
        Ok(())
    }

    fn render_leaf(
        &mut self,
        id: NodeId,
        kind: NodeKind,
        frame: Frame,
        surface: &mut dyn DrawSurface,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<()> {
        let node_trans = self.effective_translation(id);
        let draw_trans = rotate_translation(node_trans, frame.angle) + frame.origin;
        let rotation = frame.angle + self.peek_f64(id, "rotation");
        let opacity = frame.opacity * self.own_opacity(id);
        let declared = Rect2D::new(
            draw_trans.x,
            draw_trans.y,
            self.peek_f64(id, "width"),
            self.peek_f64(id, "height"),
        );

        let rect = match kind {
            NodeKind::Label => self.draw_label(id, declared, rotation, opacity, surface, host)?,
            NodeKind::Poster => self.draw_poster(id, declared, rotation, opacity, surface, host)?,
            _ => {
                let color = self.peek_i64(id, "color") as i32;
                let center = self.peek_vec2(id, "scalerotatecenter", Vec2::ZERO);
                surface.draw_rotated_rect(declared, color, rotation, center, opacity);
                declared
            }
        };

        self.update_bounding_rects(id, rect, frame.origin, rotation)?;
        let inner = Frame {
            origin: draw_trans,
            angle: rotation,
            opacity,
        };
        self.render_children(id, inner, surface, host)?;
        self.update_parent_rects(id, frame);
        self.node_mut(id)?.dirty = false;
        Ok(())
    }

    /// Cache a leaf's rectangles from the rectangle it was drawn into.
    ///
    /// The parent-space rectangle reconciles the composed `rotation` with the node's own
    /// declared rotation: when they match the scene rectangle is reused, otherwise the node's
    /// extent is rotated by its own angle only.
    fn update_bounding_rects(
        &mut self,
        id: NodeId,
        draw_rect: Rect2D,
        origin: Vec2,
        rotation: f64,
    ) -> SceneResult<()> {
        let node_trans = self.effective_translation(id);
        let node_rotation = self.peek_f64(id, "rotation");
        let center = self.peek_vec2(id, "scalerotatecenter", Vec2::ZERO);
        let extent = Rect2D::new(0.0, 0.0, draw_rect.width, draw_rect.height);

        let (to_scene, to_parent) = if rotation != 0.0 {
            let to_scene = draw_rect.rotated(rotation, center);
            let to_parent = if node_rotation != 0.0 && node_rotation == rotation {
                to_scene.translate(-origin)
            } else if node_rotation != 0.0 {
                extent.rotated(node_rotation, center).translate(node_trans)
            } else {
                extent.translate(node_trans)
            };
            (to_scene, to_parent)
        } else {
            (draw_rect, extent.translate(node_trans))
        };

        self.node_mut(id)?.rects = BoundingRects {
            local: extent,
            to_parent,
            to_scene,
        };
        Ok(())
    }

    /// Union this node's parent-space rectangle into its parent's cached rectangles.
    fn update_parent_rects(&mut self, id: NodeId, frame: Frame) {
        let Some(data) = self.try_node(id) else {
            return;
        };
        let contribution = data.rects.to_parent;
        let Some(parent) = data.parent else {
            return;
        };
        if !self.try_node(parent).is_some_and(|p| p.kind.is_group()) {
            return;
        }
        let parent_trans = self.effective_translation(parent);
        let center = self.peek_vec2(parent, "scalerotatecenter", Vec2::ZERO);
        let Some(p) = self.try_node_mut(parent) else {
            return;
        };

        p.rects.local = p.rects.local.union(contribution);
        let local = p.rects.local;
        let mut rect = Rect2D::new(
            parent_trans.x + local.x,
            parent_trans.y + local.y,
            local.width,
            local.height,
        );
        if frame.angle != 0.0 {
            let rotated = Rect2D::new(0.0, 0.0, local.width, local.height).rotated(frame.angle, center);
            rect = Rect2D::new(
                rect.x + rotated.x,
                rect.y + rotated.y,
                rotated.width,
                rotated.height,
            );
        }
        p.rects.to_parent = p.rects.to_parent.union(rect);
        p.rects.to_scene = p.rects.to_scene.union(rect.translate(frame.origin - parent_trans));
    }

    /// Refresh geometry by rendering `id`'s whole tree without drawing, then read one rectangle.
    pub fn bounding_rect(
        &mut self,
        id: NodeId,
        space: RectSpace,
        surface: &dyn DrawSurface,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<Rect2D> {
        self.node(id)?;
        let root = self.root_of(id);
        let mut measure = MeasureOnly::new(surface);
        self.render_at(root, Frame::ROOT, &mut measure, host)?;
        Ok(self.node(id)?.rects.get(space))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
