use std::collections::HashMap;

use crate::field::observer::ScriptHost;
use crate::foundation::core::{Size, Vec2};
use crate::foundation::error::SceneResult;
use crate::foundation::math::{Fnv1a64, nearly_equal};
use crate::graph::SceneGraph;
use crate::node::NodeId;
use crate::value::TypedValue;

/// Stacking axis of a LayoutGroup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Direction {
    Horiz,
    #[default]
    Vert,
}

impl Direction {
    pub(crate) fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "horiz" | "horizontal" => Self::Horiz,
            _ => Self::Vert,
        }
    }
}

/// Alignment along one axis. `Start` is left/top, `End` is right/bottom.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Align {
    #[default]
    Start,
    Center,
    End,
    Custom,
}

impl Align {
    fn parse(s: &str, start: &str, end: &str) -> Self {
        let s = s.trim().to_ascii_lowercase();
        if s == start {
            Self::Start
        } else if s == end {
            Self::End
        } else if s == "center" {
            Self::Center
        } else if s == "custom" {
            Self::Custom
        } else {
            Self::Start
        }
    }

    /// Where content of `extent` starts relative to the group origin.
    fn start_offset(self, extent: f64) -> f64 {
        match self {
            Self::Center => -extent / 2.0,
            Self::End => -extent,
            Self::Start | Self::Custom => 0.0,
        }
    }
}

/// One child's extent along both axes and where it currently starts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct ChildMetrics {
    pub(crate) primary: f64,
    pub(crate) cross: f64,
    pub(crate) primary_start: f64,
    pub(crate) cross_start: f64,
}

impl ChildMetrics {
    fn size(&self, direction: Direction) -> Size {
        match direction {
            Direction::Horiz => Size::new(self.primary, self.cross),
            Direction::Vert => Size::new(self.cross, self.primary),
        }
    }

    /// Extents match; where the child starts is not compared.
    fn same_extent(&self, other: &Self, eps: f64) -> bool {
        nearly_equal(self.primary, other.primary, eps) && nearly_equal(self.cross, other.cross, eps)
    }
}

fn sizes_close(a: Size, b: Size, eps: f64) -> bool {
    nearly_equal(a.width, b.width, eps) && nearly_equal(a.height, b.height, eps)
}

/// Placement inputs read from a LayoutGroup's fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct LayoutConfig {
    pub(crate) direction: Direction,
    pub(crate) primary_align: Align,
    pub(crate) cross_align: Align,
    pub(crate) spacings: Vec<f64>,
    pub(crate) add_spacing_after: bool,
}

impl LayoutConfig {
    fn read(graph: &SceneGraph, id: NodeId) -> Self {
        let direction = Direction::parse(graph.peek_str(id, "layoutdirection"));
        let horiz = Align::parse(graph.peek_str(id, "horizalignment"), "left", "right");
        let vert = Align::parse(graph.peek_str(id, "vertalignment"), "top", "bottom");
        let (primary, cross) = match direction {
            Direction::Horiz => (horiz, vert),
            Direction::Vert => (vert, horiz),
        };
        let primary_align = if primary == Align::Custom {
            Align::Start
        } else {
            primary
        };
        let spacings = graph
            .peek(id, "itemspacings")
            .and_then(TypedValue::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|v| v.as_f64().filter(|n| n.is_finite()).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            direction,
            primary_align,
            cross_align: cross,
            spacings,
            add_spacing_after: graph.peek_bool(id, "additemspacingafterchild", true),
        }
    }

    fn spacing(&self, index: usize) -> f64 {
        match self.spacings.len() {
            0 => 0.0,
            n => self.spacings[index.min(n - 1)],
        }
    }
}

/// Target position of one child.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Placement {
    /// Where the child must start along the stacking axis.
    pub(crate) primary: f64,
    /// Where the child must start across it; `None` leaves the cross axis alone.
    pub(crate) cross: Option<f64>,
}

/// Stack `metrics` along the configured axis.
pub(crate) fn plan_placements(config: &LayoutConfig, metrics: &[ChildMetrics]) -> Vec<Placement> {
    let count = metrics.len();
    let mut total = 0.0;
    for (i, m) in metrics.iter().enumerate() {
        let spacing = config.spacing(i);
        if !config.add_spacing_after {
            total += spacing;
        }
        total += m.primary;
        if config.add_spacing_after {
            total += spacing;
        }
    }

    let mut offset = config.primary_align.start_offset(total);
    let mut placements = Vec::with_capacity(count);
    for (i, m) in metrics.iter().enumerate() {
        let spacing = config.spacing(i);
        if !config.add_spacing_after {
            offset += spacing;
        }
        let cross = match config.cross_align {
            Align::Custom => None,
            align => Some(align.start_offset(m.cross)),
        };
        placements.push(Placement {
            primary: offset,
            cross,
        });
        offset += m.primary;
        if config.add_spacing_after {
            offset += spacing;
        }
    }
    placements
}

/// Order-sensitive hash of the spacing list; any change forces a relayout.
pub(crate) fn spacing_signature(spacings: &[f64]) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_u64(spacings.len() as u64);
    for s in spacings {
        h.write_f64(*s);
    }
    h.finish()
}

/// Per-LayoutGroup bookkeeping carried between frames.
#[derive(Debug)]
pub(crate) struct LayoutState {
    /// Placement must be recomputed before the next render.
    pub(crate) dirty: bool,
    child_sizes: HashMap<NodeId, Size>,
    used_this_pass: Option<HashMap<NodeId, ChildMetrics>>,
    /// `u64::MAX` until the first pass so the first frame always lays out.
    spacing_signature: u64,
    last_child_count: usize,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            dirty: true,
            child_sizes: HashMap::new(),
            used_this_pass: None,
            spacing_signature: u64::MAX,
            last_child_count: 0,
        }
    }
}

impl LayoutState {
    fn cached_size(&self, child: NodeId) -> Option<Size> {
        self.child_sizes.get(&child).copied()
    }
}

impl SceneGraph {
    /// Children taking part in layout: every child that has geometry.
    fn layout_children(&self, id: NodeId) -> Vec<NodeId> {
        let Some(data) = self.try_node(id) else {
            return Vec::new();
        };
        data.children
            .iter()
            .copied()
            .filter(|c| self.try_node(*c).is_some_and(|n| n.kind.is_group()))
            .collect()
    }

    fn layout_state(&self, id: NodeId) -> Option<&LayoutState> {
        match &self.try_node(id)?.state {
            crate::node::KindState::Layout(layout)
            | crate::node::KindState::ButtonGroup(layout, _) => Some(layout),
            _ => None,
        }
    }

    /// Best current estimate of a child's extent, in the parent's coordinates.
    ///
    /// Prefers the child's last rendered rectangles; before a child has rendered its declared
    /// width/height are used, falling back per axis to the size seen on a previous frame.
    fn measure_child(&self, parent: NodeId, child: NodeId, direction: Direction) -> ChildMetrics {
        let rects = self.try_node(child).map(|n| n.rects).unwrap_or_default();
        let rect = if rects.local.has_area() {
            rects.local.translate(self.effective_translation(child))
        } else if rects.to_parent.has_area() {
            rects.to_parent
        } else {
            let cached = self
                .layout_state(parent)
                .and_then(|s| s.cached_size(child))
                .unwrap_or(Size::ZERO);
            let width = self.peek_f64(child, "width");
            let height = self.peek_f64(child, "height");
            let t = self.peek_vec2(child, "translation", Vec2::ZERO);
            crate::foundation::core::Rect2D::new(
                t.x,
                t.y,
                if width > 0.0 { width } else { cached.width },
                if height > 0.0 { height } else { cached.height },
            )
        };
        match direction {
            Direction::Horiz => ChildMetrics {
                primary: rect.width,
                cross: rect.height,
                primary_start: rect.x,
                cross_start: rect.y,
            },
            Direction::Vert => ChildMetrics {
                primary: rect.height,
                cross: rect.width,
                primary_start: rect.y,
                cross_start: rect.x,
            },
        }
    }

    /// Place children before the group renders, if anything invalidated the last placement.
    pub(crate) fn layout_before_render(
        &mut self,
        id: NodeId,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<()> {
        let config = LayoutConfig::read(self, id);
        let children = self.layout_children(id);
        let signature = spacing_signature(&config.spacings);
        let eps = self.opts().layout_epsilon;

        let Some(state) = self.try_node_mut(id).and_then(|n| n.state.layout_mut()) else {
            return Ok(());
        };
        if signature != state.spacing_signature {
            state.spacing_signature = signature;
            state.dirty = true;
        }
        if children.len() != state.last_child_count {
            state.last_child_count = children.len();
            state.dirty = true;
        }
        state.used_this_pass = None;
        if children.is_empty() || !state.dirty {
            return Ok(());
        }

        let metrics: Vec<ChildMetrics> = children
            .iter()
            .map(|c| self.measure_child(id, *c, config.direction))
            .collect();
        let placements = plan_placements(&config, &metrics);

        let mut used = HashMap::with_capacity(children.len());
        for ((child, m), p) in children.iter().zip(&metrics).zip(&placements) {
            let current = self.peek_vec2(*child, "translation", Vec2::ZERO);
            let mut target = current;
            let (primary, cross) = match config.direction {
                Direction::Horiz => (&mut target.x, &mut target.y),
                Direction::Vert => (&mut target.y, &mut target.x),
            };
            *primary += p.primary - m.primary_start;
            if let Some(c) = p.cross {
                *cross += c - m.cross_start;
            }
            if !(nearly_equal(current.x, target.x, eps) && nearly_equal(current.y, target.y, eps)) {
                self.set(*child, "translation", TypedValue::vec2(target.x, target.y), host)?;
            }
            used.insert(
                *child,
                ChildMetrics {
                    primary: m.primary,
                    cross: m.cross,
                    primary_start: p.primary,
                    cross_start: p.cross.unwrap_or(m.cross_start),
                },
            );
        }

        if let Some(state) = self.try_node_mut(id).and_then(|n| n.state.layout_mut()) {
            state.used_this_pass = Some(used);
            state.dirty = false;
        }
        tracing::trace!(node = %id, children = children.len(), "layout applied");
        Ok(())
    }

    /// Compare rendered child sizes with the ones placement assumed; request another pass on drift.
    pub(crate) fn layout_after_render(&mut self, id: NodeId) {
        let children = self.layout_children(id);
        if children.is_empty() {
            return;
        }
        let direction = Direction::parse(self.peek_str(id, "layoutdirection"));
        let eps = self.opts().layout_epsilon;
        let actual: Vec<(NodeId, ChildMetrics)> = children
            .iter()
            .map(|c| (*c, self.measure_child(id, *c, direction)))
            .collect();

        let Some(node) = self.try_node_mut(id) else {
            return;
        };
        let Some(state) = node.state.layout_mut() else {
            return;
        };
        let used = state.used_this_pass.take();
        let mut relayout = false;
        for (child, m) in &actual {
            let size = m.size(direction);
            let previous = state.child_sizes.insert(*child, size);
            if previous.is_some_and(|p| !sizes_close(p, size, eps)) {
                relayout = true;
            }
            let expected = used.as_ref().and_then(|u| u.get(child));
            if expected.is_some_and(|e| !e.same_extent(m, eps)) {
                relayout = true;
            }
        }
        state.child_sizes.retain(|c, _| children.contains(c));

        if relayout {
            state.dirty = true;
            node.dirty = true;
            tracing::debug!(node = %id, "child sizes drifted, relayout next frame");
        }
    }

    /// Whether a LayoutGroup will recompute placement on its next render.
    pub fn is_layout_dirty(&self, id: NodeId) -> SceneResult<bool> {
        self.node(id)?;
        Ok(self.layout_state(id).is_some_and(|s| s.dirty))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/mod.rs"]
mod tests;
