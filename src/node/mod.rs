use std::collections::BTreeMap;
use std::fmt;

use crate::field::Field;
use crate::foundation::core::Rect2D;
use crate::layout::LayoutState;
use crate::widgets::button_group::ButtonState;
use crate::widgets::dialog::DialogState;
use crate::widgets::poster::PosterState;

pub(crate) mod models;

/// Generation-checked handle to a node in a [`crate::SceneGraph`].
///
/// Handles are plain data: holding one never keeps a node alive. Once the node is disposed its
/// slot generation is bumped and every old handle becomes stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot index.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Slot generation this handle was issued for.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Closed set of node kinds the runtime knows how to lay out and render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NodeKind {
    /// Plain field container with no geometry.
    Node,
    /// Transform container.
    Group,
    /// Solid rectangle.
    Rectangle,
    /// Text.
    Label,
    /// Bitmap.
    Poster,
    /// Auto-stacking container.
    LayoutGroup,
    /// Vertical list of text buttons.
    ButtonGroup,
    /// Modal dialog with title, message and buttons.
    Dialog,
}

impl NodeKind {
    /// Resolve a subtype name, case-insensitively. `Scene` is treated as a [`NodeKind::Group`].
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name.trim().to_ascii_lowercase().as_str() {
            "node" | "contentnode" => Self::Node,
            "group" | "scene" => Self::Group,
            "rectangle" => Self::Rectangle,
            "label" => Self::Label,
            "poster" => Self::Poster,
            "layoutgroup" => Self::LayoutGroup,
            "buttongroup" => Self::ButtonGroup,
            "dialog" => Self::Dialog,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical subtype name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Node => "Node",
            Self::Group => "Group",
            Self::Rectangle => "Rectangle",
            Self::Label => "Label",
            Self::Poster => "Poster",
            Self::LayoutGroup => "LayoutGroup",
            Self::ButtonGroup => "ButtonGroup",
            Self::Dialog => "Dialog",
        }
    }

    /// Kinds that carry a transform and take part in rendering.
    pub fn is_group(self) -> bool {
        !matches!(self, Self::Node)
    }

    /// Kinds driven by the auto-stacking layout engine.
    pub fn is_layout(self) -> bool {
        matches!(self, Self::LayoutGroup | Self::ButtonGroup)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cached geometry of a node, refreshed by every render pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct BoundingRects {
    /// Extent in the node's own coordinate space.
    pub local: Rect2D,
    /// Extent in the parent's coordinate space.
    pub to_parent: Rect2D,
    /// Extent in scene coordinates.
    pub to_scene: Rect2D,
}

/// Which of the cached rectangles to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RectSpace {
    /// Node space.
    Local,
    /// Parent space.
    #[default]
    ToParent,
    /// Scene space.
    ToScene,
}

impl BoundingRects {
    /// Rectangle for `space`.
    pub fn get(&self, space: RectSpace) -> Rect2D {
        match space {
            RectSpace::Local => self.local,
            RectSpace::ToParent => self.to_parent,
            RectSpace::ToScene => self.to_scene,
        }
    }
}

/// A field table entry: either the field itself or an alias of another node's field.
#[derive(Debug)]
pub(crate) enum FieldSlot {
    Owned(Field),
    Linked { node: NodeId, field: String },
}

/// Per-kind runtime state that is not exposed as fields.
#[derive(Debug, Default)]
pub(crate) enum KindState {
    #[default]
    None,
    Poster(PosterState),
    Layout(LayoutState),
    ButtonGroup(LayoutState, ButtonState),
    Dialog(DialogState),
}

impl KindState {
    pub(crate) fn for_kind(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Poster => Self::Poster(PosterState::default()),
            NodeKind::LayoutGroup => Self::Layout(LayoutState::default()),
            NodeKind::ButtonGroup => Self::ButtonGroup(LayoutState::default(), ButtonState::default()),
            // Dialog state is filled in once its parts exist.
            _ => Self::None,
        }
    }

    pub(crate) fn layout_mut(&mut self) -> Option<&mut LayoutState> {
        match self {
            Self::Layout(layout) | Self::ButtonGroup(layout, _) => Some(layout),
            _ => None,
        }
    }

    pub(crate) fn buttons_mut(&mut self) -> Option<&mut ButtonState> {
        match self {
            Self::ButtonGroup(_, buttons) => Some(buttons),
            _ => None,
        }
    }

    pub(crate) fn buttons(&self) -> Option<&ButtonState> {
        match self {
            Self::ButtonGroup(_, buttons) => Some(buttons),
            _ => None,
        }
    }

    pub(crate) fn poster_mut(&mut self) -> Option<&mut PosterState> {
        match self {
            Self::Poster(poster) => Some(poster),
            _ => None,
        }
    }

    pub(crate) fn dialog(&self) -> Option<&DialogState> {
        match self {
            Self::Dialog(dialog) => Some(dialog),
            _ => None,
        }
    }

    pub(crate) fn dialog_mut(&mut self) -> Option<&mut DialogState> {
        match self {
            Self::Dialog(dialog) => Some(dialog),
            _ => None,
        }
    }
}

/// Arena payload of one live node.
#[derive(Debug)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) fields: BTreeMap<String, FieldSlot>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) rects: BoundingRects,
    /// Visual state is stale and must be redrawn.
    pub(crate) dirty: bool,
    /// A field or child changed since the node's children were last rendered.
    pub(crate) changed: bool,
    pub(crate) ref_count: u32,
    /// In flight as a call's return value: reaching zero references does not dispose.
    pub(crate) returning: bool,
    pub(crate) state: KindState,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            fields: BTreeMap::new(),
            children: Vec::new(),
            parent: None,
            rects: BoundingRects::default(),
            dirty: true,
            changed: false,
            ref_count: 1,
            returning: false,
            state: KindState::for_kind(kind),
        }
    }

    pub(crate) fn owned_field(&self, key: &str) -> Option<&Field> {
        match self.fields.get(key)? {
            FieldSlot::Owned(field) => Some(field),
            FieldSlot::Linked { .. } => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/mod.rs"]
mod tests;
