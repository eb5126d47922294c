//! Retained-mode SceneGraph runtime.
//!
//! A [`SceneGraph`] owns an arena of typed nodes. Each node carries a table of reactive
//! [`Field`]s whose writes are delivered to observers through a [`ScriptHost`], and every frame
//! a render pass composes geometry, runs the auto-layout engine and emits draw calls to a
//! [`DrawSurface`]:
//!
//! - Build a tree with [`SceneGraph::create_node`] or from a [`SceneDoc`]
//! - Read and write fields with [`SceneGraph::get`] / [`SceneGraph::set`]
//! - Render frames with [`SceneGraph::render`] into a [`RecordingSurface`] or your own surface
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod field;
mod foundation;
mod graph;
mod layout;
mod node;
mod render;
mod scene;
mod value;
mod widgets;

pub use crate::field::Field;
pub use crate::field::observer::{
    CallbackError, NodeEvent, NullHost, ObserverCall, ObserverMode, ObserverTarget, ScriptHost,
};
pub use crate::foundation::core::{Affine, Point, Rect2D, Size, Vec2};
pub use crate::foundation::error::{SceneError, SceneResult};
pub use crate::graph::{GraphStats, SceneGraph};
pub use crate::node::{BoundingRects, NodeId, NodeKind, RectSpace};
pub use crate::render::{
    Bitmap, DrawCommand, DrawSurface, FontSpec, MeasureOnly, Paint, RecordingSurface,
};
pub use crate::scene::model::{NodeDef, SceneDoc};
pub use crate::scene::opts::{Resolution, SceneOpts};
pub use crate::value::json::{from_json, to_json};
pub use crate::value::kind::{FieldKind, convert_hex_color};
pub use crate::value::{AssocMap, FunctionRef, PortId, TypedValue};
