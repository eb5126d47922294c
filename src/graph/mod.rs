use std::collections::HashMap;

use crate::field::Field;
use crate::foundation::core::Vec2;
use crate::foundation::error::{SceneError, SceneResult};
use crate::node::{FieldSlot, NodeData, NodeId, NodeKind};
use crate::scene::opts::SceneOpts;
use crate::value::TypedValue;

mod access;
mod focus;
mod tree;

/// Link chains longer than this are treated as broken.
const MAX_LINK_DEPTH: usize = 8;

#[derive(Debug)]
struct Slot {
    generation: u32,
    data: Option<NodeData>,
}

/// Counters describing the lifetime activity of a graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct GraphStats {
    /// Nodes allocated.
    pub nodes_created: u64,
    /// Nodes disposed after their last reference was released.
    pub nodes_disposed: u64,
    /// Observer callbacks invoked.
    pub callbacks_invoked: u64,
}

/// Arena of nodes plus the process-wide focus state.
///
/// Every node is addressed through a generation-checked [`NodeId`]. Children are owned by their
/// parent's child list; parent links and focus references are plain handles and never keep a
/// node alive.
#[derive(Debug)]
pub struct SceneGraph {
    opts: SceneOpts,
    slots: Vec<Slot>,
    free: Vec<u32>,
    focused: Option<NodeId>,
    /// Fields each host node observes through scoped subscriptions, keyed by host.
    scoped_hosts: HashMap<NodeId, Vec<(NodeId, String)>>,
    stats: GraphStats,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Empty graph with default options.
    pub fn new() -> Self {
        Self::with_opts(SceneOpts::default())
    }

    /// Empty graph with the given options.
    pub fn with_opts(opts: SceneOpts) -> Self {
        Self {
            opts,
            slots: Vec::new(),
            free: Vec::new(),
            focused: None,
            scoped_hosts: HashMap::new(),
            stats: GraphStats::default(),
        }
    }

    /// Options the graph was built with.
    pub fn opts(&self) -> &SceneOpts {
        &self.opts
    }

    /// Lifetime counters.
    pub fn stats(&self) -> GraphStats {
        self.stats
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.data.is_some()).count()
    }

    /// `true` when no node is alive.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` still refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.try_node(id).is_some()
    }

    /// Handles of every live node, in slot order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.data.is_some())
            .map(|(i, s)| NodeId::new(i as u32, s.generation))
            .collect()
    }

    /// Kind of a live node.
    pub fn kind(&self, id: NodeId) -> SceneResult<NodeKind> {
        Ok(self.node(id)?.kind)
    }

    /// Cached bounding rectangles from the last render pass.
    pub fn rects(&self, id: NodeId) -> SceneResult<crate::node::BoundingRects> {
        Ok(self.node(id)?.rects)
    }

    /// Whether the node's visuals are stale.
    pub fn is_dirty(&self, id: NodeId) -> SceneResult<bool> {
        Ok(self.node(id)?.dirty)
    }

    /// Whether the node changed since its children were last rendered.
    pub fn is_changed(&self, id: NodeId) -> SceneResult<bool> {
        Ok(self.node(id)?.changed)
    }

    pub(crate) fn alloc(&mut self, data: NodeData) -> NodeId {
        self.stats.nodes_created += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.data = Some(data);
            return NodeId::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            data: Some(data),
        });
        NodeId::new(index, 0)
    }

    /// Drop the slot's payload and invalidate every handle to it.
    pub(crate) fn free_slot(&mut self, id: NodeId) -> Option<NodeData> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        let data = slot.data.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        Some(data)
    }

    pub(crate) fn try_node(&self, id: NodeId) -> Option<&NodeData> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.data.as_ref()
    }

    pub(crate) fn try_node_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.data.as_mut()
    }

    pub(crate) fn node(&self, id: NodeId) -> SceneResult<&NodeData> {
        self.try_node(id)
            .ok_or_else(|| SceneError::stale(format!("node {id} is not alive")))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> SceneResult<&mut NodeData> {
        self.try_node_mut(id)
            .ok_or_else(|| SceneError::stale(format!("node {id} is not alive")))
    }

    /// Follow field links from `(id, key)` to the node that stores the field.
    pub(crate) fn resolve(&self, id: NodeId, key: &str) -> Option<(NodeId, String)> {
        let mut node = id;
        let mut key = key.to_owned();
        for _ in 0..MAX_LINK_DEPTH {
            match self.try_node(node)?.fields.get(&key)? {
                FieldSlot::Owned(_) => return Some((node, key)),
                FieldSlot::Linked { node: target, field } => {
                    node = *target;
                    key = field.clone();
                }
            }
        }
        tracing::warn!(node = %id, field = %key, "field link chain too deep");
        None
    }

    pub(crate) fn field(&self, id: NodeId, key: &str) -> Option<&Field> {
        let (node, key) = self.resolve(id, key)?;
        self.try_node(node)?.owned_field(&key)
    }

    pub(crate) fn field_mut(&mut self, id: NodeId, key: &str) -> Option<&mut Field> {
        let (node, key) = self.resolve(id, key)?;
        match self.try_node_mut(node)?.fields.get_mut(&key)? {
            FieldSlot::Owned(field) => Some(field),
            FieldSlot::Linked { .. } => None,
        }
    }

    /// Read a field without clearing its hidden latch. `key` must be lowercase.
    pub(crate) fn peek(&self, id: NodeId, key: &str) -> Option<&TypedValue> {
        self.field(id, key).map(Field::peek)
    }

    pub(crate) fn peek_f64(&self, id: NodeId, key: &str) -> f64 {
        self.peek(id, key).and_then(TypedValue::as_f64).unwrap_or(0.0)
    }

    pub(crate) fn peek_i64(&self, id: NodeId, key: &str) -> i64 {
        self.peek(id, key).and_then(TypedValue::as_i64).unwrap_or(0)
    }

    pub(crate) fn peek_bool(&self, id: NodeId, key: &str, default: bool) -> bool {
        self.peek(id, key)
            .and_then(TypedValue::as_bool)
            .unwrap_or(default)
    }

    pub(crate) fn peek_str(&self, id: NodeId, key: &str) -> &str {
        self.peek(id, key).and_then(TypedValue::as_str).unwrap_or("")
    }

    pub(crate) fn peek_vec2(&self, id: NodeId, key: &str, default: Vec2) -> Vec2 {
        self.peek(id, key)
            .and_then(TypedValue::as_vec2)
            .unwrap_or(default)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/mod.rs"]
mod tests;
