use crate::foundation::error::{SceneError, SceneResult};
use crate::graph::SceneGraph;
use crate::node::models::models_for;
use crate::node::{FieldSlot, NodeData, NodeId, NodeKind};
use crate::value::TypedValue;

impl SceneGraph {
    /// Create a node of `kind` with its built-in fields.
    ///
    /// The new node holds one reference owned by the caller.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let mut data = NodeData::new(kind);
        for table in models_for(kind) {
            for model in table {
                data.fields
                    .insert(model.name.to_ascii_lowercase(), FieldSlot::Owned(model.build()));
            }
        }
        let id = self.alloc(data);
        self.apply_kind_defaults(id, kind);
        tracing::trace!(node = %id, kind = %kind, "created node");
        id
    }

    /// Create a node from a subtype name.
    pub fn create_node_by_name(&mut self, subtype: &str) -> SceneResult<NodeId> {
        let kind = NodeKind::from_name(subtype)
            .ok_or_else(|| SceneError::validation(format!("unknown node subtype `{subtype}`")))?;
        Ok(self.create_node(kind))
    }

    fn apply_kind_defaults(&mut self, id: NodeId, kind: NodeKind) {
        let res = self.opts().resolution;
        match kind {
            NodeKind::Label => {
                let spacing = self.opts().line_spacing();
                self.put_silent(id, "linespacing", TypedValue::Float(spacing as f32));
            }
            NodeKind::LayoutGroup => {
                self.put_silent(id, "focusable", TypedValue::Boolean(true));
            }
            NodeKind::ButtonGroup => {
                self.put_silent(id, "focusable", TypedValue::Boolean(true));
                let height = res.pick(50.0, 75.0);
                self.put_silent(id, "buttonheight", TypedValue::Float(height as f32));
            }
            NodeKind::Dialog => self.build_dialog(id),
            _ => {}
        }
    }

    /// Children in render order.
    pub fn children(&self, id: NodeId) -> SceneResult<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    /// Current parent, if attached.
    pub fn parent(&self, id: NodeId) -> SceneResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Append `child` to `parent`, detaching it from any previous parent first.
    ///
    /// Appending a node that is already a child of `parent` is a no-op.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<bool> {
        if self.node(child)?.parent == Some(parent) {
            return Ok(true);
        }
        self.attach(parent, child, usize::MAX)?;
        Ok(true)
    }

    /// Insert `child` at `index`; a negative or past-the-end index appends.
    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, index: i64) -> SceneResult<bool> {
        self.check_attach(parent, child)?;
        self.retain(child)?;
        if self.node(child)?.parent == Some(parent) {
            self.detach(parent, child)?;
        }
        let at = usize::try_from(index).unwrap_or(usize::MAX);
        self.attach(parent, child, at)?;
        self.release(child)?;
        Ok(true)
    }

    /// Replace the child at `index` with `child`.
    ///
    /// Returns `false` when `index` is out of range. If `child` is already a child of `parent` it
    /// is moved rather than duplicated.
    pub fn replace_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> SceneResult<bool> {
        let Some(old) = self.node(parent)?.children.get(index).copied() else {
            return Ok(false);
        };
        if old == child {
            return Ok(true);
        }
        self.check_attach(parent, child)?;
        // Hold the newcomer while it is moved within the same parent.
        self.retain(child)?;
        if self.node(child)?.parent == Some(parent) {
            self.detach(parent, child)?;
        }
        let at = self
            .node(parent)?
            .children
            .iter()
            .position(|c| *c == old)
            .unwrap_or(usize::MAX);
        self.detach(parent, old)?;
        self.attach(parent, child, at)?;
        self.release(child)?;
        Ok(true)
    }

    /// Remove `child` from `parent`. Returns `false` if it was not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<bool> {
        if !self.node(parent)?.children.contains(&child) {
            return Ok(false);
        }
        self.detach(parent, child)?;
        Ok(true)
    }

    /// Remove up to `count` children starting at `index`.
    pub fn remove_children_at(&mut self, parent: NodeId, index: usize, count: usize) -> SceneResult<bool> {
        let children = &self.node(parent)?.children;
        if count == 0 || index >= children.len() {
            return Ok(false);
        }
        let end = index.saturating_add(count).min(children.len());
        let removed: Vec<NodeId> = children[index..end].to_vec();
        for child in removed {
            self.detach(parent, child)?;
        }
        Ok(true)
    }

    fn check_attach(&self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.node(parent)?;
        self.node(child)?;
        if parent == child {
            return Err(SceneError::tree(format!("cannot append node {child} to itself")));
        }
        if self.path_to_root(parent).contains(&child) {
            return Err(SceneError::tree(format!(
                "cannot append node {child} into its own subtree"
            )));
        }
        Ok(())
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, index: usize) -> SceneResult<()> {
        self.check_attach(parent, child)?;
        // Take the new reference before dropping the old parent's so reparenting never disposes.
        self.node_mut(child)?.ref_count += 1;
        if let Some(old) = self.node(child)?.parent {
            self.detach(old, child)?;
        }
        let data = self.node_mut(parent)?;
        let at = index.min(data.children.len());
        data.children.insert(at, child);
        self.node_mut(child)?.parent = Some(parent);
        self.children_changed(parent);
        Ok(())
    }

    fn detach(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        let data = self.node_mut(parent)?;
        data.children.retain(|c| *c != child);
        if let Some(c) = self.try_node_mut(child)
            && c.parent == Some(parent)
        {
            c.parent = None;
        }
        self.children_changed(parent);
        self.release(child)?;
        Ok(())
    }

    fn children_changed(&mut self, parent: NodeId) {
        if let Some(data) = self.try_node_mut(parent) {
            data.changed = true;
            data.dirty = true;
            if let Some(layout) = data.state.layout_mut() {
                layout.dirty = true;
            }
        }
    }

    /// Depth-first search of `root`'s subtree for a node whose `id` field matches, ignoring case.
    pub fn find_node_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        let data = self.try_node(root)?;
        let current = self.peek(root, "id").map(ToString::to_string);
        if current.is_some_and(|c| c.eq_ignore_ascii_case(id)) {
            return Some(root);
        }
        data.children
            .iter()
            .find_map(|child| self.find_node_by_id(*child, id))
    }

    /// Ancestors of `id` followed by `id` itself, root first.
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            let Some(data) = self.try_node(node) else {
                break;
            };
            path.push(node);
            cursor = data.parent;
        }
        path.reverse();
        path
    }

    /// Topmost ancestor of `id` (itself when detached).
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.path_to_root(id).first().copied().unwrap_or(id)
    }

    /// Copy `id` into a new detached node.
    ///
    /// Field values are copied without observers. With `deep`, children are cloned recursively.
    /// Composite widgets rebuild their internal children, so only their fields are copied.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> SceneResult<NodeId> {
        let source = self.node(id)?;
        let kind = source.kind;
        let children = source.children.clone();
        let mut owned = Vec::new();
        let mut linked = Vec::new();
        for (key, slot) in &source.fields {
            match slot {
                FieldSlot::Owned(field) => owned.push((key.clone(), field.duplicate())),
                FieldSlot::Linked { .. } => {
                    if let Some(value) = self.peek(id, key) {
                        linked.push((key.clone(), value.clone()));
                    }
                }
            }
        }

        let copy = self.create_node(kind);
        for (key, field) in owned {
            let is_linked = matches!(
                self.node(copy)?.fields.get(&key),
                Some(FieldSlot::Linked { .. })
            );
            if is_linked {
                self.put_silent(copy, &key, field.peek().clone());
            } else {
                self.node_mut(copy)?
                    .fields
                    .insert(key, FieldSlot::Owned(field));
            }
        }
        for (key, value) in linked {
            self.put_silent(copy, &key, value);
        }
        let state = &mut self.node_mut(copy)?.state;
        if let Some(buttons) = state.buttons_mut() {
            buttons.refresh = true;
        }
        if let Some(poster) = state.poster_mut() {
            poster.pending = true;
        }
        if deep && !matches!(kind, NodeKind::ButtonGroup | NodeKind::Dialog) {
            for child in children {
                let cloned = self.clone_node(child, true)?;
                self.append_child(copy, cloned)?;
                self.release(cloned)?;
            }
        }
        Ok(copy)
    }

    /// Take a reference on `id`. Returns the new count.
    pub fn retain(&mut self, id: NodeId) -> SceneResult<u32> {
        let data = self.node_mut(id)?;
        data.ref_count += 1;
        Ok(data.ref_count)
    }

    /// Drop a reference on `id`, disposing it when none remain and it is not being returned.
    /// Returns the remaining count.
    pub fn release(&mut self, id: NodeId) -> SceneResult<u32> {
        let data = self.node_mut(id)?;
        data.ref_count = data.ref_count.saturating_sub(1);
        let remaining = data.ref_count;
        if remaining == 0 && !data.returning {
            self.dispose(id);
        }
        Ok(remaining)
    }

    /// Current reference count.
    pub fn ref_count(&self, id: NodeId) -> SceneResult<u32> {
        Ok(self.node(id)?.ref_count)
    }

    /// Mark `id` as in flight as a return value. Clearing the mark disposes an unreferenced node.
    pub fn set_returning(&mut self, id: NodeId, returning: bool) -> SceneResult<()> {
        let data = self.node_mut(id)?;
        data.returning = returning;
        if !returning && data.ref_count == 0 {
            self.dispose(id);
        }
        Ok(())
    }

    fn dispose(&mut self, id: NodeId) {
        let Some(data) = self.free_slot(id) else {
            return;
        };
        self.stats.nodes_disposed += 1;
        tracing::debug!(node = %id, kind = %data.kind, "disposing node");

        if let Some(parent) = data.parent
            && let Some(p) = self.try_node_mut(parent)
        {
            p.children.retain(|c| *c != id);
        }
        if self.focused == Some(id) {
            self.focused = None;
        }
        for (node, key) in self.scoped_hosts.remove(&id).unwrap_or_default() {
            if let Some(FieldSlot::Owned(field)) = self
                .try_node_mut(node)
                .and_then(|n| n.fields.get_mut(&key))
            {
                field.remove_scoped(id);
            }
        }
        for child in data.children {
            if let Some(c) = self.try_node_mut(child)
                && c.parent == Some(id)
            {
                c.parent = None;
            }
            let _ = self.release(child);
        }
    }
}
