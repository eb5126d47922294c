use crate::field::observer::ScriptHost;
use crate::foundation::error::SceneResult;
use crate::graph::SceneGraph;
use crate::node::{NodeId, NodeKind};
use crate::value::TypedValue;

impl SceneGraph {
    /// Node currently holding focus.
    pub fn focused(&self) -> Option<NodeId> {
        self.focused.filter(|f| self.is_alive(*f))
    }

    /// Whether `id` itself holds focus.
    pub fn has_focus(&self, id: NodeId) -> bool {
        self.focused() == Some(id)
    }

    /// Whether `id` is the focused node or one of its ancestors.
    pub fn is_in_focus_chain(&self, id: NodeId) -> bool {
        self.focused()
            .is_some_and(|f| self.path_to_root(f).contains(&id))
    }

    /// Give focus to `id` (`on`) or take it away.
    ///
    /// Gaining focus rewrites the `focusedChild` chain: ancestors that are no longer on the path
    /// to the focused node are cleared, each ancestor on the new path points at the next node
    /// down, and the node points at itself. Returns the node's `focusable` flag.
    pub fn set_focus(
        &mut self,
        id: NodeId,
        on: bool,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<bool> {
        let kind = self.node(id)?.kind;
        let focusable = self.peek_bool(id, "focusable", false);
        let old = self.focused();

        if !on {
            let cleared = if old == Some(id) {
                self.focused = None;
                self.path_to_root(id)
            } else {
                vec![id]
            };
            for node in cleared {
                self.set(node, "focusedchild", TypedValue::Invalid, host)?;
            }
            return Ok(focusable);
        }

        if kind == NodeKind::Dialog
            && let Some(buttons) = self.dialog_focus_target(id, old)
        {
            return self.set_focus(buttons, true, host);
        }

        let old_chain = old.map(|o| self.path_to_root(o)).unwrap_or_default();
        let new_chain = self.path_to_root(id);
        let shared = old_chain
            .iter()
            .zip(&new_chain)
            .take_while(|(a, b)| a == b)
            .count();
        self.focused = Some(id);
        tracing::debug!(node = %id, previous = ?old, "focus moved");

        for node in old_chain.iter().skip(shared) {
            if self.is_alive(*node) {
                self.set(*node, "focusedchild", TypedValue::Invalid, host)?;
            }
        }
        for pair in new_chain.windows(2) {
            self.set(pair[0], "focusedchild", TypedValue::Node(pair[1]), host)?;
        }
        self.set(id, "focusedchild", TypedValue::Node(id), host)?;
        Ok(focusable)
    }

    /// Offer a remote key to the focused node, then to each ancestor, until one handles it.
    #[tracing::instrument(level = "debug", skip(self, host))]
    pub fn route_key(
        &mut self,
        key: &str,
        press: bool,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<bool> {
        let Some(focused) = self.focused() else {
            return Ok(false);
        };
        for node in self.path_to_root(focused).into_iter().rev() {
            if self.is_alive(node) && self.handle_key(node, key, press, host)? {
                tracing::trace!(node = %node, "key handled");
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Let one node react to a key. Plain nodes never handle keys.
    pub fn handle_key(
        &mut self,
        id: NodeId,
        key: &str,
        press: bool,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<bool> {
        match self.node(id)?.kind {
            NodeKind::ButtonGroup => self.button_group_key(id, key, press, host),
            NodeKind::Dialog => self.dialog_key(id, key, press, host),
            _ => Ok(false),
        }
    }
}
