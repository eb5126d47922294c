use crate::field::observer::{
    CallbackError, NodeEvent, ObserverCall, ObserverMode, ObserverRecord, ObserverTarget,
    ScriptHost,
};
use crate::field::{Field, values_equal};
use crate::foundation::error::{SceneError, SceneResult};
use crate::graph::SceneGraph;
use crate::node::models::{is_label_metric_field, is_layout_field};
use crate::node::{FieldSlot, NodeId, NodeKind};
use crate::value::{AssocMap, FieldKind, FunctionRef, TypedValue, convert_hex_color};

impl SceneGraph {
    /// Read a field, clearing its hidden latch. A missing field reads as `invalid`.
    pub fn get(&mut self, id: NodeId, name: &str) -> SceneResult<TypedValue> {
        self.node(id)?;
        let key = name.to_ascii_lowercase();
        Ok(self
            .field_mut(id, &key)
            .map(|f| f.value().clone())
            .unwrap_or_default())
    }

    /// [`SceneGraph::get`] for a key coming straight from script code.
    pub fn get_by_key(&mut self, id: NodeId, key: &TypedValue) -> SceneResult<TypedValue> {
        let name = field_key(key)?;
        self.get(id, name)
    }

    /// Assign a field and notify its observers.
    ///
    /// Returns the previous value when the write was applied, or `None` when it was ignored
    /// (unknown field, or a value the field's kind rejects). Ignored writes log a warning; they
    /// never fail. An error is returned only for a stale handle or a callback runtime error.
    pub fn set(
        &mut self,
        id: NodeId,
        name: &str,
        value: TypedValue,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<Option<TypedValue>> {
        self.set_field(id, name, value, None, host)
    }

    /// [`SceneGraph::set`] for a key coming straight from script code.
    pub fn set_by_key(
        &mut self,
        id: NodeId,
        key: &TypedValue,
        value: TypedValue,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<Option<TypedValue>> {
        let name = field_key(key)?;
        self.set(id, name, value, host)
    }

    /// Like [`SceneGraph::set`], but a missing field is created from the value's own kind.
    pub fn set_or_add(
        &mut self,
        id: NodeId,
        name: &str,
        value: TypedValue,
        always_notify: bool,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<Option<TypedValue>> {
        self.set_field(id, name, value, Some(always_notify), host)
    }

    fn set_field(
        &mut self,
        id: NodeId,
        name: &str,
        value: TypedValue,
        create: Option<bool>,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<Option<TypedValue>> {
        let node_kind = self.node(id)?.kind;
        let mut key = name.to_ascii_lowercase();
        let mut value = value;

        if node_kind == NodeKind::Dialog && key == "close" && value.as_bool() == Some(true) {
            self.close_dialog(id, host)?;
            key = "wasclosed".to_owned();
            value = TypedValue::Boolean(true);
        }

        let Some((store, store_key)) = self.resolve(id, &key) else {
            if let Some(always_notify) = create
                && let Some(kind) = FieldKind::of_value(&value)
            {
                self.insert_field(id, &key, Field::new(kind, value, always_notify))?;
                return Ok(Some(TypedValue::Invalid));
            }
            tracing::warn!(subtype = %node_kind, field = name, "set ignored: field is not defined");
            return Ok(None);
        };

        let Some(field) = self.field(store, &store_key) else {
            return Ok(None);
        };
        let Some(value) = coerce_input(node_kind, field.kind(), value) else {
            return Ok(None);
        };
        if !field.can_accept(&value) {
            if !value.is_invalid() {
                tracing::warn!(
                    subtype = %node_kind,
                    field = name,
                    expected = field.kind().name(),
                    got = value.type_name(),
                    "set ignored: type mismatch"
                );
            }
            return Ok(None);
        }

        let incoming_changed = value
            .as_node()
            .and_then(|n| self.try_node(n))
            .is_some_and(|n| n.changed);
        let Some(field) = self.field_mut(store, &store_key) else {
            return Ok(None);
        };
        let previous = field.peek().clone();
        let notify = field.set_value(value, true, incoming_changed);

        self.touch(store, &store_key);
        if store != id {
            self.touch(id, &key);
        }
        self.after_set(store, &store_key, host)?;
        if notify {
            self.notify(store, &store_key, host)?;
        }
        Ok(Some(previous))
    }

    /// Assign a field without validation messages or observer notification.
    ///
    /// Values the field cannot hold and unknown fields are dropped.
    pub fn set_silent(&mut self, id: NodeId, name: &str, value: TypedValue) -> SceneResult<()> {
        self.node(id)?;
        let key = name.to_ascii_lowercase();
        if !self.put_silent(id, &key, value) {
            tracing::trace!(node = %id, field = name, "silent set dropped");
        }
        Ok(())
    }

    /// Silent write with an already-lowercase key. Returns whether the value was stored.
    pub(crate) fn put_silent(&mut self, id: NodeId, key: &str, value: TypedValue) -> bool {
        let Some(node_kind) = self.try_node(id).map(|n| n.kind) else {
            return false;
        };
        let Some((store, store_key)) = self.resolve(id, key) else {
            return false;
        };
        let Some(field) = self.field_mut(store, &store_key) else {
            return false;
        };
        let Some(value) = coerce_input(node_kind, field.kind(), value) else {
            return false;
        };
        if !field.can_accept(&value) {
            return false;
        }
        let _ = field.set_value(value, false, false);
        self.touch(store, &store_key);
        if store != id {
            self.touch(id, key);
        }
        true
    }

    /// Silent write that leaves the field alone when it already holds an equal value.
    pub(crate) fn put_if_changed(&mut self, id: NodeId, key: &str, value: TypedValue) -> bool {
        if self
            .peek(id, key)
            .is_some_and(|current| current == &value || values_equal(current, &value, false))
        {
            return false;
        }
        self.put_silent(id, key, value)
    }

    /// Declare a new field. Returns `false` if a field with that name already exists.
    pub fn add_field(
        &mut self,
        id: NodeId,
        name: &str,
        kind: FieldKind,
        always_notify: bool,
    ) -> SceneResult<bool> {
        let key = name.to_ascii_lowercase();
        if self.node(id)?.fields.contains_key(&key) {
            return Ok(false);
        }
        self.insert_field(id, &key, Field::new(kind, kind.default_value(), always_notify))?;
        Ok(true)
    }

    /// Assign every entry of `fields` that names an existing field; other names are skipped.
    pub fn set_fields(
        &mut self,
        id: NodeId,
        fields: &AssocMap,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<()> {
        self.update(id, fields, false, host)
    }

    /// Assign the entries of `fields` in name order.
    ///
    /// With `create_fields` a missing name becomes a new field typed from its value; without it
    /// the entry is skipped.
    pub fn update(
        &mut self,
        id: NodeId,
        fields: &AssocMap,
        create_fields: bool,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<()> {
        self.node(id)?;
        for (name, value) in fields {
            if create_fields {
                self.set_or_add(id, name, value.clone(), false, host)?;
            } else if self.has_field(id, name)? {
                self.set(id, name, value.clone(), host)?;
            }
        }
        Ok(())
    }

    /// Create a field for every entry whose name is not defined yet. Existing fields keep their
    /// value. Returns how many fields were added.
    pub fn add_fields(
        &mut self,
        id: NodeId,
        fields: &AssocMap,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<usize> {
        self.node(id)?;
        let mut added = 0;
        for (name, value) in fields {
            if self.has_field(id, name)? {
                continue;
            }
            if self.set_or_add(id, name, value.clone(), false, host)?.is_some() {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Names and values of every visible field. Hidden latches are left untouched.
    pub fn get_fields(&self, id: NodeId) -> SceneResult<AssocMap> {
        let names = self.field_names(id)?;
        Ok(names
            .into_iter()
            .filter_map(|name| {
                let value = self.peek(id, &name)?.clone();
                Some((name, value))
            })
            .collect())
    }

    fn insert_field(&mut self, id: NodeId, key: &str, field: Field) -> SceneResult<()> {
        let data = self.node_mut(id)?;
        data.fields.insert(key.to_owned(), FieldSlot::Owned(field));
        data.changed = true;
        Ok(())
    }

    /// Remove a user-declared field or a link. Built-in fields cannot be removed.
    pub fn remove_field(&mut self, id: NodeId, name: &str) -> SceneResult<bool> {
        let key = name.to_ascii_lowercase();
        let data = self.node_mut(id)?;
        match data.fields.get(&key) {
            None => return Ok(false),
            Some(FieldSlot::Owned(field)) if field.is_system() => return Ok(false),
            Some(_) => {}
        }
        if let Some(FieldSlot::Owned(mut field)) = data.fields.remove(&key) {
            field.clear_observers();
        }
        data.changed = true;
        Ok(true)
    }

    /// Whether the node has a field (owned or linked) named `name`.
    pub fn has_field(&self, id: NodeId, name: &str) -> SceneResult<bool> {
        Ok(self.node(id)?.fields.contains_key(&name.to_ascii_lowercase()))
    }

    /// Declared kind of a field.
    pub fn field_kind(&self, id: NodeId, name: &str) -> SceneResult<Option<FieldKind>> {
        self.node(id)?;
        Ok(self.field(id, &name.to_ascii_lowercase()).map(Field::kind))
    }

    /// Whether a field is still hidden from listings.
    pub fn is_field_hidden(&self, id: NodeId, name: &str) -> SceneResult<Option<bool>> {
        self.node(id)?;
        Ok(self.field(id, &name.to_ascii_lowercase()).map(Field::is_hidden))
    }

    /// Sorted lowercase names of every visible field.
    pub fn field_names(&self, id: NodeId) -> SceneResult<Vec<String>> {
        let data = self.node(id)?;
        Ok(data
            .fields
            .keys()
            .filter(|k| self.field(id, k).is_some_and(|f| !f.is_hidden()))
            .cloned()
            .collect())
    }

    /// Make `name` on `id` an alias of `target_field` on `target`.
    ///
    /// Reads, writes and subscriptions on the alias act on the target field. Returns `false` when
    /// the target field does not exist or the link would loop back onto itself.
    pub fn link_field(
        &mut self,
        id: NodeId,
        name: &str,
        target: NodeId,
        target_field: &str,
    ) -> SceneResult<bool> {
        self.node(id)?;
        self.node(target)?;
        let key = name.to_ascii_lowercase();
        let target_key = target_field.to_ascii_lowercase();
        match self.resolve(target, &target_key) {
            None => return Ok(false),
            Some((store, store_key)) if store == id && store_key == key => return Ok(false),
            Some(_) => {}
        }
        let data = self.node_mut(id)?;
        data.fields.insert(
            key,
            FieldSlot::Linked {
                node: target,
                field: target_key,
            },
        );
        data.changed = true;
        Ok(true)
    }

    /// Subscribe to changes of a field.
    ///
    /// `host` is the node whose script environment receives the callback; scoped subscriptions
    /// are torn down when it is disposed. Returns `false` when the field does not exist.
    pub fn observe_field(
        &mut self,
        id: NodeId,
        name: &str,
        mode: ObserverMode,
        target: ObserverTarget,
        host: NodeId,
        info_fields: Option<Vec<String>>,
    ) -> SceneResult<bool> {
        self.node(id)?;
        let key = name.to_ascii_lowercase();
        let Some((store, store_key)) = self.resolve(id, &key) else {
            return Ok(false);
        };
        let Some(field) = self.field_mut(store, &store_key) else {
            return Ok(false);
        };
        let record = ObserverRecord::new(host, target, id, name, info_fields);
        field.add_observer(mode, record);
        if mode == ObserverMode::Scoped {
            self.scoped_hosts
                .entry(host)
                .or_default()
                .push((store, store_key));
        }
        Ok(true)
    }

    /// Remove subscriptions: those scoped to `host`, or every unscoped one when `host` is `None`.
    pub fn unobserve_field(
        &mut self,
        id: NodeId,
        name: &str,
        host: Option<NodeId>,
    ) -> SceneResult<bool> {
        self.node(id)?;
        let key = name.to_ascii_lowercase();
        let Some(field) = self.field_mut(id, &key) else {
            return Ok(false);
        };
        let removed = match host {
            Some(host) => field.remove_scoped(host),
            None => field.remove_unscoped(),
        };
        Ok(removed > 0)
    }

    /// Whether a message port observes the field, either unscoped or scoped to `scope`.
    pub fn is_port_observed(&self, id: NodeId, name: &str, scope: NodeId) -> SceneResult<bool> {
        self.node(id)?;
        Ok(self
            .field(id, &name.to_ascii_lowercase())
            .is_some_and(|f| f.is_port_observed(scope)))
    }

    /// Deliver the current value of a field to its observers.
    ///
    /// Each registration gets a freshly built event. A registration already running further up
    /// the stack is skipped, control-flow unwinds are swallowed and runtime errors abort the
    /// delivery and propagate.
    pub(crate) fn notify(
        &mut self,
        id: NodeId,
        key: &str,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<()> {
        let Some(records) = self.field(id, key).map(Field::observers) else {
            return Ok(());
        };
        for record in records {
            if record.is_running() || !self.is_alive(record.host) {
                continue;
            }
            let Some(value) = self.peek(id, key).cloned() else {
                break;
            };
            let info = record
                .info_fields
                .as_deref()
                .map(|names| self.snapshot_info(record.node, names));
            let event = NodeEvent {
                node: record.node,
                field: record.field_name.clone(),
                value,
                info,
            };
            match &record.target {
                ObserverTarget::Port(port) => host.post_message(*port, event),
                ObserverTarget::Function(function) => {
                    let event = host.accepts_event(function).then_some(event);
                    let call = ObserverCall {
                        host: record.host,
                        function: function.clone(),
                        event,
                    };
                    let _running = record.enter();
                    self.stats.callbacks_invoked += 1;
                    match host.invoke(self, call) {
                        Ok(()) | Err(CallbackError::Unwind) => {}
                        Err(CallbackError::Runtime(msg)) => {
                            return Err(SceneError::callback(msg));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn snapshot_info(&self, node: NodeId, names: &[String]) -> AssocMap {
        names
            .iter()
            .filter_map(|name| {
                let value = self.peek(node, &name.to_ascii_lowercase())?;
                Some((name.clone(), value.clone()))
            })
            .collect()
    }

    /// Per-kind bookkeeping after a field write: dirty flags, layout invalidation, re-measure.
    fn touch(&mut self, id: NodeId, key: &str) {
        let Some(data) = self.try_node_mut(id) else {
            return;
        };
        data.changed = true;
        if data.kind.is_group() {
            data.dirty = true;
        }
        if is_layout_field(key)
            && let Some(layout) = data.state.layout_mut()
        {
            layout.dirty = true;
        }
        match data.kind {
            NodeKind::ButtonGroup => {
                if let Some(buttons) = data.state.buttons_mut() {
                    buttons.refresh = true;
                }
            }
            NodeKind::Poster if key == "uri" => {
                if let Some(poster) = data.state.poster_mut() {
                    poster.pending = true;
                }
            }
            NodeKind::Label if is_label_metric_field(key) => {
                if let Some(FieldSlot::Owned(field)) = data.fields.get_mut("istextellipsized") {
                    let _ = field.set_value(TypedValue::Boolean(false), false, false);
                }
            }
            _ => {}
        }
    }

    /// Writes that cascade into other fields.
    fn after_set(&mut self, id: NodeId, key: &str, host: &mut dyn ScriptHost) -> SceneResult<()> {
        if self.node(id)?.kind == NodeKind::ButtonGroup && key == "focusbutton" {
            self.focus_button_changed(id, host)?;
        }
        Ok(())
    }
}

fn field_key(key: &TypedValue) -> SceneResult<&str> {
    key.as_str().ok_or_else(|| {
        SceneError::invalid_key(format!("field keys must be strings, got {}", key.type_name()))
    })
}

/// Turn script-side input into something the field's kind can judge.
///
/// Strings written to non-string fields are parsed as that kind's literal. `None` means the
/// write is ignored outright (an empty colour string on a renderable node).
fn coerce_input(node_kind: NodeKind, kind: FieldKind, value: TypedValue) -> Option<TypedValue> {
    let TypedValue::String(s) = &value else {
        return Some(value);
    };
    match kind {
        FieldKind::String | FieldKind::Object | FieldKind::Node | FieldKind::Boolean => Some(value),
        FieldKind::Color if node_kind.is_group() => {
            if s.is_empty() {
                None
            } else {
                Some(TypedValue::Color(convert_hex_color(s)))
            }
        }
        FieldKind::Function => Some(TypedValue::Function(FunctionRef::new(s))),
        kind => Some(kind.parse_literal(Some(s))),
    }
}
