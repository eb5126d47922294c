use std::rc::Rc;

use smallvec::SmallVec;

use crate::node::NodeId;
use crate::value::{FieldKind, TypedValue};

pub(crate) mod observer;

use observer::{ObserverMode, ObserverRecord, ObserverTarget};

pub(crate) type ObserverList = SmallVec<[Rc<ObserverRecord>; 4]>;

/// One named, typed, observable slot on a node.
#[derive(Debug)]
pub struct Field {
    value: TypedValue,
    kind: FieldKind,
    always_notify: bool,
    system: bool,
    hidden: bool,
    permanent: Vec<Rc<ObserverRecord>>,
    unscoped: Vec<Rc<ObserverRecord>>,
    scoped: Vec<(NodeId, Vec<Rc<ObserverRecord>>)>,
}

impl Field {
    /// Create a field holding `value` coerced to `kind`.
    pub fn new(kind: FieldKind, value: TypedValue, always_notify: bool) -> Self {
        Self {
            value: kind.convert(value),
            kind,
            always_notify,
            system: false,
            hidden: false,
            permanent: Vec::new(),
            unscoped: Vec::new(),
            scoped: Vec::new(),
        }
    }

    pub(crate) fn with_flags(mut self, system: bool, hidden: bool) -> Self {
        self.system = system;
        self.hidden = hidden;
        self
    }

    /// Copy of the field's value and flags, without observers.
    pub(crate) fn duplicate(&self) -> Self {
        Self::new(self.kind, self.value.clone(), self.always_notify)
            .with_flags(self.system, self.hidden)
    }

    /// Declared kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Whether every write notifies, even when the value is unchanged.
    pub fn always_notify(&self) -> bool {
        self.always_notify
    }

    /// Built-in field registered from a node kind's defaults.
    pub fn is_system(&self) -> bool {
        self.system
    }

    /// Hidden fields are omitted from listings until first read or written.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Read the value, clearing the hidden latch.
    pub fn value(&mut self) -> &TypedValue {
        self.hidden = false;
        &self.value
    }

    /// Read the value without touching the hidden latch.
    pub fn peek(&self) -> &TypedValue {
        &self.value
    }

    /// Whether `value` is assignable to this field.
    pub fn can_accept(&self, value: &TypedValue) -> bool {
        self.kind.can_accept(value)
    }

    /// Store `value` (coerced) and report whether observers must be notified.
    ///
    /// `incoming_changed` tells whether a node being assigned was modified since its last
    /// render; re-assigning such a node counts as a change.
    pub(crate) fn set_value(
        &mut self,
        value: TypedValue,
        notify: bool,
        incoming_changed: bool,
    ) -> bool {
        self.hidden = false;
        let value = self.kind.convert(value);
        let old = std::mem::replace(&mut self.value, value);
        notify && (self.always_notify || !values_equal(&old, &self.value, incoming_changed))
    }

    pub(crate) fn add_observer(&mut self, mode: ObserverMode, record: ObserverRecord) {
        self.hidden = false;
        let record = Rc::new(record);
        match mode {
            ObserverMode::Permanent => self.permanent.push(record),
            ObserverMode::Unscoped => self.unscoped.push(record),
            ObserverMode::Scoped => {
                let host = record.host;
                match self.scoped.iter_mut().find(|(h, _)| *h == host) {
                    Some((_, list)) => list.push(record),
                    None => self.scoped.push((host, vec![record])),
                }
            }
        }
    }

    pub(crate) fn remove_unscoped(&mut self) -> usize {
        std::mem::take(&mut self.unscoped).len()
    }

    pub(crate) fn remove_scoped(&mut self, host: NodeId) -> usize {
        let mut removed = 0;
        self.scoped.retain(|(h, list)| {
            if *h == host {
                removed += list.len();
                false
            } else {
                true
            }
        });
        removed
    }

    pub(crate) fn clear_observers(&mut self) {
        self.permanent.clear();
        self.unscoped.clear();
        self.scoped.clear();
    }

    /// Whether any observer is registered.
    pub fn is_observed(&self) -> bool {
        !self.permanent.is_empty() || !self.unscoped.is_empty() || !self.scoped.is_empty()
    }

    pub(crate) fn is_port_observed(&self, scope: NodeId) -> bool {
        let is_port = |r: &Rc<ObserverRecord>| matches!(r.target, ObserverTarget::Port(_));
        self.unscoped.iter().any(is_port)
            || self
                .scoped
                .iter()
                .filter(|(h, _)| *h == scope)
                .any(|(_, list)| list.iter().any(is_port))
    }

    /// Registrations in delivery order: permanent, then unscoped, then scoped by host.
    pub(crate) fn observers(&self) -> ObserverList {
        self.permanent
            .iter()
            .chain(self.unscoped.iter())
            .chain(self.scoped.iter().flat_map(|(_, list)| list.iter()))
            .cloned()
            .collect()
    }
}

/// Type-aware equality used to decide whether a write is a change.
///
/// Arrays and associative arrays are components: only the same instance counts as unchanged.
pub(crate) fn values_equal(old: &TypedValue, new: &TypedValue, new_node_changed: bool) -> bool {
    match (old, new) {
        (a, b) if a.is_number() && b.is_number() => a.as_f64() == b.as_f64(),
        (TypedValue::String(a), TypedValue::String(b)) => a == b,
        (TypedValue::Boolean(a), TypedValue::Boolean(b)) => a == b,
        (TypedValue::Node(a), TypedValue::Node(b)) => a == b && !new_node_changed,
        (TypedValue::Array(a), TypedValue::Array(b)) => Rc::ptr_eq(a, b),
        (TypedValue::AssocArray(a), TypedValue::AssocArray(b)) => Rc::ptr_eq(a, b),
        (a, b) => a == b,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/field/mod.rs"]
mod tests;
