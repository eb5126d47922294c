use std::cell::Cell;

use crate::graph::SceneGraph;
use crate::node::NodeId;
use crate::value::{AssocMap, FunctionRef, PortId, TypedValue};

/// Lifetime scope of an observer registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObserverMode {
    /// Never removed.
    Permanent,
    /// Removed in bulk by [`SceneGraph::unobserve_field`] without a host.
    Unscoped,
    /// Removed per host node, and automatically when the host is disposed.
    Scoped,
}

/// What an observer delivers change events to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObserverTarget {
    /// Call a script function.
    Function(FunctionRef),
    /// Queue the event on a message port.
    Port(PortId),
}

/// One observer registration.
///
/// Carries everything needed to rebuild the call: the subscribing host node, the target, the
/// node the subscription was made on and the info fields to snapshot. `running` guards against
/// re-entering the same registration from a nested notification.
#[derive(Debug)]
pub(crate) struct ObserverRecord {
    pub(crate) host: NodeId,
    pub(crate) target: ObserverTarget,
    pub(crate) node: NodeId,
    pub(crate) field_name: String,
    pub(crate) info_fields: Option<Vec<String>>,
    running: Cell<bool>,
}

impl ObserverRecord {
    pub(crate) fn new(
        host: NodeId,
        target: ObserverTarget,
        node: NodeId,
        field_name: impl Into<String>,
        info_fields: Option<Vec<String>>,
    ) -> Self {
        Self {
            host,
            target,
            node,
            field_name: field_name.into(),
            info_fields,
            running: Cell::new(false),
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Mark the record as running until the guard drops.
    pub(crate) fn enter(&self) -> RunningGuard<'_> {
        self.running.set(true);
        RunningGuard(&self.running)
    }
}

pub(crate) struct RunningGuard<'a>(&'a Cell<bool>);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Change event handed to observers. A fresh one is built for every delivery.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeEvent {
    /// Node the subscription was made on.
    pub node: NodeId,
    /// Field name as given at subscription time.
    pub field: String,
    /// Field value at delivery time.
    pub value: TypedValue,
    /// Snapshot of the requested info fields, if any were requested.
    pub info: Option<AssocMap>,
}

/// A function call requested by observer dispatch.
#[derive(Clone, Debug)]
pub struct ObserverCall {
    /// Node whose script environment the function runs in.
    pub host: NodeId,
    /// Function to call.
    pub function: FunctionRef,
    /// Event argument, or `None` when the function takes no parameters.
    pub event: Option<NodeEvent>,
}

/// Non-success outcomes of an observer callback.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CallbackError {
    /// Control-flow unwind (`return`/`exit`); swallowed by dispatch.
    #[error("callback unwound")]
    Unwind,
    /// Script runtime error; propagates to the writer that triggered dispatch.
    #[error("{0}")]
    Runtime(String),
}

/// The interpreter side of observer dispatch.
///
/// The scene graph never captures script closures: every delivery is routed through this trait
/// with the graph passed back in, so callbacks may read and write fields freely.
pub trait ScriptHost {
    /// Whether `function` declares an event parameter.
    fn accepts_event(&self, function: &FunctionRef) -> bool {
        let _ = function;
        true
    }

    /// Run an observer callback.
    fn invoke(&mut self, graph: &mut SceneGraph, call: ObserverCall) -> Result<(), CallbackError>;

    /// Queue an event on a message port.
    fn post_message(&mut self, port: PortId, event: NodeEvent) {
        tracing::trace!(port = port.0, field = %event.field, "dropping port message");
    }
}

/// Host that ignores every callback.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullHost;

impl ScriptHost for NullHost {
    fn invoke(&mut self, _graph: &mut SceneGraph, _call: ObserverCall) -> Result<(), CallbackError> {
        Ok(())
    }
}

impl<F> ScriptHost for F
where
    F: FnMut(&mut SceneGraph, ObserverCall) -> Result<(), CallbackError>,
{
    fn invoke(&mut self, graph: &mut SceneGraph, call: ObserverCall) -> Result<(), CallbackError> {
        self(graph, call)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/field/observer.rs"]
mod tests;
