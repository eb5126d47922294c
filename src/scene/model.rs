use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::field::observer::ScriptHost;
use crate::foundation::error::{SceneError, SceneResult};
use crate::graph::SceneGraph;
use crate::node::NodeId;
use crate::scene::opts::SceneOpts;
use crate::value::json::from_json;

/// Declarative description of one node and its subtree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeDef {
    /// Node subtype name, e.g. `"Rectangle"`.
    pub subtype: String,
    /// Value of the node's `id` field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Initial field values. Unknown names become new fields typed from their value.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, serde_json::Value>,
    /// Children in render order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDef>,
}

/// A whole scene file: options, the root node and the node focused at start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDoc {
    /// Runtime options.
    #[serde(default)]
    pub opts: SceneOpts,
    /// Root of the tree.
    pub root: NodeDef,
    /// `id` of the node to focus after instantiation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
}

impl SceneDoc {
    /// Parse a scene from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SceneResult<Self> {
        let doc: Self = serde_json::from_reader(r)
            .map_err(|e| SceneError::validation(format!("parse scene JSON: {e}")))?;
        doc.opts.validate()?;
        Ok(doc)
    }

    /// Parse a scene from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SceneError::validation(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Create a graph with this scene's options and build the tree into it.
    ///
    /// Returns the graph and the root node, which holds the caller's reference.
    pub fn build(&self, host: &mut dyn ScriptHost) -> SceneResult<(SceneGraph, NodeId)> {
        let mut graph = SceneGraph::with_opts(self.opts.clone());
        let root = graph.instantiate(&self.root, host)?;
        if let Some(focus) = &self.focus {
            let target = graph.find_node_by_id(root, focus).ok_or_else(|| {
                SceneError::validation(format!("focus target `{focus}` not found"))
            })?;
            graph.set_focus(target, true, host)?;
        }
        Ok((graph, root))
    }
}

impl SceneGraph {
    /// Create the subtree described by `def`.
    ///
    /// Fields are assigned in name order through the regular write path, so observers and
    /// per-kind bookkeeping see them. The returned node holds one reference owned by the caller;
    /// children are owned by their parents.
    pub fn instantiate(&mut self, def: &NodeDef, host: &mut dyn ScriptHost) -> SceneResult<NodeId> {
        let id = self.create_node_by_name(&def.subtype)?;
        if let Err(err) = self.populate(id, def, host) {
            let _ = self.release(id);
            return Err(err);
        }
        Ok(id)
    }

    fn populate(&mut self, id: NodeId, def: &NodeDef, host: &mut dyn ScriptHost) -> SceneResult<()> {
        if let Some(node_id) = &def.id {
            self.set(id, "id", node_id.as_str().into(), host)?;
        }
        for (name, value) in &def.fields {
            if self.set_or_add(id, name, from_json(value), false, host)?.is_none() {
                tracing::warn!(subtype = %def.subtype, field = %name, "scene field not applied");
            }
        }
        for child_def in &def.children {
            let child = self.instantiate(child_def, host)?;
            self.append_child(id, child)?;
            self.release(child)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
