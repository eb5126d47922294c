use super::*;
use crate::field::observer::NullHost;
use crate::foundation::core::Vec2;
use crate::node::NodeKind;
use crate::scene::opts::Resolution;
use crate::value::{FieldKind, TypedValue};

const SCENE: &str = r#"{
  "opts": { "resolution": "FHD" },
  "root": {
    "subtype": "Group",
    "id": "root",
    "fields": { "translation": [10, 20] },
    "children": [
      { "subtype": "Rectangle", "id": "box", "fields": { "width": 30, "height": 40.5 } },
      {
        "subtype": "LayoutGroup",
        "id": "menu",
        "fields": { "itemSpacings": [8], "score": 3 },
        "children": [ { "subtype": "Label", "id": "item", "fields": { "text": "Play" } } ]
      }
    ]
  },
  "focus": "menu"
}"#;

fn def(subtype: &str) -> NodeDef {
    NodeDef {
        subtype: subtype.to_owned(),
        ..NodeDef::default()
    }
}

#[test]
fn scene_file_builds_the_whole_tree() {
    let doc = SceneDoc::from_reader(SCENE.as_bytes()).unwrap();
    assert_eq!(doc.opts.resolution, Resolution::FHD);
    let (mut g, root) = doc.build(&mut NullHost).unwrap();

    assert_eq!(g.kind(root).unwrap(), NodeKind::Group);
    assert_eq!(g.children(root).unwrap().len(), 2);
    assert_eq!(g.peek_vec2(root, "translation", Vec2::ZERO), Vec2::new(10.0, 20.0));

    let item = g.find_node_by_id(root, "item").unwrap();
    assert_eq!(g.get(item, "text").unwrap(), TypedValue::string("Play"));
    // Labels pick up the FHD line spacing at creation.
    assert_eq!(g.peek_f64(item, "linespacing"), 12.0);

    let rect = g.find_node_by_id(root, "box").unwrap();
    assert_eq!(g.get(rect, "height").unwrap(), TypedValue::Float(40.5));
    assert_eq!(g.ref_count(rect).unwrap(), 1);
    assert_eq!(g.ref_count(root).unwrap(), 1);
}

#[test]
fn focus_names_a_node_by_id() {
    let doc = SceneDoc::from_reader(SCENE.as_bytes()).unwrap();
    let (g, root) = doc.build(&mut NullHost).unwrap();
    let menu = g.find_node_by_id(root, "menu").unwrap();
    assert_eq!(g.focused(), Some(menu));
    assert!(g.is_in_focus_chain(root));
}

#[test]
fn missing_focus_target_is_a_validation_error() {
    let mut doc = SceneDoc::from_reader(SCENE.as_bytes()).unwrap();
    doc.focus = Some("nowhere".to_owned());
    let err = doc.build(&mut NullHost).unwrap_err();
    assert!(matches!(err, SceneError::Validation(_)), "{err}");
}

#[test]
fn undeclared_fields_are_added_from_their_value() {
    let doc = SceneDoc::from_reader(SCENE.as_bytes()).unwrap();
    let (g, root) = doc.build(&mut NullHost).unwrap();
    let menu = g.find_node_by_id(root, "menu").unwrap();
    assert!(g.has_field(menu, "score").unwrap());
    assert_eq!(g.field_kind(menu, "score").unwrap(), Some(FieldKind::Integer));
    assert_eq!(g.peek(menu, "score"), Some(&TypedValue::Int32(3)));
}

#[test]
fn mismatched_field_values_are_skipped() {
    let mut g = SceneGraph::new();
    let mut rect = def("Rectangle");
    rect.fields
        .insert("visible".to_owned(), serde_json::json!([1, 2]));
    rect.fields.insert("width".to_owned(), serde_json::json!(12));
    let id = g.instantiate(&rect, &mut NullHost).unwrap();
    assert_eq!(g.peek(id, "visible"), Some(&TypedValue::Boolean(true)));
    assert_eq!(g.peek_f64(id, "width"), 12.0);
}

#[test]
fn unknown_subtype_unwinds_the_partial_tree() {
    let mut g = SceneGraph::new();
    let mut parent = def("Group");
    parent.children.push(def("Rectangle"));
    parent.children.push(def("Hologram"));

    let err = g.instantiate(&parent, &mut NullHost).unwrap_err();
    assert!(err.to_string().contains("Hologram"));
    assert!(g.is_empty());
}

#[test]
fn scene_json_rejects_unknown_keys() {
    let bad = r#"{ "root": { "subtype": "Group", "colour": 1 } }"#;
    assert!(SceneDoc::from_reader(bad.as_bytes()).is_err());
    let bad = r#"{ "root": { "subtype": "Group" }, "camera": {} }"#;
    assert!(SceneDoc::from_reader(bad.as_bytes()).is_err());
}

#[test]
fn node_defs_serialize_compactly() {
    let mut label = def("Label");
    label.id = Some("title".to_owned());
    let json = serde_json::to_value(&label).unwrap();
    assert_eq!(json, serde_json::json!({ "subtype": "Label", "id": "title" }));
    let back: NodeDef = serde_json::from_value(json).unwrap();
    assert_eq!(back, label);
}
