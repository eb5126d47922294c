use super::*;
use crate::field::observer::NullHost;
use crate::render::surface::RecordingSurface;

fn group(g: &mut SceneGraph, buttons: &[&str]) -> NodeId {
    let mut host = NullHost;
    let bg = g.create_node(NodeKind::ButtonGroup);
    g.set(bg, "buttons", TypedValue::string_array(buttons.iter().copied()), &mut host)
        .unwrap();
    bg
}

fn frame(g: &mut SceneGraph, id: NodeId) {
    let mut surface = RecordingSurface::new();
    g.render(id, &mut surface, &mut NullHost).unwrap();
}

fn label_texts(g: &SceneGraph, id: NodeId) -> Vec<String> {
    g.children(id)
        .unwrap()
        .iter()
        .map(|l| g.peek_str(*l, "text").to_owned())
        .collect()
}

#[test]
fn one_label_per_button_with_a_common_width() {
    let mut g = SceneGraph::new();
    let bg = group(&mut g, &["OK", "Cancel"]);
    frame(&mut g, bg);

    assert_eq!(label_texts(&g, bg), vec!["OK", "Cancel"]);
    // "Cancel" in the 24px focused font is 72 wide, plus 24 on each side.
    for label in g.children(bg).unwrap().to_vec() {
        assert_eq!(g.kind(label).unwrap(), NodeKind::Label);
        assert_eq!(g.peek_f64(label, "width"), 120.0);
        assert_eq!(g.peek_str(label, "vertalign"), "center");
    }
}

#[test]
fn width_respects_min_and_max() {
    let mut g = SceneGraph::new();
    let mut host = NullHost;
    let bg = group(&mut g, &["OK"]);
    g.set(bg, "minWidth", TypedValue::Float(300.0), &mut host).unwrap();
    frame(&mut g, bg);
    let label = g.children(bg).unwrap()[0];
    assert_eq!(g.peek_f64(label, "width"), 300.0);

    g.set(bg, "maxWidth", TypedValue::Float(200.0), &mut host).unwrap();
    frame(&mut g, bg);
    assert_eq!(g.peek_f64(label, "width"), 200.0);
}

#[test]
fn labels_are_reused_and_trimmed() {
    let mut g = SceneGraph::new();
    let mut host = NullHost;
    let bg = group(&mut g, &["a", "b", "c"]);
    frame(&mut g, bg);
    let first = g.children(bg).unwrap()[0];
    let third = g.children(bg).unwrap()[2];

    g.set(bg, "buttons", TypedValue::string_array(["x"]), &mut host)
        .unwrap();
    frame(&mut g, bg);
    assert_eq!(g.children(bg).unwrap(), vec![first]);
    assert_eq!(label_texts(&g, bg), vec!["x"]);
    assert!(!g.is_alive(third));
}

#[test]
fn focused_button_uses_the_focused_style() {
    let mut g = SceneGraph::new();
    let mut host = NullHost;
    let bg = group(&mut g, &["OK", "Cancel"]);
    frame(&mut g, bg);
    let labels = g.children(bg).unwrap().to_vec();
    assert_eq!(g.peek_i64(labels[0], "color") as i32, 0xddddddff_u32 as i32);

    g.set_focus(bg, true, &mut host).unwrap();
    frame(&mut g, bg);
    assert_eq!(g.peek_i64(labels[0], "color") as i32, 0x262626ff_u32 as i32);
    assert_eq!(g.peek_str(labels[0], "font"), "font:MediumBoldSystemFont");
    assert_eq!(g.peek_i64(labels[1], "color") as i32, 0xddddddff_u32 as i32);
}

#[test]
fn up_and_down_move_focus_within_bounds() {
    let mut g = SceneGraph::new();
    let mut host = NullHost;
    let bg = group(&mut g, &["a", "b", "c"]);
    g.set_focus(bg, true, &mut host).unwrap();

    assert!(g.route_key("down", true, &mut host).unwrap());
    assert_eq!(g.peek_i64(bg, "buttonfocused"), 1);
    assert!(g.route_key("down", false, &mut host).unwrap());
    assert!(g.route_key("down", true, &mut host).unwrap());
    assert!(g.route_key("down", false, &mut host).unwrap());
    assert_eq!(g.peek_i64(bg, "buttonfocused"), 2);

    // Already at the last button: not handled, so the release is not swallowed either.
    assert!(!g.route_key("down", true, &mut host).unwrap());
    assert!(!g.route_key("down", false, &mut host).unwrap());
    assert_eq!(g.peek_i64(bg, "buttonfocused"), 2);

    assert!(g.route_key("up", true, &mut host).unwrap());
    assert_eq!(g.peek_i64(bg, "buttonfocused"), 1);
}

#[test]
fn ok_selects_the_focused_button() {
    let mut g = SceneGraph::new();
    let mut host = NullHost;
    let bg = group(&mut g, &["a", "b"]);
    g.set(bg, "focusButton", TypedValue::Int32(1), &mut host).unwrap();
    assert_eq!(g.peek_i64(bg, "buttonfocused"), 1);

    assert!(g.handle_key(bg, "OK", true, &mut host).unwrap());
    assert_eq!(g.peek_i64(bg, "buttonselected"), 1);
    assert!(g.handle_key(bg, "OK", false, &mut host).unwrap());
    assert!(!g.handle_key(bg, "left", true, &mut host).unwrap());
}

#[test]
fn out_of_range_focus_requests_are_ignored() {
    let mut g = SceneGraph::new();
    let mut host = NullHost;
    let bg = group(&mut g, &["a", "b"]);
    g.set(bg, "focusButton", TypedValue::Int32(5), &mut host).unwrap();
    assert_eq!(g.peek_i64(bg, "buttonfocused"), 0);
    g.set(bg, "focusButton", TypedValue::Int32(-1), &mut host).unwrap();
    assert_eq!(g.peek_i64(bg, "buttonfocused"), 0);
}

#[test]
fn empty_group_handles_nothing() {
    let mut g = SceneGraph::new();
    let mut host = NullHost;
    let bg = group(&mut g, &[]);
    frame(&mut g, bg);
    assert!(g.children(bg).unwrap().is_empty());
    assert!(!g.handle_key(bg, "down", true, &mut host).unwrap());
}
