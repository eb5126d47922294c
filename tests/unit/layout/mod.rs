use super::*;
use crate::field::observer::NullHost;
use crate::node::NodeKind;
use crate::render::surface::RecordingSurface;

fn vert(spacings: &[f64]) -> LayoutConfig {
    LayoutConfig {
        direction: Direction::Vert,
        spacings: spacings.to_vec(),
        add_spacing_after: true,
        ..LayoutConfig::default()
    }
}

fn tall(heights: &[f64]) -> Vec<ChildMetrics> {
    heights
        .iter()
        .map(|h| ChildMetrics {
            primary: *h,
            cross: 40.0,
            ..ChildMetrics::default()
        })
        .collect()
}

fn starts(placements: &[Placement]) -> Vec<f64> {
    placements.iter().map(|p| p.primary).collect()
}

#[test]
fn stacks_with_spacing_after_each_child() {
    let p = plan_placements(&vert(&[5.0]), &tall(&[20.0, 30.0, 25.0]));
    assert_eq!(starts(&p), vec![0.0, 25.0, 60.0]);
    assert!(p.iter().all(|p| p.cross == Some(0.0)));
}

#[test]
fn spacing_before_each_child() {
    let mut config = vert(&[5.0]);
    config.add_spacing_after = false;
    let p = plan_placements(&config, &tall(&[20.0, 30.0]));
    assert_eq!(starts(&p), vec![5.0, 30.0]);
}

#[test]
fn last_spacing_repeats_and_empty_list_means_zero() {
    let p = plan_placements(&vert(&[1.0, 2.0]), &tall(&[10.0, 10.0, 10.0, 10.0]));
    assert_eq!(starts(&p), vec![0.0, 11.0, 23.0, 35.0]);
    let p = plan_placements(&vert(&[]), &tall(&[10.0, 10.0]));
    assert_eq!(starts(&p), vec![0.0, 10.0]);
}

#[test]
fn centered_alignment_on_both_axes() {
    let mut config = vert(&[10.0]);
    config.primary_align = Align::Center;
    config.cross_align = Align::Center;
    let p = plan_placements(&config, &tall(&[20.0, 30.0]));
    // The spacing after the last child counts toward the extent being aligned.
    assert_eq!(starts(&p), vec![-35.0, -5.0]);
    assert_eq!(p[0].cross, Some(-20.0));

    config.primary_align = Align::End;
    config.cross_align = Align::Custom;
    let p = plan_placements(&config, &tall(&[20.0, 30.0]));
    assert_eq!(starts(&p), vec![-70.0, -40.0]);
    assert_eq!(p[0].cross, None);
}

#[test]
fn drift_check_compares_extents_only() {
    let placed = ChildMetrics {
        primary: 20.0,
        cross: 40.0,
        primary_start: 0.0,
        cross_start: 0.0,
    };
    let moved = ChildMetrics {
        primary_start: 12.0,
        cross_start: -3.0,
        ..placed
    };
    assert!(placed.same_extent(&moved, 0.25));
    let grown = ChildMetrics {
        primary: 21.0,
        ..placed
    };
    assert!(!placed.same_extent(&grown, 0.25));
}

#[test]
fn direction_and_alignment_parsing_fall_back() {
    assert_eq!(Direction::parse("HORIZ"), Direction::Horiz);
    assert_eq!(Direction::parse("sideways"), Direction::Vert);
    assert_eq!(Align::parse("Right", "left", "right"), Align::End);
    assert_eq!(Align::parse("diagonal", "left", "right"), Align::Start);
}

#[test]
fn spacing_signature_is_order_sensitive() {
    assert_eq!(spacing_signature(&[1.0, 2.0]), spacing_signature(&[1.0, 2.0]));
    assert_ne!(spacing_signature(&[1.0, 2.0]), spacing_signature(&[2.0, 1.0]));
    assert_ne!(spacing_signature(&[]), spacing_signature(&[0.0]));
}

fn column(g: &mut SceneGraph, heights: &[f64], spacing: f64) -> (NodeId, Vec<NodeId>) {
    let mut host = NullHost;
    let group = g.create_node(NodeKind::LayoutGroup);
    g.set(
        group,
        "itemSpacings",
        TypedValue::array([TypedValue::Float(spacing as f32)]),
        &mut host,
    )
    .unwrap();
    let kids = heights
        .iter()
        .map(|h| {
            let r = g.create_node(NodeKind::Rectangle);
            g.set(r, "width", TypedValue::Float(50.0), &mut host).unwrap();
            g.set(r, "height", TypedValue::Float(*h as f32), &mut host)
                .unwrap();
            g.append_child(group, r).unwrap();
            g.release(r).unwrap();
            r
        })
        .collect();
    (group, kids)
}

fn ys(g: &SceneGraph, kids: &[NodeId]) -> Vec<f64> {
    kids.iter()
        .map(|k| g.peek_vec2(*k, "translation", Vec2::ZERO).y)
        .collect()
}

#[test]
fn declared_sizes_converge_on_the_first_frame() {
    let mut g = SceneGraph::new();
    let mut host = NullHost;
    let mut surface = RecordingSurface::new();
    let (group, kids) = column(&mut g, &[10.0, 20.0, 30.0], 10.0);
    assert!(g.is_layout_dirty(group).unwrap());

    for _ in 0..4 {
        g.render(group, &mut surface, &mut host).unwrap();
        assert!(!g.is_layout_dirty(group).unwrap());
    }
    assert_eq!(ys(&g, &kids), vec![0.0, 20.0, 50.0]);
}

#[test]
fn resized_child_is_replaced_one_frame_later() {
    let mut g = SceneGraph::new();
    let mut host = NullHost;
    let mut surface = RecordingSurface::new();
    let (group, kids) = column(&mut g, &[20.0, 30.0, 25.0], 5.0);
    g.render(group, &mut surface, &mut host).unwrap();
    assert_eq!(ys(&g, &kids), vec![0.0, 25.0, 60.0]);

    g.set(kids[0], "height", TypedValue::Float(40.0), &mut host)
        .unwrap();
    g.render(group, &mut surface, &mut host).unwrap();
    assert!(g.is_layout_dirty(group).unwrap());
    assert_eq!(ys(&g, &kids), vec![0.0, 25.0, 60.0]);

    g.render(group, &mut surface, &mut host).unwrap();
    assert_eq!(ys(&g, &kids), vec![0.0, 45.0, 80.0]);
    g.render(group, &mut surface, &mut host).unwrap();
    assert!(!g.is_layout_dirty(group).unwrap());
}

#[test]
fn spacing_and_child_count_changes_invalidate() {
    let mut g = SceneGraph::new();
    let mut host = NullHost;
    let mut surface = RecordingSurface::new();
    let (group, kids) = column(&mut g, &[10.0, 10.0], 0.0);
    g.render(group, &mut surface, &mut host).unwrap();
    assert_eq!(ys(&g, &kids), vec![0.0, 10.0]);

    g.set(
        group,
        "itemspacings",
        TypedValue::array([TypedValue::Int32(4)]),
        &mut host,
    )
    .unwrap();
    assert!(g.is_layout_dirty(group).unwrap());
    g.render(group, &mut surface, &mut host).unwrap();
    assert_eq!(ys(&g, &kids), vec![0.0, 14.0]);

    g.remove_child(group, kids[0]).unwrap();
    g.render(group, &mut surface, &mut host).unwrap();
    assert_eq!(ys(&g, &kids[1..]), vec![0.0]);
}

#[test]
fn horizontal_layout_moves_x_only() {
    let mut g = SceneGraph::new();
    let mut host = NullHost;
    let mut surface = RecordingSurface::new();
    let (group, kids) = column(&mut g, &[10.0, 10.0], 6.0);
    g.set(group, "layoutDirection", TypedValue::string("horiz"), &mut host)
        .unwrap();
    g.set(group, "vertAlignment", TypedValue::string("custom"), &mut host)
        .unwrap();
    g.set(kids[1], "translation", TypedValue::vec2(0.0, 7.0), &mut host)
        .unwrap();
    g.render(group, &mut surface, &mut host).unwrap();

    let t0 = g.peek_vec2(kids[0], "translation", Vec2::ZERO);
    let t1 = g.peek_vec2(kids[1], "translation", Vec2::ZERO);
    assert_eq!((t0.x, t0.y), (0.0, 0.0));
    assert_eq!((t1.x, t1.y), (56.0, 7.0));
}

#[test]
fn non_geometry_children_are_ignored() {
    let mut g = SceneGraph::new();
    let mut host = NullHost;
    let mut surface = RecordingSurface::new();
    let (group, kids) = column(&mut g, &[10.0], 0.0);
    let data = g.create_node(NodeKind::Node);
    g.insert_child(group, data, 0).unwrap();
    g.render(group, &mut surface, &mut host).unwrap();
    assert_eq!(ys(&g, &kids), vec![0.0]);
    assert_eq!(g.layout_children(group), kids);
}
