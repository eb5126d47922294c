use super::*;

fn approx(a: Rect2D, b: Rect2D) -> bool {
    (a.x - b.x).abs() < 1e-9
        && (a.y - b.y).abs() < 1e-9
        && (a.width - b.width).abs() < 1e-9
        && (a.height - b.height).abs() < 1e-9
}

#[test]
fn union_absorbs_non_finite_operands() {
    let r = Rect2D::new(3.0, 4.0, 10.0, 20.0);
    assert_eq!(r.union(Rect2D::UNBOUNDED), r);
    assert_eq!(Rect2D::UNBOUNDED.union(r), r);
    let nan = Rect2D::new(f64::NAN, 0.0, 1.0, 1.0);
    assert_eq!(r.union(nan), r);
    assert_eq!(nan.union(r), r);
}

#[test]
fn union_covers_both_rects() {
    let a = Rect2D::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect2D::new(5.0, -5.0, 10.0, 10.0);
    assert_eq!(a.union(b), Rect2D::new(0.0, -5.0, 15.0, 15.0));
}

#[test]
fn rotation_by_zero_is_identity() {
    let r = Rect2D::new(7.0, 9.0, 30.0, 12.0);
    assert!(approx(r.rotated(0.0, Vec2::ZERO), r));
}

#[test]
fn quarter_turn_swaps_extent() {
    let r = Rect2D::new(0.0, 0.0, 40.0, 10.0);
    let rotated = r.rotated(std::f64::consts::FRAC_PI_2, Vec2::new(20.0, 5.0));
    assert!((rotated.width - 10.0).abs() < 1e-9);
    assert!((rotated.height - 40.0).abs() < 1e-9);
    assert!((rotated.x - 15.0).abs() < 1e-9);
    assert!((rotated.y + 15.0).abs() < 1e-9);
}

#[test]
fn rotate_translation_matches_rect_rotation_sense() {
    let v = rotate_translation(Vec2::new(10.0, 0.0), std::f64::consts::FRAC_PI_2);
    assert!(v.x.abs() < 1e-9);
    assert!((v.y + 10.0).abs() < 1e-9);
}

#[test]
fn kurbo_conversion_preserves_geometry() {
    let r = Rect2D::new(1.0, 2.0, 3.0, 4.0);
    assert_eq!(Rect2D::from(r.to_kurbo()), r);
}
