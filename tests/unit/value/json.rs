use super::*;

#[test]
fn numbers_pick_the_narrowest_variant() {
    assert_eq!(from_json(&serde_json::json!(5)), TypedValue::Int32(5));
    assert_eq!(
        from_json(&serde_json::json!(5_000_000_000_i64)),
        TypedValue::Int64(5_000_000_000)
    );
    assert_eq!(from_json(&serde_json::json!(1.5)), TypedValue::Float(1.5));
    assert_eq!(from_json(&serde_json::json!(null)), TypedValue::Invalid);
}

#[test]
fn nested_structures_convert() {
    let v = from_json(&serde_json::json!({"items": ["a", true], "n": 2}));
    let map = v.as_assoc().unwrap();
    assert_eq!(
        map.get("items"),
        Some(&TypedValue::array([
            TypedValue::string("a"),
            TypedValue::Boolean(true)
        ]))
    );
    assert_eq!(map.get("n"), Some(&TypedValue::Int32(2)));
}

#[test]
fn rect_and_invalid_dump_readably() {
    let r = to_json(&TypedValue::Rect2D(crate::foundation::core::Rect2D::new(
        1.0, 2.0, 3.0, 4.0,
    )));
    assert_eq!(
        r,
        serde_json::json!({"x": 1.0, "y": 2.0, "width": 3.0, "height": 4.0})
    );
    assert_eq!(to_json(&TypedValue::Invalid), serde_json::Value::Null);
}
