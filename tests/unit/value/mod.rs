use super::*;

#[test]
fn numeric_accessors_widen_every_number_variant() {
    assert_eq!(TypedValue::Int32(7).as_f64(), Some(7.0));
    assert_eq!(TypedValue::Color(-1).as_i64(), Some(-1));
    assert_eq!(TypedValue::Float(2.5).as_f64(), Some(2.5));
    assert_eq!(TypedValue::Time(1.25).as_f64(), Some(1.25));
    assert_eq!(TypedValue::string("3").as_f64(), None);
    assert!(TypedValue::Int64(1).is_number());
    assert!(!TypedValue::Boolean(true).is_number());
}

#[test]
fn vec2_reads_back_as_vector() {
    let v = TypedValue::vec2(10.0, -4.5);
    assert_eq!(v.as_vec2(), Some(Vec2::new(10.0, -4.5)));
    assert_eq!(TypedValue::array([TypedValue::Int32(1)]).as_vec2(), None);
}

#[test]
fn display_prints_whole_floats_without_fraction() {
    assert_eq!(TypedValue::Float(3.0).to_string(), "3");
    assert_eq!(TypedValue::Double(0.5).to_string(), "0.5");
    assert_eq!(TypedValue::Boolean(false).to_string(), "false");
    assert_eq!(TypedValue::Invalid.to_string(), "invalid");
}

#[test]
fn assoc_lookup_ignores_key_case() {
    let map = TypedValue::assoc([("Width", TypedValue::Int32(4))]);
    let map = map.as_assoc().unwrap();
    assert_eq!(assoc_get(map, "width"), Some(&TypedValue::Int32(4)));
    assert_eq!(assoc_get(map, "height"), None);
}

#[test]
fn strings_and_numbers_filter_foreign_elements() {
    let v = TypedValue::array([
        TypedValue::string("a"),
        TypedValue::Int32(2),
        TypedValue::string("b"),
    ]);
    assert_eq!(v.strings(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(v.numbers(), vec![2.0]);
}
