use super::*;

#[test]
fn names_parse_with_aliases_and_any_case() {
    assert_eq!(FieldKind::from_name("INT"), Some(FieldKind::Integer));
    assert_eq!(FieldKind::from_name("longint"), Some(FieldKind::LongInteger));
    assert_eq!(FieldKind::from_name("Bool"), Some(FieldKind::Boolean));
    assert_eq!(FieldKind::from_name("uri"), Some(FieldKind::String));
    assert_eq!(FieldKind::from_name("nodearray"), Some(FieldKind::Array));
    assert_eq!(FieldKind::from_name("roAssociativeArray"), Some(FieldKind::AssocArray));
    assert_eq!(FieldKind::from_name("Vector2D"), Some(FieldKind::Vector2D));
    assert_eq!(FieldKind::from_name("nonsense"), None);
}

#[test]
fn float_into_integer_truncates() {
    assert!(FieldKind::Integer.can_accept(&TypedValue::Float(3.9)));
    assert_eq!(
        FieldKind::Integer.convert(TypedValue::Float(3.9)),
        TypedValue::Int32(3)
    );
    assert_eq!(
        FieldKind::Integer.convert(TypedValue::Float(-3.9)),
        TypedValue::Int32(-3)
    );
}

#[test]
fn booleans_and_strings_cross_convert() {
    assert_eq!(
        FieldKind::String.convert(TypedValue::Boolean(true)),
        TypedValue::string("1")
    );
    assert_eq!(
        FieldKind::String.convert(TypedValue::Boolean(false)),
        TypedValue::string("0")
    );
    assert_eq!(
        FieldKind::Boolean.convert(TypedValue::string("TRUE")),
        TypedValue::Boolean(true)
    );
    assert_eq!(
        FieldKind::Boolean.convert(TypedValue::string("yes")),
        TypedValue::Boolean(false)
    );
    assert_eq!(
        FieldKind::String.convert(TypedValue::Float(2.5)),
        TypedValue::string("2.5")
    );
}

#[test]
fn only_object_kinds_accept_invalid() {
    assert!(FieldKind::Object.can_accept(&TypedValue::Invalid));
    assert!(FieldKind::Node.can_accept(&TypedValue::Invalid));
    assert!(!FieldKind::Integer.can_accept(&TypedValue::Invalid));
    assert!(!FieldKind::String.can_accept(&TypedValue::Invalid));
    assert!(!FieldKind::Rect2D.can_accept(&TypedValue::Invalid));
}

#[test]
fn rect2d_accepts_arrays_and_maps() {
    let arr = TypedValue::array([1, 2, 3, 4].map(TypedValue::Int32));
    assert!(FieldKind::Rect2D.can_accept(&arr));
    assert_eq!(
        FieldKind::Rect2D.convert(arr),
        TypedValue::Rect2D(Rect2D::new(1.0, 2.0, 3.0, 4.0))
    );

    let map = TypedValue::assoc([
        ("x", TypedValue::Float(1.0)),
        ("y", TypedValue::Float(2.0)),
        ("width", TypedValue::Float(5.0)),
        ("height", TypedValue::Float(6.0)),
    ]);
    assert!(FieldKind::Rect2D.can_accept(&map));
    assert_eq!(
        rect_from_value(&map).unwrap(),
        Rect2D::new(1.0, 2.0, 5.0, 6.0)
    );

    let short = TypedValue::array([1, 2, 3].map(TypedValue::Int32));
    assert!(!FieldKind::Rect2D.can_accept(&short));
    assert!(matches!(
        rect_from_value(&short),
        Err(SceneError::MalformedValue(_))
    ));
}

#[test]
fn vector2d_normalizes_to_float_pair() {
    let map = TypedValue::assoc([("x", TypedValue::Int32(3)), ("y", TypedValue::Int32(4))]);
    assert!(FieldKind::Vector2D.can_accept(&map));
    assert_eq!(FieldKind::Vector2D.convert(map), TypedValue::vec2(3.0, 4.0));
    assert!(vec2_from_value(&TypedValue::string("x")).is_err());
}

#[test]
fn numbers_widen_into_number_arrays() {
    assert_eq!(
        FieldKind::IntArray.convert(TypedValue::Float(2.0)),
        TypedValue::array([TypedValue::Int32(2)])
    );
    assert_eq!(
        FieldKind::FloatArray.convert(TypedValue::Int32(2)),
        TypedValue::array([TypedValue::Float(2.0)])
    );
    assert_eq!(
        FieldKind::TimeArray.convert(TypedValue::Int32(2)),
        TypedValue::array([TypedValue::Double(2.0)])
    );
    assert_eq!(
        FieldKind::BoolArray.convert(TypedValue::Boolean(true)),
        TypedValue::array([TypedValue::Boolean(true)])
    );
}

#[test]
fn string_array_rejects_mixed_arrays() {
    let ok = TypedValue::string_array(["a", "b"]);
    let mixed = TypedValue::array([TypedValue::string("a"), TypedValue::Int32(1)]);
    assert!(FieldKind::StringArray.can_accept(&ok));
    assert!(!FieldKind::StringArray.can_accept(&mixed));
}

#[test]
fn hex_colors_get_implicit_alpha() {
    assert_eq!(convert_hex_color("#FF0000"), 0xFF00_00FF_u32 as i32);
    assert_eq!(convert_hex_color("0xFF0000FF"), 0xFF00_00FF_u32 as i32);
    assert_eq!(convert_hex_color("00FF00"), 0x00FF_00FF);
    assert_eq!(convert_hex_color("FF"), 0x0000_FFFF);
    assert_eq!(convert_hex_color("0xFFFFFFFF"), -1);
    assert_eq!(convert_hex_color("zz"), -1);
    assert_eq!(convert_hex_color(""), -1);
}

#[test]
fn literals_parse_per_kind() {
    assert_eq!(
        FieldKind::Boolean.parse_literal(Some("true")),
        TypedValue::Boolean(true)
    );
    assert_eq!(
        FieldKind::Float.parse_literal(Some("1.0")),
        TypedValue::Float(1.0)
    );
    assert_eq!(
        FieldKind::Integer.parse_literal(Some("0x10")),
        TypedValue::Int32(16)
    );
    assert_eq!(
        FieldKind::Vector2D.parse_literal(Some("[1.0,2.0]")),
        TypedValue::vec2(1.0, 2.0)
    );
    assert_eq!(
        FieldKind::Rect2D.parse_literal(Some("[0.0,0.0,10.0,5.0]")),
        TypedValue::Rect2D(Rect2D::new(0.0, 0.0, 10.0, 5.0))
    );
    assert_eq!(
        FieldKind::Color.parse_literal(Some("0xddddddff")),
        TypedValue::Color(0xDDDD_DDFF_u32 as i32)
    );
    assert_eq!(FieldKind::Color.default_value(), TypedValue::Color(-1));
    assert_eq!(FieldKind::Node.default_value(), TypedValue::Invalid);
    assert_eq!(
        FieldKind::StringArray.parse_literal(Some("[\"a\",\"b\"]")),
        TypedValue::string_array(["a", "b"])
    );
    assert_eq!(
        FieldKind::ColorArray.parse_literal(Some("[ 0xFF0000FF, #00FF00 ]")),
        TypedValue::array([
            TypedValue::Int32(0xFF00_00FF_u32 as i32),
            TypedValue::Int32(0x00FF_00FF),
        ])
    );
    assert_eq!(
        FieldKind::AssocArray.parse_literal(Some("{}")),
        TypedValue::assoc(Vec::<(String, TypedValue)>::new())
    );
    assert_eq!(
        FieldKind::Float.parse_literal(Some("garbage")),
        TypedValue::Float(0.0)
    );
}
