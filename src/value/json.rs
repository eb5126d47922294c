use serde_json::{Map, Number, Value};

use crate::value::TypedValue;

/// Convert a JSON value from a scene description into a typed value.
///
/// Integers that fit in 32 bits become `Int32`, larger ones `Int64`, fractional numbers `Float`.
pub fn from_json(value: &Value) -> TypedValue {
    match value {
        Value::Null => TypedValue::Invalid,
        Value::Bool(b) => TypedValue::Boolean(*b),
        Value::Number(n) => number_from_json(n),
        Value::String(s) => TypedValue::String(s.clone()),
        Value::Array(items) => TypedValue::array(items.iter().map(from_json)),
        Value::Object(map) => TypedValue::assoc(map.iter().map(|(k, v)| (k.clone(), from_json(v)))),
    }
}

fn number_from_json(n: &Number) -> TypedValue {
    if let Some(i) = n.as_i64() {
        return i32::try_from(i).map_or(TypedValue::Int64(i), TypedValue::Int32);
    }
    TypedValue::Float(n.as_f64().unwrap_or(0.0) as f32)
}

/// Convert a typed value to JSON for diagnostics and dumps.
///
/// Node references serialize as `{"node": "<index>v<generation>"}` and function references as
/// their name.
pub fn to_json(value: &TypedValue) -> Value {
    match value {
        TypedValue::Int32(v) | TypedValue::Color(v) => Value::from(*v),
        TypedValue::Int64(v) => Value::from(*v),
        TypedValue::Float(v) => float_to_json(f64::from(*v)),
        TypedValue::Double(v) | TypedValue::Time(v) => float_to_json(*v),
        TypedValue::Boolean(b) => Value::Bool(*b),
        TypedValue::String(s) => Value::String(s.clone()),
        TypedValue::Node(id) => {
            let mut map = Map::new();
            map.insert("node".to_owned(), Value::String(id.to_string()));
            Value::Object(map)
        }
        TypedValue::Array(items) => Value::Array(items.iter().map(to_json).collect()),
        TypedValue::AssocArray(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect(),
        ),
        TypedValue::Rect2D(r) => serde_json::json!({
            "x": r.x,
            "y": r.y,
            "width": r.width,
            "height": r.height,
        }),
        TypedValue::Function(f) => Value::String(f.name().to_owned()),
        TypedValue::Invalid => Value::Null,
    }
}

fn float_to_json(v: f64) -> Value {
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}

#[cfg(test)]
#[path = "../../tests/unit/value/json.rs"]
mod tests;
