use std::rc::Rc;

use crate::foundation::core::Rect2D;
use crate::foundation::error::{SceneError, SceneResult};
use crate::value::{AssocMap, TypedValue, assoc_get, format_number, json};

/// Declared type of a node field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    LongInteger,
    /// Single precision float.
    Float,
    /// Double precision float.
    Double,
    /// Boolean.
    Boolean,
    /// String (also `uri`).
    String,
    /// Node reference.
    Node,
    /// Untyped array.
    Array,
    /// Associative map.
    AssocArray,
    /// Packed colour.
    Color,
    /// Time in seconds.
    Time,
    /// Rectangle.
    Rect2D,
    /// Two-float vector.
    Vector2D,
    /// Function reference.
    Function,
    /// Any object, including `invalid`.
    Object,
    /// Array of integers.
    IntArray,
    /// Array of floats.
    FloatArray,
    /// Array of booleans.
    BoolArray,
    /// Array of strings.
    StringArray,
    /// Array of colours.
    ColorArray,
    /// Array of times.
    TimeArray,
}

impl FieldKind {
    /// Parse a declaration type name, case-insensitively, honouring the host's aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => Self::Integer,
            "longint" | "longinteger" => Self::LongInteger,
            "float" => Self::Float,
            "double" => Self::Double,
            "bool" | "boolean" => Self::Boolean,
            "str" | "string" | "uri" => Self::String,
            "node" => Self::Node,
            "array" | "roarray" | "nodearray" | "vector2darray" | "rect2darray" => Self::Array,
            "assocarray" | "roassociativearray" => Self::AssocArray,
            "color" => Self::Color,
            "time" => Self::Time,
            "rect2d" => Self::Rect2D,
            "vector2d" => Self::Vector2D,
            "function" => Self::Function,
            "object" => Self::Object,
            "intarray" => Self::IntArray,
            "floatarray" => Self::FloatArray,
            "boolarray" => Self::BoolArray,
            "stringarray" => Self::StringArray,
            "colorarray" => Self::ColorArray,
            "timearray" => Self::TimeArray,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical lowercase declaration name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::LongInteger => "longinteger",
            Self::Float => "float",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Node => "node",
            Self::Array => "array",
            Self::AssocArray => "assocarray",
            Self::Color => "color",
            Self::Time => "time",
            Self::Rect2D => "rect2d",
            Self::Vector2D => "vector2d",
            Self::Function => "function",
            Self::Object => "object",
            Self::IntArray => "intarray",
            Self::FloatArray => "floatarray",
            Self::BoolArray => "boolarray",
            Self::StringArray => "stringarray",
            Self::ColorArray => "colorarray",
            Self::TimeArray => "timearray",
        }
    }

    /// Kind implied by a value's own variant (used when a field is created from a value).
    pub fn of_value(value: &TypedValue) -> Option<Self> {
        let kind = match value {
            TypedValue::Int32(_) => Self::Integer,
            TypedValue::Int64(_) => Self::LongInteger,
            TypedValue::Float(_) => Self::Float,
            TypedValue::Double(_) => Self::Double,
            TypedValue::Boolean(_) => Self::Boolean,
            TypedValue::String(_) => Self::String,
            TypedValue::Node(_) => Self::Node,
            TypedValue::Array(_) => Self::Array,
            TypedValue::AssocArray(_) => Self::AssocArray,
            TypedValue::Color(_) => Self::Color,
            TypedValue::Time(_) => Self::Time,
            TypedValue::Rect2D(_) => Self::Rect2D,
            TypedValue::Function(_) => Self::Function,
            TypedValue::Invalid => return None,
        };
        Some(kind)
    }

    /// Scalar numeric kinds.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::LongInteger | Self::Float | Self::Double | Self::Color | Self::Time
        )
    }

    /// Kinds whose storage is a heap object and may therefore hold `invalid`.
    pub fn is_object(self) -> bool {
        matches!(
            self,
            Self::Node
                | Self::Array
                | Self::AssocArray
                | Self::Object
                | Self::Function
                | Self::IntArray
                | Self::FloatArray
                | Self::BoolArray
                | Self::StringArray
                | Self::ColorArray
                | Self::TimeArray
        )
    }

    fn is_number_array(self) -> bool {
        matches!(
            self,
            Self::IntArray | Self::FloatArray | Self::ColorArray | Self::TimeArray
        )
    }

    /// Whether `value` may be assigned to a field of this kind.
    pub fn can_accept(self, value: &TypedValue) -> bool {
        if value.is_invalid() {
            return self.is_object();
        }
        match self {
            Self::Object => true,
            k if k.is_numeric() && value.is_number() => true,
            Self::String => matches!(
                value,
                TypedValue::String(_) | TypedValue::Boolean(_)
            ) || value.is_number(),
            Self::Boolean => matches!(value, TypedValue::String(_) | TypedValue::Boolean(_)),
            Self::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(|v| v.as_str().is_some())),
            Self::Rect2D => match value {
                TypedValue::Rect2D(_) => true,
                TypedValue::Array(items) => {
                    items.len() == 4 && items.iter().all(TypedValue::is_number)
                }
                TypedValue::AssocArray(map) => rect_from_map(map).is_some(),
                _ => false,
            },
            Self::Vector2D => match value {
                TypedValue::Array(items) => {
                    items.len() == 2 && items.iter().all(TypedValue::is_number)
                }
                TypedValue::AssocArray(map) => vec2_from_map(map).is_some(),
                _ => false,
            },
            k if k.is_number_array() => {
                value.is_number() || matches!(value, TypedValue::Array(_))
            }
            Self::BoolArray => matches!(value, TypedValue::Boolean(_) | TypedValue::Array(_)),
            k => Self::of_value(value) == Some(k),
        }
    }

    /// Coerce an accepted value into this kind's storage variant.
    pub fn convert(self, value: TypedValue) -> TypedValue {
        match (self, value) {
            (Self::Object, v) => v,
            (Self::Rect2D, v) => TypedValue::Rect2D(rect_from_value(&v).unwrap_or(Rect2D::ZERO)),
            (Self::Vector2D, TypedValue::Array(items))
                if items.len() == 2 && items.iter().all(|i| matches!(i, TypedValue::Float(_))) =>
            {
                TypedValue::Array(items)
            }
            (Self::Vector2D, v) => {
                let (x, y) = vec2_from_value(&v).unwrap_or((0.0, 0.0));
                TypedValue::vec2(x, y)
            }
            (k, v) if v.is_number() => k.convert_number(v),
            (Self::String, TypedValue::Boolean(b)) => {
                TypedValue::string(if b { "1" } else { "0" })
            }
            (Self::Boolean, TypedValue::String(s)) => {
                TypedValue::Boolean(s.eq_ignore_ascii_case("true"))
            }
            (Self::BoolArray, TypedValue::Boolean(b)) => {
                TypedValue::array([TypedValue::Boolean(b)])
            }
            (_, v) => v,
        }
    }

    fn convert_number(self, value: TypedValue) -> TypedValue {
        let Some(n) = value.as_f64() else {
            return value;
        };
        match self {
            Self::Integer => TypedValue::Int32(n as i32),
            Self::LongInteger => TypedValue::Int64(n as i64),
            Self::Float => TypedValue::Float(n as f32),
            Self::Double => TypedValue::Double(n),
            Self::Color => TypedValue::Color(n as i64 as i32),
            Self::Time => TypedValue::Time(n),
            Self::String => TypedValue::String(match value {
                TypedValue::Int32(v) | TypedValue::Color(v) => v.to_string(),
                TypedValue::Int64(v) => v.to_string(),
                _ => format_number(n),
            }),
            Self::IntArray | Self::ColorArray => TypedValue::array([TypedValue::Int32(n as i32)]),
            Self::FloatArray => TypedValue::array([TypedValue::Float(n as f32)]),
            Self::TimeArray => TypedValue::array([TypedValue::Double(n)]),
            _ => value,
        }
    }

    /// Default value of this kind, optionally parsed from a declaration literal.
    ///
    /// Unparsable literals fall back to the kind's zero value. The result is already in this
    /// kind's storage variant.
    pub fn parse_literal(self, literal: Option<&str>) -> TypedValue {
        let lit = literal.map(str::trim).filter(|s| !s.is_empty());
        let raw = match self {
            Self::Boolean => {
                TypedValue::Boolean(lit.is_some_and(|s| s.eq_ignore_ascii_case("true")))
            }
            Self::Integer => TypedValue::Int32(lit.and_then(parse_number).unwrap_or(0.0) as i32),
            Self::LongInteger => {
                TypedValue::Int64(lit.and_then(parse_number).unwrap_or(0.0) as i64)
            }
            Self::Float => TypedValue::Float(lit.and_then(parse_number).unwrap_or(0.0) as f32),
            Self::Double => TypedValue::Double(lit.and_then(parse_number).unwrap_or(0.0)),
            Self::Time => TypedValue::Time(lit.and_then(parse_number).unwrap_or(0.0)),
            Self::String => TypedValue::string(literal.unwrap_or_default()),
            Self::Color => TypedValue::Color(
                lit.map(convert_hex_color)
                    .filter(|c| *c != -1)
                    .unwrap_or(-1),
            ),
            Self::Node | Self::Object | Self::Function => TypedValue::Invalid,
            Self::AssocArray => match lit {
                None => TypedValue::Invalid,
                Some(s) => parse_json_literal(s)
                    .filter(|v| matches!(v, TypedValue::AssocArray(_)))
                    .unwrap_or(TypedValue::Invalid),
            },
            Self::StringArray => match lit {
                Some(s) if !s.starts_with('[') => TypedValue::string_array([s]),
                _ => parse_array_literal(lit),
            },
            Self::ColorArray => parse_color_array(lit),
            Self::Array
            | Self::Rect2D
            | Self::Vector2D
            | Self::IntArray
            | Self::FloatArray
            | Self::BoolArray
            | Self::TimeArray => parse_array_literal(lit),
        };
        self.convert(raw)
    }

    /// Default (literal-free) value of this kind.
    pub fn default_value(self) -> TypedValue {
        self.parse_literal(None)
    }
}

/// Convert a `#RRGGBB`, `0xRRGGBBAA` or bare hex colour string to a packed integer.
///
/// Six-digit colours get an opaque `FF` alpha. Returns `-1` when the string is not hex.
pub fn convert_hex_color(text: &str) -> i32 {
    let text = text.trim();
    if text.is_empty() {
        return -1;
    }
    let digits = text.strip_prefix('#').unwrap_or(text);
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .or_else(|| digits.strip_prefix("&h"))
        .or_else(|| digits.strip_prefix("&H"))
        .unwrap_or(digits);
    let mut hex = format!("{digits:0>6}");
    if hex.len() == 6 {
        hex.push_str("FF");
    }
    match u64::from_str_radix(&hex, 16) {
        Ok(v) => v as u32 as i32,
        Err(_) => -1,
    }
}

/// Strict Rect2D conversion from a rectangle, a four-number array or an `{x, y, width, height}` map.
pub fn rect_from_value(value: &TypedValue) -> SceneResult<Rect2D> {
    match value {
        TypedValue::Rect2D(r) => Ok(*r),
        TypedValue::Array(items) if items.len() == 4 => {
            let n: Vec<f64> = items.iter().filter_map(TypedValue::as_f64).collect();
            match n.as_slice() {
                [x, y, w, h] => Ok(Rect2D::new(*x, *y, *w, *h)),
                _ => Err(SceneError::malformed("rect2d array must hold four numbers")),
            }
        }
        TypedValue::AssocArray(map) => rect_from_map(map)
            .ok_or_else(|| SceneError::malformed("rect2d map needs numeric x, y, width, height")),
        other => Err(SceneError::malformed(format!(
            "cannot build rect2d from {}",
            other.type_name()
        ))),
    }
}

/// Strict Vector2D conversion from a two-number array or an `{x, y}` map.
pub fn vec2_from_value(value: &TypedValue) -> SceneResult<(f64, f64)> {
    vec2_components(value).ok_or_else(|| {
        SceneError::malformed(format!("cannot build vector2d from {}", value.type_name()))
    })
}

fn vec2_components(value: &TypedValue) -> Option<(f64, f64)> {
    match value {
        TypedValue::Array(items) => match items.as_ref() {
            [x, y] => Some((x.as_f64()?, y.as_f64()?)),
            _ => None,
        },
        TypedValue::AssocArray(map) => vec2_from_map(map),
        _ => None,
    }
}

fn rect_from_map(map: &AssocMap) -> Option<Rect2D> {
    let num = |k: &str| assoc_get(map, k).and_then(TypedValue::as_f64);
    Some(Rect2D::new(
        num("x")?,
        num("y")?,
        num("width")?,
        num("height")?,
    ))
}

fn vec2_from_map(map: &AssocMap) -> Option<(f64, f64)> {
    let num = |k: &str| assoc_get(map, k).and_then(TypedValue::as_f64);
    Some((num("x")?, num("y")?))
}

/// Parse a numeric literal: decimal, `0x`/`&h` hexadecimal.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let hex = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .or_else(|| text.strip_prefix("&h"))
        .or_else(|| text.strip_prefix("&H"));
    match hex {
        Some(h) => u64::from_str_radix(h, 16).ok().map(|v| v as u32 as i32 as f64),
        None => text.parse::<f64>().ok().filter(|v| !v.is_nan()),
    }
}

fn parse_json_literal(text: &str) -> Option<TypedValue> {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .map(|v| json::from_json(&v))
}

fn parse_array_literal(lit: Option<&str>) -> TypedValue {
    lit.filter(|s| s.starts_with('[') && s.ends_with(']'))
        .and_then(parse_json_literal)
        .filter(|v| matches!(v, TypedValue::Array(_)))
        .unwrap_or_else(|| TypedValue::Array(Rc::from(Vec::new())))
}

fn parse_color_array(lit: Option<&str>) -> TypedValue {
    let Some(inner) = lit
        .filter(|s| s.starts_with('[') && s.ends_with(']'))
        .map(|s| s[1..s.len() - 1].trim())
    else {
        return TypedValue::array([]);
    };
    TypedValue::array(
        inner
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| TypedValue::Int32(convert_hex_color(s.trim_matches('"')))),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/value/kind.rs"]
mod tests;
