use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::foundation::core::{Rect2D, Vec2};
use crate::node::NodeId;

pub(crate) mod json;
pub(crate) mod kind;

/// Associative map payload of [`TypedValue::AssocArray`].
pub type AssocMap = BTreeMap<String, TypedValue>;

/// Handle to a script function, resolved by the [`crate::ScriptHost`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionRef(Rc<str>);

impl FunctionRef {
    /// Reference a script function by name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Rc::from(name.as_ref()))
    }

    /// Function name as registered by the script.
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Handle to a host message port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PortId(pub u32);

/// Closed set of values a node field can hold.
///
/// Arrays and maps are shared (`Rc`), so cloning a value out of a field is cheap and never
/// aliases mutable state: writers always build a new payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TypedValue {
    /// 32-bit integer.
    Int32(i32),
    /// 64-bit integer.
    Int64(i64),
    /// Single precision float.
    Float(f32),
    /// Double precision float.
    Double(f64),
    /// Boolean.
    Boolean(bool),
    /// String.
    String(String),
    /// Non-owning node reference.
    Node(NodeId),
    /// Ordered array.
    Array(Rc<[TypedValue]>),
    /// Associative map.
    AssocArray(Rc<AssocMap>),
    /// Packed `0xRRGGBBAA` colour.
    Color(i32),
    /// Time in seconds.
    Time(f64),
    /// Rectangle.
    Rect2D(Rect2D),
    /// Script function reference.
    Function(FunctionRef),
    /// Absence of a value.
    #[default]
    Invalid,
}

impl TypedValue {
    /// Build a [`TypedValue::String`].
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// Build a [`TypedValue::Array`] from any iterator of values.
    pub fn array(items: impl IntoIterator<Item = TypedValue>) -> Self {
        Self::Array(items.into_iter().collect::<Vec<_>>().into())
    }

    /// Build a [`TypedValue::AssocArray`] from `(key, value)` pairs.
    pub fn assoc<K: Into<String>>(items: impl IntoIterator<Item = (K, TypedValue)>) -> Self {
        Self::AssocArray(Rc::new(
            items.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Vector2D payload: a two-element Float array.
    pub fn vec2(x: f64, y: f64) -> Self {
        Self::array([Self::Float(x as f32), Self::Float(y as f32)])
    }

    /// Array of strings.
    pub fn string_array<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        Self::array(items.into_iter().map(|s| Self::String(s.into())))
    }

    /// `true` for every numeric variant (integers, floats, colour and time).
    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Self::Int32(_)
                | Self::Int64(_)
                | Self::Float(_)
                | Self::Double(_)
                | Self::Color(_)
                | Self::Time(_)
        )
    }

    /// `true` for [`TypedValue::Invalid`].
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid)
    }

    /// Numeric payload widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Int32(v) | Self::Color(v) => Some(f64::from(v)),
            Self::Int64(v) => Some(v as f64),
            Self::Float(v) => Some(f64::from(v)),
            Self::Double(v) | Self::Time(v) => Some(v),
            _ => None,
        }
    }

    /// Numeric payload truncated to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int32(v) | Self::Color(v) => Some(i64::from(v)),
            Self::Int64(v) => Some(v),
            Self::Float(v) => Some(v as i64),
            Self::Double(v) | Self::Time(v) => Some(v as i64),
            _ => None,
        }
    }

    /// String payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean payload.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Boolean(b) => Some(b),
            _ => None,
        }
    }

    /// Node payload.
    pub fn as_node(&self) -> Option<NodeId> {
        match *self {
            Self::Node(id) => Some(id),
            _ => None,
        }
    }

    /// Array payload.
    pub fn as_array(&self) -> Option<&[TypedValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Map payload.
    pub fn as_assoc(&self) -> Option<&AssocMap> {
        match self {
            Self::AssocArray(map) => Some(map),
            _ => None,
        }
    }

    /// Rectangle payload.
    pub fn as_rect(&self) -> Option<Rect2D> {
        match *self {
            Self::Rect2D(r) => Some(r),
            _ => None,
        }
    }

    /// Two-number array read as a vector.
    pub fn as_vec2(&self) -> Option<Vec2> {
        match self.as_array()? {
            [x, y] => Some(Vec2::new(x.as_f64()?, y.as_f64()?)),
            _ => None,
        }
    }

    /// Every element as `f64`, skipping non-numbers.
    pub fn numbers(&self) -> Vec<f64> {
        self.as_array()
            .map(|items| items.iter().filter_map(Self::as_f64).collect())
            .unwrap_or_default()
    }

    /// Every string element of an array.
    pub fn strings(&self) -> Vec<String> {
        self.as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Script-facing type name, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int32(_) => "Integer",
            Self::Int64(_) => "LongInteger",
            Self::Float(_) => "Float",
            Self::Double(_) => "Double",
            Self::Boolean(_) => "Boolean",
            Self::String(_) => "String",
            Self::Node(_) => "Node",
            Self::Array(_) => "roArray",
            Self::AssocArray(_) => "roAssociativeArray",
            Self::Color(_) => "Color",
            Self::Time(_) => "Time",
            Self::Rect2D(_) => "Rect2D",
            Self::Function(_) => "Function",
            Self::Invalid => "Invalid",
        }
    }
}

impl From<bool> for TypedValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i32> for TypedValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<f32> for TypedValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for TypedValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for TypedValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for TypedValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<NodeId> for TypedValue {
    fn from(v: NodeId) -> Self {
        Self::Node(v)
    }
}

impl From<Rect2D> for TypedValue {
    fn from(v: Rect2D) -> Self {
        Self::Rect2D(v)
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float(v) => f.write_str(&format_number(f64::from(*v))),
            Self::Double(v) | Self::Time(v) => f.write_str(&format_number(*v)),
            Self::Boolean(v) => f.write_str(if *v { "true" } else { "false" }),
            Self::String(s) => f.write_str(s),
            Self::Node(id) => write!(f, "<Node {id}>"),
            Self::Array(_) => f.write_str("<Component: roArray>"),
            Self::AssocArray(_) => f.write_str("<Component: roAssociativeArray>"),
            Self::Color(v) => write!(f, "{v}"),
            Self::Rect2D(r) => write!(f, "{{{}, {}, {}, {}}}", r.x, r.y, r.width, r.height),
            Self::Function(func) => write!(f, "<Function: {}>", func.name()),
            Self::Invalid => f.write_str("invalid"),
        }
    }
}

/// Render a number the way the scripting runtime prints it: whole values without a fraction.
pub(crate) fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Case-insensitive map lookup.
pub(crate) fn assoc_get<'a>(map: &'a AssocMap, key: &str) -> Option<&'a TypedValue> {
    map.get(key)
        .or_else(|| map.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)).map(|(_, v)| v))
}

pub use kind::{FieldKind, convert_hex_color};

#[cfg(test)]
#[path = "../../tests/unit/value/mod.rs"]
mod tests;
