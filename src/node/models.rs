use crate::field::Field;
use crate::node::NodeKind;
use crate::value::FieldKind;

/// Declaration of one built-in field: name, kind and default literal.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FieldModel {
    pub(crate) name: &'static str,
    pub(crate) kind: FieldKind,
    pub(crate) value: Option<&'static str>,
    pub(crate) always_notify: bool,
    pub(crate) hidden: bool,
}

impl FieldModel {
    const fn new(name: &'static str, kind: FieldKind, value: Option<&'static str>) -> Self {
        Self {
            name,
            kind,
            value,
            always_notify: false,
            hidden: false,
        }
    }

    const fn notify(mut self) -> Self {
        self.always_notify = true;
        self
    }

    pub(crate) fn build(&self) -> Field {
        Field::new(self.kind, self.kind.parse_literal(self.value), self.always_notify)
            .with_flags(true, self.hidden)
    }
}

const fn f(name: &'static str, kind: FieldKind, value: &'static str) -> FieldModel {
    FieldModel::new(name, kind, Some(value))
}

const fn bare(name: &'static str, kind: FieldKind) -> FieldModel {
    FieldModel::new(name, kind, None)
}

/// Font fields hold a `font:<SystemFontName>` reference.
pub(crate) const DEFAULT_FONT: &str = "font:MediumSystemFont";

const NODE: &[FieldModel] = &[
    bare("id", FieldKind::String),
    bare("focusable", FieldKind::Boolean),
    bare("focusedChild", FieldKind::Node).notify(),
    bare("change", FieldKind::AssocArray),
];

const GROUP: &[FieldModel] = &[
    f("visible", FieldKind::Boolean, "true"),
    f("opacity", FieldKind::Float, "1.0"),
    f("translation", FieldKind::Vector2D, "[0.0,0.0]"),
    f("rotation", FieldKind::Float, "0.0"),
    f("scale", FieldKind::Vector2D, "[1.0,1.0]"),
    f("scaleRotateCenter", FieldKind::Vector2D, "[0.0,0.0]"),
    f("childRenderOrder", FieldKind::String, "renderLast"),
    f("inheritParentTransform", FieldKind::Boolean, "true"),
    f("inheritParentOpacity", FieldKind::Boolean, "true"),
    f("clippingRect", FieldKind::Rect2D, "[0.0,0.0,0.0,0.0]"),
    f("renderPass", FieldKind::Integer, "0"),
];

const RECTANGLE: &[FieldModel] = &[
    f("width", FieldKind::Float, "0.0"),
    f("height", FieldKind::Float, "0.0"),
    f("color", FieldKind::Color, "0xFFFFFFFF"),
    f("blendingEnabled", FieldKind::Boolean, "true"),
];

const LABEL: &[FieldModel] = &[
    f("text", FieldKind::String, ""),
    f("color", FieldKind::Color, "0xddddddff"),
    f("font", FieldKind::String, DEFAULT_FONT),
    f("horizAlign", FieldKind::String, "left"),
    f("vertAlign", FieldKind::String, "top"),
    f("width", FieldKind::Float, "0"),
    f("height", FieldKind::Float, "0"),
    f("numLines", FieldKind::Integer, "0"),
    f("maxLines", FieldKind::Integer, "0"),
    f("wrap", FieldKind::Boolean, "false"),
    f("lineSpacing", FieldKind::Float, "0"),
    f("displayPartialLines", FieldKind::Boolean, "false"),
    f("ellipsizeOnBoundary", FieldKind::Boolean, "false"),
    bare("truncateOnDelimiter", FieldKind::String),
    bare("wordBreakChars", FieldKind::String),
    bare("ellipsisText", FieldKind::String),
    f("isTextEllipsized", FieldKind::Boolean, "false"),
];

const POSTER: &[FieldModel] = &[
    bare("uri", FieldKind::String),
    f("width", FieldKind::Float, "0.0"),
    f("height", FieldKind::Float, "0.0"),
    f("loadDisplayMode", FieldKind::String, "noScale"),
    f("loadStatus", FieldKind::String, "none"),
    f("bitmapWidth", FieldKind::Float, "0.0"),
    f("bitmapHeight", FieldKind::Float, "0.0"),
    f("blendColor", FieldKind::Color, "0xFFFFFFFF"),
    f("loadingBitmapOpacity", FieldKind::Float, "1.0"),
    bare("audioGuideText", FieldKind::String),
];

const LAYOUT_GROUP: &[FieldModel] = &[
    f("layoutDirection", FieldKind::String, "vert"),
    f("horizAlignment", FieldKind::String, "left"),
    f("vertAlignment", FieldKind::String, "top"),
    bare("itemSpacings", FieldKind::Array),
    f("addItemSpacingAfterChild", FieldKind::Boolean, "true"),
];

const BUTTON_GROUP: &[FieldModel] = &[
    f("textColor", FieldKind::Color, "0xddddddff"),
    f("focusedTextColor", FieldKind::Color, "0x262626ff"),
    f("textFont", FieldKind::String, DEFAULT_FONT),
    f("focusedTextFont", FieldKind::String, "font:MediumBoldSystemFont"),
    f("minWidth", FieldKind::Float, "0.0"),
    f("maxWidth", FieldKind::Float, "32767"),
    f("buttonHeight", FieldKind::Float, "0.0"),
    f("rightJustify", FieldKind::Boolean, "false"),
    f("buttonSelected", FieldKind::Integer, "0").notify(),
    f("buttonFocused", FieldKind::Integer, "0").notify(),
    f("focusButton", FieldKind::Integer, "0").notify(),
    f("buttons", FieldKind::StringArray, "[]"),
];

const DIALOG: &[FieldModel] = &[
    bare("title", FieldKind::String),
    f("titleColor", FieldKind::Color, "0xddddddff"),
    bare("message", FieldKind::String),
    f("messageColor", FieldKind::Color, "0xddddddff"),
    f("buttons", FieldKind::StringArray, "[]"),
    bare("buttonGroup", FieldKind::Node),
    f("buttonSelected", FieldKind::Integer, "0").notify(),
    f("buttonFocused", FieldKind::Integer, "0").notify(),
    f("focusButton", FieldKind::Integer, "0"),
    f("optionsDialog", FieldKind::Boolean, "false"),
    f("backgroundColor", FieldKind::Color, "0x161616ff"),
    f("close", FieldKind::Boolean, "false"),
    f("wasClosed", FieldKind::Boolean, "false").notify(),
    f("width", FieldKind::Float, "-1.0"),
    f("maxHeight", FieldKind::Float, "-1.0"),
];

/// Field tables a node of `kind` is built from, base kind first.
pub(crate) fn models_for(kind: NodeKind) -> Vec<&'static [FieldModel]> {
    let mut tables = vec![NODE];
    if kind.is_group() {
        tables.push(GROUP);
    }
    match kind {
        NodeKind::Node | NodeKind::Group => {}
        NodeKind::Rectangle => tables.push(RECTANGLE),
        NodeKind::Label => tables.push(LABEL),
        NodeKind::Poster => tables.push(POSTER),
        NodeKind::LayoutGroup => tables.push(LAYOUT_GROUP),
        NodeKind::ButtonGroup => {
            tables.push(LAYOUT_GROUP);
            tables.push(BUTTON_GROUP);
        }
        NodeKind::Dialog => tables.push(DIALOG),
    }
    tables
}

/// Whether `key` (lowercase) is one of the fields driving a LayoutGroup's placement.
pub(crate) fn is_layout_field(key: &str) -> bool {
    matches!(
        key,
        "layoutdirection"
            | "horizalignment"
            | "vertalignment"
            | "itemspacings"
            | "additemspacingafterchild"
    )
}

/// Whether `key` (lowercase) invalidates a Label's measured text.
pub(crate) fn is_label_metric_field(key: &str) -> bool {
    matches!(
        key,
        "text" | "font" | "width" | "height" | "numlines" | "maxlines" | "wrap" | "linespacing"
    )
}

#[cfg(test)]
#[path = "../../tests/unit/node/models.rs"]
mod tests;
