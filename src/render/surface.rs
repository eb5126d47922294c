use std::collections::BTreeMap;

use crate::foundation::core::{Point, Rect2D, Size, Vec2};
use crate::scene::opts::SceneOpts;

/// Decoded bitmap as far as the scene graph is concerned: its identity and pixel size.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bitmap {
    /// Source the bitmap was resolved from.
    pub uri: String,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

/// Per-draw colour modulation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Paint {
    /// `0xRRGGBBAA` tint; `None` draws the bitmap unmodified.
    pub tint: Option<i32>,
    /// Composed opacity in `0..=1`.
    pub opacity: f64,
}

/// A resolved font: family name and point size.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FontSpec {
    /// System font name, e.g. `MediumSystemFont`.
    pub name: String,
    /// Point size.
    pub size: f64,
}

impl FontSpec {
    /// Resolve a `font:<SystemFontName>` reference at the graph's resolution.
    ///
    /// An explicit size may follow the name after a comma (`font:SmallSystemFont,30`).
    pub fn resolve(reference: &str, opts: &SceneOpts) -> Self {
        let spec = reference.trim();
        let spec = spec.strip_prefix("font:").unwrap_or(spec);
        let (name, size) = match spec.split_once(',') {
            Some((name, size)) => (name.trim(), size.trim().parse::<f64>().ok()),
            None => (spec, None),
        };
        let name = if name.is_empty() {
            "MediumSystemFont"
        } else {
            name
        };
        Self {
            name: name.to_owned(),
            size: size
                .filter(|s| s.is_finite() && *s > 0.0)
                .unwrap_or_else(|| opts.system_font_size(name)),
        }
    }
}

/// The 2D drawing backend the render pass issues calls to.
///
/// Every coordinate handed to a surface is already composed into scene space. Surfaces also
/// answer the measurement questions layout depends on (text extents, bitmap sizes).
pub trait DrawSurface {
    /// Fill the whole canvas.
    fn clear_canvas(&mut self, color: i32);

    /// Draw `bitmap` at `at`, scaled, without rotation.
    fn draw_scaled_object(&mut self, at: Point, scale: Vec2, bitmap: &Bitmap, paint: Paint);

    /// Draw `bitmap` at `at`, scaled and rotated by `angle` radians about `center`.
    fn draw_rotated_bitmap(
        &mut self,
        at: Point,
        scale: Vec2,
        angle: f64,
        bitmap: &Bitmap,
        center: Vec2,
        paint: Paint,
    );

    /// Fill `rect` rotated by `angle` radians about `center` (relative to the rect's corner).
    fn draw_rotated_rect(&mut self, rect: Rect2D, color: i32, angle: f64, center: Vec2, opacity: f64);

    /// Draw one line of text with its top-left corner at `at`.
    fn draw_rotated_text(
        &mut self,
        text: &str,
        at: Point,
        color: i32,
        opacity: f64,
        font: &FontSpec,
        angle: f64,
    );

    /// Restrict subsequent draws to `rect`.
    fn push_clip(&mut self, rect: Rect2D);

    /// Undo the matching [`DrawSurface::push_clip`].
    fn pop_clip(&mut self);

    /// Extent of a single line of text.
    fn measure_text(&self, text: &str, font: &FontSpec) -> Size;

    /// Height of one line in `font`.
    fn line_height(&self, font: &FontSpec) -> f64;

    /// Resolve a bitmap by uri. `None` means it failed to load.
    fn bitmap(&self, uri: &str) -> Option<Bitmap>;
}

/// One call recorded by [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    /// [`DrawSurface::clear_canvas`].
    Clear {
        /// Fill colour.
        color: i32,
    },
    /// [`DrawSurface::draw_scaled_object`].
    ScaledObject {
        /// Target position.
        at: Point,
        /// Scale factors.
        scale: Vec2,
        /// Bitmap uri.
        uri: String,
        /// Paint.
        paint: Paint,
    },
    /// [`DrawSurface::draw_rotated_bitmap`].
    RotatedBitmap {
        /// Target position.
        at: Point,
        /// Scale factors.
        scale: Vec2,
        /// Rotation in radians.
        angle: f64,
        /// Bitmap uri.
        uri: String,
        /// Rotation pivot.
        center: Vec2,
        /// Paint.
        paint: Paint,
    },
    /// [`DrawSurface::draw_rotated_rect`].
    RotatedRect {
        /// Filled rectangle.
        rect: Rect2D,
        /// Fill colour.
        color: i32,
        /// Rotation in radians.
        angle: f64,
        /// Rotation pivot.
        center: Vec2,
        /// Opacity.
        opacity: f64,
    },
    /// [`DrawSurface::draw_rotated_text`].
    RotatedText {
        /// Text drawn.
        text: String,
        /// Top-left corner.
        at: Point,
        /// Text colour.
        color: i32,
        /// Opacity.
        opacity: f64,
        /// Font.
        font: FontSpec,
        /// Rotation in radians.
        angle: f64,
    },
    /// [`DrawSurface::push_clip`].
    PushClip {
        /// Clip rectangle.
        rect: Rect2D,
    },
    /// [`DrawSurface::pop_clip`].
    PopClip,
}

/// Surface that records every call instead of drawing.
///
/// Text uses fixed monospace metrics: each character advances half the font size and a line is
/// exactly the font size tall. Bitmaps are registered up front with their pixel sizes.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    bitmaps: BTreeMap<String, Size>,
}

impl RecordingSurface {
    /// Empty surface with no known bitmaps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bitmap the surface can resolve.
    pub fn with_bitmap(mut self, uri: impl Into<String>, width: f64, height: f64) -> Self {
        self.insert_bitmap(uri, width, height);
        self
    }

    /// Register a bitmap the surface can resolve.
    pub fn insert_bitmap(&mut self, uri: impl Into<String>, width: f64, height: f64) {
        self.bitmaps.insert(uri.into(), Size::new(width, height));
    }

    /// Commands recorded so far.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the recorded commands.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    fn char_width(font: &FontSpec) -> f64 {
        font.size * 0.5
    }
}

impl DrawSurface for RecordingSurface {
    fn clear_canvas(&mut self, color: i32) {
        self.commands.push(DrawCommand::Clear { color });
    }

    fn draw_scaled_object(&mut self, at: Point, scale: Vec2, bitmap: &Bitmap, paint: Paint) {
        self.commands.push(DrawCommand::ScaledObject {
            at,
            scale,
            uri: bitmap.uri.clone(),
            paint,
        });
    }

    fn draw_rotated_bitmap(
        &mut self,
        at: Point,
        scale: Vec2,
        angle: f64,
        bitmap: &Bitmap,
        center: Vec2,
        paint: Paint,
    ) {
        self.commands.push(DrawCommand::RotatedBitmap {
            at,
            scale,
            angle,
            uri: bitmap.uri.clone(),
            center,
            paint,
        });
    }

    fn draw_rotated_rect(&mut self, rect: Rect2D, color: i32, angle: f64, center: Vec2, opacity: f64) {
        self.commands.push(DrawCommand::RotatedRect {
            rect,
            color,
            angle,
            center,
            opacity,
        });
    }

    fn draw_rotated_text(
        &mut self,
        text: &str,
        at: Point,
        color: i32,
        opacity: f64,
        font: &FontSpec,
        angle: f64,
    ) {
        self.commands.push(DrawCommand::RotatedText {
            text: text.to_owned(),
            at,
            color,
            opacity,
            font: font.clone(),
            angle,
        });
    }

    fn push_clip(&mut self, rect: Rect2D) {
        self.commands.push(DrawCommand::PushClip { rect });
    }

    fn pop_clip(&mut self) {
        self.commands.push(DrawCommand::PopClip);
    }

    fn measure_text(&self, text: &str, font: &FontSpec) -> Size {
        if text.is_empty() {
            return Size::ZERO;
        }
        let chars = text.chars().count() as f64;
        Size::new(chars * Self::char_width(font), self.line_height(font))
    }

    fn line_height(&self, font: &FontSpec) -> f64 {
        font.size
    }

    fn bitmap(&self, uri: &str) -> Option<Bitmap> {
        self.bitmaps.get(uri).map(|size| Bitmap {
            uri: uri.to_owned(),
            width: size.width,
            height: size.height,
        })
    }
}

/// Wraps a surface so that only measurement reaches it; every draw call is dropped.
pub struct MeasureOnly<'a> {
    inner: &'a dyn DrawSurface,
}

impl<'a> MeasureOnly<'a> {
    /// Borrow `inner` for measurement.
    pub fn new(inner: &'a dyn DrawSurface) -> Self {
        Self { inner }
    }
}

impl DrawSurface for MeasureOnly<'_> {
    fn clear_canvas(&mut self, _color: i32) {}

    fn draw_scaled_object(&mut self, _at: Point, _scale: Vec2, _bitmap: &Bitmap, _paint: Paint) {}

    fn draw_rotated_bitmap(
        &mut self,
        _at: Point,
        _scale: Vec2,
        _angle: f64,
        _bitmap: &Bitmap,
        _center: Vec2,
        _paint: Paint,
    ) {
    }

    fn draw_rotated_rect(&mut self, _rect: Rect2D, _color: i32, _angle: f64, _center: Vec2, _opacity: f64) {}

    fn draw_rotated_text(
        &mut self,
        _text: &str,
        _at: Point,
        _color: i32,
        _opacity: f64,
        _font: &FontSpec,
        _angle: f64,
    ) {
    }

    fn push_clip(&mut self, _rect: Rect2D) {}

    fn pop_clip(&mut self) {}

    fn measure_text(&self, text: &str, font: &FontSpec) -> Size {
        self.inner.measure_text(text, font)
    }

    fn line_height(&self, font: &FontSpec) -> f64 {
        self.inner.line_height(font)
    }

    fn bitmap(&self, uri: &str) -> Option<Bitmap> {
        self.inner.bitmap(uri)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
