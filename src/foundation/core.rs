pub use kurbo::{Affine, Point, Size, Vec2};

/// Axis-aligned rectangle in `x, y, width, height` form.
///
/// Rectangles with any non-finite component act as "empty": unioning with one yields the other
/// operand unchanged. [`Rect2D::UNBOUNDED`] is the sentinel a container starts each render with.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect2D {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Rect2D {
    /// Zero-sized rectangle at the origin.
    pub const ZERO: Rect2D = Rect2D {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Non-finite sentinel absorbed by [`Rect2D::union`].
    pub const UNBOUNDED: Rect2D = Rect2D {
        x: f64::INFINITY,
        y: f64::INFINITY,
        width: f64::INFINITY,
        height: f64::INFINITY,
    };

    /// Create a rectangle from its components.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle at `origin` with the given size.
    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Return `true` when all four components are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Return `true` when the rectangle is finite and has a positive area.
    pub fn has_area(&self) -> bool {
        self.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Width and height.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Return the rectangle shifted by `offset`.
    pub fn translate(self, offset: Vec2) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
            ..self
        }
    }

    /// Smallest rectangle containing both operands.
    ///
    /// A non-finite operand is absorbed: the result is a copy of the other one.
    pub fn union(self, other: Rect2D) -> Rect2D {
        if !self.is_finite() {
            return other;
        }
        if !other.is_finite() {
            return self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Rect2D::new(x, y, right - x, bottom - y)
    }

    /// Bounding box of this rectangle's extent rotated by `angle` radians about `center`.
    ///
    /// `center` is relative to the rectangle's top-left corner. The four corners are rotated and
    /// the axis-aligned box of the result is returned, anchored back at `(x, y)`.
    pub fn rotated(self, angle: f64, center: Vec2) -> Rect2D {
        let rot = Affine::rotate(-angle);
        let corners = [
            Point::new(-center.x, -center.y),
            Point::new(self.width - center.x, -center.y),
            Point::new(self.width - center.x, self.height - center.y),
            Point::new(-center.x, self.height - center.y),
        ];

        let mut min = Point::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for c in corners {
            let p = rot * c;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        Rect2D::new(
            self.x + min.x + center.x,
            self.y + min.y + center.y,
            max.x - min.x,
            max.y - min.y,
        )
    }

    /// Convert into a corner-form [`kurbo::Rect`].
    pub fn to_kurbo(self) -> kurbo::Rect {
        kurbo::Rect::from_origin_size(self.origin(), self.size())
    }
}

impl From<kurbo::Rect> for Rect2D {
    fn from(r: kurbo::Rect) -> Self {
        Rect2D::new(r.x0, r.y0, r.width(), r.height())
    }
}

/// Rotate a translation vector by `angle` radians (screen-space, same sense as [`Rect2D::rotated`]).
pub fn rotate_translation(v: Vec2, angle: f64) -> Vec2 {
    if angle == 0.0 {
        return v;
    }
    (Affine::rotate(-angle) * v.to_point()).to_vec2()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
