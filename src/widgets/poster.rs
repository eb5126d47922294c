use crate::field::observer::ScriptHost;
use crate::foundation::core::{Point, Rect2D, Vec2};
use crate::foundation::error::SceneResult;
use crate::graph::SceneGraph;
use crate::node::NodeId;
use crate::render::surface::{Bitmap, DrawSurface, Paint};
use crate::value::TypedValue;

/// Bitmap resolution state of a Poster.
#[derive(Clone, Debug, Default)]
pub(crate) struct PosterState {
    /// `uri` changed since the bitmap was last resolved.
    pub(crate) pending: bool,
    bitmap: Option<Bitmap>,
}

/// How a bitmap is fitted into a Poster's declared size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DisplayMode {
    Stretch,
    ScaleToFit,
}

impl DisplayMode {
    fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("scaletofit") {
            Self::ScaleToFit
        } else {
            Self::Stretch
        }
    }
}

impl SceneGraph {
    /// Resolve a changed `uri` through the surface and publish the load outcome.
    fn resolve_poster(
        &mut self,
        id: NodeId,
        surface: &dyn DrawSurface,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<Option<Bitmap>> {
        let uri = self.peek_str(id, "uri").to_owned();
        let Some(state) = self.node_mut(id)?.state.poster_mut() else {
            return Ok(None);
        };
        if !state.pending {
            return Ok(state.bitmap.clone());
        }
        state.pending = false;
        let bitmap = if uri.is_empty() {
            None
        } else {
            surface.bitmap(&uri)
        };
        state.bitmap = bitmap.clone();

        let status = match (&bitmap, uri.is_empty()) {
            (_, true) => "none",
            (Some(_), false) => "ready",
            (None, false) => "failed",
        };
        if status == "failed" {
            tracing::warn!(node = %id, uri = %uri, "poster bitmap failed to load");
        }
        let (width, height) = bitmap
            .as_ref()
            .map_or((0.0, 0.0), |b| (b.width, b.height));
        self.set(id, "bitmapwidth", TypedValue::Float(width as f32), host)?;
        self.set(id, "bitmapheight", TypedValue::Float(height as f32), host)?;
        self.set(id, "loadstatus", TypedValue::string(status), host)?;
        Ok(bitmap)
    }

    /// Draw a Poster's bitmap into `rect` and return the rectangle it covers.
    pub(crate) fn draw_poster(
        &mut self,
        id: NodeId,
        rect: Rect2D,
        rotation: f64,
        opacity: f64,
        surface: &mut dyn DrawSurface,
        host: &mut dyn ScriptHost,
    ) -> SceneResult<Rect2D> {
        let Some(bitmap) = self.resolve_poster(id, surface, host)? else {
            return Ok(rect);
        };
        if bitmap.width <= 0.0 || bitmap.height <= 0.0 {
            return Ok(rect);
        }

        let node_scale = self.peek_vec2(id, "scale", Vec2::new(1.0, 1.0));
        let mode = DisplayMode::parse(self.peek_str(id, "loaddisplaymode"));
        let mut at = Point::new(rect.x, rect.y);
        let (sx, sy) = match mode {
            DisplayMode::ScaleToFit if rect.width > 0.0 && rect.height > 0.0 => {
                let s = (rect.width / bitmap.width).min(rect.height / bitmap.height);
                at.x += (rect.width - bitmap.width * s) / 2.0;
                at.y += (rect.height - bitmap.height * s) / 2.0;
                (s, s)
            }
            _ => (
                if rect.width != 0.0 {
                    rect.width / bitmap.width
                } else {
                    1.0
                },
                if rect.height != 0.0 {
                    rect.height / bitmap.height
                } else {
                    1.0
                },
            ),
        };
        let scale = Vec2::new(sx * node_scale.x, sy * node_scale.y);

        let blend = self.peek_i64(id, "blendcolor") as i32;
        let paint = Paint {
            tint: (blend != -1).then_some(blend),
            opacity: if (0.0..=1.0).contains(&opacity) {
                opacity
            } else {
                1.0
            },
        };
        if rotation != 0.0 || node_scale != Vec2::new(1.0, 1.0) {
            let center = self.peek_vec2(id, "scalerotatecenter", Vec2::ZERO);
            surface.draw_rotated_bitmap(at, scale, rotation, &bitmap, center, paint);
        } else {
            surface.draw_scaled_object(at, scale, &bitmap, paint);
        }

        Ok(Rect2D::new(
            at.x,
            at.y,
            scale.x * bitmap.width,
            scale.y * bitmap.height,
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/poster.rs"]
mod tests;
