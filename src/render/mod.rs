pub(crate) mod pipeline;
pub(crate) mod surface;
pub(crate) mod text;

pub use surface::{Bitmap, DrawCommand, DrawSurface, FontSpec, MeasureOnly, Paint, RecordingSurface};
