//! Drawing Capability Boundary
//!
//! The engine does not rasterize; it drives an implementation of
//! [`DrawBackend`] — normally the host compositor's off-screen context, here
//! also provided as a CPU implementation in
//! [`SoftwareBackend`](super::SoftwareBackend). All positions and widths
//! crossing this boundary are logical (unscaled); the backend applies the
//! device scale it was created with.

use crate::error::Result;
use crate::geometry::{Point, Region, Size};
use crate::palette::Color;

/// One vertex of a stroked polyline: position plus the width and color the
/// segment *ending* at this vertex is drawn with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeVertex {
    /// Logical position
    pub position: Point,
    /// Logical line width
    pub width: f64,
    /// Straight-alpha segment color
    pub color: Color,
}

/// How deposited pixels combine with existing buffer content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Standard painter's blending (premultiplied source-over)
    SourceOver,
    /// Removes existing content (eraser)
    Clear,
}

/// A snapshot of the raster buffer
///
/// Premultiplied RGBA8 at device scale. Cheap to clone compared to
/// regenerating, which is the point: callers cache it.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    /// Buffer width in device pixels
    pub width: u32,
    /// Buffer height in device pixels
    pub height: u32,
    /// Device pixels per logical pixel
    pub scale: f64,
    /// Premultiplied RGBA8 pixel data, row-major, no padding
    pub pixels: Vec<u8>,
}

/// The drawing capability the engine consumes
pub trait DrawBackend {
    /// Stroke consecutive connecting segments between adjacent vertices.
    ///
    /// Fewer than two vertices draws nothing. Each segment uses the width
    /// and color of its trailing vertex and round caps, so adjacent
    /// segments join without gaps.
    fn draw_polyline(&mut self, vertices: &[StrokeVertex], blend: BlendMode);

    /// Reallocate the buffer to `size * scale` device pixels.
    ///
    /// Existing content is preserved anchored at the top-left; content
    /// outside the new bounds is discarded — deliberate data loss on
    /// shrink. Fails fast on a zero-area size.
    fn resize(&mut self, size: Size, scale: f64) -> Result<()>;

    /// Reset `region` (or the whole buffer when `None`) to transparent
    fn clear(&mut self, region: Option<Region>);

    /// Copy out the current buffer contents
    fn snapshot(&self) -> RasterImage;

    /// Current logical size
    fn size(&self) -> Size;

    /// Current device scale
    fn scale(&self) -> f64;
}
