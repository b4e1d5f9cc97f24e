//! Persistent Raster Surface
//!
//! The "frozen" half of the canvas: an off-screen buffer that stable stroke
//! prefixes are progressively baked into. [`RasterSurface`] adapts samples
//! to the consumed drawing capability ([`DrawBackend`]) and caches the
//! snapshot image, which is expensive to regenerate and is what the host
//! composites on every redraw.

pub mod backend;
pub mod software;

pub use backend::{BlendMode, DrawBackend, RasterImage, StrokeVertex};
pub use software::SoftwareBackend;

use tracing::trace;

use crate::error::Result;
use crate::geometry::{Region, Size};
use crate::input::Sample;
use crate::palette::{Palette, Tool};

/// Off-screen raster the engine bakes committed stroke segments into
pub struct RasterSurface<B: DrawBackend> {
    backend: B,
    cached_snapshot: Option<RasterImage>,
}

impl RasterSurface<SoftwareBackend> {
    /// Surface over a fresh CPU backend
    pub fn software(size: Size, scale: f64) -> Result<Self> {
        Ok(Self::new(SoftwareBackend::new(size, scale)?))
    }
}

impl<B: DrawBackend> RasterSurface<B> {
    /// Wrap an existing drawing backend
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            cached_snapshot: None,
        }
    }

    /// Bake the connecting segments of `samples` into the buffer.
    ///
    /// Widths and colors derive per sample: width from pressure and device
    /// class, color from the palette with the sample's classification
    /// opacity applied. Fewer than two samples is a no-op. Returns whether
    /// the buffer was touched (and the cached snapshot invalidated).
    pub fn draw(&mut self, samples: &[Sample], palette: &Palette) -> bool {
        if samples.len() < 2 {
            return false;
        }

        let blend = match palette.tool {
            Tool::Eraser => BlendMode::Clear,
            Tool::Brush => BlendMode::SourceOver,
        };

        let vertices: Vec<StrokeVertex> = samples
            .iter()
            .map(|sample| StrokeVertex {
                position: sample.location(),
                width: sample.draw_width(palette),
                color: palette.color.with_opacity(sample.opacity()),
            })
            .collect();

        trace!(segments = vertices.len() - 1, "baking segments into raster");
        self.backend.draw_polyline(&vertices, blend);
        self.cached_snapshot = None;
        true
    }

    /// Reallocate to `size * scale`; previous content is kept anchored
    /// top-left, anything outside the new bounds is discarded
    pub fn resize(&mut self, size: Size, scale: f64) -> Result<()> {
        self.backend.resize(size, scale)?;
        self.cached_snapshot = None;
        Ok(())
    }

    /// Reset `region` (whole buffer when `None`) to transparent
    pub fn clear(&mut self, region: Option<Region>) {
        self.backend.clear(region);
        self.cached_snapshot = None;
    }

    /// Current buffer image, cached until the next mutation
    pub fn snapshot(&mut self) -> &RasterImage {
        if self.cached_snapshot.is_none() {
            self.cached_snapshot = Some(self.backend.snapshot());
        }
        self.cached_snapshot.as_ref().expect("snapshot just cached")
    }

    /// Whether a cached snapshot is currently held (diagnostics/tests)
    pub fn has_cached_snapshot(&self) -> bool {
        self.cached_snapshot.is_some()
    }

    /// Current logical size
    pub fn size(&self) -> Size {
        self.backend.size()
    }

    /// Current device scale
    pub fn scale(&self) -> f64 {
        self.backend.scale()
    }

    /// The wrapped backend
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::input::{InputObservation, SampleFlags};
    use crate::palette::Color;

    fn sample(x: f64, y: f64, sequence: u64) -> Sample {
        Sample::capture(
            &InputObservation::stylus(Point::new(x, y), 1.0),
            sequence,
            SampleFlags::empty(),
        )
    }

    fn surface() -> RasterSurface<SoftwareBackend> {
        RasterSurface::software(Size::new(100.0, 100.0), 1.0).unwrap()
    }

    #[test]
    fn test_draw_under_two_samples_is_noop() {
        let mut surface = surface();
        assert!(!surface.draw(&[], &Palette::default()));
        assert!(!surface.draw(&[sample(10.0, 10.0, 0)], &Palette::default()));
        assert!(surface.backend().is_blank());
    }

    #[test]
    fn test_draw_bakes_segment() {
        let mut surface = surface();
        let drew = surface.draw(
            &[sample(10.0, 50.0, 0), sample(90.0, 50.0, 1)],
            &Palette::default(),
        );
        assert!(drew);
        assert!(!surface.backend().is_blank());
    }

    #[test]
    fn test_snapshot_cached_until_draw() {
        let mut surface = surface();
        surface.draw(
            &[sample(10.0, 50.0, 0), sample(90.0, 50.0, 1)],
            &Palette::default(),
        );

        surface.snapshot();
        assert!(surface.has_cached_snapshot());

        surface.draw(
            &[sample(10.0, 60.0, 2), sample(90.0, 60.0, 3)],
            &Palette::default(),
        );
        assert!(!surface.has_cached_snapshot());
    }

    #[test]
    fn test_snapshot_invalidated_by_clear_and_resize() {
        let mut surface = surface();
        surface.snapshot();
        surface.clear(None);
        assert!(!surface.has_cached_snapshot());

        surface.snapshot();
        surface.resize(Size::new(50.0, 50.0), 1.0).unwrap();
        assert!(!surface.has_cached_snapshot());
    }

    #[test]
    fn test_eraser_palette_clears_ink() {
        let mut surface = surface();
        surface.draw(
            &[sample(10.0, 50.0, 0), sample(90.0, 50.0, 1)],
            &Palette::default(),
        );
        assert!(!surface.backend().is_blank());

        let eraser = Palette {
            tool: Tool::Eraser,
            stylus_width: 30.0,
            ..Palette::default()
        };
        surface.draw(
            &[sample(0.0, 50.0, 0), sample(100.0, 50.0, 1)],
            &eraser,
        );
        assert!(surface.backend().is_blank());
    }

    #[test]
    fn test_cancelled_samples_deposit_nothing() {
        let mut surface = surface();
        let mut a = sample(10.0, 50.0, 0);
        let mut b = sample(90.0, 50.0, 1);
        a.mark_cancelled();
        b.mark_cancelled();

        surface.draw(&[a, b], &Palette::default());
        assert!(surface.backend().is_blank());
    }

    #[test]
    fn test_predicted_samples_draw_reduced_opacity() {
        let mut surface = surface();
        let predicted: Vec<Sample> = [(10.0, 50.0), (90.0, 50.0)]
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| {
                Sample::capture(
                    &InputObservation::stylus(Point::new(x, y), 1.0),
                    i as u64,
                    crate::input::SampleFlag::Predicted.into(),
                )
            })
            .collect();

        surface.draw(&predicted, &Palette::default());
        let px = surface.backend().pixel(50, 50);
        assert!(px[3] > 0 && px[3] < 255, "expected half-strength ink, got {:?}", px);
    }

    #[test]
    fn test_pixel_color_follows_palette() {
        let mut surface = surface();
        let palette = Palette {
            color: Color::rgba(255, 0, 0, 255),
            ..Palette::default()
        };
        surface.draw(&[sample(40.0, 50.0, 0), sample(60.0, 50.0, 1)], &palette);

        let px = surface.backend().pixel(50, 50);
        assert_eq!(px, [255, 0, 0, 255]);
    }
}
