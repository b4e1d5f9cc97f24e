//! Software Raster Backend
//!
//! CPU implementation of [`DrawBackend`]: a premultiplied RGBA8 buffer at
//! device scale with the logical-to-device transform pre-applied, so every
//! drawing call works in logical coordinates. Segments are stroked with
//! round caps by stamping filled discs along the segment, which also makes
//! adjacent segments of differing widths join cleanly.

use tracing::{debug, trace};

use crate::error::{CanvasError, Result};
use crate::geometry::{Point, Region, Size};
use crate::palette::Color;

use super::backend::{BlendMode, DrawBackend, RasterImage, StrokeVertex};

const BYTES_PER_PIXEL: usize = 4;

/// CPU premultiplied-RGBA8 drawing backend
pub struct SoftwareBackend {
    width: u32,
    height: u32,
    scale: f64,
    pixels: Vec<u8>,
}

impl SoftwareBackend {
    /// Allocate a transparent buffer of `size * scale` device pixels
    pub fn new(size: Size, scale: f64) -> Result<Self> {
        let (width, height) = Self::device_dimensions(size, scale)?;
        debug!(width, height, scale, "allocated software raster");

        Ok(Self {
            width,
            height,
            scale,
            pixels: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
        })
    }

    fn device_dimensions(size: Size, scale: f64) -> Result<(u32, u32)> {
        let width = (size.width * scale).round();
        let height = (size.height * scale).round();
        if size.is_degenerate() || scale <= 0.0 || width < 1.0 || height < 1.0 {
            return Err(CanvasError::InvalidSurfaceSize {
                width: size.width,
                height: size.height,
                scale,
            });
        }
        Ok((width as u32, height as u32))
    }

    /// Buffer width in device pixels
    pub fn device_width(&self) -> u32 {
        self.width
    }

    /// Buffer height in device pixels
    pub fn device_height(&self) -> u32 {
        self.height
    }

    /// Premultiplied RGBA of the device pixel at (`x`, `y`)
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let mut px = [0; 4];
        px.copy_from_slice(&self.pixels[offset..offset + BYTES_PER_PIXEL]);
        px
    }

    /// Whether any pixel in the buffer holds ink
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&b| b == 0)
    }

    fn stroke_segment(&mut self, from: Point, to: Point, width: f64, color: Color, blend: BlendMode) {
        if blend == BlendMode::SourceOver && color.is_transparent() {
            return;
        }

        let radius = (width * self.scale / 2.0).max(0.5);
        let start = Point::new(from.x * self.scale, from.y * self.scale);
        let end = Point::new(to.x * self.scale, to.y * self.scale);

        // Premultiply once per segment.
        let alpha = color.a as u32;
        let src = [
            (color.r as u32 * alpha / 255) as u8,
            (color.g as u32 * alpha / 255) as u8,
            (color.b as u32 * alpha / 255) as u8,
            color.a,
        ];

        let length = start.distance_to(end);
        let step = (radius / 2.0).max(0.5);
        let stamps = (length / step).ceil() as u32;

        for i in 0..=stamps {
            let t = if stamps == 0 { 0.0 } else { i as f64 / stamps as f64 };
            let center = Point::new(
                start.x + (end.x - start.x) * t,
                start.y + (end.y - start.y) * t,
            );
            self.fill_disc(center, radius, src, blend);
        }
    }

    fn fill_disc(&mut self, center: Point, radius: f64, src: [u8; 4], blend: BlendMode) {
        let min_x = ((center.x - radius).floor().max(0.0)) as i64;
        let min_y = ((center.y - radius).floor().max(0.0)) as i64;
        let max_x = ((center.x + radius).ceil() as i64).min(self.width as i64);
        let max_y = ((center.y + radius).ceil() as i64).min(self.height as i64);
        let r_sq = radius * radius;

        for y in min_y..max_y {
            for x in min_x..max_x {
                let dx = x as f64 + 0.5 - center.x;
                let dy = y as f64 + 0.5 - center.y;
                if dx * dx + dy * dy > r_sq {
                    continue;
                }

                let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
                match blend {
                    BlendMode::SourceOver => {
                        let inv = 255 - src[3] as u32;
                        for c in 0..4 {
                            let dst = self.pixels[offset + c] as u32;
                            self.pixels[offset + c] = (src[c] as u32 + dst * inv / 255) as u8;
                        }
                    }
                    BlendMode::Clear => {
                        self.pixels[offset..offset + BYTES_PER_PIXEL].fill(0);
                    }
                }
            }
        }
    }
}

impl DrawBackend for SoftwareBackend {
    fn draw_polyline(&mut self, vertices: &[StrokeVertex], blend: BlendMode) {
        if vertices.len() < 2 {
            return;
        }
        trace!(vertices = vertices.len(), ?blend, "stroking polyline");

        for pair in vertices.windows(2) {
            // Segment style comes from the trailing vertex.
            self.stroke_segment(
                pair[0].position,
                pair[1].position,
                pair[1].width,
                pair[1].color,
                blend,
            );
        }
    }

    fn resize(&mut self, size: Size, scale: f64) -> Result<()> {
        let (new_width, new_height) = Self::device_dimensions(size, scale)?;
        let mut new_pixels = vec![0; new_width as usize * new_height as usize * BYTES_PER_PIXEL];

        // Blit the old image anchored top-left; content outside the new
        // bounds is discarded.
        let copy_width = (self.width.min(new_width)) as usize * BYTES_PER_PIXEL;
        for row in 0..self.height.min(new_height) as usize {
            let src_offset = row * self.width as usize * BYTES_PER_PIXEL;
            let dst_offset = row * new_width as usize * BYTES_PER_PIXEL;
            new_pixels[dst_offset..dst_offset + copy_width]
                .copy_from_slice(&self.pixels[src_offset..src_offset + copy_width]);
        }

        debug!(
            from_width = self.width,
            from_height = self.height,
            to_width = new_width,
            to_height = new_height,
            "resized software raster"
        );

        self.width = new_width;
        self.height = new_height;
        self.scale = scale;
        self.pixels = new_pixels;
        Ok(())
    }

    fn clear(&mut self, region: Option<Region>) {
        match region {
            None => self.pixels.fill(0),
            Some(region) => {
                let Some((x, y, w, h)) = region.to_device_pixels(self.scale, self.width, self.height)
                else {
                    return;
                };
                for row in y..y + h {
                    let offset = (row as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
                    self.pixels[offset..offset + w as usize * BYTES_PER_PIXEL].fill(0);
                }
            }
        }
    }

    fn snapshot(&self) -> RasterImage {
        RasterImage {
            width: self.width,
            height: self.height,
            scale: self.scale,
            pixels: self.pixels.clone(),
        }
    }

    fn size(&self) -> Size {
        Size::new(self.width as f64 / self.scale, self.height as f64 / self.scale)
    }

    fn scale(&self) -> f64 {
        self.scale
    }
}

// =============================================================================
// Tests
// =============================================================================
