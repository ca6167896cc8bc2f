//! CPU draw backend over `image` buffers.
//!
//! [`RasterTarget`] renders one surface into an [`RgbaImage`]. Pixel
//! `(px, py)` of the frame covers the canvas point
//! `surface.origin + (px + 0.5, py + 0.5)`; anything outside the surface is
//! clipped. Textures are sampled nearest-neighbor with wrap addressing, so
//! UV windows larger than 1 tile the image.

use std::path::Path;

use image::{ImageError, Rgba, RgbaImage};

use crate::color::Color;
use crate::geometry::{Rect, Vec2};
use crate::placement::UvWindow;
use crate::render::{DrawContext, DrawInterface, ImageTexture};

/// Decoded RGBA8 image ready to draw.
#[derive(Clone, Debug)]
pub struct Texture {
    pixels: RgbaImage,
}

impl Texture {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Wrapped nearest-neighbor lookup at normalized `(u, v)`.
    fn sample(&self, u: f64, v: f64) -> [u8; 4] {
        let (w, h) = self.pixels.dimensions();
        let x = ((u * w as f64).floor() as i64).rem_euclid(w as i64) as u32;
        let y = ((v * h as f64).floor() as i64).rem_euclid(h as i64) as u32;
        self.pixels.get_pixel(x, y).0
    }
}

impl ImageTexture for Texture {
    fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

/// Decode an image file into a [`Texture`].
pub fn load_texture(path: impl AsRef<Path>) -> Result<Texture, ImageError> {
    let path = path.as_ref();
    let pixels = image::open(path)?.into_rgba8();
    log::info!(
        "loaded {} ({}x{})",
        path.display(),
        pixels.width(),
        pixels.height()
    );
    Ok(Texture::new(pixels))
}

/// One surface rendered on the CPU.
#[derive(Clone, Debug)]
pub struct RasterTarget {
    surface: Rect,
    frame: RgbaImage,
    depth: u32,
}

impl RasterTarget {
    /// Blank frame for `surface`, cleared to `background`.
    pub fn new(surface: Rect, background: Color) -> Self {
        let w = surface.size.x.round().max(0.0) as u32;
        let h = surface.size.y.round().max(0.0) as u32;
        Self {
            surface,
            frame: RgbaImage::from_pixel(w, h, Rgba(background.to_array())),
            depth: 0,
        }
    }

    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    pub fn into_image(self) -> RgbaImage {
        self.frame
    }

    /// Half-open frame pixel range whose centers fall in `[lo, hi)` along
    /// one axis, given the surface origin on that axis and the frame extent.
    fn span(lo: f64, hi: f64, origin: f64, extent: u32) -> (u32, u32) {
        let first = (lo - origin - 0.5).ceil().max(0.0);
        let last = (hi - origin - 0.5).ceil().min(extent as f64);
        if last <= first {
            (0, 0)
        } else {
            (first as u32, last as u32)
        }
    }

    fn blend(&mut self, x: u32, y: u32, src: [u8; 4]) {
        let dst = self.frame.get_pixel_mut(x, y);
        let a = src[3] as u32;
        if a == 255 {
            dst.0 = src;
            return;
        }
        for c in 0..3 {
            dst.0[c] = ((src[c] as u32 * a + dst.0[c] as u32 * (255 - a) + 127) / 255) as u8;
        }
        dst.0[3] = (a + (dst.0[3] as u32 * (255 - a) + 127) / 255) as u8;
    }
}

impl DrawInterface for RasterTarget {
    type Texture = Texture;

    fn begin_draw_2d(&mut self, ctx: &DrawContext) {
        if ctx.surface != self.surface {
            log::debug!(
                "pass surface {:?} differs from target surface {:?}",
                ctx.surface,
                self.surface
            );
        }
        self.depth += 1;
    }

    fn fill_rect(&mut self, position: Vec2, size: Vec2, color: Color) {
        let Some(clip) = Rect { origin: position, size }.intersect(&self.surface) else {
            return;
        };
        let origin = self.surface.origin;
        let max = clip.max();
        let (x0, x1) = Self::span(clip.origin.x, max.x, origin.x, self.frame.width());
        let (y0, y1) = Self::span(clip.origin.y, max.y, origin.y, self.frame.height());
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color.to_array());
            }
        }
    }

    fn draw_textured_rect(
        &mut self,
        texture: &Texture,
        position: Vec2,
        size: Vec2,
        rotation: f64,
        uv: UvWindow,
        tint: Color,
    ) {
        if size.x <= 0.0 || size.y <= 0.0 || texture.pixels.width() == 0 || texture.pixels.height() == 0 {
            return;
        }
        let origin = self.surface.origin;
        let center = position + size / 2.0;
        let (sin, cos) = (-rotation.to_radians()).sin_cos();

        // Bounding box of the rotated rect.
        let (lo, hi) = if rotation == 0.0 {
            (position, position + size)
        } else {
            let r = (size.x * size.x + size.y * size.y).sqrt() / 2.0;
            (center - Vec2::new(r, r), center + Vec2::new(r, r))
        };
        let (x0, x1) = Self::span(lo.x, hi.x, origin.x, self.frame.width());
        let (y0, y1) = Self::span(lo.y, hi.y, origin.y, self.frame.height());

        let span = uv.repeats();
        let tint = tint.to_array();
        for y in y0..y1 {
            for x in x0..x1 {
                // Undo the rotation around the rect center.
                let dx = origin.x + x as f64 + 0.5 - center.x;
                let dy = origin.y + y as f64 + 0.5 - center.y;
                let lx = (dx * cos - dy * sin) / size.x + 0.5;
                let ly = (dx * sin + dy * cos) / size.y + 0.5;
                if !(0.0..1.0).contains(&lx) || !(0.0..1.0).contains(&ly) {
                    continue;
                }
                let texel = texture.sample(uv.min.x + lx * span.x, uv.min.y + ly * span.y);
                let mut px = [0u8; 4];
                for c in 0..4 {
                    px[c] = ((texel[c] as u32 * tint[c] as u32 + 127) / 255) as u8;
                }
                self.blend(x, y, px);
            }
        }
    }

    fn end_draw(&mut self) {
        if self.depth == 0 {
            log::warn!("end_draw without matching begin_draw_2d");
        }
        self.depth = self.depth.saturating_sub(1);
    }
}
