//! SVG recording of a draw pass.
//!
//! [`SvgRecorder`] is a [`DrawInterface`] that keeps every draw call made for
//! one surface and renders them as an annotated SVG panel: the surface
//! outline, pattern fills in their real colors, and textured rectangles
//! labeled with the image size and, when tiled, the UV window.
//!
//! # Example
//!
//! ```
//! use zenview::svg::SvgRecorder;
//! use zenview::{DrawContext, Eye, ImageTexture, Rect, Vec2, ViewerConfig, ViewerPass};
//!
//! struct Dims(u32, u32);
//! impl ImageTexture for Dims {
//!     fn dimensions(&self) -> (u32, u32) { (self.0, self.1) }
//! }
//!
//! let config = ViewerConfig::builder().mode_str("tile").build().config;
//! let canvas = Vec2::new(800.0, 600.0);
//! let mut rec = SvgRecorder::<Dims>::new(Rect::from_size(canvas));
//! let ctx = DrawContext::overlay(Eye::Cyclop, Rect::from_size(canvas), canvas);
//! ViewerPass::new(&config).render(&mut rec, &ctx, Some(&Dims(100, 100))).unwrap();
//!
//! let svg = rec.finish();
//! assert!(svg.contains("uv 0,0 → 8,6"));
//! ```

use core::marker::PhantomData;

use crate::color::Color;
use crate::geometry::{Rect, Vec2};
use crate::placement::UvWindow;
use crate::render::{DrawContext, DrawInterface, ImageTexture};
use crate::stereo::Eye;

/// Maximum pixel width of the surface panel.
const MAX_PANEL_W: f64 = 300.0;
/// Maximum pixel height of the surface panel.
const MAX_PANEL_H: f64 = 200.0;
/// Horizontal margin.
const MARGIN_X: f64 = 50.0;
/// Top and bottom margin.
const MARGIN_TOP: f64 = 30.0;
/// Height of the label line above the panel.
const LABEL_H: f64 = 22.0;
/// Height reserved for each annotation line below the panel.
const NOTE_H: f64 = 16.0;

enum Shape {
    Fill {
        rect: Rect,
        color: Color,
    },
    Textured {
        rect: Rect,
        image: (u32, u32),
        rotation: f64,
        uv: UvWindow,
    },
}

/// Records draw calls for one surface.
pub struct SvgRecorder<T: ?Sized> {
    surface: Rect,
    eye: Option<Eye>,
    shapes: Vec<Shape>,
    _texture: PhantomData<fn(&T)>,
}

impl<T: ImageTexture + ?Sized> SvgRecorder<T> {
    pub fn new(surface: Rect) -> Self {
        Self {
            surface,
            eye: None,
            shapes: Vec::new(),
            _texture: PhantomData,
        }
    }

    /// Number of recorded draw calls.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Render the recorded calls as a complete SVG document.
    pub fn finish(&self) -> String {
        let (pw, ph, scale) = scale_to_fit(self.surface.size);
        let notes: Vec<String> = self.shapes.iter().filter_map(note).collect();

        let total_w = MAX_PANEL_W + 2.0 * MARGIN_X;
        let total_h = MARGIN_TOP + LABEL_H + MAX_PANEL_H + NOTE_H * notes.len() as f64 + MARGIN_TOP;
        let panel_x = total_w / 2.0 - pw / 2.0;
        let panel_y = MARGIN_TOP + LABEL_H;

        let mut svg = String::with_capacity(2048);
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            total_w as u32, total_h as u32, total_w, total_h
        ));
        svg.push('\n');
        svg.push_str(
            r##"<style>
  text { font-family: "Consolas", "DejaVu Sans Mono", "Courier New", monospace; }
  .label { font-size: 13px; font-weight: bold; fill: #333; }
  .annotation { font-size: 11px; fill: #666; }
  .surface { fill: #e8e8e8; stroke: #999; stroke-width: 1; }
  .texture { fill: #6ba3d6; fill-opacity: 0.8; stroke: #2c6faa; stroke-width: 1.5; }
  .texture.tiled { stroke-dasharray: 4,2; }
  @media (prefers-color-scheme: dark) {
    .label { fill: #e0e0e0; }
    .annotation { fill: #aaa; }
    .surface { fill: #2d2d2d; stroke: #555; }
    .texture { fill: #3a72a4; stroke: #5a9fd4; }
  }
</style>
"##,
        );
        svg.push_str(&format!(
            r#"<defs><clipPath id="surface"><rect x="{panel_x:.1}" y="{panel_y:.1}" width="{pw:.1}" height="{ph:.1}"/></clipPath></defs>"#
        ));
        svg.push('\n');

        let s = self.surface;
        let label = match self.eye {
            Some(eye) => format!(
                "Surface {}×{} at ({}, {})  {eye}",
                s.size.x, s.size.y, s.origin.x, s.origin.y
            ),
            None => format!("Surface {}×{} at ({}, {})", s.size.x, s.size.y, s.origin.x, s.origin.y),
        };
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" class="label" text-anchor="middle">{}</text>"#,
            total_w / 2.0,
            MARGIN_TOP + 14.0,
            escape_xml(&label)
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r#"<rect x="{panel_x:.1}" y="{panel_y:.1}" width="{pw:.1}" height="{ph:.1}" class="surface" rx="2"/>"#
        ));
        svg.push('\n');

        // Shapes in surface-local panel coordinates, clipped to the surface.
        svg.push_str(r#"<g clip-path="url(#surface)">"#);
        svg.push('\n');
        let to_panel = |r: &Rect| {
            let x = panel_x + (r.origin.x - s.origin.x) * scale;
            let y = panel_y + (r.origin.y - s.origin.y) * scale;
            (x, y, r.size.x * scale, r.size.y * scale)
        };
        for shape in &self.shapes {
            match shape {
                Shape::Fill { rect, color } => {
                    let (x, y, w, h) = to_panel(rect);
                    let [r, g, b, a] = color.to_array();
                    svg.push_str(&format!(
                        r#"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" fill="rgb({r},{g},{b})" fill-opacity="{:.3}"/>"#,
                        a as f64 / 255.0
                    ));
                }
                Shape::Textured {
                    rect, rotation, uv, ..
                } => {
                    let (x, y, w, h) = to_panel(rect);
                    let class = if *uv == UvWindow::IDENTITY {
                        "texture"
                    } else {
                        "texture tiled"
                    };
                    svg.push_str(&format!(
                        r#"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" class="{class}" transform="rotate({rotation} {:.1} {:.1})"/>"#,
                        x + w / 2.0,
                        y + h / 2.0
                    ));
                }
            }
            svg.push('\n');
        }
        svg.push_str("</g>\n");

        let mut y = panel_y + MAX_PANEL_H;
        for text in &notes {
            svg.push_str(&format!(
                r#"<text x="{}" y="{:.1}" class="annotation" text-anchor="middle">{}</text>"#,
                total_w / 2.0,
                y + 12.0,
                escape_xml(text)
            ));
            svg.push('\n');
            y += NOTE_H;
        }

        svg.push_str("</svg>\n");
        svg
    }
}

impl<T: ImageTexture + ?Sized> DrawInterface for SvgRecorder<T> {
    type Texture = T;

    fn begin_draw_2d(&mut self, ctx: &DrawContext) {
        self.eye = Some(ctx.eye);
    }

    fn fill_rect(&mut self, position: Vec2, size: Vec2, color: Color) {
        self.shapes.push(Shape::Fill {
            rect: Rect {
                origin: position,
                size,
            },
            color,
        });
    }

    fn draw_textured_rect(
        &mut self,
        texture: &T,
        position: Vec2,
        size: Vec2,
        rotation: f64,
        uv: UvWindow,
        _tint: Color,
    ) {
        self.shapes.push(Shape::Textured {
            rect: Rect {
                origin: position,
                size,
            },
            image: texture.dimensions(),
            rotation,
            uv,
        });
    }

    fn end_draw(&mut self) {}
}

/// Annotation line for a shape, if it has anything worth saying.
fn note(shape: &Shape) -> Option<String> {
    match shape {
        Shape::Fill { color, .. } => Some(format!("fill {color}")),
        Shape::Textured {
            rect, image, uv, ..
        } => {
            let mut text = format!(
                "image {}×{} → {:.1}×{:.1} at ({:.1}, {:.1})",
                image.0, image.1, rect.size.x, rect.size.y, rect.origin.x, rect.origin.y
            );
            if *uv != UvWindow::IDENTITY {
                text.push_str(&format!(
                    "  uv {},{} → {},{}",
                    uv.min.x, uv.min.y, uv.max.x, uv.max.y
                ));
            }
            Some(text)
        }
    }
}

/// Scale a size to fit within MAX_PANEL_W × MAX_PANEL_H, preserving aspect ratio.
fn scale_to_fit(size: Vec2) -> (f64, f64, f64) {
    if size.x <= 0.0 || size.y <= 0.0 {
        return (1.0, 1.0, 1.0);
    }
    let scale = (MAX_PANEL_W / size.x).min(MAX_PANEL_H / size.y);
    (size.x * scale, size.y * scale, scale)
}

/// Escape special characters for XML text content.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::placement::LayoutMode;
    use crate::render::ViewerPass;

    struct Dims(u32, u32);

    impl ImageTexture for Dims {
        fn dimensions(&self) -> (u32, u32) {
            (self.0, self.1)
        }
    }

    fn record(config: &ViewerConfig, eye: Eye, surface: Rect, canvas: Vec2) -> SvgRecorder<Dims> {
        let mut rec = SvgRecorder::new(surface);
        let ctx = DrawContext::overlay(eye, surface, canvas);
        ViewerPass::new(config)
            .render(&mut rec, &ctx, Some(&Dims(100, 100)))
            .unwrap();
        rec
    }

    #[test]
    fn empty_recording_is_still_a_document() {
        let rec = SvgRecorder::<Dims>::new(Rect::new(0.0, 0.0, 100.0, 50.0));
        assert!(rec.is_empty());
        let svg = rec.finish();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>\n"));
        assert!(svg.contains("Surface 100×50 at (0, 0)"));
    }

    #[test]
    fn pattern_fill_uses_real_color() {
        let config = ViewerConfig::builder().pattern(true).build().config;
        let canvas = Vec2::new(200.0, 100.0);
        let rec = record(&config, Eye::Left, Rect::from_size(canvas), canvas);
        assert_eq!(rec.len(), 1);
        let svg = rec.finish();
        assert!(svg.contains(r#"fill="rgb(255,0,0)""#));
        assert!(svg.contains("fill #ff0000"));
        assert!(svg.contains("left"));
    }

    #[test]
    fn centered_image_annotated() {
        let config = ViewerConfig::builder()
            .mode(LayoutMode::Center)
            .scale(2.0)
            .build()
            .config;
        let canvas = Vec2::new(1000.0, 500.0);
        let svg = record(&config, Eye::Cyclop, Rect::from_size(canvas), canvas).finish();
        assert!(svg.contains("image 100×100 → 200.0×200.0 at (400.0, 150.0)"));
        assert!(!svg.contains("uv "));
        assert!(svg.contains(r#"class="texture""#));
    }

    #[test]
    fn tiled_image_shows_uv_window() {
        let config = ViewerConfig::builder().mode(LayoutMode::Tile).build().config;
        let canvas = Vec2::new(800.0, 600.0);
        let svg = record(&config, Eye::Cyclop, Rect::new(400.0, 0.0, 400.0, 600.0), canvas).finish();
        assert!(svg.contains("uv 0,0 → 8,6"));
        assert!(svg.contains(r#"class="texture tiled""#));
    }

    #[test]
    fn labels_are_escaped() {
        assert_eq!(escape_xml(r#"<a & "b">"#), "&lt;a &amp; &quot;b&quot;&gt;");
    }

    #[test]
    fn svg_is_balanced() {
        let config = ViewerConfig::builder().pattern(true).build().config;
        let canvas = Vec2::new(640.0, 480.0);
        let svg = record(&config, Eye::Right, Rect::from_size(canvas), canvas).finish();
        let opens = svg.matches("<g").count();
        let closes = svg.matches("</g>").count();
        assert_eq!(opens, closes);
        assert_eq!(svg.matches("<svg").count(), 1);
    }
}
