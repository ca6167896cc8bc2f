//! The per-pass draw callback and the drawing interface it targets.
//!
//! The host calls [`ViewerPass::render`] once per draw pass, per surface,
//! per eye. The pass draws the stereo pattern on the left and right eye
//! passes and the image on the cyclopean pass, through whatever
//! [`DrawInterface`] the host provides.

use crate::color::Color;
#[cfg(feature = "alloc")]
use crate::config::ViewerConfig;
use crate::geometry::{Rect, Vec2};
#[cfg(feature = "alloc")]
use crate::placement::PlacementError;
use crate::placement::{Placement, UvWindow};
use crate::stereo::{DrawTask, Eye};

/// Per-pass metadata supplied by the host.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrawContext {
    pub task: DrawTask,
    pub eye: Eye,
    /// Region of the canvas this pass renders, in canvas coordinates.
    pub surface: Rect,
    /// Size of the full shared canvas.
    pub canvas: Vec2,
}

impl DrawContext {
    /// Overlay pass for `eye` on `surface`.
    pub fn overlay(eye: Eye, surface: Rect, canvas: Vec2) -> Self {
        Self {
            task: DrawTask::Overlay,
            eye,
            surface,
            canvas,
        }
    }
}

/// A drawable image with known pixel dimensions.
pub trait ImageTexture {
    /// Native `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);
}

/// 2D drawing primitives, in canvas coordinates.
///
/// Implementations clip to the surface of the active pass.
pub trait DrawInterface {
    type Texture: ImageTexture + ?Sized;

    /// Open a 2D draw scope for the pass.
    fn begin_draw_2d(&mut self, ctx: &DrawContext);

    /// Solid rectangle.
    fn fill_rect(&mut self, position: Vec2, size: Vec2, color: Color);

    /// Textured rectangle sampling `uv`, rotated by `rotation` degrees
    /// around its center and multiplied by `tint`.
    fn draw_textured_rect(
        &mut self,
        texture: &Self::Texture,
        position: Vec2,
        size: Vec2,
        rotation: f64,
        uv: UvWindow,
        tint: Color,
    );

    /// Close the scope opened by [`begin_draw_2d`](Self::begin_draw_2d).
    fn end_draw(&mut self);
}

/// What a pass drew.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PassOutcome {
    /// The pass was an overlay pass and a draw scope was opened.
    pub handled: bool,
    /// Pattern color, if the stereo pattern was drawn.
    pub pattern: Option<Color>,
    /// Image placement, if the image was drawn.
    pub image: Option<Placement>,
}

/// Draw callback bound to an immutable configuration.
#[cfg(feature = "alloc")]
#[derive(Copy, Clone, Debug)]
pub struct ViewerPass<'a> {
    config: &'a ViewerConfig,
}

#[cfg(feature = "alloc")]
impl<'a> ViewerPass<'a> {
    pub fn new(config: &'a ViewerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &'a ViewerConfig {
        self.config
    }

    /// Render one pass.
    ///
    /// Non-overlay passes are skipped. `texture` is `None` when no image is
    /// loaded. A placement error skips the image draw and is returned after
    /// the draw scope has been closed.
    pub fn render<D: DrawInterface + ?Sized>(
        &self,
        draw: &mut D,
        ctx: &DrawContext,
        texture: Option<&D::Texture>,
    ) -> Result<PassOutcome, PlacementError> {
        if ctx.task != DrawTask::Overlay {
            return Ok(PassOutcome::default());
        }

        draw.begin_draw_2d(ctx);
        let mut outcome = PassOutcome {
            handled: true,
            ..PassOutcome::default()
        };

        if self.config.pattern_enabled()
            && let Some(color) = self.config.pattern().color_for(ctx.eye)
        {
            draw.fill_rect(ctx.surface.origin, ctx.surface.size, color);
            outcome.pattern = Some(color);
        }

        let image = match ctx.eye {
            Eye::Cyclop => self.draw_image(draw, ctx, texture),
            Eye::Left | Eye::Right => Ok(None),
        };
        draw.end_draw();

        outcome.image = image?;
        Ok(outcome)
    }

    fn draw_image<D: DrawInterface + ?Sized>(
        &self,
        draw: &mut D,
        ctx: &DrawContext,
        texture: Option<&D::Texture>,
    ) -> Result<Option<Placement>, PlacementError> {
        let (Some(texture), Some(layout)) = (texture, self.config.layout()) else {
            return Ok(None);
        };
        let (w, h) = texture.dimensions();
        let placement = layout.compute(ctx.canvas, ctx.surface, Vec2::from_pixels(w, h))?;
        draw.draw_textured_rect(
            texture,
            placement.position,
            placement.size,
            0.0,
            placement.uv,
            Color::WHITE,
        );
        Ok(Some(placement))
    }
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use super::*;
    use crate::placement::LayoutMode;
    use alloc::vec::Vec;

    struct Image(u32, u32);

    impl ImageTexture for Image {
        fn dimensions(&self) -> (u32, u32) {
            (self.0, self.1)
        }
    }

    #[derive(Debug, PartialEq)]
    enum Call {
        Begin(Eye),
        Fill(Rect, Color),
        Textured(Rect, UvWindow),
        End,
    }

    #[derive(Default)]
    struct Recorder(Vec<Call>);

    impl DrawInterface for Recorder {
        type Texture = Image;

        fn begin_draw_2d(&mut self, ctx: &DrawContext) {
            self.0.push(Call::Begin(ctx.eye));
        }

        fn fill_rect(&mut self, position: Vec2, size: Vec2, color: Color) {
            self.0.push(Call::Fill(Rect { origin: position, size }, color));
        }

        fn draw_textured_rect(
            &mut self,
            _texture: &Image,
            position: Vec2,
            size: Vec2,
            rotation: f64,
            uv: UvWindow,
            tint: Color,
        ) {
            assert_eq!(rotation, 0.0);
            assert_eq!(tint, Color::WHITE);
            self.0.push(Call::Textured(Rect { origin: position, size }, uv));
        }

        fn end_draw(&mut self) {
            self.0.push(Call::End);
        }
    }

    const CANVAS: Vec2 = Vec2::new(1000.0, 500.0);

    fn surface() -> Rect {
        Rect::new(500.0, 0.0, 500.0, 500.0)
    }

    fn config(mode: &str, pattern: bool) -> ViewerConfig {
        ViewerConfig::builder()
            .image("x.png")
            .mode_str(mode)
            .pattern(pattern)
            .build()
            .config
    }

    #[test]
    fn scene_pass_is_skipped() {
        let cfg = config("center", true);
        let mut rec = Recorder::default();
        let ctx = DrawContext {
            task: DrawTask::Scene,
            ..DrawContext::overlay(Eye::Left, surface(), CANVAS)
        };
        let out = ViewerPass::new(&cfg)
            .render(&mut rec, &ctx, Some(&Image(10, 10)))
            .unwrap();
        assert_eq!(out, PassOutcome::default());
        assert!(rec.0.is_empty());
    }

    #[test]
    fn left_pass_draws_pattern_only() {
        let cfg = config("center", true);
        let mut rec = Recorder::default();
        let ctx = DrawContext::overlay(Eye::Left, surface(), CANVAS);
        let out = ViewerPass::new(&cfg)
            .render(&mut rec, &ctx, Some(&Image(10, 10)))
            .unwrap();
        assert_eq!(out.pattern, Some(Color::RED));
        assert_eq!(out.image, None);
        assert_eq!(
            rec.0,
            [Call::Begin(Eye::Left), Call::Fill(surface(), Color::RED), Call::End]
        );
    }

    #[test]
    fn right_pass_uses_right_color() {
        let cfg = config("center", true);
        let mut rec = Recorder::default();
        let ctx = DrawContext::overlay(Eye::Right, surface(), CANVAS);
        ViewerPass::new(&cfg).render(&mut rec, &ctx, None).unwrap();
        assert_eq!(rec.0[1], Call::Fill(surface(), Color::BLUE));
    }

    #[test]
    fn cyclop_pass_draws_image_without_pattern() {
        let cfg = config("center", true);
        let mut rec = Recorder::default();
        let ctx = DrawContext::overlay(Eye::Cyclop, surface(), CANVAS);
        let out = ViewerPass::new(&cfg)
            .render(&mut rec, &ctx, Some(&Image(100, 100)))
            .unwrap();
        assert_eq!(out.pattern, None);
        assert_eq!(
            rec.0,
            [
                Call::Begin(Eye::Cyclop),
                Call::Textured(Rect::new(450.0, 200.0, 100.0, 100.0), UvWindow::IDENTITY),
                Call::End
            ]
        );
    }

    #[test]
    fn pattern_disabled_draws_nothing_on_eye_passes() {
        let cfg = config("stretch", false);
        let mut rec = Recorder::default();
        let ctx = DrawContext::overlay(Eye::Left, surface(), CANVAS);
        ViewerPass::new(&cfg).render(&mut rec, &ctx, None).unwrap();
        assert_eq!(rec.0, [Call::Begin(Eye::Left), Call::End]);
    }

    #[test]
    fn no_image_or_no_mode_skips_image() {
        let ctx = DrawContext::overlay(Eye::Cyclop, surface(), CANVAS);

        let cfg = config("tile", false);
        let mut rec = Recorder::default();
        let out = ViewerPass::new(&cfg).render(&mut rec, &ctx, None).unwrap();
        assert_eq!(out.image, None);

        let cfg = config("mosaic", false);
        let mut rec = Recorder::default();
        let out = ViewerPass::new(&cfg)
            .render(&mut rec, &ctx, Some(&Image(10, 10)))
            .unwrap();
        assert_eq!(out.image, None);
        assert_eq!(rec.0.len(), 2);
    }

    #[test]
    fn placement_error_still_closes_scope() {
        let cfg = config("tile", false);
        let mut rec = Recorder::default();
        let ctx = DrawContext::overlay(Eye::Cyclop, surface(), CANVAS);
        let err = ViewerPass::new(&cfg)
            .render(&mut rec, &ctx, Some(&Image(0, 10)))
            .unwrap_err();
        assert_eq!(err, PlacementError::ZeroImageDimension);
        assert_eq!(rec.0, [Call::Begin(Eye::Cyclop), Call::End]);
    }

    #[test]
    fn tile_pass_passes_uv_window() {
        let cfg = ViewerConfig::builder()
            .mode(LayoutMode::Tile)
            .build()
            .config;
        let mut rec = Recorder::default();
        let ctx = DrawContext::overlay(Eye::Cyclop, surface(), CANVAS);
        ViewerPass::new(&cfg)
            .render(&mut rec, &ctx, Some(&Image(100, 50)))
            .unwrap();
        assert_eq!(
            rec.0[1],
            Call::Textured(surface(), UvWindow::new(Vec2::ZERO, Vec2::new(10.0, 10.0)))
        );
    }
}
