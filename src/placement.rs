//! Image placement on a shared canvas.
//!
//! Computes where an image goes, how large it is drawn, and which texture
//! window is sampled, for one surface of a canvas that may span several
//! physical displays. Pure geometry: no pixels, no allocations.
//!
//! # Example
//!
//! ```
//! use zenview::{Layout, LayoutMode, Rect, Vec2};
//!
//! let canvas = Vec2::new(1000.0, 500.0);
//! let placement = Layout::new(LayoutMode::Center)
//!     .scale(2.0)
//!     .compute(canvas, Rect::from_size(canvas), Vec2::new(100.0, 100.0))
//!     .unwrap();
//!
//! assert_eq!(placement.size, Vec2::new(200.0, 200.0));
//! assert_eq!(placement.position, Vec2::new(400.0, 150.0));
//! ```

use core::fmt;
use core::str::FromStr;

use crate::geometry::{Rect, Vec2};

/// How the image is fitted to the output.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayoutMode {
    /// Draw at `image * scale`, centered. Aspect ratio is preserved.
    #[default]
    Center,

    /// Fill the target exactly, ignoring the image aspect ratio and scale.
    Stretch,

    /// Fill the surface and repeat the image at `image * scale` through the
    /// texture window.
    ///
    /// The repeat count is derived from the whole canvas and the window
    /// always starts at `(0, 0)` on every surface, so tiles do not line up
    /// across surface seams. The `repeat` flag has no effect in this mode.
    Tile,
}

impl LayoutMode {
    /// All modes, in the order they appear on the command line.
    pub const ALL: [Self; 3] = [Self::Stretch, Self::Tile, Self::Center];

    /// Parse a mode name (`stretch`, `tile`, `center`), ignoring ASCII case
    /// and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
    }

    /// Canonical lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Stretch => "stretch",
            Self::Tile => "tile",
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutMode {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or(PlacementError::UnknownMode)
    }
}

/// Normalized texture-coordinate window sampled when drawing.
///
/// Values above 1 repeat the texture (wrap addressing).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UvWindow {
    pub min: Vec2,
    pub max: Vec2,
}

impl UvWindow {
    /// The whole texture, once.
    pub const IDENTITY: Self = Self {
        min: Vec2::ZERO,
        max: Vec2::ONE,
    };

    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Texture repeats along each axis.
    pub fn repeats(&self) -> Vec2 {
        self.max - self.min
    }
}

impl Default for UvWindow {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Where and how to draw the image for one surface, in canvas coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Placement {
    /// Top-left corner. May be negative or off-surface.
    pub position: Vec2,
    /// Drawn size. Never negative.
    pub size: Vec2,
    /// Texture window. [`UvWindow::IDENTITY`] outside tile mode.
    pub uv: UvWindow,
}

impl Placement {
    /// Destination rectangle.
    pub fn rect(&self) -> Rect {
        Rect {
            origin: self.position,
            size: self.size,
        }
    }

    /// Whether the texture window differs from the identity window.
    pub fn is_tiled(&self) -> bool {
        self.uv != UvWindow::IDENTITY
    }

    /// Position and size rounded to whole pixels. The UV window is kept.
    pub fn snapped(&self) -> Self {
        Self {
            position: self.position.round(),
            size: self.size.round(),
            uv: self.uv,
        }
    }
}

/// Placement computation error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlacementError {
    /// Image width or height is zero, negative or not finite.
    ZeroImageDimension,
    /// Scale is zero, negative, NaN or infinite.
    InvalidScale,
    /// Canvas has a negative or non-finite dimension.
    InvalidCanvas,
    /// Surface has a negative or non-finite dimension, or a non-finite origin.
    InvalidSurface,
    /// Mode name is not one of `stretch`, `tile`, `center`.
    UnknownMode,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::ZeroImageDimension => "image has a zero or invalid dimension",
            Self::InvalidScale => "scale must be a positive finite number",
            Self::InvalidCanvas => "canvas size must be finite and non-negative",
            Self::InvalidSurface => "surface rect must be finite with non-negative size",
            Self::UnknownMode => "unknown layout mode (expected stretch, tile or center)",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PlacementError {}

/// Layout settings: mode, scale and repeat flag.
///
/// Fixed for the lifetime of the viewer; reused for every surface and frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Layout {
    pub mode: LayoutMode,
    /// Multiplier on the image size. Ignored by [`LayoutMode::Stretch`].
    pub scale: f64,
    /// Draw an independent copy per surface instead of one copy across the
    /// canvas.
    pub repeat: bool,
}

impl Layout {
    /// Layout with scale 1 and no repeat.
    pub const fn new(mode: LayoutMode) -> Self {
        Self {
            mode,
            scale: 1.0,
            repeat: false,
        }
    }

    /// Set the image scale.
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Set the repeat flag.
    pub fn repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    /// Compute the placement of an `image`-sized texture on `surface`, a
    /// region of a `canvas`-sized shared output.
    pub fn compute(
        &self,
        canvas: Vec2,
        surface: Rect,
        image: Vec2,
    ) -> Result<Placement, PlacementError> {
        if !canvas.is_valid_extent() {
            return Err(PlacementError::InvalidCanvas);
        }
        if !surface.origin.is_finite() || !surface.size.is_valid_extent() {
            return Err(PlacementError::InvalidSurface);
        }
        if !image.is_positive_extent() {
            return Err(PlacementError::ZeroImageDimension);
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(PlacementError::InvalidScale);
        }

        let placement = match (self.mode, self.repeat) {
            (LayoutMode::Stretch, true) => Placement {
                position: surface.origin,
                size: surface.size,
                uv: UvWindow::IDENTITY,
            },
            (LayoutMode::Stretch, false) => Placement {
                position: Vec2::ZERO,
                size: canvas,
                uv: UvWindow::IDENTITY,
            },
            (LayoutMode::Center, true) => {
                let size = self.scaled(image)?;
                Placement {
                    position: surface.origin + (surface.size - size) / 2.0,
                    size,
                    uv: UvWindow::IDENTITY,
                }
            }
            (LayoutMode::Center, false) => {
                let size = self.scaled(image)?;
                Placement {
                    position: (canvas - size) / 2.0,
                    size,
                    uv: UvWindow::IDENTITY,
                }
            }
            (LayoutMode::Tile, _) => {
                let tile = self.scaled(image)?;
                Placement {
                    position: surface.origin,
                    size: surface.size,
                    uv: UvWindow::new(Vec2::ZERO, canvas.div_components(tile)),
                }
            }
        };
        Ok(placement)
    }

    /// `image * scale`, rejected when it underflows to zero or overflows
    /// to infinity.
    fn scaled(&self, image: Vec2) -> Result<Vec2, PlacementError> {
        let size = image * self.scale;
        if size.is_positive_extent() {
            Ok(size)
        } else {
            Err(PlacementError::InvalidScale)
        }
    }
}

/// Free-function form of [`Layout::compute`].
pub fn compute_placement(
    canvas: Vec2,
    surface: Rect,
    image: Vec2,
    mode: LayoutMode,
    scale: f64,
    repeat: bool,
) -> Result<Placement, PlacementError> {
    Layout::new(mode)
        .scale(scale)
        .repeat(repeat)
        .compute(canvas, surface, image)
}
