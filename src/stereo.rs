//! Eye passes and the stereo test pattern.

use crate::color::Color;

/// Which eye a draw pass renders for.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Eye {
    Left,
    Right,
    /// Mono pass, between the eyes.
    #[default]
    Cyclop,
}

impl Eye {
    pub const ALL: [Self; 3] = [Self::Left, Self::Right, Self::Cyclop];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Cyclop => "cyclop",
        }
    }
}

impl core::fmt::Display for Eye {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of draw work the host is asking for.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DrawTask {
    /// 3D scene geometry. The viewer draws nothing here.
    Scene,
    /// 2D overlay on top of the scene.
    #[default]
    Overlay,
}

/// Flat per-eye colors that make left/right routing visible.
///
/// Viewed through stereo glasses, each eye should see only its own color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StereoPattern {
    pub left: Color,
    pub right: Color,
}

impl Default for StereoPattern {
    fn default() -> Self {
        Self {
            left: Color::RED,
            right: Color::BLUE,
        }
    }
}

impl StereoPattern {
    pub const fn new(left: Color, right: Color) -> Self {
        Self { left, right }
    }

    /// Fill color for `eye`. The cyclopean pass gets no pattern.
    pub const fn color_for(&self, eye: Eye) -> Option<Color> {
        match eye {
            Eye::Left => Some(self.left),
            Eye::Right => Some(self.right),
            Eye::Cyclop => None,
        }
    }
}
