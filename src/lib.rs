//! Cluster-synchronized image viewer and stereo test-pattern layout.
//!
//! The core is pure geometry: given the shared canvas, the surface being
//! drawn and the image size, [`Layout::compute`] decides where the image
//! goes and which texture window is sampled. Everything around it (texture
//! upload, drawing, cluster transport) belongs to the host and is reached
//! through traits.
//!
//! # Modules
//!
//! - [`placement`]: layout modes (Center, Stretch, Tile) and placement computation
//! - [`geometry`]: canvas-space vectors and rectangles
//! - [`color`]: sRGB colors with hex and named parsing
//! - [`stereo`]: eye passes and the stereo test pattern
//! - [`config`]: immutable viewer configuration and its wire encoding
//! - [`cluster`]: once-only master-to-worker configuration broadcast
//! - [`render`]: the per-pass draw callback and the drawing interface
//! - `svg`: SVG recording backend (feature `svg`)
//! - `raster`: CPU backend and image loading (feature `raster`)

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod color;
pub mod geometry;
pub mod placement;
pub mod render;
pub mod stereo;

#[cfg(feature = "alloc")]
pub mod cluster;
#[cfg(feature = "alloc")]
pub mod config;

#[cfg(feature = "raster")]
pub mod raster;
#[cfg(feature = "svg")]
pub mod svg;

pub use color::Color;
pub use geometry::{Rect, Vec2};
pub use placement::{Layout, LayoutMode, Placement, PlacementError, UvWindow, compute_placement};
pub use render::{DrawContext, DrawInterface, ImageTexture, PassOutcome};
pub use stereo::{DrawTask, Eye, StereoPattern};

#[cfg(feature = "alloc")]
pub use cluster::{ConfigSync, Role, SharedSink, SharedSource, SyncError};
#[cfg(feature = "alloc")]
pub use config::{ConfigBuilder, ConfigResult, ConfigWarning, ViewerConfig};
#[cfg(feature = "alloc")]
pub use render::ViewerPass;
