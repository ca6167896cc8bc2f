// cli.rs - Command-line interface configuration
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use zenview::{Color, ConfigResult, StereoPattern, ViewerConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "zenview")]
#[command(about = "Cluster image viewer / stereo pattern generator", long_about = None)]
pub struct Cli {
    /// Image file path
    #[arg(long = "img", value_name = "PATH", default_value = "")]
    pub img: String,

    /// Image mode: one of stretch, tile, center
    #[arg(short = 'm', long, default_value = "center")]
    pub mode: String,

    /// Image scale (center and tile modes)
    #[arg(short = 's', long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub scale: f64,

    /// Repeat the image on each node instead of stretching/tiling a single copy
    #[arg(short = 'R', long)]
    pub repeat: bool,

    /// Draw a stereo pattern
    #[arg(short = 'p', long)]
    pub pattern: bool,

    /// Left eye pattern color
    #[arg(long, default_value = "red")]
    pub left_color: Color,

    /// Right eye pattern color
    #[arg(long, default_value = "blue")]
    pub right_color: Color,

    /// Full canvas size in pixels
    #[arg(long, value_name = "WxH", default_value = "1920x1080")]
    pub canvas: Dims,

    /// Split the canvas into COLSxROWS surfaces, one node each
    #[arg(long, value_name = "COLSxROWS", default_value = "1x1")]
    pub grid: Dims,

    /// Output directory for rendered frames
    #[arg(short = 'o', long, default_value = ".")]
    pub out: PathBuf,

    /// Also write an SVG recording of every pass
    #[arg(long)]
    pub svg: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the options into the startup configuration.
    pub fn config(&self) -> ConfigResult {
        ViewerConfig::builder()
            .image(self.img.as_str())
            .mode_str(&self.mode)
            .scale(self.scale)
            .repeat(self.repeat)
            .pattern(self.pattern)
            .pattern_colors(StereoPattern::new(self.left_color, self.right_color))
            .build()
    }
}

/// Two positive integers written `AxB`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dims {
    pub a: u32,
    pub b: u32,
}

impl FromStr for Dims {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected AxB, got {s:?}"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| format!("{v:?} is not a positive integer"))
        };
        Ok(Self {
            a: parse(a)?,
            b: parse(b)?,
        })
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.a, self.b)
    }
}
