//! Viewer configuration: one immutable value built at startup.
//!
//! The master builds a [`ViewerConfig`] from command-line options, encodes
//! it with [`ViewerConfig::encode`], and workers rebuild the same value with
//! [`ViewerConfig::decode`]. Problems never fail the build; they are
//! reported as [`ConfigWarning`]s next to the config.
//!
//! # Example
//!
//! ```
//! use zenview::{LayoutMode, ViewerConfig};
//!
//! let result = ViewerConfig::builder()
//!     .image("wall.png")
//!     .mode_str("tile")
//!     .scale(0.5)
//!     .build();
//! assert!(result.warnings.is_empty());
//!
//! let wire = result.config.encode();
//! let received = ViewerConfig::decode(&wire);
//! assert_eq!(received.config, result.config);
//! assert_eq!(received.config.mode(), Some(LayoutMode::Tile));
//! ```

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::fmt::Write as _;

use crate::color::Color;
use crate::placement::{Layout, LayoutMode};
use crate::stereo::StereoPattern;

/// Immutable viewer settings shared by every node.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    image: Option<String>,
    mode: Option<LayoutMode>,
    scale: f64,
    repeat: bool,
    pattern_enabled: bool,
    pattern: StereoPattern,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            image: None,
            mode: Some(LayoutMode::Center),
            scale: 1.0,
            repeat: false,
            pattern_enabled: false,
            pattern: StereoPattern::default(),
        }
    }
}

/// A config plus the non-fatal problems found while building it.
#[derive(Clone, Debug)]
pub struct ConfigResult {
    pub config: ViewerConfig,
    pub warnings: Vec<ConfigWarning>,
}

impl ConfigResult {
    /// Emit every warning through `log::warn!`.
    pub fn log_warnings(&self) {
        for w in &self.warnings {
            log::warn!("{w}");
        }
    }
}

/// Non-fatal configuration problem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Mode name not recognized. The image will not be drawn.
    ModeNotRecognized { value: String },
    /// Scale is not a positive finite number. Scaled modes will not draw.
    ScaleInvalid { value: String },
    /// A key appeared more than once in an encoded config (last wins).
    DuplicateKey { key: String, value: String },
    /// An encoded config carried an unknown key.
    KeyNotRecognized { key: String, value: String },
    /// A known key carried a value that could not be parsed.
    ValueInvalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModeNotRecognized { value } => write!(
                f,
                "image mode {value:?} not recognized (expected stretch, tile or center); image will not be drawn"
            ),
            Self::ScaleInvalid { value } => {
                write!(f, "scale {value} is not a positive number; image will not be drawn")
            }
            Self::DuplicateKey { key, value } => {
                write!(f, "duplicate config key {key:?}, using {value:?}")
            }
            Self::KeyNotRecognized { key, value } => {
                write!(f, "ignoring unknown config key {key:?}={value:?}")
            }
            Self::ValueInvalid { key, value, reason } => {
                write!(f, "invalid value {value:?} for {key}: {reason}")
            }
        }
    }
}

impl ViewerConfig {
    /// Start a builder with default settings: no image, center mode,
    /// scale 1, no repeat, no pattern, red/blue pattern colors.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder {
            config: Self::default(),
            warnings: Vec::new(),
        }
    }

    /// Image path, if one was given. Never empty.
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Resolved layout mode. `None` when the given name was not recognized.
    pub fn mode(&self) -> Option<LayoutMode> {
        self.mode
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    /// Whether the stereo test pattern is drawn.
    pub fn pattern_enabled(&self) -> bool {
        self.pattern_enabled
    }

    pub fn pattern(&self) -> &StereoPattern {
        &self.pattern
    }

    /// Layout settings for the placement engine, or `None` without a mode.
    pub fn layout(&self) -> Option<Layout> {
        self.mode
            .map(|mode| Layout::new(mode).scale(self.scale).repeat(self.repeat))
    }

    /// Encode as `key=value` pairs joined by `&`, values percent-encoded.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        if let Some(img) = &self.image {
            out.push_str("img=");
            percent_encode_into(&mut out, img);
            out.push('&');
        }
        let mode = self.mode.map_or("none", LayoutMode::as_str);
        // Writing to a String cannot fail.
        let _ = write!(
            out,
            "pattern={}&mode={mode}&scale={}&repeat={}&left=",
            u8::from(self.pattern_enabled),
            self.scale,
            u8::from(self.repeat),
        );
        percent_encode_into(&mut out, &format!("{}", self.pattern.left));
        out.push_str("&right=");
        percent_encode_into(&mut out, &format!("{}", self.pattern.right));
        out
    }

    /// Decode a payload produced by [`encode`](Self::encode).
    ///
    /// Missing keys keep their defaults. Unknown keys, malformed values and
    /// duplicates are reported as warnings.
    pub fn decode(payload: &str) -> ConfigResult {
        let mut dec = Decoder::default();
        for pair in split_payload(payload) {
            let (raw_key, raw_value) = split_pair(pair);
            let key = percent_decode(raw_key).to_ascii_lowercase();
            let value = percent_decode(raw_value);
            dec.dispatch(&key, &value);
        }
        dec.finish()
    }
}

/// Builder for [`ViewerConfig`].
#[derive(Clone, Debug)]
pub struct ConfigBuilder {
    config: ViewerConfig,
    warnings: Vec<ConfigWarning>,
}

impl ConfigBuilder {
    /// Image to show. An empty path means no image.
    pub fn image(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.config.image = if path.is_empty() { None } else { Some(path) };
        self
    }

    pub fn mode(mut self, mode: LayoutMode) -> Self {
        self.config.mode = Some(mode);
        self
    }

    /// Mode by name. Empty selects the default (center); an unknown name
    /// leaves no mode, so no image is drawn.
    pub fn mode_str(mut self, name: &str) -> Self {
        if name.trim().is_empty() {
            self.config.mode = Some(LayoutMode::default());
        } else {
            self.config.mode = LayoutMode::parse(name);
            if self.config.mode.is_none() {
                self.warnings.push(ConfigWarning::ModeNotRecognized {
                    value: String::from(name),
                });
            }
        }
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.config.scale = scale;
        self
    }

    pub fn repeat(mut self, repeat: bool) -> Self {
        self.config.repeat = repeat;
        self
    }

    /// Enable or disable the stereo test pattern.
    pub fn pattern(mut self, enabled: bool) -> Self {
        self.config.pattern_enabled = enabled;
        self
    }

    /// Override the pattern colors.
    pub fn pattern_colors(mut self, pattern: StereoPattern) -> Self {
        self.config.pattern = pattern;
        self
    }

    /// Finish. The scale is checked here so the warning is reported once.
    pub fn build(mut self) -> ConfigResult {
        let scale = self.config.scale;
        if !(scale.is_finite() && scale > 0.0) {
            self.warnings.push(ConfigWarning::ScaleInvalid {
                value: format!("{scale}"),
            });
        }
        ConfigResult {
            config: self.config,
            warnings: self.warnings,
        }
    }
}

// ---- Payload decoding ----

#[derive(Default)]
struct Decoder {
    image: Option<Option<String>>,
    mode: Option<Option<LayoutMode>>,
    scale: Option<f64>,
    repeat: Option<bool>,
    pattern_enabled: Option<bool>,
    left: Option<Color>,
    right: Option<Color>,
    warnings: Vec<ConfigWarning>,
}

impl Decoder {
    fn dispatch(&mut self, key: &str, value: &str) {
        let warnings = &mut self.warnings;
        match key {
            "img" => {
                let image = if value.is_empty() {
                    None
                } else {
                    Some(String::from(value))
                };
                set_or_warn(&mut self.image, Some(image), key, value, warnings);
            }
            "mode" => {
                // Same resolution as `ConfigBuilder::mode_str`: empty is
                // center, anything unknown leaves no mode.
                let mode = if value.trim().is_empty() {
                    Some(LayoutMode::default())
                } else if value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    let parsed = LayoutMode::parse(value);
                    if parsed.is_none() {
                        warnings.push(ConfigWarning::ModeNotRecognized {
                            value: String::from(value),
                        });
                    }
                    parsed
                };
                set_or_warn(&mut self.mode, Some(mode), key, value, warnings);
            }
            "scale" => match value.trim().parse::<f64>() {
                Ok(s) => set_or_warn(&mut self.scale, Some(s), key, value, warnings),
                Err(_) => warnings.push(ConfigWarning::ValueInvalid {
                    key: "scale",
                    value: String::from(value),
                    reason: "expected a number",
                }),
            },
            "repeat" => {
                let parsed = parse_bool(value);
                warn_if_none(parsed, "repeat", value, warnings);
                set_or_warn(&mut self.repeat, parsed, key, value, warnings);
            }
            "pattern" => {
                let parsed = parse_bool(value);
                warn_if_none(parsed, "pattern", value, warnings);
                set_or_warn(&mut self.pattern_enabled, parsed, key, value, warnings);
            }
            "left" | "right" => {
                let parsed = Color::parse(value);
                if parsed.is_none() {
                    warnings.push(ConfigWarning::ValueInvalid {
                        key: if key == "left" { "left" } else { "right" },
                        value: String::from(value),
                        reason: "expected a hex color or color name",
                    });
                }
                let field = if key == "left" {
                    &mut self.left
                } else {
                    &mut self.right
                };
                set_or_warn(field, parsed, key, value, warnings);
            }
            _ => warnings.push(ConfigWarning::KeyNotRecognized {
                key: String::from(key),
                value: String::from(value),
            }),
        }
    }

    fn finish(self) -> ConfigResult {
        let defaults = ViewerConfig::default();
        let config = ViewerConfig {
            image: self.image.unwrap_or(defaults.image),
            mode: self.mode.unwrap_or(defaults.mode),
            scale: self.scale.unwrap_or(defaults.scale),
            repeat: self.repeat.unwrap_or(defaults.repeat),
            pattern_enabled: self.pattern_enabled.unwrap_or(defaults.pattern_enabled),
            pattern: StereoPattern::new(
                self.left.unwrap_or(defaults.pattern.left),
                self.right.unwrap_or(defaults.pattern.right),
            ),
        };
        ConfigResult {
            config,
            warnings: self.warnings,
        }
    }
}

/// Set a field, warning on duplicate.
fn set_or_warn<T>(
    field: &mut Option<T>,
    parsed: Option<T>,
    key: &str,
    value: &str,
    warnings: &mut Vec<ConfigWarning>,
) {
    if let Some(v) = parsed {
        if field.is_some() {
            warnings.push(ConfigWarning::DuplicateKey {
                key: String::from(key),
                value: String::from(value),
            });
        }
        *field = Some(v);
    }
}

fn warn_if_none<T>(
    parsed: Option<T>,
    key: &'static str,
    value: &str,
    warnings: &mut Vec<ConfigWarning>,
) {
    if parsed.is_none() {
        warnings.push(ConfigWarning::ValueInvalid {
            key,
            value: String::from(value),
            reason: "expected 0|1|true|false",
        });
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ---- Payload tokenizer ----

fn split_payload(payload: &str) -> impl Iterator<Item = &str> {
    payload.split('&').filter(|s| !s.is_empty())
}

/// Split on the first `=`. A bare key has an empty value.
fn split_pair(pair: &str) -> (&str, &str) {
    pair.split_once('=').unwrap_or((pair, ""))
}

/// Bytes that pass through unescaped.
fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~' | b'/')
}

fn percent_encode_into(out: &mut String, s: &str) {
    for &b in s.as_bytes() {
        if is_unreserved(b) {
            out.push(b as char);
        } else {
            let _ = write!(out, "%{b:02X}");
        }
    }
}

/// Percent-decode a component; `+` is a space. Invalid UTF-8 is replaced.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                match (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stereo::Eye;

    // ── builder ─────────────────────────────────────────────────────────

    #[test]
    fn defaults() {
        let r = ViewerConfig::builder().build();
        assert!(r.warnings.is_empty());
        let c = r.config;
        assert_eq!(c.image(), None);
        assert_eq!(c.mode(), Some(LayoutMode::Center));
        assert_eq!(c.scale(), 1.0);
        assert!(!c.repeat());
        assert!(!c.pattern_enabled());
        assert_eq!(c.pattern().color_for(Eye::Left), Some(Color::RED));
    }

    #[test]
    fn empty_mode_string_is_center() {
        let r = ViewerConfig::builder().mode_str("").build();
        assert_eq!(r.config.mode(), Some(LayoutMode::Center));
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn unknown_mode_disables_image() {
        let r = ViewerConfig::builder().image("a.png").mode_str("zoom").build();
        assert_eq!(r.config.mode(), None);
        assert_eq!(r.config.layout(), None);
        assert_eq!(
            r.warnings,
            [ConfigWarning::ModeNotRecognized {
                value: String::from("zoom")
            }]
        );
    }

    #[test]
    fn empty_image_path_is_none() {
        let r = ViewerConfig::builder().image("").build();
        assert_eq!(r.config.image(), None);
    }

    #[test]
    fn bad_scale_warns_but_keeps_value() {
        let r = ViewerConfig::builder().scale(-2.0).build();
        assert_eq!(r.config.scale(), -2.0);
        assert!(matches!(r.warnings[..], [ConfigWarning::ScaleInvalid { .. }]));
    }

    #[test]
    fn layout_carries_scale_and_repeat() {
        let c = ViewerConfig::builder()
            .mode(LayoutMode::Tile)
            .scale(2.5)
            .repeat(true)
            .build()
            .config;
        assert_eq!(
            c.layout(),
            Some(Layout::new(LayoutMode::Tile).scale(2.5).repeat(true))
        );
    }

    // ── wire format ─────────────────────────────────────────────────────

    #[test]
    fn encode_default_layout() {
        let c = ViewerConfig::builder().build().config;
        assert_eq!(
            c.encode(),
            "pattern=0&mode=center&scale=1&repeat=0&left=%23ff0000&right=%230000ff"
        );
    }

    #[test]
    fn encode_decode_full() {
        let c = ViewerConfig::builder()
            .image("/data/walls/Ünïcode & spaces.png")
            .mode(LayoutMode::Stretch)
            .scale(0.3)
            .repeat(true)
            .pattern(true)
            .pattern_colors(StereoPattern::new(Color::rgb(0, 255, 0), Color::rgba(1, 2, 3, 4)))
            .build()
            .config;
        let r = ViewerConfig::decode(&c.encode());
        assert!(r.warnings.is_empty(), "{:?}", r.warnings);
        assert_eq!(r.config, c);
    }

    #[test]
    fn unresolved_mode_survives_the_wire() {
        let c = ViewerConfig::builder().mode_str("bogus").build().config;
        let wire = c.encode();
        assert!(wire.contains("mode=none"));
        let r = ViewerConfig::decode(&wire);
        assert_eq!(r.config.mode(), None);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn decode_is_lenient() {
        let r = ViewerConfig::decode("scale=abc&repeat=maybe&color=red&&pattern=1");
        assert_eq!(r.config.scale(), 1.0);
        assert!(!r.config.repeat());
        assert!(r.config.pattern_enabled());
        assert_eq!(r.warnings.len(), 3);
        assert!(r.warnings.iter().any(|w| matches!(
            w,
            ConfigWarning::KeyNotRecognized { key, .. } if key == "color"
        )));
    }

    #[test]
    fn decode_unknown_mode_disables_image() {
        let r = ViewerConfig::decode("img=a.png&mode=spiral");
        assert_eq!(r.config.mode(), None);
        assert_eq!(r.config.layout(), None);
        assert_eq!(
            r.warnings,
            [ConfigWarning::ModeNotRecognized {
                value: String::from("spiral")
            }]
        );

        // Matches what the builder does with the same name.
        let built = ViewerConfig::builder().image("a.png").mode_str("spiral").build();
        assert_eq!(r.config, built.config);
        assert_eq!(r.warnings, built.warnings);
    }

    #[test]
    fn decode_empty_mode_is_center() {
        let r = ViewerConfig::decode("mode=&img=a.png");
        assert_eq!(r.config.mode(), Some(LayoutMode::Center));
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn decode_duplicate_last_wins() {
        let r = ViewerConfig::decode("scale=2&scale=3");
        assert_eq!(r.config.scale(), 3.0);
        assert_eq!(
            r.warnings,
            [ConfigWarning::DuplicateKey {
                key: String::from("scale"),
                value: String::from("3")
            }]
        );
    }

    #[test]
    fn decode_keys_case_insensitive() {
        let r = ViewerConfig::decode("MODE=Tile&Repeat=true");
        assert_eq!(r.config.mode(), Some(LayoutMode::Tile));
        assert!(r.config.repeat());
    }

    #[test]
    fn percent_decode_edge_cases() {
        assert_eq!(percent_decode("a+b"), "a b");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("%41%42"), "AB");
        assert_eq!(percent_decode("%C3%BC"), "ü");
    }

    #[test]
    fn warnings_display() {
        let w = ConfigWarning::ModeNotRecognized {
            value: String::from("zoom"),
        };
        assert!(format!("{w}").contains("\"zoom\""));
    }
}
