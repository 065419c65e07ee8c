//! Configuration for the capture surface, document viewer and overlay
//!
//! Configuration is read from TOML. Every key has a default, so an empty
//! document (or [`DocsignConfig::default`]) yields the stock behaviour.

use anyhow::{ensure, Context};
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocsignConfig {
    /// Signature/initial capture surface
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Zoom limits of the document viewer
    #[serde(default)]
    pub viewer: ViewerConfig,
    /// Field interaction behaviour
    #[serde(default)]
    pub overlay: OverlayConfig,
}

impl DocsignConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed, or
    /// a value is out of range.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use docsign_core::config::DocsignConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = DocsignConfig::from_str(r#"
    ///     [capture]
    ///     pixel_ratio = 1.0
    /// "#)?;
    /// assert_eq!(config.viewer.max_scale, 3.0);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let capture = &self.capture;
        ensure!(
            capture.width > 0.0 && capture.height > 0.0,
            "capture surface must have a positive size"
        );
        ensure!(capture.pixel_ratio > 0.0, "pixel_ratio must be positive");
        ensure!(
            capture.signature_stroke_width > 0.0 && capture.initial_stroke_width > 0.0,
            "stroke widths must be positive"
        );

        let viewer = &self.viewer;
        ensure!(
            viewer.min_scale > 0.0 && viewer.min_scale <= viewer.max_scale,
            "viewer scale range is empty"
        );
        ensure!(
            (viewer.min_scale..=viewer.max_scale).contains(&viewer.initial_scale),
            "initial_scale lies outside [min_scale, max_scale]"
        );
        ensure!(viewer.zoom_step > 0.0, "zoom_step must be positive");

        let overlay = &self.overlay;
        ensure!(
            !StrftimeItems::new(&overlay.date_format).any(|item| matches!(item, Item::Error)),
            "date_format {:?} is not a valid format string",
            overlay.date_format
        );
        // Time and zone specifiers fail against a bare date
        ensure!(
            NaiveDate::from_ymd_opt(2000, 1, 1).and_then(|d| overlay.stamp(d)).is_some(),
            "date_format {:?} cannot be applied to a calendar date",
            overlay.date_format
        );
        Ok(())
    }
}

/// Capture surface appearance. Sizes are logical pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default = "default_surface_width")]
    pub width: f64,
    #[serde(default = "default_surface_height")]
    pub height: f64,
    /// Device pixels per logical pixel
    #[serde(default = "default_pixel_ratio")]
    pub pixel_ratio: f32,
    #[serde(default = "default_signature_stroke_width")]
    pub signature_stroke_width: f32,
    #[serde(default = "default_initial_stroke_width")]
    pub initial_stroke_width: f32,
    #[serde(default = "default_signature_font_size")]
    pub signature_font_size: f32,
    #[serde(default = "default_initial_font_size")]
    pub initial_font_size: f32,
    /// RGBA ink colour
    #[serde(default = "default_ink")]
    pub ink: [u8; 4],
    /// RGBA background colour
    #[serde(default = "default_background")]
    pub background: [u8; 4],
    /// Embedded font family preferred for typed signatures
    #[serde(default = "default_font_family")]
    pub font_family: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: default_surface_width(),
            height: default_surface_height(),
            pixel_ratio: default_pixel_ratio(),
            signature_stroke_width: default_signature_stroke_width(),
            initial_stroke_width: default_initial_stroke_width(),
            signature_font_size: default_signature_font_size(),
            initial_font_size: default_initial_font_size(),
            ink: default_ink(),
            background: default_background(),
            font_family: default_font_family(),
        }
    }
}

fn default_surface_width() -> f64 {
    600.0
}

fn default_surface_height() -> f64 {
    192.0
}

fn default_pixel_ratio() -> f32 {
    2.0
}

fn default_signature_stroke_width() -> f32 {
    2.0
}

fn default_initial_stroke_width() -> f32 {
    1.5
}

fn default_signature_font_size() -> f32 {
    32.0
}

fn default_initial_font_size() -> f32 {
    24.0
}

fn default_ink() -> [u8; 4] {
    [0, 0, 0, 255]
}

fn default_background() -> [u8; 4] {
    [255, 255, 255, 255]
}

fn default_font_family() -> String {
    "Libertinus Serif".to_string()
}

/// Zoom behaviour of the document viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default = "default_initial_scale")]
    pub initial_scale: f64,
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            initial_scale: default_initial_scale(),
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            zoom_step: default_zoom_step(),
        }
    }
}

fn default_initial_scale() -> f64 {
    1.0
}

fn default_min_scale() -> f64 {
    0.5
}

fn default_max_scale() -> f64 {
    3.0
}

fn default_zoom_step() -> f64 {
    0.2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// chrono format string used when stamping date fields
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
        }
    }
}

impl OverlayConfig {
    /// Format `date` with `date_format`, or `None` if the format needs more
    /// than a calendar date
    pub fn stamp(&self, date: NaiveDate) -> Option<String> {
        let mut out = String::new();
        write!(out, "{}", date.format(&self.date_format)).ok()?;
        Some(out)
    }
}

fn default_date_format() -> String {
    "%-m/%-d/%Y".to_string()
}
