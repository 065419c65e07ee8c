use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared_types::Point;
use tiny_skia::{
    Color, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PremultipliedColorU8, Stroke, Transform,
};
use tracing::debug;

use super::CaptureKind;
use crate::config::CaptureConfig;
use crate::error::{DocsignError, Result};

pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Freehand drawing surface.
///
/// Pointer positions are logical coordinates relative to the surface's
/// top-left corner. The backing pixmap is `pixel_ratio` times larger in each
/// dimension so exported images stay sharp on high-density displays.
pub struct CaptureSurface {
    pixmap: Pixmap,
    width: f64,
    height: f64,
    pixel_ratio: f32,
    stroke_width: f32,
    ink: [u8; 4],
    background: [u8; 4],
    /// Last point of the stroke in progress
    cursor: Option<Point>,
    is_empty: bool,
    strokes: usize,
}

impl CaptureSurface {
    pub fn new(config: &CaptureConfig, kind: CaptureKind) -> Result<Self> {
        let invalid = || DocsignError::InvalidSurface {
            width: config.width,
            height: config.height,
        };
        if !(config.width > 0.0 && config.height > 0.0 && config.pixel_ratio > 0.0) {
            return Err(invalid());
        }

        let ratio = f64::from(config.pixel_ratio);
        let device_width = (config.width * ratio).round() as u32;
        let device_height = (config.height * ratio).round() as u32;
        let pixmap = Pixmap::new(device_width, device_height).ok_or_else(invalid)?;

        let mut surface = Self {
            pixmap,
            width: config.width,
            height: config.height,
            pixel_ratio: config.pixel_ratio,
            stroke_width: kind.stroke_width(config),
            ink: config.ink,
            background: config.background,
            cursor: None,
            is_empty: true,
            strokes: 0,
        };
        surface.fill_background();
        Ok(surface)
    }

    /// Logical width
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Logical height
    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Device-pixel dimensions of the exported image
    pub fn device_size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    /// True until something has been drawn or rendered since the last clear
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    /// True while a stroke is in progress
    pub fn is_drawing(&self) -> bool {
        self.cursor.is_some()
    }

    /// Number of strokes started since the last clear
    pub fn stroke_count(&self) -> usize {
        self.strokes
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.width && point.y <= self.height
    }

    /// Begin a stroke. Presses outside the surface are ignored.
    pub fn pointer_down(&mut self, point: Point) {
        if !self.contains(point) {
            debug!(x = point.x, y = point.y, "Ignoring press outside capture surface");
            return;
        }
        self.cursor = Some(point);
        self.is_empty = false;
        self.strokes += 1;
    }

    /// Extend the current stroke with a segment to `point`.
    ///
    /// Leaving the surface ends the stroke without drawing the segment.
    pub fn pointer_move(&mut self, point: Point) {
        let Some(from) = self.cursor else {
            return;
        };
        if !self.contains(point) {
            self.end_stroke();
            return;
        }
        self.draw_segment(from, point);
        self.cursor = Some(point);
    }

    pub fn pointer_up(&mut self) {
        self.end_stroke();
    }

    pub fn pointer_leave(&mut self) {
        self.end_stroke();
    }

    fn end_stroke(&mut self) {
        self.cursor = None;
    }

    /// Reset to the background colour and the empty state
    pub fn clear(&mut self) {
        self.fill_background();
        self.cursor = None;
        self.is_empty = true;
        self.strokes = 0;
    }

    /// Encode the surface as a PNG data URI
    ///
    /// # Errors
    ///
    /// [`DocsignError::EmptyCapture`] if nothing has been drawn.
    pub fn export(&self) -> Result<String> {
        if self.is_empty {
            return Err(DocsignError::EmptyCapture);
        }
        let png = self
            .pixmap
            .encode_png()
            .map_err(|e| DocsignError::Encode(e.to_string()))?;
        Ok(format!("{}{}", PNG_DATA_URI_PREFIX, STANDARD.encode(png)))
    }

    /// Demultiplied RGBA of a device pixel
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let color = self.pixmap.pixel(x, y)?.demultiply();
        Some([color.red(), color.green(), color.blue(), color.alpha()])
    }

    fn draw_segment(&mut self, from: Point, to: Point) {
        if from == to {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        let Some(path) = pb.finish() else {
            return;
        };

        let mut paint = Paint::default();
        let [r, g, b, a] = self.ink;
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;

        let stroke = Stroke {
            width: self.stroke_width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        let ratio = self.pixel_ratio;
        self.pixmap.stroke_path(
            &path,
            &paint,
            &stroke,
            Transform::from_scale(ratio, ratio),
            None,
        );
    }

    pub(crate) fn fill_background(&mut self) {
        let [r, g, b, a] = self.background;
        self.pixmap.fill(Color::from_rgba8(r, g, b, a));
    }

    /// Record content painted outside the stroke path, such as typed text
    pub(crate) fn mark_drawn(&mut self) {
        self.is_empty = false;
    }

    /// Composite the ink colour over a device pixel with `coverage` in `[0, 1]`
    pub(crate) fn blend_ink(&mut self, x: i32, y: i32, coverage: f32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        let (width, height) = self.device_size();
        if x >= width || y >= height {
            return;
        }

        let coverage = coverage.clamp(0.0, 1.0);
        let [r, g, b, a] = self.ink;
        let src_alpha = f32::from(a) / 255.0 * coverage;
        let premul = |channel: u8| f32::from(channel) * src_alpha;

        let idx = (y * width + x) as usize;
        let pixels = self.pixmap.pixels_mut();
        let dst = pixels[idx];
        let over = |src: f32, dst: u8| (src + f32::from(dst) * (1.0 - src_alpha)).round() as u8;

        let alpha = over(255.0 * src_alpha, dst.alpha());
        let blended = PremultipliedColorU8::from_rgba(
            over(premul(r), dst.red()).min(alpha),
            over(premul(g), dst.green()).min(alpha),
            over(premul(b), dst.blue()).min(alpha),
            alpha,
        );
        if let Some(color) = blended {
            pixels[idx] = color;
        }
    }
}

impl std::fmt::Debug for CaptureSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixel_ratio", &self.pixel_ratio)
            .field("is_empty", &self.is_empty)
            .field("strokes", &self.strokes)
            .finish()
    }
}
