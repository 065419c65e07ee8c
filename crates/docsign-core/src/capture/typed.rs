use ab_glyph::{point, Font, FontRef, GlyphId, PxScale, ScaleFont};
use tracing::debug;

use super::font::signature_font;
use super::{CaptureKind, CaptureSurface};
use crate::config::CaptureConfig;
use crate::error::Result;

/// Fraction of the surface width typed text may occupy before it is shrunk
const MAX_TEXT_WIDTH: f32 = 0.9;

/// Renders typed text into a [`CaptureSurface`] as a signature image
#[derive(Debug, Clone)]
pub struct TypedSignatureRenderer {
    signature_font_size: f32,
    initial_font_size: f32,
    font_family: String,
}

impl TypedSignatureRenderer {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            signature_font_size: config.signature_font_size,
            initial_font_size: config.initial_font_size,
            font_family: config.font_family.clone(),
        }
    }

    /// Logical font size used for `kind`
    pub fn font_size(&self, kind: CaptureKind) -> f32 {
        match kind {
            CaptureKind::Signature => self.signature_font_size,
            CaptureKind::Initial => self.initial_font_size,
        }
    }

    /// Replace the surface content with `text`, centered.
    ///
    /// Blank text leaves the surface untouched and returns `Ok(false)`.
    pub fn render(&self, surface: &mut CaptureSurface, text: &str, kind: CaptureKind) -> Result<bool> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }
        let font = signature_font(&self.font_family)?;

        surface.clear();
        let (device_width, device_height) = surface.device_size();
        let mut size = self.font_size(kind) * surface.pixel_ratio();
        let mut width = line_width(&font, size, text);
        let max_width = device_width as f32 * MAX_TEXT_WIDTH;
        if width > max_width {
            size *= max_width / width;
            width = line_width(&font, size, text);
            debug!(size, "Shrinking typed signature to fit");
        }

        let scaled = font.as_scaled(PxScale::from(size));
        let baseline = device_height as f32 / 2.0 + (scaled.ascent() + scaled.descent()) / 2.0;
        let mut caret = (device_width as f32 - width) / 2.0;
        let mut previous: Option<GlyphId> = None;

        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(size, point(caret, baseline));
            caret += scaled.h_advance(id);
            previous = Some(id);

            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|x, y, coverage| {
                    surface.blend_ink(
                        bounds.min.x as i32 + x as i32,
                        bounds.min.y as i32 + y as i32,
                        coverage,
                    );
                });
            }
        }

        surface.mark_drawn();
        Ok(true)
    }

    /// Render `text` and export the surface as a PNG data URI
    pub fn render_and_export(
        &self,
        surface: &mut CaptureSurface,
        text: &str,
        kind: CaptureKind,
    ) -> Result<String> {
        self.render(surface, text, kind)?;
        surface.export()
    }
}

/// Advance width of `text` at `size` pixels, kerning included
fn line_width(font: &FontRef<'_>, size: f32, text: &str) -> f32 {
    let scaled = font.as_scaled(PxScale::from(size));
    let mut width = 0.0;
    let mut previous: Option<GlyphId> = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        previous = Some(id);
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocsignError;

    fn setup() -> (TypedSignatureRenderer, CaptureSurface) {
        let config = CaptureConfig::default();
        (
            TypedSignatureRenderer::new(&config),
            CaptureSurface::new(&config, CaptureKind::Signature).unwrap(),
        )
    }

    fn ink_columns(surface: &CaptureSurface) -> Vec<u32> {
        let (w, h) = surface.device_size();
        (0..w)
            .filter(|&x| (0..h).any(|y| surface.pixel(x, y).is_some_and(|p| p[0] < 128)))
            .collect()
    }

    #[test]
    fn test_blank_text_is_noop() {
        let (renderer, mut surface) = setup();
        assert!(!renderer.render(&mut surface, "   ", CaptureKind::Signature).unwrap());
        assert!(surface.is_empty());
        assert!(matches!(
            renderer.render_and_export(&mut surface, "", CaptureKind::Signature),
            Err(DocsignError::EmptyCapture)
        ));
    }

    #[test]
    fn test_renders_ink_near_center() {
        let (renderer, mut surface) = setup();
        assert!(renderer.render(&mut surface, "Jane Doe", CaptureKind::Signature).unwrap());
        assert!(!surface.is_empty());

        let columns = ink_columns(&surface);
        assert!(!columns.is_empty());
        let first = *columns.first().unwrap() as f32;
        let last = *columns.last().unwrap() as f32;
        let center = (first + last) / 2.0;
        // Centered horizontally within a generous tolerance for glyph overhang
        assert!((center - 600.0).abs() < 60.0, "ink centered at {}", center);
    }

    #[test]
    fn test_render_replaces_drawn_strokes() {
        let (renderer, mut surface) = setup();
        surface.pointer_down(shared_types::Point::new(2.0, 2.0));
        surface.pointer_move(shared_types::Point::new(20.0, 2.0));
        surface.pointer_up();

        renderer.render(&mut surface, "JD", CaptureKind::Initial).unwrap();
        assert_eq!(surface.pixel(20, 4), Some([255, 255, 255, 255]));
        assert_eq!(surface.stroke_count(), 0);
    }

    #[test]
    fn test_long_text_fits_surface() {
        let (renderer, mut surface) = setup();
        let long = "Bartholomew Maximilian Featherstonehaugh-Cholmondeley the Third";
        renderer.render(&mut surface, long, CaptureKind::Signature).unwrap();

        let columns = ink_columns(&surface);
        let (w, _) = surface.device_size();
        assert!(*columns.first().unwrap() > 0);
        assert!(*columns.last().unwrap() < w - 1);
    }

    #[test]
    fn test_export_produces_data_uri() {
        let (renderer, mut surface) = setup();
        let uri = renderer
            .render_and_export(&mut surface, "J. Doe", CaptureKind::Signature)
            .unwrap();
        assert!(uri.starts_with(super::super::PNG_DATA_URI_PREFIX));
    }
}
