use serde::{Deserialize, Serialize};
use shared_types::{FormField, Point};
use tracing::debug;

use super::{CaptureKind, CaptureSurface, TypedSignatureRenderer};
use crate::config::CaptureConfig;
use crate::error::{DocsignError, Result};

/// How the user is producing their mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    #[default]
    Draw,
    Type,
}

/// An open capture for one signature or initial field.
///
/// Drawing and typing share one surface. In [`CaptureMode::Type`] the typed
/// text is rendered into the surface on save.
#[derive(Debug)]
pub struct CaptureSession {
    field_id: String,
    kind: CaptureKind,
    mode: CaptureMode,
    typed_text: String,
    surface: CaptureSurface,
    renderer: TypedSignatureRenderer,
}

impl CaptureSession {
    /// Open a capture for `field`
    ///
    /// # Errors
    ///
    /// [`DocsignError::WrongInteraction`] unless the field is a signature or
    /// initial field.
    pub fn open(field: &FormField, config: &CaptureConfig) -> Result<Self> {
        let kind =
            CaptureKind::for_field(field.field_type).ok_or_else(|| DocsignError::WrongInteraction {
                field_id: field.id.clone(),
                field_type: field.field_type,
            })?;
        debug!(field_id = %field.id, ?kind, "Opening capture");
        Ok(Self {
            field_id: field.id.clone(),
            kind,
            mode: CaptureMode::default(),
            typed_text: String::new(),
            surface: CaptureSurface::new(config, kind)?,
            renderer: TypedSignatureRenderer::new(config),
        })
    }

    pub fn field_id(&self) -> &str {
        &self.field_id
    }

    pub fn kind(&self) -> CaptureKind {
        self.kind
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CaptureMode) {
        self.mode = mode;
    }

    pub fn typed_text(&self) -> &str {
        &self.typed_text
    }

    pub fn set_typed_text(&mut self, text: impl Into<String>) {
        self.typed_text = text.into();
    }

    pub fn surface(&self) -> &CaptureSurface {
        &self.surface
    }

    pub fn pointer_down(&mut self, point: Point) {
        if self.mode == CaptureMode::Draw {
            self.surface.pointer_down(point);
        }
    }

    pub fn pointer_move(&mut self, point: Point) {
        if self.mode == CaptureMode::Draw {
            self.surface.pointer_move(point);
        }
    }

    pub fn pointer_up(&mut self) {
        self.surface.pointer_up();
    }

    pub fn pointer_leave(&mut self) {
        self.surface.pointer_leave();
    }

    /// Render the typed text into the surface without saving
    pub fn preview(&mut self) -> Result<bool> {
        self.renderer.render(&mut self.surface, &self.typed_text, self.kind)
    }

    /// Clear both the drawing and the typed text
    pub fn clear(&mut self) {
        self.surface.clear();
        self.typed_text.clear();
    }

    /// Whether [`save`](Self::save) would produce an image
    pub fn can_save(&self) -> bool {
        match self.mode {
            CaptureMode::Draw => !self.surface.is_empty(),
            CaptureMode::Type => !self.typed_text.trim().is_empty(),
        }
    }

    /// Produce the image data URI for the field
    ///
    /// # Errors
    ///
    /// [`DocsignError::EmptyCapture`] when there is nothing to save. The
    /// session stays usable after an error.
    pub fn save(&mut self) -> Result<String> {
        if !self.can_save() {
            return Err(DocsignError::EmptyCapture);
        }
        match self.mode {
            CaptureMode::Draw => self.surface.export(),
            CaptureMode::Type => {
                self.renderer
                    .render_and_export(&mut self.surface, &self.typed_text, self.kind)
            }
        }
    }
}
