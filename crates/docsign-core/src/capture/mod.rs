//! Signature and initial capture
//!
//! A [`CaptureSurface`] is a fixed-size raster region that records freehand
//! strokes. [`TypedSignatureRenderer`] paints typed text into the same
//! surface with an embedded italic face, and [`CaptureSession`] ties the two
//! together for a single field.
//!
//! Saved captures leave the surface as a `data:image/png;base64,` URI, which
//! is what signature and initial fields store as their value.

mod font;
mod session;
mod surface;
mod typed;

pub use font::signature_font;
pub use session::{CaptureMode, CaptureSession};
pub use surface::{CaptureSurface, PNG_DATA_URI_PREFIX};
pub use typed::TypedSignatureRenderer;

use serde::{Deserialize, Serialize};
use shared_types::FieldType;

use crate::config::CaptureConfig;

/// Which kind of mark is being captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureKind {
    Signature,
    Initial,
}

impl CaptureKind {
    /// The capture kind for fields filled through the capture surface
    pub fn for_field(field_type: FieldType) -> Option<Self> {
        match field_type {
            FieldType::Signature => Some(CaptureKind::Signature),
            FieldType::Initial => Some(CaptureKind::Initial),
            FieldType::Checkbox | FieldType::Date | FieldType::Text => None,
        }
    }

    /// Logical stroke width for freehand drawing
    pub fn stroke_width(self, config: &CaptureConfig) -> f32 {
        match self {
            CaptureKind::Signature => config.signature_stroke_width,
            CaptureKind::Initial => config.initial_stroke_width,
        }
    }

    /// Logical font size for typed rendering
    pub fn font_size(self, config: &CaptureConfig) -> f32 {
        match self {
            CaptureKind::Signature => config.signature_font_size,
            CaptureKind::Initial => config.initial_font_size,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            CaptureKind::Signature => "Add Your Signature",
            CaptureKind::Initial => "Add Your Initials",
        }
    }
}
