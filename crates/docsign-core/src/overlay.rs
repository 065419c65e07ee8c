//! Annotation overlay
//!
//! Draws field regions on top of the rendered page and routes signer clicks
//! to the right fill action. At most one capture is open at a time; clicks
//! on other fields are blocked until it is saved or cancelled.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use shared_types::field::{self, ensure_unique_ids};
use shared_types::{FieldError, FieldPatch, FieldType, FieldValue, FormField, Point};
use tracing::{debug, info};

use crate::capture::CaptureSession;
use crate::config::DocsignConfig;
use crate::coords::{contains_rotated, field_rect, Rotation, ScreenRect};
use crate::error::{DocsignError, Result};
use crate::viewer::ViewState;

/// How a region is styled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualState {
    /// Not editable
    ReadOnly,
    Completed,
    /// Required and still empty
    RequiredPending,
    OptionalPending,
}

/// What is drawn inside a region
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RegionContent {
    /// Checked checkbox
    Checkmark,
    /// Completed signature or initial
    Signed,
    /// Stamped date or entered text
    Text(String),
    /// Placeholder icon for an unfilled field
    Placeholder(FieldType),
}

/// A field as it appears on screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayRegion {
    pub field_id: String,
    pub field_type: FieldType,
    pub rect: ScreenRect,
    pub rotation: Rotation,
    pub state: VisualState,
    pub content: RegionContent,
    /// Show the required marker
    pub required_marker: bool,
    pub interactive: bool,
    /// Hover caption
    pub title: String,
}

impl OverlayRegion {
    pub fn contains(&self, point: Point) -> bool {
        contains_rotated(&self.rect, self.rotation, point)
    }
}

/// Outcome of clicking a field
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// The overlay is read-only
    Ignored,
    /// Another capture is open
    Blocked,
    CaptureOpened,
    DateStamped(String),
    CheckboxToggled(bool),
    /// The host should collect text and call [`AnnotationOverlay::submit_text`]
    TextEntryRequested,
}

#[derive(Debug)]
pub struct AnnotationOverlay {
    fields: Vec<FormField>,
    editable: bool,
    config: DocsignConfig,
    capture: Option<CaptureSession>,
}

impl AnnotationOverlay {
    pub fn new(fields: Vec<FormField>, editable: bool, config: DocsignConfig) -> Result<Self> {
        ensure_unique_ids(&fields)?;
        Ok(Self {
            fields,
            editable,
            config,
            capture: None,
        })
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<FormField> {
        self.fields
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Regions for the fields on the viewed page, in collection order
    pub fn regions(&self, view: &ViewState) -> Vec<OverlayRegion> {
        self.fields
            .iter()
            .filter(|f| f.page == view.page)
            .map(|f| self.region(f, view))
            .collect()
    }

    fn region(&self, field: &FormField, view: &ViewState) -> OverlayRegion {
        let state = if !self.editable {
            VisualState::ReadOnly
        } else if field.completed {
            VisualState::Completed
        } else if field.required {
            VisualState::RequiredPending
        } else {
            VisualState::OptionalPending
        };

        let content = match (&field.value, field.completed) {
            (Some(FieldValue::Checked(true)), true) => RegionContent::Checkmark,
            (Some(_), true) if field.field_type.is_capture() => RegionContent::Signed,
            (Some(FieldValue::Text(text)), true) => RegionContent::Text(text.clone()),
            _ => RegionContent::Placeholder(field.field_type),
        };

        OverlayRegion {
            field_id: field.id.clone(),
            field_type: field.field_type,
            rect: field_rect(field, view.scale),
            rotation: view.rotation,
            state,
            content,
            required_marker: field.required && !field.completed,
            interactive: self.editable,
            title: field.display_label().to_string(),
        }
    }

    /// Topmost field on the viewed page under a viewport point
    pub fn hit_test(&self, view: &ViewState, point: Point) -> Option<&FormField> {
        self.fields
            .iter()
            .rev()
            .filter(|f| f.page == view.page)
            .find(|f| contains_rotated(&field_rect(f, view.scale), view.rotation, point))
    }

    /// The open capture, if any
    pub fn capture(&self) -> Option<&CaptureSession> {
        self.capture.as_ref()
    }

    pub fn capture_mut(&mut self) -> Option<&mut CaptureSession> {
        self.capture.as_mut()
    }

    /// Handle a click on `field_id`, stamping dates with today's local date
    pub fn click_now(&mut self, field_id: &str) -> Result<Interaction> {
        self.click(field_id, Local::now().date_naive())
    }

    /// Handle a click on `field_id`
    ///
    /// # Errors
    ///
    /// [`FieldError::FieldNotFound`] for an unknown id, or
    /// [`DocsignError::DateFormat`] if the configured date format cannot
    /// format a calendar date.
    pub fn click(&mut self, field_id: &str, today: NaiveDate) -> Result<Interaction> {
        let field = self.find(field_id)?;
        if !self.editable {
            return Ok(Interaction::Ignored);
        }
        if let Some(open) = &self.capture {
            debug!(field_id, open = open.field_id(), "Click blocked by open capture");
            return Ok(Interaction::Blocked);
        }

        match field.field_type {
            FieldType::Signature | FieldType::Initial => {
                let session = CaptureSession::open(field, &self.config.capture)?;
                self.capture = Some(session);
                Ok(Interaction::CaptureOpened)
            }
            FieldType::Date => {
                let overlay = &self.config.overlay;
                let stamp = overlay
                    .stamp(today)
                    .ok_or_else(|| DocsignError::DateFormat(overlay.date_format.clone()))?;
                self.apply(field_id, FieldPatch::default().complete_with(FieldValue::Text(stamp.clone())))?;
                Ok(Interaction::DateStamped(stamp))
            }
            FieldType::Checkbox => {
                let checked = !field.value.as_ref().and_then(FieldValue::as_bool).unwrap_or(false);
                self.apply(field_id, FieldPatch::default().complete_with(FieldValue::Checked(checked)))?;
                Ok(Interaction::CheckboxToggled(checked))
            }
            FieldType::Text => Ok(Interaction::TextEntryRequested),
        }
    }

    /// Store the open capture's image in its field and close it.
    ///
    /// On error the capture stays open so the signer can retry.
    pub fn save_capture(&mut self) -> Result<&FormField> {
        let session = self.capture.as_mut().ok_or(DocsignError::NoActiveCapture)?;
        let image = session.save()?;
        let field_id = session.field_id().to_string();

        let index = self.apply(&field_id, FieldPatch::default().complete_with(FieldValue::Text(image)))?;
        self.capture = None;
        info!(field_id = %field_id, "Capture saved");
        Ok(&self.fields[index])
    }

    /// Close the open capture without touching its field
    pub fn cancel_capture(&mut self) -> bool {
        self.capture.take().is_some()
    }

    /// Fill a text field
    pub fn submit_text(&mut self, field_id: &str, text: &str) -> Result<&FormField> {
        let field = self.find(field_id)?;
        if field.field_type != FieldType::Text || !self.editable {
            return Err(DocsignError::WrongInteraction {
                field_id: field.id.clone(),
                field_type: field.field_type,
            });
        }
        if text.trim().is_empty() {
            return Err(FieldError::InvalidValue {
                field_id: field_id.to_string(),
                reason: "text is empty".to_string(),
            }
            .into());
        }

        let index = self.apply(
            field_id,
            FieldPatch::default().complete_with(FieldValue::Text(text.to_string())),
        )?;
        Ok(&self.fields[index])
    }

    /// Every required field is completed
    pub fn is_complete(&self) -> bool {
        field::is_complete(&self.fields)
    }

    pub fn completion_count(&self) -> (usize, usize) {
        field::completion_count(&self.fields)
    }

    /// Ids of required fields still waiting on the signer
    pub fn pending_required(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| !f.is_satisfied())
            .map(|f| f.id.as_str())
            .collect()
    }

    fn find(&self, field_id: &str) -> Result<&FormField> {
        self.fields
            .iter()
            .find(|f| f.id == field_id)
            .ok_or_else(|| FieldError::FieldNotFound(field_id.to_string()).into())
    }

    fn apply(&mut self, field_id: &str, patch: FieldPatch) -> Result<usize> {
        let index = self
            .fields
            .iter()
            .position(|f| f.id == field_id)
            .ok_or_else(|| FieldError::FieldNotFound(field_id.to_string()))?;
        self.fields[index] = field::update_field(&self.fields[index], patch)?;
        Ok(index)
    }
}
