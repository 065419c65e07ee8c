//! Form field model
//!
//! A [`FormField`] is one placeable, fillable annotation on a contract page.
//! Positions and sizes are stored unscaled (zoom 1.0, no rotation) relative to
//! the top-left corner of the page the field belongs to.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the field model
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("cannot change `{attribute}` of field {field_id} after creation")]
    InvalidMutation {
        field_id: String,
        attribute: &'static str,
    },

    #[error("invalid value for field {field_id}: {reason}")]
    InvalidValue { field_id: String, reason: String },

    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("duplicate field id: {0}")]
    DuplicateFieldId(String),
}

/// The kind of a form field. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Signature,
    Initial,
    Checkbox,
    Date,
    Text,
}

impl FieldType {
    pub const ALL: [FieldType; 5] = [
        FieldType::Signature,
        FieldType::Initial,
        FieldType::Checkbox,
        FieldType::Date,
        FieldType::Text,
    ];

    /// Human-readable label used for default field captions
    pub fn label(self) -> &'static str {
        match self {
            FieldType::Signature => "Signature",
            FieldType::Initial => "Initial",
            FieldType::Checkbox => "Checkbox",
            FieldType::Date => "Date",
            FieldType::Text => "Text",
        }
    }

    /// Wire name, as stored in persisted field JSON
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Signature => "signature",
            FieldType::Initial => "initial",
            FieldType::Checkbox => "checkbox",
            FieldType::Date => "date",
            FieldType::Text => "text",
        }
    }

    /// Default unscaled `(width, height)` of a newly placed field
    pub fn default_size(self) -> (f64, f64) {
        match self {
            FieldType::Signature => (200.0, 60.0),
            FieldType::Checkbox => (20.0, 20.0),
            FieldType::Initial | FieldType::Date | FieldType::Text => (100.0, 30.0),
        }
    }

    /// Signature and initial fields are filled through the capture surface
    pub fn is_capture(self) -> bool {
        matches!(self, FieldType::Signature | FieldType::Initial)
    }

    /// Whether `value` is the right shape for this field type
    pub fn accepts(self, value: &FieldValue) -> bool {
        match (self, value) {
            (FieldType::Checkbox, FieldValue::Checked(_)) => true,
            (FieldType::Checkbox, FieldValue::Text(_)) => false,
            (_, FieldValue::Text(_)) => true,
            (_, FieldValue::Checked(_)) => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Captured content of a field.
///
/// Checkbox fields hold a boolean; every other type holds a string (an image
/// data URI for signature/initial, the stamped date, or free text).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Checked(bool),
    Text(String),
}

impl FieldValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Checked(checked) => Some(*checked),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Checked(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Checked(checked) => write!(f, "{}", checked),
            FieldValue::Text(text) => f.write_str(text),
        }
    }
}

/// A point in unscaled document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One annotation placed on a contract page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// 1-based page number
    pub page: u32,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
    #[serde(default)]
    pub completed: bool,
}

impl FormField {
    /// Caption shown to users, falling back to the type name
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.field_type.as_str())
    }

    /// Optional fields are always satisfied; required ones once completed
    pub fn is_satisfied(&self) -> bool {
        !self.required || self.completed
    }
}

/// A partial update to a [`FormField`].
///
/// Only `label`, `required`, `value` and `completed` may be applied. The
/// remaining attributes exist so that a host passing a full field diff gets
/// an [`FieldError::InvalidMutation`] instead of a silently dropped change.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FieldPatch {
    pub label: Option<String>,
    pub required: Option<bool>,
    pub value: Option<FieldValue>,
    pub completed: Option<bool>,
    #[serde(rename = "type")]
    pub field_type: Option<FieldType>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub page: Option<u32>,
}

impl FieldPatch {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn value(mut self, value: FieldValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Set the value and mark the field completed in one step
    pub fn complete_with(self, value: FieldValue) -> Self {
        self.value(value).completed(true)
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}

/// Create a field of `field_type` at `position` on `page`.
///
/// `ordinal` is the 1-based placement order, used for the default label.
pub fn create_field(field_type: FieldType, position: Point, page: u32, ordinal: usize) -> FormField {
    let (width, height) = field_type.default_size();
    FormField {
        id: format!("field_{}", Uuid::new_v4().simple()),
        field_type,
        x: position.x,
        y: position.y,
        width,
        height,
        page,
        required: true,
        label: Some(format!("{} {}", field_type.label(), ordinal)),
        value: None,
        completed: false,
    }
}

fn changes<T: PartialEq>(proposed: Option<T>, current: T) -> bool {
    proposed.is_some_and(|p| p != current)
}

/// Apply `patch` to `field`, returning the updated field.
///
/// The input is never modified; on error the caller keeps its prior state.
pub fn update_field(field: &FormField, patch: FieldPatch) -> Result<FormField, FieldError> {
    let frozen = [
        ("type", changes(patch.field_type, field.field_type)),
        ("x", changes(patch.x, field.x)),
        ("y", changes(patch.y, field.y)),
        ("width", changes(patch.width, field.width)),
        ("height", changes(patch.height, field.height)),
        ("page", changes(patch.page, field.page)),
    ];
    if let Some(&(attribute, _)) = frozen.iter().find(|(_, changed)| *changed) {
        return Err(FieldError::InvalidMutation {
            field_id: field.id.clone(),
            attribute,
        });
    }

    let mut next = field.clone();
    if let Some(label) = patch.label {
        next.label = Some(label);
    }
    if let Some(required) = patch.required {
        next.required = required;
    }
    if let Some(value) = patch.value {
        if !next.field_type.accepts(&value) {
            return Err(FieldError::InvalidValue {
                field_id: field.id.clone(),
                reason: format!("{} field cannot hold {:?}", next.field_type, value),
            });
        }
        next.value = Some(value);
    }
    if let Some(completed) = patch.completed {
        next.completed = completed;
    }
    if next.completed && next.value.is_none() {
        return Err(FieldError::InvalidValue {
            field_id: field.id.clone(),
            reason: "completed field has no value".to_string(),
        });
    }

    Ok(next)
}

/// True iff every required field is completed
pub fn is_complete(fields: &[FormField]) -> bool {
    fields.iter().all(FormField::is_satisfied)
}

/// `(completed, total)` over the whole collection
pub fn completion_count(fields: &[FormField]) -> (usize, usize) {
    let completed = fields.iter().filter(|f| f.completed).count();
    (completed, fields.len())
}

/// Reject collections that reuse a field id
pub fn ensure_unique_ids(fields: &[FormField]) -> Result<(), FieldError> {
    let mut seen = HashSet::with_capacity(fields.len());
    for field in fields {
        if !seen.insert(field.id.as_str()) {
            return Err(FieldError::DuplicateFieldId(field.id.clone()));
        }
    }
    Ok(())
}
