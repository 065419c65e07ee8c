//! Field placement editor
//!
//! Producers arm a field type, click on the page, and the editor creates a
//! field at the clicked spot. Placement is one-shot: each arm places exactly
//! one field.

use shared_types::field::{self, create_field, ensure_unique_ids};
use shared_types::{FieldError, FieldPatch, FieldType, FormField, Point};
use tracing::{debug, warn};

use crate::coords::viewport_to_document;

#[derive(Debug, Clone)]
pub struct FieldPlacementEditor {
    selected_type: FieldType,
    is_placing: bool,
    fields: Vec<FormField>,
}

impl Default for FieldPlacementEditor {
    fn default() -> Self {
        Self {
            selected_type: FieldType::Signature,
            is_placing: false,
            fields: Vec::new(),
        }
    }
}

impl FieldPlacementEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume editing a previously saved collection
    pub fn with_fields(fields: Vec<FormField>) -> Result<Self, FieldError> {
        ensure_unique_ids(&fields)?;
        Ok(Self {
            fields,
            ..Self::default()
        })
    }

    pub fn selected_type(&self) -> FieldType {
        self.selected_type
    }

    pub fn is_placing(&self) -> bool {
        self.is_placing
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Arm placement of `field_type` for the next document click
    pub fn arm_placement(&mut self, field_type: FieldType) {
        self.selected_type = field_type;
        self.is_placing = true;
    }

    pub fn cancel_placement(&mut self) {
        self.is_placing = false;
    }

    /// Place the armed field at a viewport click.
    ///
    /// `click` is relative to the rendered page's top-left corner, shown at
    /// `scale`. Returns `None` when no placement is armed.
    pub fn handle_document_click(&mut self, click: Point, scale: f64, page: u32) -> Option<&FormField> {
        if !self.is_placing {
            return None;
        }
        if !(scale.is_finite() && scale > 0.0) {
            warn!(scale, "Ignoring placement at invalid scale");
            return None;
        }

        let position = viewport_to_document(click, scale);
        let field = create_field(self.selected_type, position, page, self.fields.len() + 1);
        debug!(
            field_id = %field.id,
            field_type = %field.field_type,
            page,
            x = field.x,
            y = field.y,
            "Placed field"
        );
        self.fields.push(field);
        self.is_placing = false;
        self.fields.last()
    }

    /// Remove a field by id. Unknown ids are a no-op.
    pub fn remove_field(&mut self, field_id: &str) -> Option<FormField> {
        let index = self.fields.iter().position(|f| f.id == field_id)?;
        Some(self.fields.remove(index))
    }

    /// Apply `patch` to the field with `field_id`
    pub fn update_field(&mut self, field_id: &str, patch: FieldPatch) -> Result<&FormField, FieldError> {
        let index = self
            .fields
            .iter()
            .position(|f| f.id == field_id)
            .ok_or_else(|| FieldError::FieldNotFound(field_id.to_string()))?;
        self.fields[index] = field::update_field(&self.fields[index], patch)?;
        Ok(&self.fields[index])
    }

    /// Snapshot of the collection for the caller to persist
    pub fn commit(&self) -> Vec<FormField> {
        self.fields.clone()
    }

    pub fn into_fields(self) -> Vec<FormField> {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_click_without_arming_is_noop() {
        let mut editor = FieldPlacementEditor::new();
        assert!(editor.handle_document_click(Point::new(10.0, 10.0), 1.0, 1).is_none());
        assert!(editor.fields().is_empty());
    }

    #[test]
    fn test_place_signature_at_zoom() {
        let mut editor = FieldPlacementEditor::new();
        editor.arm_placement(FieldType::Signature);
        let field = editor
            .handle_document_click(Point::new(300.0, 150.0), 1.5, 2)
            .unwrap()
            .clone();

        assert_eq!(field.field_type, FieldType::Signature);
        assert!((field.x - 200.0).abs() < 1e-9);
        assert!((field.y - 100.0).abs() < 1e-9);
        assert_eq!((field.width, field.height), (200.0, 60.0));
        assert_eq!(field.page, 2);
        assert!(field.required);
        assert!(!field.completed);
        assert_eq!(field.label.as_deref(), Some("Signature 1"));
        assert!(!editor.is_placing());
    }

    #[test]
    fn test_place_at_double_zoom() {
        let mut editor = FieldPlacementEditor::new();
        editor.arm_placement(FieldType::Signature);
        let field = editor
            .handle_document_click(Point::new(220.0, 110.0), 2.0, 1)
            .unwrap();
        assert_eq!((field.x, field.y), (110.0, 55.0));
        assert_eq!(field.page, 1);
    }

    #[test]
    fn test_placement_is_one_shot() {
        let mut editor = FieldPlacementEditor::new();
        editor.arm_placement(FieldType::Checkbox);
        editor.handle_document_click(Point::new(5.0, 5.0), 1.0, 1);
        assert!(editor.handle_document_click(Point::new(50.0, 50.0), 1.0, 1).is_none());
        assert_eq!(editor.fields().len(), 1);
        assert_eq!((editor.fields()[0].width, editor.fields()[0].height), (20.0, 20.0));
    }

    #[test]
    fn test_cancel_placement() {
        let mut editor = FieldPlacementEditor::new();
        editor.arm_placement(FieldType::Date);
        editor.cancel_placement();
        assert!(editor.handle_document_click(Point::new(5.0, 5.0), 1.0, 1).is_none());
        assert_eq!(editor.selected_type(), FieldType::Date);
    }

    #[test]
    fn test_invalid_scale_ignored() {
        let mut editor = FieldPlacementEditor::new();
        editor.arm_placement(FieldType::Text);
        assert!(editor.handle_document_click(Point::new(5.0, 5.0), 0.0, 1).is_none());
        assert!(editor.is_placing());
    }

    #[test]
    fn test_labels_follow_placement_order() {
        let mut editor = FieldPlacementEditor::new();
        for field_type in [FieldType::Signature, FieldType::Date, FieldType::Text] {
            editor.arm_placement(field_type);
            editor.handle_document_click(Point::new(1.0, 1.0), 1.0, 1);
        }
        let labels: Vec<&str> = editor.fields().iter().map(|f| f.display_label()).collect();
        assert_eq!(labels, vec!["Signature 1", "Date 2", "Text 3"]);
    }

    #[test]
    fn test_remove_field_idempotent() {
        let mut editor = FieldPlacementEditor::new();
        editor.arm_placement(FieldType::Initial);
        let id = editor
            .handle_document_click(Point::new(1.0, 1.0), 1.0, 1)
            .unwrap()
            .id
            .clone();

        assert!(editor.remove_field(&id).is_some());
        assert!(editor.remove_field(&id).is_none());
        assert!(editor.fields().is_empty());
    }

    #[test]
    fn test_update_field_rejects_move() {
        let mut editor = FieldPlacementEditor::new();
        editor.arm_placement(FieldType::Text);
        let id = editor
            .handle_document_click(Point::new(1.0, 1.0), 1.0, 1)
            .unwrap()
            .id
            .clone();

        let err = editor.update_field(&id, FieldPatch::default().page(3)).unwrap_err();
        assert!(matches!(err, FieldError::InvalidMutation { attribute: "page", .. }));

        let updated = editor
            .update_field(&id, FieldPatch::default().label("Stage name").required(false))
            .unwrap();
        assert_eq!(updated.label.as_deref(), Some("Stage name"));
        assert!(!updated.required);
    }

    #[test]
    fn test_update_unknown_field() {
        let mut editor = FieldPlacementEditor::new();
        assert_eq!(
            editor.update_field("nope", FieldPatch::default()).unwrap_err(),
            FieldError::FieldNotFound("nope".to_string())
        );
    }

    #[test]
    fn test_with_fields_rejects_duplicates() {
        let field = create_field(FieldType::Text, Point::new(0.0, 0.0), 1, 1);
        let err = FieldPlacementEditor::with_fields(vec![field.clone(), field]).unwrap_err();
        assert!(matches!(err, FieldError::DuplicateFieldId(_)));
    }

    #[test]
    fn test_commit_snapshots_collection() {
        let mut editor = FieldPlacementEditor::new();
        editor.arm_placement(FieldType::Signature);
        editor.handle_document_click(Point::new(1.0, 1.0), 1.0, 1);
        let saved = editor.commit();
        assert_eq!(saved, editor.fields().to_vec());
    }
}
