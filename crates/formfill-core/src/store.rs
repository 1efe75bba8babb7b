//! In-memory collection of confirmed fields
//!
//! Holds manual fields and accepted candidates for the currently loaded
//! document. Loading another document replaces the store wholesale.

use crate::config::FieldConfig;
use crate::geometry::clamp_size;
use formfill_types::{CandidateField, Field, FieldPatch, FieldType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldStore {
    fields: Vec<Field>,
    #[serde(skip)]
    limits: FieldConfig,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: FieldConfig) -> Self {
        Self {
            fields: Vec::new(),
            limits,
        }
    }

    /// Insert a field and return its id.
    ///
    /// Dimensions are clamped to the configured minimums. A missing or
    /// already-taken id is replaced with a fresh one.
    pub fn add(&mut self, mut field: Field) -> String {
        if field.id.is_empty() || self.get(&field.id).is_some() {
            field.id = Field::generate_id();
        }
        let (width, height) = clamp_size(field.field_type, field.width, field.height, &self.limits);
        field.width = width;
        field.height = height;

        let id = field.id.clone();
        tracing::debug!(id = %id, page = field.page, kind = %field.field_type, "Added field");
        self.fields.push(field);
        id
    }

    /// Place a new field with the default geometry for its type
    pub fn place(&mut self, field_type: FieldType, page: u32, x: f64, y: f64) -> String {
        self.add(Field::new(field_type, page, x, y))
    }

    /// Accept a detector candidate onto `page`
    pub fn accept(&mut self, candidate: CandidateField, page: u32) -> String {
        self.add(candidate.into_field(page))
    }

    /// Merge `patch` over the field with `id`. Returns false if absent.
    pub fn update(&mut self, id: &str, patch: &FieldPatch) -> bool {
        let limits = self.limits.clone();
        let Some(field) = self.get_mut(id) else {
            return false;
        };
        field.apply(patch);
        let (width, height) = clamp_size(field.field_type, field.width, field.height, &limits);
        field.width = width;
        field.height = height;
        true
    }

    /// Delete a field by id, returning it if it existed
    pub fn delete(&mut self, id: &str) -> Option<Field> {
        let index = self.fields.iter().position(|f| f.id == id)?;
        Some(self.fields.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    /// Fields on one page, in insertion order
    pub fn list_by_page(&self, page: u32) -> Vec<&Field> {
        self.fields.iter().filter(|f| f.page == page).collect()
    }

    pub fn list_all(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}
