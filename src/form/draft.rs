use std::collections::BTreeMap;

use super::coerce::coerce;
use crate::core::{FormError, Record, RecordId, Value};
use crate::schema::EntitySchema;

/// The editable, not yet submitted copy of a record.
///
/// A draft for a new record never carries an identifier; a draft opened on
/// an existing row always does.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    id: Option<RecordId>,
    values: BTreeMap<String, Value>,
}

impl Draft {
    /// Blank draft for the create form.
    pub fn new(schema: &EntitySchema) -> Self {
        Self::seed(schema, None)
    }

    /// Draft opened on a loaded row for the edit form.
    pub fn from_record(schema: &EntitySchema, record: &Record) -> Self {
        Self::seed(schema, Some(record))
    }

    /// Each field starts from the record when it has the column, else from
    /// the declared default, else from the kind's empty value.
    fn seed(schema: &EntitySchema, initial: Option<&Record>) -> Self {
        let values = schema
            .fields()
            .iter()
            .map(|field| {
                let value = initial
                    .and_then(|record| record.get(&field.key))
                    .cloned()
                    .unwrap_or_else(|| field.initial_value());
                (field.key.clone(), value)
            })
            .collect();

        Self {
            id: initial.and_then(Record::id),
            values,
        }
    }

    pub fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    pub fn is_update(&self) -> bool {
        self.id.is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Stores raw UI input for a declared field.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), FormError> {
        match self.values.get_mut(key) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(FormError::UnknownField(key.to_string())),
        }
    }

    /// Coerces every field, rejects empty required fields, then applies the
    /// entity's `before_save` hook. The draft itself is left untouched.
    pub fn build_payload(&self, schema: &EntitySchema) -> Result<Record, FormError> {
        let mut payload = Record::new();
        for field in schema.fields() {
            let raw = self
                .values
                .get(&field.key)
                .cloned()
                .unwrap_or_else(|| field.kind.empty_value());
            let value = coerce(field, raw)?;
            if field.required && value.is_blank() {
                return Err(FormError::Required {
                    field: field.key.clone(),
                    label: field.label.clone(),
                });
            }
            payload.set(field.key.clone(), value);
        }

        Ok(match schema.before_save() {
            Some(hook) => hook.apply(payload, self.is_update()),
            None => payload,
        })
    }
}
