//! UI input to storage value, one rule per field kind.

use crate::core::{FormError, Value};
use crate::schema::{FieldDescriptor, FieldKind};

/// Converts whatever the form holds for `field` into the value that is sent
/// to the store. Every kind yields exactly one representation or NULL; input a
/// number field cannot hold is reported instead of guessed at.
pub fn coerce(field: &FieldDescriptor, value: Value) -> Result<Value, FormError> {
    match &field.kind {
        FieldKind::Number | FieldKind::Currency => coerce_number(field, value),
        FieldKind::TagList => Ok(coerce_tags(value)),
        FieldKind::Boolean => Ok(coerce_boolean(value)),
        FieldKind::Date => Ok(coerce_date(value)),
        FieldKind::PlainText
        | FieldKind::LongText
        | FieldKind::SingleSelect { .. }
        | FieldKind::ForeignKey(_) => Ok(coerce_text(value)),
    }
}

fn coerce_number(field: &FieldDescriptor, value: Value) -> Result<Value, FormError> {
    let not_a_number = |input: String| FormError::NotANumber {
        field: field.key.clone(),
        label: field.label.clone(),
        input,
    };

    match value {
        Value::Null => Ok(Value::Null),
        Value::Integer(_) | Value::Float(_) => Ok(value),
        Value::Boolean(b) => Ok(Value::Integer(i64::from(b))),
        Value::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(Value::Null);
            }
            match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Value::number(n)),
                _ => Err(not_a_number(s)),
            }
        }
        other @ (Value::List(_) | Value::Object(_)) => Err(not_a_number(other.to_string())),
    }
}

fn coerce_tags(value: Value) -> Value {
    match value {
        Value::List(items) => Value::List(items),
        Value::Null => Value::List(Vec::new()),
        Value::Text(s) => Value::List(split_tags(&s)),
        other => Value::List(split_tags(&other.to_string())),
    }
}

fn coerce_boolean(value: Value) -> Value {
    Value::Boolean(value.as_bool())
}

fn coerce_date(value: Value) -> Value {
    match value {
        Value::Text(s) if s.is_empty() => Value::Null,
        other => other,
    }
}

fn coerce_text(value: Value) -> Value {
    match value {
        Value::Text(s) if s.is_empty() => Value::Null,
        other => other,
    }
}

/// Splits comma-separated input into trimmed, non-empty tags, keeping order
/// and duplicates.
pub fn split_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Inverse of [`split_tags`] for display in a text input.
pub fn join_tags(tags: &[String]) -> String {
    tags.join(", ")
}
