use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{Record, Value};

/// One enumerated choice of a single-select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Options whose label is the stored value itself.
    pub fn from_values(values: &[&str]) -> Vec<Self> {
        values.iter().map(|v| Self::new(*v, *v)).collect()
    }
}

/// Where a foreign-key field finds its candidate values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub table: String,
    pub value_key: String,
    pub label_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
}

impl Reference {
    pub fn new(
        table: impl Into<String>,
        value_key: impl Into<String>,
        label_key: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            value_key: value_key.into(),
            label_key: label_key.into(),
            order_by: None,
        }
    }

    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(column.into());
        self
    }
}

/// The closed set of field kinds. Metadata a kind needs lives inside its
/// variant, so a select without options or a reference without a target
/// cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FieldKind {
    PlainText,
    LongText,
    Number,
    Boolean,
    SingleSelect { options: Vec<SelectOption> },
    ForeignKey(Reference),
    TagList,
    Currency,
    Date,
}

impl FieldKind {
    /// Value a draft starts from when neither the record nor the field
    /// supplies one.
    pub fn empty_value(&self) -> Value {
        match self {
            FieldKind::Boolean => Value::Boolean(false),
            FieldKind::TagList => Value::List(Vec::new()),
            FieldKind::PlainText
            | FieldKind::LongText
            | FieldKind::Number
            | FieldKind::SingleSelect { .. }
            | FieldKind::ForeignKey(_)
            | FieldKind::Currency
            | FieldKind::Date => Value::Text(String::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::PlainText => "plain-text",
            FieldKind::LongText => "long-text",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::SingleSelect { .. } => "single-select",
            FieldKind::ForeignKey(_) => "foreign-key",
            FieldKind::TagList => "tag-list",
            FieldKind::Currency => "currency",
            FieldKind::Date => "date",
        }
    }

    pub fn reference(&self) -> Option<&Reference> {
        match self {
            FieldKind::ForeignKey(reference) => Some(reference),
            _ => None,
        }
    }
}

type FormatFn = dyn Fn(&Value, &Record) -> String + Send + Sync;

/// List-only display transform `(raw, row) -> text`. Never used by forms.
#[derive(Clone)]
pub struct ListFormatter(Arc<FormatFn>);

impl ListFormatter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &Record) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn format(&self, raw: &Value, row: &Record) -> String {
        (self.0)(raw, row)
    }
}

impl fmt::Debug for ListFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ListFormatter(..)")
    }
}

/// How one column is edited, listed and coerced.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub default_value: Option<Value>,
    pub hidden_in_list: bool,
    pub list_formatter: Option<ListFormatter>,
}

impl FieldDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            required: false,
            default_value: None,
            hidden_in_list: false,
            list_formatter: None,
        }
    }

    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::PlainText)
    }

    pub fn long_text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::LongText)
    }

    pub fn number(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Number)
    }

    pub fn boolean(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Boolean)
    }

    pub fn select(
        key: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self::new(key, label, FieldKind::SingleSelect { options })
    }

    pub fn reference(key: impl Into<String>, label: impl Into<String>, reference: Reference) -> Self {
        Self::new(key, label, FieldKind::ForeignKey(reference))
    }

    pub fn tags(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::TagList)
    }

    pub fn currency(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Currency)
    }

    pub fn date(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Date)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn hidden_in_list(mut self) -> Self {
        self.hidden_in_list = true;
        self
    }

    pub fn list_format<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Record) -> String + Send + Sync + 'static,
    {
        self.list_formatter = Some(ListFormatter::new(f));
        self
    }

    /// Seed for a new draft: the declared default, else the kind's empty value.
    pub fn initial_value(&self) -> Value {
        self.default_value
            .clone()
            .unwrap_or_else(|| self.kind.empty_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_value_prefers_default() {
        let active = FieldDescriptor::boolean("active", "Active").default_value(true);
        assert_eq!(active.initial_value(), Value::Boolean(true));

        let tags = FieldDescriptor::tags("style_tags", "Style Tags");
        assert_eq!(tags.initial_value(), Value::List(vec![]));

        let name = FieldDescriptor::text("name", "Name");
        assert_eq!(name.initial_value(), Value::Text(String::new()));
    }

    #[test]
    fn test_field_kind_serializes_with_tag() {
        let kind = FieldKind::ForeignKey(Reference::new("vendors", "id", "name").order_by("name"));
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["kind"], "foreign-key");
        assert_eq!(json["table"], "vendors");
        let back: FieldKind = serde_json::from_value(json).unwrap();
        assert_eq!(back, kind);
    }
}
