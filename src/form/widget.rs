//! Form controls, one per field kind.

use serde::Serialize;

use super::coerce::join_tags;
use super::draft::Draft;
use crate::core::Value;
use crate::resolver::FkOptions;
use crate::schema::{EntitySchema, FieldDescriptor, FieldKind, SelectOption};

/// First, unselectable entry of every select.
pub const SELECT_PLACEHOLDER: &str = "Select…";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Number,
    Date,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "kebab-case")]
pub enum Widget {
    Input {
        input_type: InputType,
        #[serde(skip_serializing_if = "Option::is_none")]
        step: Option<&'static str>,
        value: String,
    },
    TextArea {
        value: String,
    },
    Checkbox {
        checked: bool,
    },
    /// With no options only the disabled placeholder is offered.
    Select {
        placeholder: &'static str,
        options: Vec<SelectOption>,
        selected: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormControl {
    pub key: String,
    pub label: String,
    pub required: bool,
    pub widget: Widget,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormView {
    pub controls: Vec<FormControl>,
    pub submit_label: &'static str,
    /// Submit is disabled while a save is in flight.
    pub submit_disabled: bool,
}

/// Renders one field. The match is exhaustive so adding a kind without a
/// control does not compile.
pub fn render_control(field: &FieldDescriptor, value: &Value, fk_options: &FkOptions) -> FormControl {
    let mut label = field.label.clone();
    let widget = match &field.kind {
        FieldKind::PlainText => text_input(InputType::Text, None, value),
        FieldKind::Number => text_input(InputType::Number, None, value),
        FieldKind::Currency => text_input(InputType::Number, Some("0.01"), value),
        FieldKind::Date => text_input(InputType::Date, None, value),
        FieldKind::LongText => Widget::TextArea {
            value: input_text(value),
        },
        FieldKind::Boolean => Widget::Checkbox {
            checked: value.as_bool(),
        },
        FieldKind::SingleSelect { options } => select(options.clone(), value),
        FieldKind::ForeignKey(_) => select(fk_options.options(&field.key).to_vec(), value),
        FieldKind::TagList => {
            label.push_str(" (comma separated)");
            text_input(InputType::Text, None, value)
        }
    };

    FormControl {
        key: field.key.clone(),
        label,
        required: field.required,
        widget,
    }
}

/// Renders the whole create/edit form for a draft.
pub fn render_form(
    schema: &EntitySchema,
    draft: &Draft,
    fk_options: &FkOptions,
    submit_disabled: bool,
) -> FormView {
    let controls = schema
        .fields()
        .iter()
        .map(|field| {
            let empty = field.kind.empty_value();
            let value = draft.get(&field.key).unwrap_or(&empty);
            render_control(field, value, fk_options)
        })
        .collect();

    FormView {
        controls,
        submit_label: if draft.is_update() { "Update" } else { "Create" },
        submit_disabled,
    }
}

fn text_input(input_type: InputType, step: Option<&'static str>, value: &Value) -> Widget {
    Widget::Input {
        input_type,
        step,
        value: input_text(value),
    }
}

fn select(options: Vec<SelectOption>, value: &Value) -> Widget {
    let current = input_text(value);
    Widget::Select {
        placeholder: SELECT_PLACEHOLDER,
        options,
        selected: (!current.is_empty()).then_some(current),
    }
}

fn input_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::List(items) => join_tags(items),
        other => other.search_text(),
    }
}
