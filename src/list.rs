//! Table view of loaded rows.

use serde::Serialize;

use crate::core::{Record, RecordId, Value};
use crate::schema::EntitySchema;

/// Shown in a cell whose value is NULL, absent or empty.
pub const EMPTY_CELL: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowAction {
    Edit,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRow {
    pub id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub cells: Vec<String>,
    pub actions: Vec<RowAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView {
    /// Column labels, ending with the unlabeled actions column.
    pub headers: Vec<String>,
    pub rows: Vec<ListRow>,
}

impl ListView {
    /// Projects `rows` onto the schema's list columns without reordering.
    pub fn render<'a>(schema: &EntitySchema, rows: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut headers: Vec<String> = schema
            .list_columns()
            .iter()
            .map(|key| {
                schema
                    .field(key)
                    .map_or_else(|| key.clone(), |f| f.label.clone())
            })
            .collect();
        headers.push(String::new());

        let rows = rows
            .into_iter()
            .map(|row| ListRow {
                id: row.id(),
                title: schema.row_title().map(|t| t.title(row)),
                cells: schema
                    .list_columns()
                    .iter()
                    .map(|key| render_cell(schema, key, row))
                    .collect(),
                actions: vec![RowAction::Edit, RowAction::Delete],
            })
            .collect();

        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Display text of one cell: the field's formatter when it has one, else the
/// raw value, else the placeholder.
pub fn render_cell(schema: &EntitySchema, key: &str, row: &Record) -> String {
    let raw = row.value(key);
    if let Some(formatter) = schema.field(key).and_then(|f| f.list_formatter.as_ref()) {
        return formatter.format(raw, row);
    }
    display_value(raw)
}

fn display_value(raw: &Value) -> String {
    if raw.is_blank() {
        return EMPTY_CELL.to_string();
    }
    match raw {
        Value::Object(_) => EMPTY_CELL.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDescriptor;

    fn schema() -> EntitySchema {
        EntitySchema::builder("Products", "products")
            .field(FieldDescriptor::text("name", "Product Name"))
            .field(FieldDescriptor::tags("tags", "Tags"))
            .field(FieldDescriptor::boolean("active", "Active"))
            .field(FieldDescriptor::long_text("notes", "Notes").hidden_in_list())
            .row_title(|row| format!("#{}", row.value("id")))
            .build()
            .unwrap()
    }

    #[test]
    fn test_headers_follow_list_columns() {
        let view = ListView::render(&schema(), &[]);
        assert_eq!(view.headers, ["Product Name", "Tags", "Active", ""]);
        assert!(view.is_empty());
    }

    #[test]
    fn test_cells_and_placeholders() {
        let rows = vec![
            Record::new()
                .with("id", "p-1")
                .with("name", "")
                .with("tags", vec!["a".to_string(), "b".to_string()])
                .with("active", true),
        ];
        let view = ListView::render(&schema(), &rows);
        let row = &view.rows[0];
        assert_eq!(row.cells, ["—", "a, b", "true"]);
        assert_eq!(row.title.as_deref(), Some("#p-1"));
        assert_eq!(row.actions, [RowAction::Edit, RowAction::Delete]);
    }
}
