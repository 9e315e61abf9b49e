use comfy_table::{Attribute, Cell, ContentArrangement, Table, presets::UTF8_FULL};
use entity_console::form::{FormView, Widget};
use entity_console::list::ListView;

/// A table sized to the terminal, 120 columns when not on a TTY.
pub fn new_table() -> Table {
    let width = crossterm::terminal::size().map(|(w, _)| w).unwrap_or(120);

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_width(width);
    table
}

pub fn render_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut table = new_table();
    table.set_header(headers.to_vec());
    for row in rows {
        table.add_row(row);
    }
    table
}

/// The list with an `id` column in place of the actions column.
pub fn render_list(view: &ListView) -> String {
    let mut table = new_table();
    let labels = view.headers.iter().take(view.headers.len().saturating_sub(1));
    table.set_header(std::iter::once("id".to_string()).chain(labels.cloned()));
    for row in &view.rows {
        let id = row.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
        table.add_row(std::iter::once(id).chain(row.cells.iter().cloned()));
    }
    format!("{}\n{} row(s)", table, view.rows.len())
}

pub fn render_form_view(view: &FormView) -> String {
    let mut table = new_table();
    table.set_header(vec!["Field", "Label", "Control", "Value"]);
    for control in &view.controls {
        let label = if control.required {
            Cell::new(format!("{} *", control.label)).add_attribute(Attribute::Bold)
        } else {
            Cell::new(&control.label)
        };
        let (kind, value) = describe_widget(&control.widget);
        table.add_row(vec![Cell::new(&control.key), label, Cell::new(kind), Cell::new(value)]);
    }
    format!("{}\n[{}]", table, view.submit_label)
}

fn describe_widget(widget: &Widget) -> (String, String) {
    match widget {
        Widget::Input {
            input_type,
            step,
            value,
        } => {
            let kind = match step {
                Some(step) => format!("input:{:?} step {}", input_type, step).to_lowercase(),
                None => format!("input:{:?}", input_type).to_lowercase(),
            };
            (kind, value.clone())
        }
        Widget::TextArea { value } => ("textarea".to_string(), value.clone()),
        Widget::Checkbox { checked } => ("checkbox".to_string(), if *checked { "[x]" } else { "[ ]" }.to_string()),
        Widget::Select {
            placeholder,
            options,
            selected,
        } => {
            let kind = format!("select ({} options)", options.len());
            let value = match selected {
                Some(value) => options
                    .iter()
                    .find(|o| &o.value == value)
                    .map(|o| format!("{} ({})", o.label, o.value))
                    .unwrap_or_else(|| value.clone()),
                None => placeholder.to_string(),
            };
            (kind, value)
        }
    }
}
