use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use entity_console::list::ListView;
use entity_console::storage::{RestStore, Store};
use entity_console::{
    EntitySchema, FieldKind, Panel, RecordId, SchemaRegistry, Value, builtin_registry,
};
use log::info;

use super::args::{Cli, Command};
use super::autocomplete::Autocompleter;
use super::demo::demo_store;
use super::table::{render_form_view, render_list, render_table};

pub async fn run(cli: Cli) -> Result<()> {
    let registry = builtin_registry().context("Invalid entity declarations")?;
    let config = cli.console_config()?;

    let store: Arc<dyn Store> = match &config.store {
        Some(store_config) => {
            info!("using REST store at {}", store_config.to_url());
            Arc::new(RestStore::new(store_config.clone())?)
        }
        None => {
            info!("using seeded in-memory store");
            Arc::new(demo_store(&registry).await?)
        }
    };

    match cli.command {
        Command::Entities => {
            print_entities(&registry);
            Ok(())
        }
        Command::List { entity, search } => list(&registry, store, &entity, search).await,
        Command::Form { entity, id } => form(&registry, store, &entity, id).await,
        Command::Create { entity, set } => save(&registry, store, &entity, None, set).await,
        Command::Update { entity, id, set } => save(&registry, store, &entity, Some(id), set).await,
        Command::Delete { entity, id, yes } => delete(&registry, store, &entity, id, yes).await,
        Command::Options { entity } => options(&registry, store, &entity).await,
    }
}

fn schema_for(registry: &SchemaRegistry, name: &str) -> Result<Arc<EntitySchema>> {
    registry.find(name).ok_or_else(|| {
        anyhow!(
            "Unknown entity '{}'{}",
            name,
            Autocompleter::for_entities(registry).hint(name)
        )
    })
}

/// Mounts a panel and reports a load failure as an error.
async fn mounted(schema: Arc<EntitySchema>, store: Arc<dyn Store>) -> Result<Panel> {
    let mut panel = Panel::new(schema, store);
    panel.mount().await;
    if let Some(err) = panel.error() {
        return Err(anyhow!("{}", err));
    }
    for failure in panel.resolution_failures() {
        eprintln!("warning: {}", failure);
    }
    Ok(panel)
}

fn print_entities(registry: &SchemaRegistry) {
    let rows: Vec<Vec<String>> = registry
        .entities()
        .map(|schema| {
            vec![
                schema.collection().to_string(),
                schema.title().to_string(),
                schema.fields().len().to_string(),
                schema.subtitle().unwrap_or_default().to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        render_table(&["Collection", "Title", "Fields", "Description"], rows)
    );
}

async fn list(
    registry: &SchemaRegistry,
    store: Arc<dyn Store>,
    entity: &str,
    search: Option<String>,
) -> Result<()> {
    let mut panel = mounted(schema_for(registry, entity)?, store).await?;
    if let Some(query) = search {
        panel.set_query(query);
    }
    match panel.empty_message() {
        Some(message) => println!("{}", message),
        None => println!("{}", render_list(&panel.list_view())),
    }
    Ok(())
}

async fn form(
    registry: &SchemaRegistry,
    store: Arc<dyn Store>,
    entity: &str,
    id: Option<String>,
) -> Result<()> {
    let mut panel = mounted(schema_for(registry, entity)?, store).await?;
    match id {
        Some(id) => panel.open_edit(&RecordId::new(id))?,
        None => panel.open_create(),
    }
    let view = panel
        .form_view()
        .ok_or_else(|| anyhow!("no form is open"))?;
    println!("{}", render_form_view(&view));
    Ok(())
}

async fn save(
    registry: &SchemaRegistry,
    store: Arc<dyn Store>,
    entity: &str,
    id: Option<String>,
    assignments: Vec<(String, String)>,
) -> Result<()> {
    let schema = schema_for(registry, entity)?;
    let mut panel = mounted(Arc::clone(&schema), store).await?;
    match &id {
        Some(id) => panel.open_edit(&RecordId::new(id.as_str()))?,
        None => panel.open_create(),
    }

    for (key, raw) in assignments {
        let field = schema.field(&key).ok_or_else(|| {
            anyhow!(
                "Unknown field '{}' in {}{}",
                key,
                schema.title(),
                Autocompleter::for_fields(&schema).hint(&key)
            )
        })?;
        let value = input_value(&field.kind, &raw)
            .with_context(|| format!("Invalid value for '{}'", key))?;
        panel.set_field(&key, value)?;
    }

    let row = panel.submit().await?;
    let verb = if id.is_some() { "Updated" } else { "Created" };
    println!(
        "{} {} {}",
        verb,
        schema.singular_noun(),
        row.id().map(|id| id.to_string()).unwrap_or_default()
    );
    println!("{}", render_list(&ListView::render(&schema, [&row])));
    Ok(())
}

async fn delete(
    registry: &SchemaRegistry,
    store: Arc<dyn Store>,
    entity: &str,
    id: String,
    yes: bool,
) -> Result<()> {
    let mut panel = mounted(schema_for(registry, entity)?, store).await?;
    let id = RecordId::new(id);
    let prompt = panel.request_delete(&id)?;
    if !yes {
        panel.cancel_delete();
        println!("{} Re-run with --yes to confirm.", prompt);
        return Ok(());
    }
    panel.delete_confirmed().await?;
    println!("Deleted {} {}", panel.schema().singular_noun(), id);
    Ok(())
}

async fn options(registry: &SchemaRegistry, store: Arc<dyn Store>, entity: &str) -> Result<()> {
    let panel = mounted(schema_for(registry, entity)?, store).await?;
    let schema = panel.schema();
    let mut any = false;
    for (field, reference) in schema.references() {
        any = true;
        println!("{} -> {}({}, {})", field.key, reference.table, reference.value_key, reference.label_key);
        let rows: Vec<Vec<String>> = panel
            .fk_options()
            .options(&field.key)
            .iter()
            .map(|o| vec![o.value.clone(), o.label.clone()])
            .collect();
        println!("{}\n", render_table(&["Value", "Label"], rows));
    }
    if !any {
        println!("{} has no foreign-key fields", schema.title());
    }
    Ok(())
}

/// Turns command-line text into a draft value. Only booleans need parsing
/// here; every other kind is coerced on submit.
fn input_value(kind: &FieldKind, raw: &str) -> Result<Value> {
    match kind {
        FieldKind::Boolean => match raw.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" | "on" => Ok(Value::Boolean(true)),
            "false" | "no" | "n" | "0" | "off" | "" => Ok(Value::Boolean(false)),
            other => Err(anyhow!("'{}' is not a boolean", other)),
        },
        _ => Ok(Value::Text(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_value() {
        assert_eq!(input_value(&FieldKind::Boolean, "No").unwrap(), Value::Boolean(false));
        assert_eq!(input_value(&FieldKind::Boolean, "yes").unwrap(), Value::Boolean(true));
        assert!(input_value(&FieldKind::Boolean, "maybe").is_err());
        assert_eq!(
            input_value(&FieldKind::Number, "12.5").unwrap(),
            Value::Text("12.5".to_string())
        );
    }
}
