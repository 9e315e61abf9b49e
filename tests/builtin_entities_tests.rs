use std::sync::Arc;

use entity_console::storage::{CollectionSpec, MemoryStore, StoreOp};
use entity_console::{EntitySchema, Panel, Record, SchemaRegistry, Value, builtin_registry};
use tokio_test::assert_ok;

fn constraints(schema: &EntitySchema) -> CollectionSpec {
    let mut spec = CollectionSpec::new();
    for field in schema.fields() {
        if field.required {
            spec = spec.not_null(field.key.clone());
        }
        if let Some(reference) = field.kind.reference() {
            spec = spec.foreign_key(field.key.clone(), reference.table.clone());
        }
    }
    spec
}

async fn store_for(registry: &SchemaRegistry) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for schema in registry.entities() {
        store
            .create_collection(schema.collection(), constraints(&schema))
            .await;
    }
    store
        .seed(
            "vendors",
            [
                Record::new().with("id", "v-acme").with("name", "Acme Denim"),
                Record::new().with("id", "v-loom").with("name", "Blue Loom"),
            ],
        )
        .await
        .unwrap();
    store
        .seed(
            "products",
            [
                Record::new()
                    .with("id", "p-shirt")
                    .with("vendor_id", "v-loom")
                    .with("name", "Linen Shirt")
                    .with("created_at", "2024-01-01T00:00:00.000Z"),
                Record::new()
                    .with("id", "p-jean")
                    .with("vendor_id", "v-acme")
                    .with("name", "Straight Jean")
                    .with("msrp", 98i64)
                    .with("created_at", "2024-02-01T00:00:00.000Z"),
            ],
        )
        .await
        .unwrap();
    store
}

#[test]
fn test_builtin_registry_declares_twelve_entities() {
    let registry = assert_ok!(builtin_registry());
    let collections: Vec<String> = registry
        .entities()
        .map(|schema| schema.collection().to_string())
        .collect();
    assert_eq!(
        collections,
        [
            "vendors",
            "products",
            "personas",
            "outfits",
            "wardrobe_items",
            "persona_measurements",
            "persona_preferences",
            "product_variants",
            "inventory",
            "media_assets",
            "wardrobes",
            "outfit_items",
        ]
    );
    assert_eq!(
        registry.find("Persona Preferences").unwrap().collection(),
        "persona_preferences"
    );
}

#[tokio::test]
async fn test_products_list_shows_vendor_names() {
    let registry = builtin_registry().unwrap();
    let store = store_for(&registry).await;
    let mut panel = Panel::new(registry.find("products").unwrap(), store.clone());
    panel.mount().await;
    assert!(panel.error().is_none());

    let view = panel.list_view();
    assert_eq!(
        view.headers,
        ["Product Name", "Vendor", "Category", "Target Gender", "Base Color", "MSRP", ""]
    );
    assert_eq!(view.rows[0].cells[0], "Straight Jean");
    assert_eq!(view.rows[0].cells[1], "Acme Denim");
    assert_eq!(view.rows[0].cells[5], "$98.00");
    assert_eq!(view.rows[1].cells[1], "Blue Loom");
    assert_eq!(view.rows[1].cells[5], "—");

    let labels: Vec<&str> = panel
        .fk_options()
        .options("vendor_id")
        .iter()
        .map(|o| o.label.as_str())
        .collect();
    assert_eq!(labels, ["Acme Denim", "Blue Loom"]);
}

#[tokio::test]
async fn test_product_created_through_panel() {
    let registry = builtin_registry().unwrap();
    let store = store_for(&registry).await;
    let mut panel = Panel::new(registry.find("products").unwrap(), store.clone());
    panel.mount().await;

    panel.open_create();
    panel.set_field("vendor_id", "v-acme").unwrap();
    panel.set_field("name", "Canvas Tote").unwrap();
    panel.set_field("msrp", "12.50").unwrap();
    panel.set_field("search_tags", "bag, canvas").unwrap();

    let row = assert_ok!(panel.submit().await);
    assert_eq!(row.value("msrp"), &Value::Float(12.5));
    assert_eq!(row.value("currency"), &Value::from("USD"));
    assert_eq!(
        row.value("search_tags"),
        &Value::List(vec!["bag".into(), "canvas".into()])
    );
    assert_eq!(row.lookup("vendors.name"), Some(&Value::from("Acme Denim")));

    let view = panel.list_view();
    assert_eq!(view.rows[0].cells[0], "Canvas Tote");
    assert_eq!(view.rows[0].cells[1], "Acme Denim");
    assert_eq!(view.rows[0].cells[5], "$12.50");
    assert_eq!(store.call_count("products", StoreOp::Insert).await, 1);
}

#[tokio::test]
async fn test_wardrobe_item_requires_a_wardrobe() {
    let registry = builtin_registry().unwrap();
    let store = store_for(&registry).await;
    let mut panel = Panel::new(registry.find("wardrobe items").unwrap(), store.clone());
    panel.mount().await;
    assert_eq!(panel.empty_message().as_deref(), Some("No wardrobe items yet."));

    panel.open_create();
    let view = panel.form_view().unwrap();
    assert_eq!(view.submit_label, "Create");
    assert!(view.controls[0].required);

    let err = panel.submit().await.unwrap_err();
    assert_eq!(err.to_string(), "Wardrobe is required");
    assert_eq!(store.call_count("wardrobe_items", StoreOp::Insert).await, 0);
}
