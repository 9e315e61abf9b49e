use anyhow::{Context, Result};
use entity_console::storage::{CollectionSpec, MemoryStore};
use entity_console::{EntitySchema, Record, SchemaRegistry};

/// Constraints a live database would enforce for `schema`: required fields
/// are NOT NULL and every reference is a foreign key.
pub fn collection_spec(schema: &EntitySchema) -> CollectionSpec {
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

/// An in-memory store with every registered collection and a few rows of
/// sample data.
pub async fn demo_store(registry: &SchemaRegistry) -> Result<MemoryStore> {
    let store = MemoryStore::new();
    for schema in registry.entities() {
        store
            .create_collection(schema.collection(), collection_spec(&schema))
            .await;
    }
    seed(&store).await?;
    Ok(store)
}

async fn seed(store: &MemoryStore) -> Result<()> {
    store
        .seed(
            "vendors",
            [
                Record::new()
                    .with("id", "v-acme")
                    .with("name", "Acme Denim")
                    .with("website_url", "https://acme.example")
                    .with("contact_name", "Rosa Lind")
                    .with("contact_email", "rosa@acme.example")
                    .with("wholesale", true),
                Record::new()
                    .with("id", "v-loom")
                    .with("name", "Blue Loom")
                    .with("contact_name", "Ito Kenji")
                    .with("wholesale", false),
            ],
        )
        .await
        .context("seeding vendors")?;

    store
        .seed(
            "products",
            [
                Record::new()
                    .with("id", "p-jean")
                    .with("vendor_id", "v-acme")
                    .with("name", "Straight Jean")
                    .with("category", "bottoms")
                    .with("target_gender", "unisex")
                    .with("base_color", "indigo")
                    .with("msrp", 98.0)
                    .with("currency", "USD")
                    .with("search_tags", vec!["denim".to_string(), "classic".to_string()]),
                Record::new()
                    .with("id", "p-shirt")
                    .with("vendor_id", "v-loom")
                    .with("name", "Linen Shirt")
                    .with("category", "tops")
                    .with("target_gender", "womens")
                    .with("base_color", "ecru")
                    .with("currency", "USD"),
            ],
        )
        .await
        .context("seeding products")?;

    store
        .seed(
            "product_variants",
            [Record::new()
                .with("id", "pv-jean-30")
                .with("product_id", "p-jean")
                .with("size_system", "us")
                .with("size_label", "30")
                .with("color", "indigo")
                .with("active", true)],
        )
        .await
        .context("seeding product variants")?;

    store
        .seed(
            "personas",
            [
                Record::new()
                    .with("id", "pe-ada")
                    .with("display_name", "Ada")
                    .with("coloring", "autumn")
                    .with("undertone", "warm")
                    .with("body_shape", "rectangle")
                    .with("style_keywords", vec!["minimal".to_string(), "utility".to_string()]),
                Record::new()
                    .with("id", "pe-june")
                    .with("display_name", "June")
                    .with("coloring", "unknown")
                    .with("undertone", "unknown"),
            ],
        )
        .await
        .context("seeding personas")?;

    store
        .seed(
            "wardrobes",
            [Record::new()
                .with("id", "w-ada")
                .with("persona_id", "pe-ada")
                .with("title", "Ada's everyday")
                .with("is_active", true)],
        )
        .await
        .context("seeding wardrobes")?;

    Ok(())
}
