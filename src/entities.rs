//! The collections the styling console manages.

use crate::core::{Record, SchemaError, Value};
use crate::list::EMPTY_CELL;
use crate::schema::{EntitySchema, FieldDescriptor, Reference, SchemaRegistry, SelectOption};

pub const TARGET_GENDERS: &[&str] = &["womens", "mens", "unisex", "kids", "unknown"];
pub const COLORING_PALETTES: &[&str] = &["spring", "summer", "autumn", "winter", "neutral", "unknown"];
pub const SKIN_UNDERTONES: &[&str] = &["cool", "warm", "neutral", "unknown"];
pub const ITEM_STATUS: &[&str] = &["owned", "wishlist", "donated", "returned", "tailor", "archived"];
pub const SIZE_SYSTEMS: &[&str] = &["us", "uk", "eu", "jp", "alpha", "custom"];
pub const MEDIA_KINDS: &[&str] = &["image", "video", "url"];

/// Registers every built-in entity. Fails on the first invalid declaration.
pub fn builtin_registry() -> Result<SchemaRegistry, SchemaError> {
    let mut registry = SchemaRegistry::new();
    for schema in builtin_schemas()? {
        registry.register(schema)?;
    }
    Ok(registry)
}

pub fn builtin_schemas() -> Result<Vec<EntitySchema>, SchemaError> {
    Ok(vec![
        vendors()?,
        products()?,
        personas()?,
        outfits()?,
        wardrobe_items()?,
        persona_measurements()?,
        persona_preferences()?,
        product_variants()?,
        inventory()?,
        media_assets()?,
        wardrobes()?,
        outfit_items()?,
    ])
}

pub fn vendors() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder("Vendors", "vendors")
        .subtitle("Brands, boutiques, suppliers")
        .order_by("name", true)
        .fields([
            FieldDescriptor::text("name", "Name").required(),
            FieldDescriptor::text("website_url", "Website"),
            FieldDescriptor::text("contact_name", "Contact Name"),
            FieldDescriptor::text("contact_email", "Contact Email"),
            FieldDescriptor::text("contact_phone", "Contact Phone"),
            FieldDescriptor::boolean("wholesale", "Wholesale").default_value(false),
            FieldDescriptor::long_text("notes", "Notes").hidden_in_list(),
        ])
        .search_keys(["name", "contact_name", "contact_email", "website_url"])
        .list_columns(["name", "website_url", "contact_name", "wholesale"])
        .build()
}

pub fn products() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder("Products", "products")
        .subtitle("Create and update product styles (variants managed elsewhere)")
        .projection("*, vendors(name)")
        .order_by("created_at", false)
        .limit(200)
        .fields([
            vendor_ref().required().list_format(embedded_label("vendors.name")),
            FieldDescriptor::text("name", "Product Name").required(),
            FieldDescriptor::text("category", "Category"),
            FieldDescriptor::text("subcategory", "Subcategory"),
            FieldDescriptor::select("target_gender", "Target Gender", SelectOption::from_values(TARGET_GENDERS)),
            FieldDescriptor::text("base_color", "Base Color"),
            FieldDescriptor::text("material", "Material"),
            FieldDescriptor::text("care", "Care"),
            FieldDescriptor::currency("msrp", "MSRP").list_format(money),
            currency_code(),
            FieldDescriptor::text("external_handle", "External Handle"),
            FieldDescriptor::tags("search_tags", "Search Tags").hidden_in_list(),
            FieldDescriptor::long_text("description", "Description").hidden_in_list(),
        ])
        .search_keys(["name", "category", "subcategory", "base_color"])
        .list_columns(["name", "vendor_id", "category", "target_gender", "base_color", "msrp"])
        .build()
}

pub fn personas() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder("Personas", "personas")
        .subtitle("Clients you style")
        .order_by("display_name", true)
        .fields([
            FieldDescriptor::text("user_id", "User ID").hidden_in_list(),
            FieldDescriptor::text("display_name", "Display Name").required(),
            FieldDescriptor::date("birth_date", "Birth Date"),
            FieldDescriptor::select("coloring", "Coloring", SelectOption::from_values(COLORING_PALETTES))
                .default_value("unknown"),
            FieldDescriptor::select("undertone", "Undertone", SelectOption::from_values(SKIN_UNDERTONES))
                .default_value("unknown"),
            FieldDescriptor::text("eye_color", "Eye Color"),
            FieldDescriptor::text("hair_color", "Hair Color"),
            FieldDescriptor::text("skin_tone", "Skin Tone"),
            FieldDescriptor::text("body_shape", "Body Shape"),
            FieldDescriptor::tags("style_keywords", "Style Keywords"),
            FieldDescriptor::tags("brand_prefs", "Brand Preferences"),
            FieldDescriptor::long_text("notes", "Notes").hidden_in_list(),
        ])
        .search_keys(["display_name", "eye_color", "hair_color", "skin_tone", "body_shape"])
        .list_columns(["display_name", "coloring", "undertone", "body_shape"])
        .build()
}

pub fn outfits() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder("Outfits", "outfits")
        .subtitle("Compose looks for a persona (attach wardrobe items separately)")
        .projection("*, personas(display_name)")
        .order_by("created_at", false)
        .limit(200)
        .fields([
            persona_ref(),
            FieldDescriptor::text("title", "Title").required(),
            FieldDescriptor::long_text("notes", "Notes").hidden_in_list(),
        ])
        .search_keys(["title"])
        .list_columns(["title", "persona_id"])
        .build()
}

pub fn wardrobe_items() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder("Wardrobe Items", "wardrobe_items")
        .subtitle("Individual items in wardrobes")
        .projection("*, wardrobes(title), products(name), product_variants(size_label, color)")
        .order_by("created_at", false)
        .limit(200)
        .fields([
            FieldDescriptor::reference(
                "wardrobe_id",
                "Wardrobe",
                Reference::new("wardrobes", "id", "title").order_by("title"),
            )
            .required()
            .list_format(embedded_label("wardrobes.title")),
            product_ref(),
            variant_ref(),
            FieldDescriptor::select("status", "Status", SelectOption::from_values(ITEM_STATUS))
                .default_value("owned"),
            FieldDescriptor::date("acquired_on", "Acquired On"),
            FieldDescriptor::currency("purchase_price", "Purchase Price").list_format(money),
            currency_code(),
            FieldDescriptor::text("condition", "Condition"),
            FieldDescriptor::number("fit_rating", "Fit Rating (1-5)"),
            FieldDescriptor::long_text("tailor_notes", "Tailor Notes").hidden_in_list(),
            FieldDescriptor::tags("style_tags", "Style Tags"),
            FieldDescriptor::long_text("notes", "Notes").hidden_in_list(),
        ])
        .search_keys(["style_tags", "notes", "condition"])
        .list_columns(["wardrobe_id", "product_id", "variant_id", "status", "purchase_price", "fit_rating"])
        .build()
}

pub fn persona_measurements() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder("Persona Measurements", "persona_measurements")
        .subtitle("Measurements for personas")
        .projection("*, personas(display_name)")
        .order_by("name", true)
        .fields([
            persona_ref(),
            FieldDescriptor::text("name", "Measurement Name").required(),
            FieldDescriptor::number("value_cm", "Value (cm)").required(),
            FieldDescriptor::date("taken_on", "Taken On"),
            FieldDescriptor::long_text("notes", "Notes").hidden_in_list(),
        ])
        .search_keys(["name"])
        .list_columns(["persona_id", "name", "value_cm", "taken_on"])
        .build()
}

pub fn persona_preferences() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder("Persona Preferences", "persona_preferences")
        .subtitle("Preferences for personas")
        .projection("*, personas(display_name)")
        .order_by("priority", false)
        .fields([
            persona_ref(),
            FieldDescriptor::text("pref_key", "Preference Key").required(),
            FieldDescriptor::long_text("pref_value", "Preference Value (JSON)").required(),
            FieldDescriptor::number("priority", "Priority").default_value(0i64),
        ])
        .search_keys(["pref_key"])
        .list_columns(["persona_id", "pref_key", "priority"])
        .build()
}

pub fn product_variants() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder("Product Variants", "product_variants")
        .subtitle("Size/color variations of products")
        .projection("*, products(name)")
        .order_by("created_at", false)
        .limit(200)
        .fields([
            product_ref().required(),
            FieldDescriptor::text("sku", "SKU"),
            FieldDescriptor::text("barcode", "Barcode"),
            FieldDescriptor::select("size_system", "Size System", SelectOption::from_values(SIZE_SYSTEMS))
                .default_value("custom"),
            FieldDescriptor::text("size_label", "Size Label"),
            FieldDescriptor::number("numeric_size", "Numeric Size"),
            FieldDescriptor::text("color", "Color"),
            FieldDescriptor::text("length_label", "Length Label"),
            FieldDescriptor::text("rise_label", "Rise Label"),
            FieldDescriptor::long_text("fit_notes", "Fit Notes").hidden_in_list(),
            FieldDescriptor::boolean("active", "Active").default_value(true),
        ])
        .search_keys(["sku", "barcode", "size_label", "color"])
        .list_columns(["product_id", "sku", "size_label", "color", "active"])
        .build()
}

pub fn inventory() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder("Inventory", "inventory")
        .subtitle("Stock levels and pricing")
        .projection("*, product_variants(size_label, color), vendors(name)")
        .order_by("last_synced_at", false)
        .limit(200)
        .fields([
            variant_ref().required(),
            vendor_ref().list_format(embedded_label("vendors.name")),
            FieldDescriptor::number("quantity_on_hand", "Quantity On Hand")
                .required()
                .default_value(0i64),
            FieldDescriptor::currency("cost", "Cost").list_format(money),
            FieldDescriptor::currency("price", "Price").list_format(money),
            currency_code(),
            FieldDescriptor::text("location", "Location"),
            FieldDescriptor::text("last_synced_at", "Last Synced").hidden_in_list(),
        ])
        .search_keys(["location"])
        .list_columns(["variant_id", "vendor_id", "quantity_on_hand", "cost", "price", "location"])
        .build()
}

pub fn media_assets() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder("Media Assets", "media_assets")
        .subtitle("Images, videos, and links for products")
        .projection("*, products(name), product_variants(size_label, color)")
        .order_by("position", true)
        .fields([
            product_ref(),
            variant_ref(),
            FieldDescriptor::select("kind", "Media Type", SelectOption::from_values(MEDIA_KINDS))
                .required()
                .default_value("image"),
            FieldDescriptor::text("url", "URL").required(),
            FieldDescriptor::text("alt", "Alt Text"),
            FieldDescriptor::boolean("is_primary", "Is Primary").default_value(false),
            FieldDescriptor::number("position", "Position").default_value(0i64),
        ])
        .search_keys(["url", "alt"])
        .list_columns(["product_id", "variant_id", "kind", "url", "is_primary", "position"])
        .build()
}

pub fn wardrobes() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder("Wardrobes", "wardrobes")
        .subtitle("Collections of items for personas")
        .projection("*, personas(display_name)")
        .order_by("title", true)
        .fields([
            persona_ref(),
            FieldDescriptor::text("title", "Title").required(),
            FieldDescriptor::boolean("is_active", "Is Active").default_value(true),
            FieldDescriptor::long_text("notes", "Notes").hidden_in_list(),
        ])
        .search_keys(["title"])
        .list_columns(["persona_id", "title", "is_active"])
        .build()
}

pub fn outfit_items() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder("Outfit Items", "outfit_items")
        .subtitle("Items within outfits")
        .projection("*, outfits(title), wardrobe_items(id)")
        .order_by("position", true)
        .fields([
            FieldDescriptor::reference(
                "outfit_id",
                "Outfit",
                Reference::new("outfits", "id", "title").order_by("title"),
            )
            .required()
            .list_format(embedded_label("outfits.title")),
            FieldDescriptor::reference(
                "wardrobe_item_id",
                "Wardrobe Item",
                Reference::new("wardrobe_items", "id", "id").order_by("created_at"),
            )
            .required()
            .list_format(embedded_label("wardrobe_items.id")),
            FieldDescriptor::text("role", "Role"),
            FieldDescriptor::number("position", "Position").default_value(0i64),
        ])
        .search_keys(["role"])
        .list_columns(["outfit_id", "wardrobe_item_id", "role", "position"])
        .build()
}

fn vendor_ref() -> FieldDescriptor {
    FieldDescriptor::reference(
        "vendor_id",
        "Vendor",
        Reference::new("vendors", "id", "name").order_by("name"),
    )
}

fn persona_ref() -> FieldDescriptor {
    FieldDescriptor::reference(
        "persona_id",
        "Persona",
        Reference::new("personas", "id", "display_name").order_by("display_name"),
    )
    .required()
    .list_format(embedded_label("personas.display_name"))
}

fn product_ref() -> FieldDescriptor {
    FieldDescriptor::reference(
        "product_id",
        "Product",
        Reference::new("products", "id", "name").order_by("name"),
    )
    .list_format(embedded_label("products.name"))
}

fn variant_ref() -> FieldDescriptor {
    FieldDescriptor::reference(
        "variant_id",
        "Product Variant",
        Reference::new("product_variants", "id", "size_label").order_by("size_label"),
    )
    .list_format(variant_label)
}

fn currency_code() -> FieldDescriptor {
    FieldDescriptor::text("currency", "Currency").default_value("USD")
}

/// Shows the embedded related label at `path`, falling back to the raw key.
pub fn embedded_label(path: &'static str) -> impl Fn(&Value, &Record) -> String + Send + Sync + 'static {
    move |raw, row| match row.lookup(path) {
        Some(label) if !label.is_blank() => label.search_text(),
        _ => plain(raw),
    }
}

/// `M / navy` from an embedded variant, else the raw key.
pub fn variant_label(raw: &Value, row: &Record) -> String {
    let parts: Vec<String> = ["product_variants.size_label", "product_variants.color"]
        .iter()
        .filter_map(|path| row.lookup(path))
        .filter(|value| !value.is_blank())
        .map(Value::search_text)
        .collect();
    if parts.is_empty() {
        plain(raw)
    } else {
        parts.join(" / ")
    }
}

/// `$12.50`; non-numeric text is shown as stored.
pub fn money(raw: &Value, _row: &Record) -> String {
    match raw.as_f64() {
        Some(amount) => format!("${:.2}", amount),
        None => plain(raw),
    }
}

fn plain(raw: &Value) -> String {
    if raw.is_blank() {
        EMPTY_CELL.to_string()
    } else {
        raw.search_text()
    }
}
