use entity_console::{
    EntitySchema, FieldDescriptor, Reference, SchemaError, SchemaRegistry, SelectOption,
};
use tokio_test::{assert_err, assert_ok};

fn vendors() -> EntitySchema {
    EntitySchema::builder("Vendors", "vendors")
        .field(FieldDescriptor::text("name", "Name").required())
        .build()
        .unwrap()
}

#[test]
fn test_declarations_are_checked_at_build_time() {
    let err = assert_err!(
        EntitySchema::builder("Vendors", "vendors")
            .field(FieldDescriptor::text("name", "Name"))
            .field(FieldDescriptor::text("name", "Name again"))
            .build()
    );
    assert_eq!(
        err,
        SchemaError::DuplicateField {
            entity: "Vendors".into(),
            field: "name".into()
        }
    );

    let err = assert_err!(
        EntitySchema::builder("Vendors", "vendors")
            .field(FieldDescriptor::text("name", "Name"))
            .search_keys(["email"])
            .build()
    );
    assert_eq!(err.to_string(), "Search key 'email' in 'Vendors' is not a declared field");

    let err = assert_err!(
        EntitySchema::builder("Products", "products")
            .field(FieldDescriptor::select("gender", "Gender", Vec::<SelectOption>::new()))
            .build()
    );
    assert!(matches!(err, SchemaError::MissingOptions { .. }));

    let err = assert_err!(
        EntitySchema::builder("Products", "products")
            .field(FieldDescriptor::reference(
                "vendor_id",
                "Vendor",
                Reference::new("vendors", "id", ""),
            ))
            .build()
    );
    assert_eq!(
        err.to_string(),
        "Reference field 'vendor_id' in 'Products' is incomplete: missing label key"
    );

    assert_err!(EntitySchema::builder("Empty", "empty").build());
}

#[test]
fn test_registering_twice_is_rejected() {
    let registry = assert_ok!(SchemaRegistry::new().with_entity(vendors()));
    let err = assert_err!(registry.clone().with_entity(vendors()));
    assert_eq!(err, SchemaError::DuplicateEntity("vendors".into()));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_registry_is_copy_on_write() {
    let original = SchemaRegistry::new().with_entity(vendors()).unwrap();
    let personas = EntitySchema::builder("Personas", "personas")
        .field(FieldDescriptor::text("display_name", "Display Name").required())
        .build()
        .unwrap();
    let extended = original.clone().with_entity(personas).unwrap();

    assert_eq!(original.len(), 1);
    assert_eq!(extended.len(), 2);
    assert!(original.find("personas").is_none());
    assert!(extended.find("Personas").is_some());
}

#[test]
fn test_defaults_for_search_and_list_columns() {
    let schema = EntitySchema::builder("Vendors", "vendors")
        .field(FieldDescriptor::text("name", "Name"))
        .field(FieldDescriptor::long_text("notes", "Notes").hidden_in_list())
        .build()
        .unwrap();
    assert_eq!(schema.search_keys(), ["name", "notes"]);
    assert_eq!(schema.list_columns(), ["name"]);
    assert_eq!(schema.singular_noun(), "vendor");
}
