use entity_console::form::{Draft, coerce, join_tags, render_form, split_tags};
use entity_console::{EntitySchema, FieldDescriptor, FkOptions, FormError, Record, Value};

fn tag_field() -> FieldDescriptor {
    FieldDescriptor::tags("style_tags", "Style Tags")
}

fn tags_of(value: Value) -> Vec<String> {
    match value {
        Value::List(items) => items,
        other => panic!("expected a tag list, got {:?}", other),
    }
}

#[test]
fn test_tag_rejoin_is_idempotent() {
    let inputs = [
        "linen, summer",
        " a ,, b,a ,",
        "",
        ",,,",
        "single",
        "  spaced   out  , tags ",
        "dup,dup,dup",
    ];
    for input in inputs {
        let first = tags_of(coerce(&tag_field(), Value::from(input)).unwrap());
        let rejoined = join_tags(&first);
        let second = tags_of(coerce(&tag_field(), Value::from(rejoined.as_str())).unwrap());
        assert_eq!(first, second, "input {:?}", input);
    }
}

#[test]
fn test_tags_keep_order_and_duplicates() {
    assert_eq!(split_tags(" b, a ,b,, "), ["b", "a", "b"]);
    let kept = coerce(&tag_field(), Value::List(vec!["x".into(), "y".into()])).unwrap();
    assert_eq!(kept, Value::List(vec!["x".into(), "y".into()]));
    assert_eq!(coerce(&tag_field(), Value::Null).unwrap(), Value::List(vec![]));
}

#[test]
fn test_number_and_currency_coercion() {
    let rating = FieldDescriptor::number("fit_rating", "Fit Rating (1-5)");
    let price = FieldDescriptor::currency("price", "Price");

    assert_eq!(coerce(&rating, Value::from("4")).unwrap(), Value::Integer(4));
    assert_eq!(coerce(&price, Value::from(" 12.50 ")).unwrap(), Value::Float(12.5));
    assert_eq!(coerce(&price, Value::from("")).unwrap(), Value::Null);
    assert_eq!(coerce(&price, Value::from("   ")).unwrap(), Value::Null);
    assert_eq!(coerce(&price, Value::Null).unwrap(), Value::Null);

    let err = coerce(&rating, Value::from("four")).unwrap_err();
    assert_eq!(
        err,
        FormError::NotANumber {
            field: "fit_rating".into(),
            label: "Fit Rating (1-5)".into(),
            input: "four".into()
        }
    );
}

#[test]
fn test_text_like_kinds_blank_to_null() {
    let date = FieldDescriptor::date("taken_on", "Taken On");
    assert_eq!(coerce(&date, Value::from("")).unwrap(), Value::Null);
    assert_eq!(
        coerce(&date, Value::from("2024-03-01")).unwrap(),
        Value::from("2024-03-01")
    );

    let notes = FieldDescriptor::long_text("notes", "Notes");
    assert_eq!(coerce(&notes, Value::from("")).unwrap(), Value::Null);
    assert_eq!(coerce(&notes, Value::from(" x ")).unwrap(), Value::from(" x "));
}

#[test]
fn test_boolean_truthiness() {
    let flag = FieldDescriptor::boolean("active", "Active");
    assert_eq!(coerce(&flag, Value::Null).unwrap(), Value::Boolean(false));
    assert_eq!(coerce(&flag, Value::from("")).unwrap(), Value::Boolean(false));
    assert_eq!(coerce(&flag, Value::Integer(0)).unwrap(), Value::Boolean(false));
    assert_eq!(coerce(&flag, Value::from("on")).unwrap(), Value::Boolean(true));
    assert_eq!(coerce(&flag, Value::Integer(2)).unwrap(), Value::Boolean(true));
}

fn wardrobe_schema() -> EntitySchema {
    EntitySchema::builder("Wardrobe Items", "wardrobe_items")
        .field(FieldDescriptor::text("condition", "Condition"))
        .field(FieldDescriptor::select("status", "Status", entity_console::SelectOption::from_values(&["owned", "wishlist"])).default_value("owned"))
        .field(FieldDescriptor::text("currency", "Currency").default_value("USD"))
        .field(FieldDescriptor::tags("style_tags", "Style Tags"))
        .field(FieldDescriptor::currency("purchase_price", "Purchase Price"))
        .before_save(|mut payload, is_update| {
            if !is_update {
                payload.set("source", "console");
            }
            payload
        })
        .build()
        .unwrap()
}

#[test]
fn test_untouched_defaults_are_persisted() {
    let schema = wardrobe_schema();
    let draft = Draft::new(&schema);
    let payload = draft.build_payload(&schema).unwrap();

    assert_eq!(payload.value("status"), &Value::from("owned"));
    assert_eq!(payload.value("currency"), &Value::from("USD"));
    assert_eq!(payload.value("condition"), &Value::Null);
    assert_eq!(payload.value("style_tags"), &Value::List(vec![]));
    assert_eq!(payload.value("source"), &Value::from("console"));
    assert!(!payload.contains("id"));
}

#[test]
fn test_edit_draft_is_seeded_from_record() {
    let schema = wardrobe_schema();
    let record = Record::new()
        .with("id", "wi-1")
        .with("condition", "worn")
        .with("style_tags", vec!["boho".to_string()])
        .with("purchase_price", 40i64);
    let mut draft = Draft::from_record(&schema, &record);
    assert!(draft.is_update());
    assert_eq!(draft.get("status"), Some(&Value::from("owned")));

    draft.set("style_tags", "boho, festival").unwrap();
    let payload = draft.build_payload(&schema).unwrap();
    assert_eq!(
        payload.value("style_tags"),
        &Value::List(vec!["boho".into(), "festival".into()])
    );
    assert_eq!(payload.value("purchase_price"), &Value::Integer(40));
    assert!(!payload.contains("source"));
    assert!(!payload.contains("id"));

    let view = render_form(&schema, &draft, &FkOptions::new(), false);
    assert_eq!(view.submit_label, "Update");
    assert_eq!(view.controls.len(), 5);
    assert_eq!(view.controls[3].label, "Style Tags (comma separated)");
}
