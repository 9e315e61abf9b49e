use entity_console::{EntitySchema, FieldDescriptor, Record, RecordSet};

fn schema() -> EntitySchema {
    EntitySchema::builder("Personas", "personas")
        .field(FieldDescriptor::text("display_name", "Display Name").required())
        .field(FieldDescriptor::text("hair_color", "Hair Color"))
        .field(FieldDescriptor::number("height", "Height"))
        .field(FieldDescriptor::long_text("notes", "Notes"))
        .search_keys(["display_name", "hair_color", "height"])
        .build()
        .unwrap()
}

fn rows() -> RecordSet {
    RecordSet::new(vec![
        Record::new()
            .with("id", "pe-1")
            .with("display_name", "Ada Lovelace")
            .with("hair_color", "Auburn")
            .with("height", 168i64)
            .with("notes", "prefers linen"),
        Record::new()
            .with("id", "pe-2")
            .with("display_name", "June Park")
            .with("height", 154.5),
        Record::new().with("id", "pe-3").with("display_name", "Bo"),
    ])
}

#[test]
fn test_every_substring_of_a_search_key_matches() {
    let schema = schema();
    let set = rows();
    for row in set.rows() {
        for key in schema.search_keys() {
            let text = row.value(key).search_text();
            let chars: Vec<char> = text.chars().collect();
            for start in 0..chars.len() {
                for end in start + 1..=chars.len() {
                    let query: String = chars[start..end].iter().collect();
                    for query in [query.to_uppercase(), query.to_lowercase()] {
                        let hits = set.filter(&schema, &query);
                        assert!(
                            hits.iter().any(|hit| hit.id() == row.id()),
                            "{:?} should match {:?}",
                            query,
                            row.id()
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn test_empty_query_returns_everything_in_order() {
    let schema = schema();
    let set = rows();
    let all: Vec<&Record> = set.filter(&schema, "");
    let expected: Vec<&Record> = set.rows().iter().collect();
    assert_eq!(all, expected);
}

#[test]
fn test_only_search_keys_are_scanned() {
    let schema = schema();
    let set = rows();
    assert!(set.filter(&schema, "linen").is_empty());
    assert_eq!(set.filter(&schema, "154.5").len(), 1);
    assert!(set.filter(&schema, "zzz").is_empty());
}
