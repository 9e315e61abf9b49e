use log::debug;

use crate::core::{Record, RecordId, StoreResult};
use crate::schema::EntitySchema;
use crate::storage::Store;

/// The page of rows a panel currently shows, in server order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    rows: Vec<Record>,
}

impl RecordSet {
    pub fn new(rows: Vec<Record>) -> Self {
        Self { rows }
    }

    /// Fetches the entity's page and returns it as a fresh set.
    pub async fn load(store: &dyn Store, schema: &EntitySchema) -> StoreResult<Self> {
        let rows = store
            .fetch_all(schema.collection(), &schema.fetch_query())
            .await?;
        debug!("loaded {} rows from '{}'", rows.len(), schema.collection());
        Ok(Self::new(rows))
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.rows.iter().find(|row| row.id().as_ref() == Some(id))
    }

    /// Replaces the whole set; loads never merge.
    pub fn replace_all(&mut self, rows: Vec<Record>) {
        self.rows = rows;
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// New rows go first, the way a freshly created row shows up on top.
    pub fn prepend(&mut self, row: Record) {
        self.rows.insert(0, row);
    }

    /// Swaps the row with the same id in place. Returns `false` when no row
    /// matched.
    pub fn replace(&mut self, row: Record) -> bool {
        let Some(id) = row.id() else {
            return false;
        };
        match self.rows.iter_mut().find(|r| r.id().as_ref() == Some(&id)) {
            Some(slot) => {
                *slot = row;
                true
            }
            None => false,
        }
    }

    /// Drops the row carrying `id`, leaving every other row untouched.
    pub fn remove(&mut self, id: &RecordId) -> Option<Record> {
        let idx = self.rows.iter().position(|r| r.id().as_ref() == Some(id))?;
        Some(self.rows.remove(idx))
    }

    /// Rows matching `query`, in loaded order. Matching is a case-insensitive
    /// substring test over the schema's search keys; the empty query matches
    /// everything. Purely local, never touches the store.
    pub fn filter<'a>(&'a self, schema: &EntitySchema, query: &str) -> Vec<&'a Record> {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return self.rows.iter().collect();
        }
        self.rows
            .iter()
            .filter(|row| matches_query(row, schema.search_keys(), &needle))
            .collect()
    }
}

fn matches_query(row: &Record, keys: &[String], needle: &str) -> bool {
    keys.iter()
        .any(|key| row.value(key).search_text().to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::schema::FieldDescriptor;

    fn schema() -> EntitySchema {
        EntitySchema::builder("Vendors", "vendors")
            .field(FieldDescriptor::text("name", "Name"))
            .field(FieldDescriptor::number("rank", "Rank"))
            .field(FieldDescriptor::text("notes", "Notes"))
            .search_keys(["name", "rank"])
            .build()
            .unwrap()
    }

    fn rows() -> RecordSet {
        RecordSet::new(vec![
            Record::new().with("id", "1").with("name", "Acme Denim").with("rank", 3i64),
            Record::new().with("id", "2").with("name", "Blue Loom").with("notes", "acme partner"),
            Record::new().with("id", "3").with("rank", 42i64),
        ])
    }

    #[test]
    fn test_filter_is_case_insensitive_and_ordered() {
        let set = rows();
        let hits = set.filter(&schema(), "ACME");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].value("id"), &Value::from("1"));

        let all = set.filter(&schema(), "");
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_filter_stringifies_numbers_and_skips_nulls() {
        let set = rows();
        let hits = set.filter(&schema(), "42");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id(), Some(RecordId::new("3")));
    }

    #[test]
    fn test_replace_and_remove() {
        let mut set = rows();
        assert!(set.replace(Record::new().with("id", "2").with("name", "Loom")));
        assert_eq!(set.rows()[1].value("name"), &Value::from("Loom"));
        assert!(!set.replace(Record::new().with("id", "9")));

        let removed = set.remove(&RecordId::new("1")).unwrap();
        assert_eq!(removed.value("name"), &Value::from("Acme Denim"));
        assert_eq!(set.len(), 2);
        assert!(set.remove(&RecordId::new("1")).is_none());
    }
}
