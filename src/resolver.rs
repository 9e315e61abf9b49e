//! Candidate values for foreign-key fields.
//!
//! Option sets are fetched once when a panel mounts and again only on an
//! explicit refresh; edits to the referenced collection elsewhere are not
//! observed in between.

use std::collections::HashMap;

use futures::future::join_all;
use log::{debug, warn};

use crate::core::{PanelError, Record, StoreResult, Value};
use crate::schema::{EntitySchema, Reference, SelectOption};
use crate::storage::{FetchQuery, Projection, SortOrder, Store};

/// Resolved `(value, label)` pairs per foreign-key field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FkOptions {
    sets: HashMap<String, Vec<SelectOption>>,
}

impl FkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a field; empty when resolution failed or never ran.
    pub fn options(&self, field: &str) -> &[SelectOption] {
        self.sets.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_resolved(&self, field: &str) -> bool {
        self.sets.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, options: Vec<SelectOption>) {
        self.sets.insert(field.into(), options);
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Outcome of resolving every foreign-key field of a schema. Failures are
/// per field; the other sets are still populated.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub options: FkOptions,
    pub failures: Vec<PanelError>,
}

/// Resolves all foreign-key fields of `schema` concurrently.
pub async fn resolve_all(store: &dyn Store, schema: &EntitySchema) -> Resolution {
    let lookups = schema.references().map(|(field, reference)| async move {
        (field.key.clone(), resolve_reference(store, reference).await)
    });

    let mut resolution = Resolution::default();
    for (field, outcome) in join_all(lookups).await {
        match outcome {
            Ok(options) => {
                debug!(
                    "resolved {} options for '{}.{}'",
                    options.len(),
                    schema.collection(),
                    field
                );
                resolution.options.insert(field, options);
            }
            Err(source) => {
                warn!(
                    "option lookup failed: entity='{}' field='{}' error='{}'",
                    schema.title(),
                    field,
                    source
                );
                resolution
                    .failures
                    .push(PanelError::Resolution { field, source });
            }
        }
    }
    resolution
}

/// Fetches `(value_key, label_key)` from the referenced collection.
pub async fn resolve_reference(
    store: &dyn Store,
    reference: &Reference,
) -> StoreResult<Vec<SelectOption>> {
    let mut query = FetchQuery::new().projection(Projection::only([
        reference.value_key.as_str(),
        reference.label_key.as_str(),
    ]));
    if let Some(column) = &reference.order_by {
        query = query.ordering(SortOrder::asc(column.as_str()));
    }

    let rows = store.fetch_all(&reference.table, &query).await?;
    Ok(rows
        .iter()
        .filter_map(|row| option_from_row(row, reference))
        .collect())
}

fn option_from_row(row: &Record, reference: &Reference) -> Option<SelectOption> {
    let value = row.value(&reference.value_key);
    if value.is_blank() {
        return None;
    }
    let value = value.search_text();
    let label = match row.value(&reference.label_key) {
        Value::Null => value.clone(),
        label => label.search_text(),
    };
    Some(SelectOption::new(value, label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_from_row() {
        let reference = Reference::new("vendors", "id", "name");
        let row = Record::new().with("id", "v-1").with("name", "Acme");
        assert_eq!(
            option_from_row(&row, &reference),
            Some(SelectOption::new("v-1", "Acme"))
        );

        let unnamed = Record::new().with("id", 9i64);
        assert_eq!(
            option_from_row(&unnamed, &reference),
            Some(SelectOption::new("9", "9"))
        );

        assert_eq!(option_from_row(&Record::new(), &reference), None);
    }

    #[test]
    fn test_missing_set_reads_as_empty() {
        let options = FkOptions::new();
        assert!(options.options("vendor_id").is_empty());
        assert!(!options.is_resolved("vendor_id"));
    }
}
