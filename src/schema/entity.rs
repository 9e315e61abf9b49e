use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::field::{FieldDescriptor, FieldKind, Reference};
use crate::core::{Record, SchemaError};
use crate::storage::{FetchQuery, Projection, SortOrder};

type BeforeSaveFn = dyn Fn(Record, bool) -> Record + Send + Sync;
type RowTitleFn = dyn Fn(&Record) -> String + Send + Sync;

/// Last transform applied to a payload before it is persisted:
/// `(payload, is_update) -> payload`.
#[derive(Clone)]
pub struct BeforeSave(Arc<BeforeSaveFn>);

impl BeforeSave {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Record, bool) -> Record + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn apply(&self, payload: Record, is_update: bool) -> Record {
        (self.0)(payload, is_update)
    }
}

impl fmt::Debug for BeforeSave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BeforeSave(..)")
    }
}

/// Caption shown for a row in the list.
#[derive(Clone)]
pub struct RowTitle(Arc<RowTitleFn>);

impl RowTitle {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Record) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn title(&self, row: &Record) -> String {
        (self.0)(row)
    }
}

impl fmt::Debug for RowTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RowTitle(..)")
    }
}

/// One manageable collection. Only obtainable through
/// [`EntitySchemaBuilder::build`], so every instance has passed validation.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    title: String,
    subtitle: Option<String>,
    collection: String,
    projection: Option<Projection>,
    ordering: Option<SortOrder>,
    page_limit: Option<usize>,
    fields: Vec<FieldDescriptor>,
    search_keys: Vec<String>,
    list_columns: Vec<String>,
    before_save: Option<BeforeSave>,
    row_title: Option<RowTitle>,
}

impl EntitySchema {
    pub fn builder(title: impl Into<String>, collection: impl Into<String>) -> EntitySchemaBuilder {
        EntitySchemaBuilder::new(title, collection)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Read projection; writes always target the bare collection.
    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    pub fn ordering(&self) -> Option<&SortOrder> {
        self.ordering.as_ref()
    }

    pub fn page_limit(&self) -> Option<usize> {
        self.page_limit
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn search_keys(&self) -> &[String] {
        &self.search_keys
    }

    pub fn list_columns(&self) -> &[String] {
        &self.list_columns
    }

    pub fn before_save(&self) -> Option<&BeforeSave> {
        self.before_save.as_ref()
    }

    pub fn row_title(&self) -> Option<&RowTitle> {
        self.row_title.as_ref()
    }

    /// Foreign-key fields with their reference, in declaration order.
    pub fn references(&self) -> impl Iterator<Item = (&FieldDescriptor, &Reference)> {
        self.fields
            .iter()
            .filter_map(|f| f.kind.reference().map(|r| (f, r)))
    }

    /// The read the record loader issues for this entity.
    pub fn fetch_query(&self) -> FetchQuery {
        FetchQuery {
            projection: self.projection.clone(),
            ordering: self.ordering.clone(),
            limit: self.page_limit,
        }
    }

    /// "Vendors" -> "vendor", used in confirmation prompts.
    pub fn singular_noun(&self) -> String {
        let title = self.title.strip_suffix('s').unwrap_or(&self.title);
        title.to_lowercase()
    }

    /// Checks the declaration is internally consistent.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.title.trim().is_empty() {
            return Err(SchemaError::EmptyTitle);
        }
        if self.collection.trim().is_empty() {
            return Err(SchemaError::EmptyCollection(self.title.clone()));
        }
        if self.fields.is_empty() {
            return Err(SchemaError::NoFields(self.title.clone()));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.key.trim().is_empty() {
                return Err(SchemaError::EmptyFieldKey(self.title.clone()));
            }
            if !seen.insert(field.key.as_str()) {
                return Err(SchemaError::DuplicateField {
                    entity: self.title.clone(),
                    field: field.key.clone(),
                });
            }
            self.validate_kind(field)?;
        }

        for key in &self.search_keys {
            if !seen.contains(key.as_str()) {
                return Err(SchemaError::UnknownSearchKey {
                    entity: self.title.clone(),
                    key: key.clone(),
                });
            }
        }
        for key in &self.list_columns {
            if !seen.contains(key.as_str()) {
                return Err(SchemaError::UnknownListColumn {
                    entity: self.title.clone(),
                    key: key.clone(),
                });
            }
        }
        Ok(())
    }

    fn validate_kind(&self, field: &FieldDescriptor) -> Result<(), SchemaError> {
        match &field.kind {
            FieldKind::SingleSelect { options } if options.is_empty() => {
                Err(SchemaError::MissingOptions {
                    entity: self.title.clone(),
                    field: field.key.clone(),
                })
            }
            FieldKind::ForeignKey(reference) => {
                let missing = [
                    ("table", &reference.table),
                    ("value key", &reference.value_key),
                    ("label key", &reference.label_key),
                ]
                .into_iter()
                .find(|(_, v)| v.trim().is_empty());
                match missing {
                    Some((what, _)) => Err(SchemaError::IncompleteReference {
                        entity: self.title.clone(),
                        field: field.key.clone(),
                        detail: format!("missing {}", what),
                    }),
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }
}

/// Collects an entity declaration and validates it in [`build`](Self::build).
#[derive(Debug)]
pub struct EntitySchemaBuilder {
    title: String,
    subtitle: Option<String>,
    collection: String,
    projection: Option<String>,
    ordering: Option<SortOrder>,
    page_limit: Option<usize>,
    fields: Vec<FieldDescriptor>,
    search_keys: Vec<String>,
    list_columns: Vec<String>,
    before_save: Option<BeforeSave>,
    row_title: Option<RowTitle>,
}

impl EntitySchemaBuilder {
    pub fn new(title: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            collection: collection.into(),
            projection: None,
            ordering: None,
            page_limit: None,
            fields: Vec::new(),
            search_keys: Vec::new(),
            list_columns: Vec::new(),
            before_save: None,
            row_title: None,
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Join/selection clause for reads, e.g. `"*, vendors(name)"`.
    pub fn projection(mut self, clause: impl Into<String>) -> Self {
        self.projection = Some(clause.into());
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.ordering = Some(SortOrder {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.page_limit = Some(limit);
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn search_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn list_columns<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.list_columns = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn before_save<F>(mut self, f: F) -> Self
    where
        F: Fn(Record, bool) -> Record + Send + Sync + 'static,
    {
        self.before_save = Some(BeforeSave::new(f));
        self
    }

    pub fn row_title<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record) -> String + Send + Sync + 'static,
    {
        self.row_title = Some(RowTitle::new(f));
        self
    }

    pub fn build(self) -> Result<EntitySchema, SchemaError> {
        let projection = match self.projection {
            Some(clause) => Some(Projection::parse(&clause).map_err(|e| {
                SchemaError::InvalidProjection {
                    entity: self.title.clone(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        let search_keys = if self.search_keys.is_empty() {
            self.fields.iter().map(|f| f.key.clone()).collect()
        } else {
            self.search_keys
        };
        let list_columns = if self.list_columns.is_empty() {
            self.fields
                .iter()
                .filter(|f| !f.hidden_in_list)
                .map(|f| f.key.clone())
                .collect()
        } else {
            self.list_columns
        };

        let schema = EntitySchema {
            title: self.title,
            subtitle: self.subtitle,
            collection: self.collection,
            projection,
            ordering: self.ordering,
            page_limit: self.page_limit,
            fields: self.fields,
            search_keys,
            list_columns,
            before_save: self.before_save,
            row_title: self.row_title,
        };
        schema.validate()?;
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SelectOption;

    fn vendors() -> EntitySchemaBuilder {
        EntitySchema::builder("Vendors", "vendors")
            .field(FieldDescriptor::text("name", "Name").required())
            .field(FieldDescriptor::boolean("wholesale", "Wholesale"))
            .field(FieldDescriptor::long_text("notes", "Notes").hidden_in_list())
    }

    #[test]
    fn test_defaults_for_search_and_list() {
        let schema = vendors().build().unwrap();
        assert_eq!(schema.search_keys(), ["name", "wholesale", "notes"]);
        assert_eq!(schema.list_columns(), ["name", "wholesale"]);
        assert_eq!(schema.singular_noun(), "vendor");
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = vendors().search_keys(["name", "email"]).build().unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownSearchKey {
                entity: "Vendors".into(),
                key: "email".into()
            }
        );

        let err = vendors().list_columns(["website"]).build().unwrap_err();
        assert!(matches!(err, SchemaError::UnknownListColumn { .. }));
    }

    #[test]
    fn test_rejects_duplicate_fields() {
        let err = vendors()
            .field(FieldDescriptor::text("name", "Other Name"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { field, .. } if field == "name"));
    }

    #[test]
    fn test_rejects_incomplete_kind_metadata() {
        let err = vendors()
            .field(FieldDescriptor::select("tier", "Tier", vec![]))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingOptions { .. }));

        let err = vendors()
            .field(FieldDescriptor::reference(
                "owner_id",
                "Owner",
                Reference::new("people", "id", ""),
            ))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::IncompleteReference { detail, .. } if detail == "missing label key"));

        assert!(vendors()
            .field(FieldDescriptor::select("tier", "Tier", SelectOption::from_values(&["a"])))
            .build()
            .is_ok());
    }

    #[test]
    fn test_rejects_bad_projection() {
        let err = vendors().projection("*, vendors(name").build().unwrap_err();
        assert!(matches!(err, SchemaError::InvalidProjection { .. }));
    }

    #[test]
    fn test_fetch_query_mirrors_declaration() {
        let schema = vendors()
            .projection("*, owners(name)")
            .order_by("name", true)
            .limit(50)
            .build()
            .unwrap();
        let query = schema.fetch_query();
        assert_eq!(query.ordering, Some(SortOrder::asc("name")));
        assert_eq!(query.limit, Some(50));
        assert_eq!(query.projection.unwrap().embeds[0].table, "owners");
    }
}
