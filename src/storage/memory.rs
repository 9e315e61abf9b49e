//! In-process store with PostgREST-like semantics.
//!
//! Backs the demo console and the test-suite. Each collection sits behind
//! its own lock, rows keep insertion order, and the server-side columns
//! (`id`, `created_at`, `updated_at`) are filled in on write.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tokio::sync::RwLock;
use tracing::{Instrument, Level, event, info_span};
use uuid::Uuid;

use super::projection::{Columns, Embed};
use super::{FetchQuery, Projection, SortOrder, Store};
use crate::core::{ID_COLUMN, Record, RecordId, StoreError, StoreResult, Value};

pub const CREATED_AT_COLUMN: &str = "created_at";
pub const UPDATED_AT_COLUMN: &str = "updated_at";

/// Operation kinds, used to target injected rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Fetch,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreOp::Fetch => "fetch",
            StoreOp::Insert => "insert",
            StoreOp::Update => "update",
            StoreOp::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Constraints of one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionSpec {
    not_null: Vec<String>,
    /// column -> referenced collection
    foreign_keys: BTreeMap<String, String>,
}

impl CollectionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn not_null(mut self, column: impl Into<String>) -> Self {
        self.not_null.push(column.into());
        self
    }

    pub fn foreign_key(mut self, column: impl Into<String>, target: impl Into<String>) -> Self {
        self.foreign_keys.insert(column.into(), target.into());
        self
    }

    /// The column of this collection that points at `target`, if any.
    fn column_referencing(&self, target: &str) -> Option<&str> {
        self.foreign_keys
            .iter()
            .find(|(_, table)| table.as_str() == target)
            .map(|(column, _)| column.as_str())
    }
}

#[derive(Debug, Default)]
struct Collection {
    spec: CollectionSpec,
    rows: Vec<Record>,
}

impl Collection {
    fn position(&self, id: &RecordId) -> Option<usize> {
        self.rows.iter().position(|row| row.id().as_ref() == Some(id))
    }

    fn check_not_null(&self, name: &str, row: &Record) -> StoreResult<()> {
        for column in &self.spec.not_null {
            if row.value(column).is_null() {
                return Err(StoreError::ConstraintViolation(format!(
                    "null value in column \"{}\" of relation \"{}\" violates not-null constraint",
                    column, name
                )));
            }
        }
        Ok(())
    }
}

type CollectionHandle = Arc<RwLock<Collection>>;

pub struct MemoryStore {
    collections: RwLock<HashMap<String, CollectionHandle>>,
    rejections: RwLock<HashMap<(String, StoreOp), StoreError>>,
    calls: RwLock<HashMap<(String, StoreOp), usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            rejections: RwLock::new(HashMap::new()),
            calls: RwLock::new(HashMap::new()),
        }
    }

    /// Creates `name`, or replaces its constraints when it already exists.
    pub async fn create_collection(&self, name: impl Into<String>, spec: CollectionSpec) {
        let name = name.into();
        let mut collections = self.collections.write().await;
        match collections.get(&name) {
            Some(handle) => handle.write().await.spec = spec,
            None => {
                collections.insert(
                    name,
                    Arc::new(RwLock::new(Collection {
                        spec,
                        rows: Vec::new(),
                    })),
                );
            }
        }
    }

    pub async fn has_collection(&self, name: &str) -> bool {
        self.collections.read().await.contains_key(name)
    }

    /// Inserts rows as-is, bypassing constraints and injected rejections.
    /// Rows without an id get one.
    pub async fn seed(&self, name: &str, rows: impl IntoIterator<Item = Record>) -> StoreResult<Vec<RecordId>> {
        let handle = self.handle(name).await?;
        let mut collection = handle.write().await;
        let mut ids = Vec::new();
        for row in rows {
            let row = stamp_new_row(row);
            if let Some(id) = row.id() {
                ids.push(id);
            }
            collection.rows.push(row);
        }
        Ok(ids)
    }

    /// Makes every subsequent `op` on `collection` fail with `message`.
    pub async fn reject(&self, collection: &str, op: StoreOp, message: impl Into<String>) {
        self.rejections
            .write()
            .await
            .insert((collection.to_string(), op), StoreError::rejected(message));
    }

    pub async fn clear_rejection(&self, collection: &str, op: StoreOp) {
        self.rejections
            .write()
            .await
            .remove(&(collection.to_string(), op));
    }

    /// How many times `op` reached `collection`, rejected calls included.
    pub async fn call_count(&self, collection: &str, op: StoreOp) -> usize {
        self.calls
            .read()
            .await
            .get(&(collection.to_string(), op))
            .copied()
            .unwrap_or(0)
    }

    /// Stored rows of `collection` in insertion order, unprojected.
    pub async fn snapshot(&self, name: &str) -> StoreResult<Vec<Record>> {
        let handle = self.handle(name).await?;
        let rows = handle.read().await.rows.clone();
        Ok(rows)
    }

    async fn handle(&self, name: &str) -> StoreResult<CollectionHandle> {
        self.collections
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))
    }

    /// Counts the call and returns the injected failure, if any.
    async fn admit(&self, collection: &str, op: StoreOp) -> StoreResult<()> {
        let key = (collection.to_string(), op);
        *self.calls.write().await.entry(key.clone()).or_insert(0) += 1;
        match self.rejections.read().await.get(&key) {
            Some(err) => {
                event!(Level::WARN, error = %err, "injected rejection");
                Err(err.clone())
            }
            None => Ok(()),
        }
    }

    async fn check_foreign_keys(&self, spec: &CollectionSpec, name: &str, row: &Record) -> StoreResult<()> {
        for (column, target) in &spec.foreign_keys {
            let value = row.value(column);
            if value.is_blank() {
                continue;
            }
            let found = match RecordId::from_value(value) {
                Some(id) => self.handle(target).await?.read().await.position(&id).is_some(),
                None => false,
            };
            if !found {
                return Err(StoreError::ConstraintViolation(format!(
                    "insert or update on table \"{}\" violates foreign key constraint on \"{}\": key ({})=({}) is not present in table \"{}\"",
                    name, column, column, value, target
                )));
            }
        }
        Ok(())
    }

    /// Applies `projection` to stored rows, embedding related rows through
    /// the collection's foreign keys.
    async fn shape(
        &self,
        spec: &CollectionSpec,
        name: &str,
        rows: Vec<Record>,
        projection: Option<&Projection>,
    ) -> StoreResult<Vec<Record>> {
        let Some(projection) = projection else {
            return Ok(rows);
        };

        let mut related = Vec::with_capacity(projection.embeds.len());
        for embed in &projection.embeds {
            let column = spec.column_referencing(&embed.table).ok_or_else(|| {
                StoreError::InvalidProjection(format!(
                    "no relationship between '{}' and '{}'",
                    name, embed.table
                ))
            })?;
            let target = self.handle(&embed.table).await?.read().await.rows.clone();
            related.push((embed, column, target));
        }

        Ok(rows
            .iter()
            .map(|row| {
                let mut out = projection.select_columns(row);
                for (embed, column, target) in &related {
                    out.set(embed.alias.clone(), embed_value(embed, row.value(column), target));
                }
                out
            })
            .collect())
    }

    async fn shape_one(
        &self,
        spec: &CollectionSpec,
        name: &str,
        row: Record,
        projection: Option<&Projection>,
    ) -> StoreResult<Record> {
        let mut shaped = self.shape(spec, name, vec![row], projection).await?;
        shaped
            .pop()
            .ok_or_else(|| StoreError::Decode(format!("'{}' returned no row", name)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn fetch_all(&self, collection: &str, query: &FetchQuery) -> StoreResult<Vec<Record>> {
        let span = info_span!("store.fetch", backend = "memory", collection = %collection);
        async move {
            self.admit(collection, StoreOp::Fetch).await?;
            let handle = self.handle(collection).await?;
            let (spec, mut rows) = {
                let guard = handle.read().await;
                (guard.spec.clone(), guard.rows.clone())
            };

            if let Some(ordering) = &query.ordering {
                sort_rows(&mut rows, ordering)?;
            }
            if let Some(limit) = query.limit {
                rows.truncate(limit);
            }

            let rows = self
                .shape(&spec, collection, rows, query.projection.as_ref())
                .await?;
            event!(Level::DEBUG, rows = rows.len(), "fetched");
            Ok(rows)
        }
        .instrument(span)
        .await
    }

    async fn insert(
        &self,
        collection: &str,
        payload: Record,
        projection: Option<&Projection>,
    ) -> StoreResult<Record> {
        let span = info_span!("store.insert", backend = "memory", collection = %collection);
        async move {
            self.admit(collection, StoreOp::Insert).await?;
            let handle = self.handle(collection).await?;
            let spec = handle.read().await.spec.clone();

            let row = stamp_new_row(payload);
            self.check_foreign_keys(&spec, collection, &row).await?;
            {
                let mut guard = handle.write().await;
                guard.check_not_null(collection, &row)?;
                if let Some(id) = row.id()
                    && guard.position(&id).is_some()
                {
                    return Err(StoreError::ConstraintViolation(format!(
                        "duplicate key value violates unique constraint \"{}_pkey\"",
                        collection
                    )));
                }
                guard.rows.push(row.clone());
            }

            event!(Level::DEBUG, id = %row.value(ID_COLUMN), "inserted");
            self.shape_one(&spec, collection, row, projection).await
        }
        .instrument(span)
        .await
    }

    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        payload: Record,
        projection: Option<&Projection>,
    ) -> StoreResult<Record> {
        let span = info_span!("store.update", backend = "memory", collection = %collection, id = %id);
        async move {
            self.admit(collection, StoreOp::Update).await?;
            let handle = self.handle(collection).await?;
            let spec = handle.read().await.spec.clone();
            self.check_foreign_keys(&spec, collection, &payload).await?;

            let updated = {
                let mut guard = handle.write().await;
                let idx = guard.position(id).ok_or_else(|| StoreError::RowNotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                })?;

                let mut merged = guard.rows[idx].clone();
                for (key, value) in payload {
                    if key != ID_COLUMN {
                        merged.set(key, value);
                    }
                }
                merged.set(UPDATED_AT_COLUMN, now());
                guard.check_not_null(collection, &merged)?;
                guard.rows[idx] = merged.clone();
                merged
            };

            event!(Level::DEBUG, "updated");
            self.shape_one(&spec, collection, updated, projection).await
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, collection: &str, id: &RecordId) -> StoreResult<()> {
        let span = info_span!("store.delete", backend = "memory", collection = %collection, id = %id);
        async move {
            self.admit(collection, StoreOp::Delete).await?;
            let handle = self.handle(collection).await?;
            let mut guard = handle.write().await;
            let idx = guard.position(id).ok_or_else(|| StoreError::RowNotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
            guard.rows.remove(idx);
            event!(Level::DEBUG, "deleted");
            Ok(())
        }
        .instrument(span)
        .await
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Fills in the server-side columns a fresh row lacks.
fn stamp_new_row(mut row: Record) -> Record {
    if RecordId::from_value(row.value(ID_COLUMN)).is_none() {
        row.set(ID_COLUMN, Uuid::new_v4().to_string());
    }
    let ts = now();
    if row.value(CREATED_AT_COLUMN).is_null() {
        row.set(CREATED_AT_COLUMN, ts.clone());
    }
    if row.value(UPDATED_AT_COLUMN).is_null() {
        row.set(UPDATED_AT_COLUMN, ts);
    }
    row
}

/// Stable sort; NULLs last ascending, first descending. A column mixing
/// incomparable types is rejected before any row moves.
fn sort_rows(rows: &mut [Record], ordering: &SortOrder) -> StoreResult<()> {
    let column = ordering.column.as_str();
    let mut present = rows.iter().map(|row| row.value(column)).filter(|v| !v.is_null());
    if let Some(first) = present.next() {
        first.compare(first)?;
        for value in present {
            first.compare(value)?;
        }
    }

    rows.sort_by(|a, b| {
        let ord = a
            .value(column)
            .compare(b.value(column))
            .unwrap_or(std::cmp::Ordering::Equal);
        if ordering.ascending { ord } else { ord.reverse() }
    });
    Ok(())
}

fn embed_value(embed: &Embed, key: &Value, target: &[Record]) -> Value {
    let Some(id) = RecordId::from_value(key) else {
        return Value::Null;
    };
    match target.iter().find(|row| row.id().as_ref() == Some(&id)) {
        Some(row) => {
            let mut picked = row.clone();
            if let Columns::Only(names) = &embed.columns {
                picked.retain_columns(names);
            }
            Value::Object(picked.into_iter().collect())
        }
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    async fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .create_collection("vendors", CollectionSpec::new().not_null("name"))
            .await;
        store
            .create_collection(
                "products",
                CollectionSpec::new()
                    .not_null("name")
                    .foreign_key("vendor_id", "vendors"),
            )
            .await;
        store
    }

    #[tokio::test]
    async fn test_insert_assigns_server_columns() {
        let store = store().await;
        let row = assert_ok!(
            store
                .insert("vendors", Record::new().with("name", "Acme"), None)
                .await
        );
        assert!(row.id().is_some());
        assert!(row.value(CREATED_AT_COLUMN).as_str().is_some());
        assert_eq!(row.value("name"), &Value::from("Acme"));
    }

    #[tokio::test]
    async fn test_not_null_and_foreign_key_are_enforced() {
        let store = store().await;
        let err = assert_err!(store.insert("vendors", Record::new(), None).await);
        assert!(matches!(err, StoreError::ConstraintViolation(_)));

        let err = assert_err!(
            store
                .insert(
                    "products",
                    Record::new().with("name", "Tee").with("vendor_id", "missing"),
                    None
                )
                .await
        );
        assert!(err.to_string().contains("foreign key"));
    }

    #[tokio::test]
    async fn test_fetch_orders_limits_and_embeds() {
        let store = store().await;
        let ids = store
            .seed(
                "vendors",
                [
                    Record::new().with("id", "v-b").with("name", "Blue Loom"),
                    Record::new().with("id", "v-a").with("name", "Acme"),
                ],
            )
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);
        store
            .seed(
                "products",
                [
                    Record::new().with("name", "Tee").with("vendor_id", "v-a"),
                    Record::new().with("name", "Jean").with("vendor_id", "v-b"),
                    Record::new().with("name", "Sock"),
                ],
            )
            .await
            .unwrap();

        let vendors = store
            .fetch_all("vendors", &FetchQuery::new().ordering(SortOrder::asc("name")).limit(1))
            .await
            .unwrap();
        assert_eq!(vendors.len(), 1);
        assert_eq!(vendors[0].value("name"), &Value::from("Acme"));

        let query = FetchQuery::new().projection(Projection::parse("*, vendors(name)").unwrap());
        let products = store.fetch_all("products", &query).await.unwrap();
        assert_eq!(products[0].lookup("vendors.name"), Some(&Value::from("Acme")));
        assert_eq!(products[1].lookup("vendors.name"), Some(&Value::from("Blue Loom")));
        assert_eq!(products[2].value("vendors"), &Value::Null);
    }

    #[tokio::test]
    async fn test_descending_puts_nulls_first() {
        let store = store().await;
        store
            .seed(
                "vendors",
                [
                    Record::new().with("name", "a").with("rank", 1i64),
                    Record::new().with("name", "b"),
                    Record::new().with("name", "c").with("rank", 2i64),
                ],
            )
            .await
            .unwrap();
        let rows = store
            .fetch_all("vendors", &FetchQuery::new().ordering(SortOrder::desc("rank")))
            .await
            .unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.value("name").to_string()).collect();
        assert_eq!(names, ["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_mixed_type_ordering_is_rejected() {
        let store = store().await;
        let rows: Vec<Record> = (0..40)
            .map(|i| {
                let rank = if i % 3 == 0 {
                    Value::from(format!("r{}", i))
                } else {
                    Value::Integer(i)
                };
                Record::new().with("name", format!("v{}", i)).with("rank", rank)
            })
            .collect();
        store.seed("vendors", rows).await.unwrap();

        let err = assert_err!(
            store
                .fetch_all("vendors", &FetchQuery::new().ordering(SortOrder::asc("rank")))
                .await
        );
        assert!(matches!(err, StoreError::TypeMismatch(_)));

        let rows = assert_ok!(
            store
                .fetch_all("vendors", &FetchQuery::new().ordering(SortOrder::asc("name")))
                .await
        );
        assert_eq!(rows.len(), 40);
    }

    #[tokio::test]
    async fn test_update_merges_and_delete_removes() {
        let store = store().await;
        let row = store
            .insert("vendors", Record::new().with("name", "Acme").with("notes", "x"), None)
            .await
            .unwrap();
        let id = row.id().unwrap();

        let updated = assert_ok!(
            store
                .update("vendors", &id, Record::new().with("name", "Acme Co"), None)
                .await
        );
        assert_eq!(updated.value("name"), &Value::from("Acme Co"));
        assert_eq!(updated.value("notes"), &Value::from("x"));

        assert_ok!(store.delete("vendors", &id).await);
        let err = assert_err!(store.delete("vendors", &id).await);
        assert!(matches!(err, StoreError::RowNotFound { .. }));
    }

    #[tokio::test]
    async fn test_injected_rejection() {
        let store = store().await;
        store.reject("vendors", StoreOp::Fetch, "permission denied").await;
        let err = assert_err!(store.fetch_all("vendors", &FetchQuery::new()).await);
        assert_eq!(err.to_string(), "permission denied");
        assert_eq!(store.call_count("vendors", StoreOp::Fetch).await, 1);

        store.clear_rejection("vendors", StoreOp::Fetch).await;
        assert_ok!(store.fetch_all("vendors", &FetchQuery::new()).await);
    }

    #[tokio::test]
    async fn test_unknown_collection_and_relationship() {
        let store = store().await;
        let err = assert_err!(store.fetch_all("nope", &FetchQuery::new()).await);
        assert!(matches!(err, StoreError::CollectionNotFound(_)));

        let query = FetchQuery::new().projection(Projection::parse("*, products(name)").unwrap());
        let err = assert_err!(store.fetch_all("vendors", &query).await);
        assert!(matches!(err, StoreError::InvalidProjection(_)));
    }
}
