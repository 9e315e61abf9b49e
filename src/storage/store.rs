use async_trait::async_trait;

use super::Projection;
use crate::core::{Record, RecordId, StoreResult};

/// Server-side ordering of a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub column: String,
    pub ascending: bool,
}

impl SortOrder {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// Everything a read can ask for besides the collection name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchQuery {
    pub projection: Option<Projection>,
    pub ordering: Option<SortOrder>,
    pub limit: Option<usize>,
}

impl FetchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn ordering(mut self, ordering: SortOrder) -> Self {
        self.ordering = Some(ordering);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Uniform access to a tabular store addressed by collection name.
///
/// Every call is an independent request/response with no implicit
/// transaction. `insert` and `update` return the written row shaped by the
/// same projection reads use, so callers never merge partial state.
///
/// The panel only ever talks to `Arc<dyn Store>`: use [`MemoryStore`] in
/// tests and the demo console, [`RestStore`] against a live database.
///
/// [`MemoryStore`]: super::MemoryStore
/// [`RestStore`]: super::RestStore
#[async_trait]
pub trait Store: Send + Sync {
    /// Rows of `collection`, shaped, ordered and capped by `query`.
    async fn fetch_all(&self, collection: &str, query: &FetchQuery) -> StoreResult<Vec<Record>>;

    /// Inserts one row and returns it with server-assigned columns populated.
    async fn insert(
        &self,
        collection: &str,
        payload: Record,
        projection: Option<&Projection>,
    ) -> StoreResult<Record>;

    /// Overwrites the given columns of one row and returns the updated row.
    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        payload: Record,
        projection: Option<&Projection>,
    ) -> StoreResult<Record>;

    /// Removes one row.
    async fn delete(&self, collection: &str, id: &RecordId) -> StoreResult<()>;
}
