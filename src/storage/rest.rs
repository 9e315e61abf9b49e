//! PostgREST-compatible HTTP store.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value as JsonValue;
use tracing::{Instrument, Level, event, info_span};

use super::{FetchQuery, Projection, Store};
use crate::config::StoreConfig;
use crate::core::{Record, RecordId, StoreError, StoreResult, Value};

const RETURN_REPRESENTATION: &str = "return=representation";

pub struct RestStore {
    client: Client,
    config: StoreConfig,
}

impl RestStore {
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        let mut builder = Client::builder().default_headers(default_headers(&config)?);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn url(&self, collection: &str) -> String {
        self.config.collection_url(collection)
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        check_response(response).await
    }

    async fn rows(response: Response) -> StoreResult<Vec<Record>> {
        let body: JsonValue = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        records_from_json(body)
    }

    async fn single_row(response: Response, collection: &str) -> StoreResult<Record> {
        Self::rows(response).await?.into_iter().next().ok_or_else(|| {
            StoreError::Decode(format!("'{}' returned an empty representation", collection))
        })
    }
}

#[async_trait]
impl Store for RestStore {
    async fn fetch_all(&self, collection: &str, query: &FetchQuery) -> StoreResult<Vec<Record>> {
        let span = info_span!("store.fetch", backend = "rest", collection = %collection);
        async move {
            let params = read_params(query, self.config.max_rows);
            let response = self
                .send(self.client.get(self.url(collection)).query(&params))
                .await?;
            let rows = Self::rows(response).await?;
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
        let span = info_span!("store.insert", backend = "rest", collection = %collection);
        async move {
            let request = self
                .client
                .post(self.url(collection))
                .header("Prefer", RETURN_REPRESENTATION)
                .query(&select_param(projection))
                .json(&payload);
            let response = self.send(request).await?;
            let row = Self::single_row(response, collection).await?;
            event!(Level::DEBUG, id = %row.value("id"), "inserted");
            Ok(row)
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
        let span = info_span!("store.update", backend = "rest", collection = %collection, id = %id);
        async move {
            let mut params = vec![id_filter(id)];
            params.extend(select_param(projection));
            let request = self
                .client
                .patch(self.url(collection))
                .header("Prefer", RETURN_REPRESENTATION)
                .query(&params)
                .json(&payload);
            let response = self.send(request).await?;
            let mut rows = Self::rows(response).await?;
            if rows.is_empty() {
                return Err(StoreError::RowNotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                });
            }
            event!(Level::DEBUG, "updated");
            Ok(rows.swap_remove(0))
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, collection: &str, id: &RecordId) -> StoreResult<()> {
        let span = info_span!("store.delete", backend = "rest", collection = %collection, id = %id);
        async move {
            self.send(self.client.delete(self.url(collection)).query(&[id_filter(id)]))
                .await?;
            event!(Level::DEBUG, "deleted");
            Ok(())
        }
        .instrument(span)
        .await
    }
}

fn default_headers(config: &StoreConfig) -> StoreResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(key) = &config.api_key {
        headers.insert("apikey", header_value(key)?);
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", key))?);
    }
    if let Some(schema) = &config.schema {
        headers.insert("accept-profile", header_value(schema)?);
        headers.insert("content-profile", header_value(schema)?);
    }
    Ok(headers)
}

fn header_value(raw: &str) -> StoreResult<HeaderValue> {
    HeaderValue::from_str(raw).map_err(|e| StoreError::Transport(format!("invalid header: {}", e)))
}

/// Query-string pairs of a read.
pub fn read_params(query: &FetchQuery, max_rows: Option<usize>) -> Vec<(String, String)> {
    let mut params = select_param(query.projection.as_ref());
    if let Some(ordering) = &query.ordering {
        let direction = if ordering.ascending { "asc" } else { "desc" };
        params.push((
            "order".to_string(),
            format!("{}.{}", ordering.column, direction),
        ));
    }
    if let Some(limit) = query.limit.or(max_rows) {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

fn select_param(projection: Option<&Projection>) -> Vec<(String, String)> {
    projection
        .map(|p| vec![("select".to_string(), p.to_string())])
        .unwrap_or_default()
}

pub fn id_filter(id: &RecordId) -> (String, String) {
    ("id".to_string(), format!("eq.{}", id))
}

/// Maps a non-2xx response to `StoreError::Rejected`.
async fn check_response(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body, status.canonical_reason());
    event!(Level::WARN, status = status.as_u16(), %message, "request rejected");
    Err(StoreError::Rejected {
        status: Some(status.as_u16()),
        message,
    })
}

/// Prefers the body's `message`, then the raw body, then the status reason.
pub fn error_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(json) = serde_json::from_str::<JsonValue>(body)
        && let Some(message) = json.get("message").and_then(JsonValue::as_str)
    {
        return message.to_string();
    }
    if !body.trim().is_empty() {
        return body.trim().to_string();
    }
    reason.unwrap_or("request failed").to_string()
}

pub fn records_from_json(body: JsonValue) -> StoreResult<Vec<Record>> {
    let items = match body {
        JsonValue::Array(items) => items,
        single @ JsonValue::Object(_) => vec![single],
        other => {
            return Err(StoreError::Decode(format!(
                "expected rows, got {}",
                other
            )));
        }
    };
    items
        .into_iter()
        .map(|item| match Value::from(item) {
            Value::Object(columns) => Ok(columns.into_iter().collect()),
            other => Err(StoreError::Decode(format!(
                "expected a row object, got {}",
                other.type_name()
            ))),
        })
        .collect()
}
