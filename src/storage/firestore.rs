//! Cloud Firestore storage implementation (REST API).
//!
//! Ids are read with a paginated `list` that masks every field except `id`,
//! so the snapshot costs one small page per 300 documents. Writes go through
//! `documents:commit`, which applies all writes of a request atomically.

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::error::{AppError, Result};
use crate::storage::DocumentStore;

const FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: usize = 300;

/// Firestore storage backend.
pub struct FirestoreStore {
    client: Client,
    endpoint: String,
    project_id: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<DocumentName>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentName {
    name: String,
}

impl FirestoreStore {
    pub fn new(
        client: Client,
        project_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: FIRESTORE_ENDPOINT.to_string(),
            project_id: project_id.into(),
            access_token: access_token.into(),
        }
    }

    /// Point the client at a different API root (e.g. the emulator).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Resource path of the database's document root.
    fn documents_root(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.documents_root()
        )
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_root(), collection, id)
    }

    async fn check(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::store(format!(
            "Firestore {action} returned {status}: {body}"
        )))
    }
}

/// Build the `documents:commit` request body.
fn commit_body(store: &FirestoreStore, collection: &str, writes: &[(String, Value)]) -> Value {
    let writes: Vec<Value> = writes
        .iter()
        .map(|(id, doc)| {
            json!({
                "update": {
                    "name": store.document_name(collection, id),
                    "fields": to_fields(doc),
                }
            })
        })
        .collect();
    json!({ "writes": writes })
}

/// Last path segment of a document resource name.
fn document_id(name: &str) -> Option<&str> {
    name.rsplit('/').next().filter(|id| !id.is_empty())
}

/// Convert a JSON object into a Firestore `fields` map.
fn to_fields(doc: &Value) -> Value {
    match doc {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), to_value(value)))
                .collect(),
        ),
        _ => Value::Object(Map::new()),
    }
}

/// Convert a JSON value into a typed Firestore value.
fn to_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(to_value).collect::<Vec<_>>() }
        }),
        Value::Object(_) => json!({ "mapValue": { "fields": to_fields(value) } }),
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn stream_all_ids(&self, collection: &str) -> Result<HashSet<String>> {
        let url = format!("{}/{}", self.documents_url(), collection);
        let mut ids = HashSet::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("pageSize".to_string(), PAGE_SIZE.to_string()),
                ("mask.fieldPaths".to_string(), "id".to_string()),
            ];
            if let Some(token) = &page_token {
                query.push(("pageToken".to_string(), token.clone()));
            }

            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.access_token)
                .query(&query)
                .send()
                .await?;
            let page: ListResponse = Self::check(response, "list").await?.json().await?;

            ids.extend(
                page.documents
                    .iter()
                    .filter_map(|doc| document_id(&doc.name))
                    .map(str::to_string),
            );

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        log::debug!("Read {} ids from Firestore '{}'", ids.len(), collection);
        Ok(ids)
    }

    async fn commit(&self, collection: &str, writes: &[(String, Value)]) -> Result<usize> {
        if writes.is_empty() {
            return Ok(0);
        }

        let url = format!("{}:commit", self.documents_url());
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&commit_body(self, collection, writes))
            .send()
            .await?;
        Self::check(response, "commit").await?;

        log::info!(
            "Committed {} documents to Firestore '{}'",
            writes.len(),
            collection
        );
        Ok(writes.len())
    }
}
