//! Document store seam standing in for the managed document database.
//!
//! Provides:
//! - `DocumentStore`: collections of JSON documents keyed by id
//! - `Query`: equality filters plus a single ordering field
//! - `MemoryDocumentStore`: in-process implementation with generated ids,
//!   server timestamps, snapshots and fault injection

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex as TokioMutex;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::RepositoryError;

/// Field map of one document
pub type Fields = Map<String, Value>;

/// Length of generated document ids
pub const DOCUMENT_ID_LEN: usize = 20;

const SERVER_TIMESTAMP_SENTINEL: &str = "__server_timestamp__";

/// Placeholder the store replaces with its own clock when the write lands
pub fn server_timestamp() -> Value {
    Value::String(SERVER_TIMESTAMP_SENTINEL.to_string())
}

/// Serialize a value into a document field map
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, RepositoryError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(RepositoryError::Malformed {
            id: String::new(),
            reason: format!("expected an object, got {}", other),
        }),
    }
}

/// A stored document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, RepositoryError> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|e| {
            RepositoryError::Malformed {
                id: self.id.clone(),
                reason: e.to_string(),
            }
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Collection query: all filters must match by equality
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<(String, Direction)>,
}

impl Query {
    pub fn collection(name: &str) -> Self {
        Query {
            collection: name.to_string(),
            filters: Vec::new(),
            order_by: None,
        }
    }

    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push((field.to_string(), value.into()));
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    fn matches(&self, fields: &Fields) -> bool {
        self.filters
            .iter()
            .all(|(field, value)| fields.get(field) == Some(value))
    }
}

/// Document database operations used by the repositories
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert with a store-generated id, returning the document as written
    async fn add(&self, collection: &str, fields: Fields) -> Result<Document, RepositoryError>;

    /// Create or overwrite the document at `id`
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), RepositoryError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, RepositoryError>;

    /// Merge fields into an existing document and return the merged
    /// result; `NotFound` when absent
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Document, RepositoryError>;

    async fn query(&self, query: &Query) -> Result<Vec<Document>, RepositoryError>;
}

// ============================================================================
// In-memory implementation
// ============================================================================

/// Serializable contents of a `MemoryDocumentStore`
pub type StoreSnapshot = HashMap<String, BTreeMap<String, Fields>>;

/// In-process document store
pub struct MemoryDocumentStore {
    collections: TokioMutex<StoreSnapshot>,
    clock: Arc<dyn Clock>,
    pending_failure: TokioMutex<Option<String>>,
    calls: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        MemoryDocumentStore {
            collections: TokioMutex::new(HashMap::new()),
            clock,
            pending_failure: TokioMutex::new(None),
            calls: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn with_snapshot(clock: Arc<dyn Clock>, snapshot: StoreSnapshot) -> Self {
        let mut store = Self::new(clock);
        store.collections = TokioMutex::new(snapshot);
        store
    }

    /// Make the next call fail with `Unavailable(message)`
    pub async fn fail_next(&self, message: &str) {
        *self.pending_failure.lock().await = Some(message.to_string());
    }

    /// Calls received, including failed ones
    pub fn call_count(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    /// Successful writes (add, set, update)
    pub fn write_count(&self) -> usize {
        self.writes.load(AtomicOrdering::SeqCst)
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.collections.lock().await.clone()
    }

    pub async fn restore(&self, snapshot: StoreSnapshot) {
        *self.collections.lock().await = snapshot;
    }

    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    async fn begin_call(&self, op: &str, collection: &str) -> Result<(), RepositoryError> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        if let Some(message) = self.pending_failure.lock().await.take() {
            warn!("Injected failure on {} {}: {}", op, collection, message);
            return Err(RepositoryError::Unavailable(message));
        }
        debug!("{} {}", op, collection);
        Ok(())
    }

    fn resolve_timestamps(&self, fields: &mut Fields) -> Result<(), RepositoryError> {
        let now = serde_json::to_value(self.clock.now_utc())?;
        for value in fields.values_mut() {
            if value.as_str() == Some(SERVER_TIMESTAMP_SENTINEL) {
                *value = now.clone();
            }
        }
        Ok(())
    }
}

fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DOCUMENT_ID_LEN)
        .map(char::from)
        .collect()
}

/// Ordering used by `Query::order_by`: missing values first, then by
/// JSON type, strings lexically and numbers numerically.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(x), Value::Number(y)) => {
                let x = x.as_f64().unwrap_or(0.0);
                let y = y.as_f64().unwrap_or(0.0);
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => rank(a).cmp(&rank(b)),
        },
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn add(
        &self,
        collection: &str,
        mut fields: Fields,
    ) -> Result<Document, RepositoryError> {
        self.begin_call("add", collection).await?;
        self.resolve_timestamps(&mut fields)?;

        let mut collections = self.collections.lock().await;
        let docs = collections.entry(collection.to_string()).or_default();
        let mut id = generate_id();
        while docs.contains_key(&id) {
            id = generate_id();
        }
        docs.insert(id.clone(), fields.clone());
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(Document { id, fields })
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        mut fields: Fields,
    ) -> Result<(), RepositoryError> {
        self.begin_call("set", collection).await?;
        self.resolve_timestamps(&mut fields)?;

        let mut collections = self.collections.lock().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, RepositoryError> {
        self.begin_call("get", collection).await?;

        let collections = self.collections.lock().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        mut fields: Fields,
    ) -> Result<Document, RepositoryError> {
        self.begin_call("update", collection).await?;
        self.resolve_timestamps(&mut fields)?;

        let mut collections = self.collections.lock().await;
        let existing = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| RepositoryError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        existing.extend(fields);
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(Document {
            id: id.to_string(),
            fields: existing.clone(),
        })
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, RepositoryError> {
        self.begin_call("query", &query.collection).await?;

        let collections = self.collections.lock().await;
        let mut results: Vec<Document> = collections
            .get(&query.collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, fields)| query.matches(fields))
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        if let Some((field, direction)) = &query.order_by {
            results.sort_by(|a, b| {
                let ord = compare_values(a.fields.get(field), b.fields.get(field));
                match direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }
        Ok(results)
    }
}
