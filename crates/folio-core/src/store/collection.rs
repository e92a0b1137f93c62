//! One entity collection and its reconciliation rules
//!
//! `Collection` is the local cache; the server is the source of truth on
//! fetch. After each successful write the cache is reconciled without a
//! refetch: append for create, shallow field merge for update, filter-out
//! for delete.
//!
//! Mutators do not serialize overlapping calls. Two concurrent edits of
//! the same record race and the last response to arrive wins.

use crate::api::ApiClient;
use crate::error::{ApiError, FolioError};
use crate::types::Entity;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Ordered records plus the loading flag
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    records: Vec<T>,
    loading: bool,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            loading: false,
        }
    }
}

impl<T: Entity> Collection<T> {
    /// Create empty collection
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records in server order, locally created ones at the tail
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Whether a bulk fetch is in flight
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Record by identifier
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Replace everything with a fresh server listing
    pub fn apply_fetched(&mut self, records: Vec<T>) {
        self.records = records;
    }

    /// Append a record the server just created
    pub fn apply_created(&mut self, record: T) {
        self.records.push(record);
    }

    /// Merge the fields the server returned into the matching record
    ///
    /// Returns `Ok(false)` when no record has that identifier. Identifier
    /// keys inside `patch` are ignored.
    pub fn apply_updated(&mut self, id: &str, patch: &Value) -> Result<bool, serde_json::Error> {
        let Some(slot) = self.records.iter_mut().find(|r| r.id() == id) else {
            return Ok(false);
        };
        *slot = merge_fields(slot, patch)?;
        Ok(true)
    }

    /// Drop the record with this identifier; unknown identifiers are a no-op
    pub fn apply_deleted(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        self.records.len() != before
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

/// Shallow merge: top-level keys of `patch` overwrite those of `record`
pub fn merge_fields<T: Entity>(record: &T, patch: &Value) -> Result<T, serde_json::Error> {
    let mut merged = match serde_json::to_value(record)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    if let Value::Object(fields) = patch {
        for (key, value) in fields {
            if key == "_id" || key == "id" {
                continue;
            }
            merged.insert(key.clone(), value.clone());
        }
    }
    T::from_wire(Value::Object(merged))
}

/// Decode a listing record by record; records that do not decode are
/// logged and skipped
fn decode_listing<T: Entity>(value: Value) -> Result<Vec<T>, ApiError> {
    let Value::Array(items) = value else {
        return Err(ApiError::Decode(format!(
            "expected a list of {} records",
            T::RESOURCE.display_name()
        )));
    };
    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match T::from_wire(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(resource = %T::RESOURCE, index, error = %e, "skipping malformed record");
                None
            }
        })
        .collect();
    if records.len() < total {
        tracing::warn!(
            resource = %T::RESOURCE,
            kept = records.len(),
            total,
            "listing partially decoded"
        );
    }
    Ok(records)
}

/// Resets a loading flag when dropped, including when the future is cancelled
pub(crate) struct LoadingGuard<'a, F: Fn(bool)> {
    set: &'a F,
}

impl<'a, F: Fn(bool)> LoadingGuard<'a, F> {
    pub(crate) fn start(set: &'a F) -> Self {
        set(true);
        Self { set }
    }
}

impl<F: Fn(bool)> Drop for LoadingGuard<'_, F> {
    fn drop(&mut self) {
        (self.set)(false);
    }
}

/// A collection bound to the resource client
pub struct CollectionStore<T> {
    client: Arc<dyn ApiClient>,
    state: RwLock<Collection<T>>,
}

impl<T: Entity> fmt::Debug for CollectionStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionStore")
            .field("resource", &T::RESOURCE)
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

impl<T: Entity> CollectionStore<T> {
    /// Create empty store
    #[inline]
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self {
            client,
            state: RwLock::new(Collection::new()),
        }
    }

    /// Snapshot of the records
    #[must_use]
    pub fn records(&self) -> Vec<T> {
        self.state.read().records().to_vec()
    }

    /// Snapshot of one record
    #[must_use]
    pub fn get(&self, id: &str) -> Option<T> {
        self.state.read().get(id).cloned()
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().records().len()
    }

    /// Whether the collection is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a bulk fetch is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading()
    }

    /// Replace the collection with the server listing
    ///
    /// Failures are logged and swallowed; the previous records stay.
    pub async fn fetch_all(&self) {
        let set_loading = |loading: bool| self.state.write().set_loading(loading);
        let _loading = LoadingGuard::start(&set_loading);

        let fetched = self
            .client
            .read(T::RESOURCE, None)
            .await
            .and_then(decode_listing::<T>);

        match fetched {
            Ok(records) => {
                tracing::debug!(resource = %T::RESOURCE, count = records.len(), "collection fetched");
                self.state.write().apply_fetched(records);
            }
            Err(e) => {
                tracing::error!(resource = %T::RESOURCE, error = %e, "failed to fetch collection");
            }
        }
    }

    /// Create a record and append the server's copy
    ///
    /// Errors propagate so the caller can keep the draft open.
    pub async fn add(&self, draft: &T) -> Result<T, FolioError> {
        let payload = serde_json::to_value(draft).map_err(ApiError::from)?;
        let created = self.client.create(T::RESOURCE, payload).await?;
        let record = T::from_wire(created).map_err(ApiError::from)?;

        tracing::info!(resource = %T::RESOURCE, id = record.id(), "record created");
        self.state.write().apply_created(record.clone());
        Ok(record)
    }

    /// Update a record and merge the fields the server returned
    pub async fn update<P>(&self, id: &str, patch: &P) -> Result<(), FolioError>
    where
        P: Serialize + ?Sized + Sync,
    {
        let payload = serde_json::to_value(patch).map_err(ApiError::from)?;
        let returned = self
            .client
            .update(T::RESOURCE, Some(id.to_string()), payload)
            .await?;

        let matched = self
            .state
            .write()
            .apply_updated(id, &returned)
            .map_err(ApiError::from)?;
        if !matched {
            tracing::debug!(resource = %T::RESOURCE, id, "updated record not in local collection");
        }
        Ok(())
    }

    /// Delete a record and drop it locally
    pub async fn remove(&self, id: &str) -> Result<(), FolioError> {
        self.client.remove(T::RESOURCE, id.to_string()).await?;
        if self.state.write().apply_deleted(id) {
            tracing::info!(resource = %T::RESOURCE, id, "record deleted");
        }
        Ok(())
    }
}
