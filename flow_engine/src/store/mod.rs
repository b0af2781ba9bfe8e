//! Persistence boundary - systems and contexts as stored documents.
//!
//! The engine never talks to a backend directly. Anything that can hold a
//! string under a key can implement [`DocumentStore`], and the save/load
//! functions handle naming and (de)serialization on top of it. Misses are
//! a typed error, not a panic, so a caller can fall back to a bundled
//! system when nothing is stored yet.

use std::collections::HashMap;

use thiserror::Error;

use flow_model::{ContextId, System, SystemId};

use crate::context::ConversationContext;

/// What loading or saving a document can report.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Nothing is stored under the key.
    #[error("no document stored under '{key}'")]
    Missing { key: String },

    /// The stored payload did not parse.
    #[error("document under '{key}' is malformed: {source}")]
    Malformed {
        key: String,
        source: serde_json::Error,
    },

    /// The backend itself failed.
    #[error("storage backend failed: {0}")]
    Backend(String),
}

/// A keyed string store.
///
/// Implementations only move strings; they never inspect payloads.
pub trait DocumentStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// An in-memory store for tests and single-process use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.documents.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.documents.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.documents.remove(key);
        Ok(())
    }
}

/// Storage key for a system document.
pub fn system_key(id: &SystemId) -> String {
    format!("system:{id}")
}

/// Storage key for a conversation context.
pub fn context_key(id: &ContextId) -> String {
    format!("context:{id}")
}

/// Save a system document under its id.
pub fn save_system(store: &mut dyn DocumentStore, system: &System) -> Result<(), StoreError> {
    let key = system_key(&system.id);
    let payload = serde_json::to_string(system).map_err(|source| StoreError::Malformed {
        key: key.clone(),
        source,
    })?;
    store.set(&key, payload)
}

/// Load a system document by id.
pub fn load_system(store: &dyn DocumentStore, id: &SystemId) -> Result<System, StoreError> {
    let key = system_key(id);
    let payload = store
        .get(&key)?
        .ok_or_else(|| StoreError::Missing { key: key.clone() })?;
    serde_json::from_str(&payload).map_err(|source| StoreError::Malformed { key, source })
}

/// Save a conversation context under its id.
pub fn save_context(
    store: &mut dyn DocumentStore,
    context: &ConversationContext,
) -> Result<(), StoreError> {
    let key = context_key(context.id());
    let payload = serde_json::to_string(context).map_err(|source| StoreError::Malformed {
        key: key.clone(),
        source,
    })?;
    store.set(&key, payload)
}

/// Load a conversation context by id.
pub fn load_context(
    store: &dyn DocumentStore,
    id: &ContextId,
) -> Result<ConversationContext, StoreError> {
    let key = context_key(id);
    let payload = store
        .get(&key)?
        .ok_or_else(|| StoreError::Missing { key: key.clone() })?;
    serde_json::from_str(&payload).map_err(|source| StoreError::Malformed { key, source })
}

/// Delete a stored conversation context.
pub fn remove_context(store: &mut dyn DocumentStore, id: &ContextId) -> Result<(), StoreError> {
    store.remove(&context_key(id))
}
