use std::collections::BTreeMap;

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
    tokio::sync::RwLock,
};

use crate::Result;

/// The student an identity is bound to.
///
/// `id` is whatever the user typed at login; it is not cross-checked against
/// the student data unless id verification is switched on in routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingRecord {
    pub id: String,
    pub name: String,
}

impl BindingRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Persistent identity → student binding storage.
///
/// At most one record per identity; `put` overwrites.
#[async_trait]
pub trait BindingStore: Send + Sync {
    async fn get(&self, identity: &str) -> Result<Option<BindingRecord>>;
    async fn put(&self, identity: &str, student_id: &str, student_name: &str) -> Result<()>;
    /// Returns whether a record was removed. Removing an absent identity is not an error.
    async fn remove(&self, identity: &str) -> Result<bool>;
    async fn list(&self) -> Result<Vec<(String, BindingRecord)>>;
}

/// Volatile store for tests and throwaway runs.
#[derive(Default)]
pub struct InMemoryBindingStore {
    records: RwLock<BTreeMap<String, BindingRecord>>,
}

impl InMemoryBindingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BindingStore for InMemoryBindingStore {
    async fn get(&self, identity: &str) -> Result<Option<BindingRecord>> {
        Ok(self.records.read().await.get(identity).cloned())
    }

    async fn put(&self, identity: &str, student_id: &str, student_name: &str) -> Result<()> {
        self.records.write().await.insert(
            identity.to_string(),
            BindingRecord::new(student_id, student_name),
        );
        Ok(())
    }

    async fn remove(&self, identity: &str) -> Result<bool> {
        Ok(self.records.write().await.remove(identity).is_some())
    }

    async fn list(&self) -> Result<Vec<(String, BindingRecord)>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
