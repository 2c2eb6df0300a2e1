use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::RwLock;

use crate::errors::ServiceError;

/// Generic in-memory key-value map store.
///
/// Backs the in-memory repositories used by tests, benches and local
/// wiring. Keys are ordered so listings are stable. Cloning shares the map.
#[derive(Clone)]
pub struct MemoryStore<K, V> {
    inner: Arc<RwLock<BTreeMap<K, V>>>,
}

impl<K, V> Default for MemoryStore<K, V> {
    fn default() -> Self {
        Self { inner: Arc::new(RwLock::new(BTreeMap::new())) }
    }
}

impl<K, V> MemoryStore<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot all values in key order.
    pub async fn list(&self) -> Vec<V> {
        let map = self.inner.read().await;
        map.values().cloned().collect()
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Find the first value matching a predicate.
    pub async fn find<F>(&self, pred: F) -> Option<V>
    where
        F: Fn(&V) -> bool,
    {
        let map = self.inner.read().await;
        map.values().find(|v| pred(v)).cloned()
    }

    /// Remove a key; returns whether it existed.
    pub async fn remove(&self, key: &K) -> bool {
        let mut map = self.inner.write().await;
        map.remove(key).is_some()
    }

    /// Run a check-and-mutate closure under a single write lock.
    pub async fn update_map<F, T>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut BTreeMap<K, V>) -> Result<T, ServiceError>,
    {
        let mut map = self.inner.write().await;
        f(&mut map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_crud() -> Result<(), anyhow::Error> {
        let store = MemoryStore::<u32, String>::new();
        assert!(store.list().await.is_empty());

        store.update_map(|m| { m.insert(2, "b".into()); m.insert(1, "a".into()); Ok(()) }).await?;
        assert_eq!(store.list().await, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.get(&1).await.as_deref(), Some("a"));
        assert_eq!(store.find(|v| v == "b").await.as_deref(), Some("b"));

        let err = store
            .update_map(|m| if m.contains_key(&1) { Err(ServiceError::BadRequest("taken".into())) } else { Ok(()) })
            .await;
        assert!(err.is_err());

        assert!(store.remove(&2).await);
        assert!(!store.remove(&2).await);
        assert_eq!(store.list().await.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn clones_share_state() {
        let a = MemoryStore::<u32, u32>::new();
        let b = a.clone();
        a.update_map(|m| { m.insert(7, 70); Ok(()) }).await.unwrap();
        assert_eq!(b.get(&7).await, Some(70));
    }
}
