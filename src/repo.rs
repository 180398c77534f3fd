/// Repository module
///
/// Handlers read and write their data through the [`KeyValueStore`] trait,
/// which is injected via the application state. The only implementation is
/// an in-process map; nothing is persisted across restarts.
use anyhow::Result;
use dashmap::DashMap;

/// A string-keyed store of values
pub trait KeyValueStore<V>: Send + Sync {
    /// Retrieves the value stored under `key`
    ///
    /// ### Returns
    ///
    /// `Ok(None)` when nothing is stored under the key
    fn get(&self, key: &str) -> Result<Option<V>>;

    /// Stores `value` under `key`, replacing any previous value
    fn put(&self, key: &str, value: V) -> Result<()>;

    /// Every entry, ordered by key
    fn list(&self) -> Result<Vec<(String, V)>>;
}

/// A [`KeyValueStore`] backed by a concurrent hash map
#[derive(Debug)]
pub struct InMemoryStore<V> {
    entries: DashMap<String, V>,
}

impl<V> Default for InMemoryStore<V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<V> InMemoryStore<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `entries`
    pub fn with_entries<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<V: Clone + Send + Sync> KeyValueStore<V> for InMemoryStore<V> {
    fn get(&self, key: &str) -> Result<Option<V>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn put(&self, key: &str, value: V) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn list(&self) -> Result<Vec<(String, V)>> {
        let mut entries: Vec<(String, V)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }
}
