use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// A bounded memo over a derived key.
///
/// Recency is updated only when a key is first inserted, never on read, so
/// eviction is strictly insertion-ordered. A hit on an old key does not
/// protect it from eviction.
///
/// Not `Sync`; owned by a single-threaded caller.
pub struct LruMemo<K, V> {
    capacity: usize,
    values: HashMap<K, V>,
    order: VecDeque<K>,
}

impl<K, V> LruMemo<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "memo capacity must be at least 1");
        Self {
            capacity,
            values: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: K, value: V) {
        if self.values.insert(key.clone(), value).is_none() {
            self.order.push_back(key);
        }
        while self.values.len() > self.capacity {
            match self.order.pop_front() {
                Some(oldest) => self.values.remove(&oldest),
                None => break,
            };
        }
    }

    /// Return the stored value for `key`, computing and caching it on a miss.
    pub fn get_or_insert_with(&mut self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(value) = self.values.get(&key) {
            return value.clone();
        }
        let value = compute();
        self.insert(key, value.clone());
        value
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A memo holding only the last `(key, value)` pair, eliding repeated
/// identical calls.
#[derive(Clone)]
pub struct SingleMemo<K, V> {
    slot: Option<(K, V)>,
}

impl<K, V> Default for SingleMemo<K, V> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<K, V> SingleMemo<K, V>
where
    K: PartialEq,
    V: Clone,
{
    pub fn new() -> Self {
        Self { slot: None }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        match &self.slot {
            Some((stored, value)) if stored == key => Some(value),
            _ => None,
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.slot = Some((key, value));
    }

    pub fn get_or_insert_with(&mut self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some((stored, value)) = &self.slot {
            if *stored == key {
                return value.clone();
            }
        }
        let value = compute();
        self.slot = Some((key, value.clone()));
        value
    }
}
