use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;

/// A concurrent memoization cache with a fixed capacity.
///
/// The cached computations are pure, so it does not matter which of two
/// threads racing to fill the same entry wins; the last insert is kept.
/// Once `capacity` entries are present, the oldest entry is evicted.
pub struct MemoCache<K, V> {
    capacity: usize,
    entries: RwLock<HashMap<K, V>>,
    // Keys in insertion order. Every key in `entries` appears here exactly
    // once.
    order: Mutex<VecDeque<K>>,
}

impl<K, V> MemoCache<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        MemoCache {
            capacity,
            entries: RwLock::new(HashMap::new()),
            order: Mutex::new(VecDeque::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    pub fn insert(&self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        // Lock order is `order` then `entries` everywhere.
        let mut order = self.order.lock();
        let mut entries = self.entries.write();
        if entries.insert(key.clone(), value).is_none() {
            order.push_back(key);
            while entries.len() > self.capacity {
                match order.pop_front() {
                    Some(oldest) => {
                        entries.remove(&oldest);
                    }
                    None => break,
                }
            }
        }
    }

    /// Return the cached value for `key`, computing and caching it with `f`
    /// if it is not present. Errors from `f` are returned and not cached.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: &K,
        f: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = f()?;
        self.insert(key.clone(), value.clone());
        Ok(value)
    }

    pub fn clear(&self) {
        let mut order = self.order.lock();
        let mut entries = self.entries.write();
        order.clear();
        entries.clear();
    }
}

impl<K, V> fmt::Debug for MemoCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MemoCache")
            .field("capacity", &self.capacity)
            .field("len", &self.entries.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::MemoCache;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn evicts_oldest_entry() {
        let cache = MemoCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("a", 10);
        assert_eq!(2, cache.len());

        cache.insert("c", 3);
        assert_eq!(2, cache.len());
        assert_eq!(None, cache.get(&"a"));
        assert_eq!(Some(2), cache.get(&"b"));
        assert_eq!(Some(3), cache.get(&"c"));
    }

    #[test]
    fn zero_capacity_caches_nothing() {
        let cache = MemoCache::new(0);
        cache.insert(1, "one");
        assert!(cache.is_empty());
    }

    #[test]
    fn errors_are_not_cached() {
        let cache: MemoCache<&str, usize> = MemoCache::new(10);
        let res: Result<usize, &str> = cache.get_or_try_insert_with(&"k", || Err("boom"));
        assert_eq!(Err("boom"), res);
        assert!(cache.is_empty());

        let res: Result<usize, &str> = cache.get_or_try_insert_with(&"k", || Ok(7));
        assert_eq!(Ok(7), res);
        let res: Result<usize, &str> =
            cache.get_or_try_insert_with(&"k", || panic!("value should be cached"));
        assert_eq!(Ok(7), res);
    }

    #[test]
    fn concurrent_inserts_stay_bounded() {
        let cache = Arc::new(MemoCache::new(16));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        cache.insert(i % 32, t);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(16, cache.len());
    }
}
