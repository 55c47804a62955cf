use smallvec::SmallVec;
use std::collections::HashMap;
use std::hash::Hash;

/// One-to-many lookup; keys disappear when their last value is removed
#[derive(Debug, Clone)]
pub struct MultiMap<K, V> {
    lookup: HashMap<K, SmallVec<[V; 2]>>,
}

impl<K: Eq + Hash, V: PartialEq> MultiMap<K, V> {
    pub fn new() -> Self {
        Self {
            lookup: HashMap::new(),
        }
    }

    pub fn add(&mut self, key: K, value: V) {
        self.lookup.entry(key).or_default().push(value);
    }

    /// Remove one occurrence of `value` under `key`
    pub fn remove_value(&mut self, key: &K, value: &V) {
        if let Some(values) = self.lookup.get_mut(key) {
            if let Some(pos) = values.iter().position(|v| v == value) {
                values.swap_remove(pos);
            }
            if values.is_empty() {
                self.lookup.remove(key);
            }
        }
    }

    pub fn get(&self, key: &K) -> &[V] {
        self.lookup.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.lookup.contains_key(key)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}

impl<K: Eq + Hash, V: PartialEq> Default for MultiMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V: PartialEq> FromIterator<(K, V)> for MultiMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.add(key, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let map: MultiMap<u32, &str> = [(1, "a"), (1, "b"), (2, "c")].into_iter().collect();
        assert_eq!(map.get(&1), &["a", "b"]);
        assert_eq!(map.get(&2), &["c"]);
        assert!(map.get(&3).is_empty());
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_remove_value_drops_empty_keys() {
        let mut map = MultiMap::new();
        map.add(1, 10);
        map.add(1, 11);
        map.remove_value(&1, &10);
        assert!(map.contains_key(&1));
        map.remove_value(&1, &11);
        assert!(!map.contains_key(&1));
        // removing from a missing key is a no-op
        map.remove_value(&7, &1);
        assert!(map.is_empty());
    }

    #[test]
    fn test_remove_only_one_duplicate() {
        let mut map = MultiMap::new();
        map.add("p", 3);
        map.add("p", 3);
        map.remove_value(&"p", &3);
        assert_eq!(map.get(&"p"), &[3]);
        map.remove_value(&"p", &3);
        assert!(!map.contains_key(&"p"));
    }
}
