use std::{collections::HashSet, hash::Hash};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A set that iterates in first-insertion order.
///
/// Downstream hashing of the build graph walks dependencies in this order, so it has to be
/// stable for a given input. Inserting an element that is already present is a no-op and
/// does not move it.
#[derive(Debug, Clone)]
pub struct OrderPreservingSet<T> {
    items: Vec<T>,
    seen: HashSet<T>,
}

impl<T> Default for OrderPreservingSet<T> {
    fn default() -> Self {
        Self {
            items: Vec::default(),
            seen: HashSet::default(),
        }
    }
}

impl<T: Hash + Eq + Clone> OrderPreservingSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    /// Returns false if the value was already present.
    pub fn insert(&mut self, value: T) -> bool {
        if self.seen.contains(&value) {
            return false;
        }
        self.seen.insert(value.clone());
        self.items.push(value);
        true
    }

    pub fn contains(&self, value: &T) -> bool {
        self.seen.contains(value)
    }
}

impl<T> OrderPreservingSet<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: PartialEq> PartialEq for OrderPreservingSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq> Eq for OrderPreservingSet<T> {}

impl<T: Hash + Eq + Clone> FromIterator<T> for OrderPreservingSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = OrderPreservingSet::new();
        set.extend(iter);
        set
    }
}

impl<T: Hash + Eq + Clone> Extend<T> for OrderPreservingSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for ele in iter {
            self.insert(ele);
        }
    }
}

impl<T> IntoIterator for OrderPreservingSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a OrderPreservingSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Serialize> Serialize for OrderPreservingSet<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.items.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for OrderPreservingSet<T>
where
    T: Deserialize<'de> + Hash + Eq + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items: Vec<T> = Vec::deserialize(deserializer)?;
        Ok(items.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_insertion_order() {
        let mut set = OrderPreservingSet::new();
        assert!(set.insert("a"));
        assert!(set.insert("b"));
        assert!(!set.insert("a"));
        assert!(set.insert("c"));

        assert_eq!(set.as_slice(), &["a", "b", "c"]);
        assert!(set.contains(&"b"));
        assert!(!set.contains(&"d"));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn equality_is_order_sensitive() {
        let ab: OrderPreservingSet<u32> = vec![1, 2].into_iter().collect();
        let ba: OrderPreservingSet<u32> = vec![2, 1].into_iter().collect();
        let aba: OrderPreservingSet<u32> = vec![1, 2, 1].into_iter().collect();
        assert_ne!(ab, ba);
        assert_eq!(ab, aba);
    }

    #[test]
    fn serializes_in_insertion_order() {
        let set: OrderPreservingSet<String> = ["z", "a", "m", "a"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["z","a","m"]"#);

        let back: OrderPreservingSet<String> =
            serde_json::from_str(r#"["z","a","z","m"]"#).unwrap();
        assert_eq!(back, set);
    }
}
