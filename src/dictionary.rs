use linked_hash_map::LinkedHashMap;

use crate::bytestring::ByteString;
use crate::value::Value;

/// A bencode dictionary.
///
/// Keys are unique byte strings. Lookups are hashed, and the order in which keys
/// were inserted (for decoded dictionaries: the order they appeared in the
/// input) is kept alongside. The canonical byte-wise order used on the wire is
/// available separately through [`Dictionary::sorted_keys`].
///
/// Equality is map equality and ignores insertion order.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: LinkedHashMap<ByteString, Value>,
}

impl Dictionary {
    pub fn new() -> Dictionary {
        Dictionary { entries: LinkedHashMap::new() }
    }

    /// Inserts a value, returning the one it replaced.
    ///
    /// A replaced key is moved to the end of the insertion order, as if it had
    /// been written for the first time.
    pub fn insert(&mut self, key: impl Into<ByteString>, value: Value) -> Option<Value> {
        let key = key.into();
        let old = self.entries.remove(&key);
        self.entries.insert(key, value);
        old
    }

    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &[u8]) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &ByteString> {
        self.entries.keys()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ByteString, &Value)> {
        self.entries.iter()
    }

    /// Keys in canonical order: raw byte-wise ascending.
    pub fn sorted_keys(&self) -> Vec<&ByteString> {
        let mut keys: Vec<&ByteString> = self.entries.keys().collect();
        keys.sort_unstable();
        keys
    }

    /// Entries in canonical order.
    pub fn iter_sorted(&self) -> impl Iterator<Item = (&ByteString, &Value)> {
        let mut entries: Vec<(&ByteString, &Value)> = self.entries.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }
}

impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.entries.get(key) == Some(value))
    }
}

impl Eq for Dictionary {}

impl<K: Into<ByteString>> FromIterator<(K, Value)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut dict = Dictionary::new();
        dict.extend(iter);
        dict
    }
}

impl<K: Into<ByteString>> Extend<(K, Value)> for Dictionary {
    fn extend<I: IntoIterator<Item = (K, Value)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl IntoIterator for Dictionary {
    type Item = (ByteString, Value);
    type IntoIter = linked_hash_map::IntoIter<ByteString, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
