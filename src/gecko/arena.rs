//! Append-only keyed tables for frame/stack/string deduplication.
//!
//! A `KeyedTable` is a Vec of values plus a map from composite key to the
//! value's stable index: the first insertion of a key assigns the next
//! index, later insertions return the existing one. Output order is
//! insertion order, never map iteration order.

// Table sizes are bounded by the sample count of one run, far below u32.
#![allow(clippy::cast_possible_truncation)]

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug)]
pub struct KeyedTable<K, V> {
    index: HashMap<K, u32>,
    values: Vec<V>,
}

impl<K, V> Default for KeyedTable<K, V> {
    fn default() -> Self {
        Self { index: HashMap::new(), values: Vec::new() }
    }
}

impl<K: Eq + Hash, V> KeyedTable<K, V> {
    /// Return the stable index for `key`, materializing the value on first
    /// sight.
    pub fn intern(&mut self, key: K, make: impl FnOnce() -> V) -> u32 {
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let idx = self.values.len() as u32;
        self.values.push(make());
        self.index.insert(key, idx);
        idx
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn into_values(self) -> Vec<V> {
        self.values
    }
}

/// Deduplicated string table; indices are stable in first-seen order.
#[derive(Debug, Default)]
pub struct StringTable {
    index: HashMap<String, u32>,
    strings: Vec<String>,
}

impl StringTable {
    pub fn intern(&mut self, s: &str) -> u32 {
        if let Some(&idx) = self.index.get(s) {
            return idx;
        }
        let idx = self.strings.len() as u32;
        self.strings.push(s.to_string());
        self.index.insert(s.to_string(), idx);
        idx
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.strings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyed_table_assigns_first_seen_ids() {
        let mut table: KeyedTable<(u32, u64), &str> = KeyedTable::default();

        assert_eq!(table.intern((1, 0x10), || "a"), 0);
        assert_eq!(table.intern((2, 0x20), || "b"), 1);
        assert_eq!(table.intern((1, 0x10), || "should not be built"), 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.into_values(), vec!["a", "b"]);
    }

    #[test]
    fn test_string_table_dedups() {
        let mut strings = StringTable::default();

        assert_eq!(strings.intern("libfoo"), 0);
        assert_eq!(strings.intern("read"), 1);
        assert_eq!(strings.intern("libfoo"), 0);
        assert_eq!(strings.into_vec(), vec!["libfoo", "read"]);
    }
}
