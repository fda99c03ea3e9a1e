//! Compound indexes: an ordered tuple of field values per document.
//!
//! Keys are stored as `Vec<Value>` but every lookup accepts a plain
//! `&[Value]` slice, so probing with a borrowed tuple never allocates.
//! Lookups with fewer than the declared number of leading values match by
//! prefix and yield the whole equal range in ascending order.

use std::collections::BTreeMap;
use std::ops::Bound;

use nimbus_core::{Document, Value};

use super::{is_same_doc, DocRef, IndexInsert, KeyFilter};
use crate::cursor::{Cursor, DocCursor};

/// A unique compound index over N ≥ 1 document fields.
pub struct CompoundUniqueIndex {
    arity: usize,
    map: BTreeMap<Vec<Value>, DocRef>,
    filter: Option<KeyFilter>,
}

impl CompoundUniqueIndex {
    pub(crate) fn new(arity: usize, filter: Option<KeyFilter>) -> Self {
        debug_assert!(arity >= 1, "a compound index spans at least one field");
        Self { arity, map: BTreeMap::new(), filter }
    }

    /// Insert a `(key, document)` entry.
    ///
    /// Rejects keys failing the value filter (not an error) and keys that
    /// are already present.
    pub fn insert(&mut self, key: Vec<Value>, doc: DocRef) -> IndexInsert {
        debug_assert_eq!(key.len(), self.arity, "key arity mismatch");
        if let Some(filter) = &self.filter {
            if !filter(&key) {
                return IndexInsert::FilterRejected;
            }
        }
        match self.map.entry(key) {
            std::collections::btree_map::Entry::Occupied(_) => IndexInsert::AlreadyExists,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(doc);
                IndexInsert::Inserted
            }
        }
    }

    /// Look up the entry for a full key tuple.
    #[must_use]
    pub fn lookup_one(&self, key: &[Value]) -> Option<(&[Value], &Document)> {
        debug_assert_eq!(key.len(), self.arity, "key arity mismatch");
        self.map
            .get_key_value(key)
            .map(|(k, doc)| (k.as_slice(), &**doc))
    }

    /// All documents whose key starts with `prefix`, in ascending key
    /// order.
    pub fn lookup_prefix<'a>(&'a self, prefix: &'a [Value]) -> DocCursor<'a> {
        debug_assert!(
            !prefix.is_empty() && prefix.len() <= self.arity,
            "prefix arity out of range"
        );
        Cursor::lazy(
            self.map
                .range::<[Value], _>((Bound::Included(prefix), Bound::Unbounded))
                .take_while(move |(key, _)| key.starts_with(prefix))
                .map(|(_, doc)| &**doc),
        )
    }

    /// All documents whose key satisfies `predicate`, in ascending key
    /// order.
    pub fn lookup_if<'a>(
        &'a self,
        mut predicate: impl FnMut(&[Value]) -> bool + 'a,
    ) -> DocCursor<'a> {
        Cursor::lazy(
            self.map
                .iter()
                .filter(move |(key, _)| predicate(key))
                .map(|(_, doc)| &**doc),
        )
    }

    /// Remove the entry for a full key tuple. Returns the number of entries
    /// removed (0 or 1).
    pub fn erase(&mut self, key: &[Value]) -> usize {
        usize::from(self.map.remove(key).is_some())
    }

    /// Remove every entry whose key satisfies `predicate`; returns how many
    /// were removed.
    pub fn erase_if(&mut self, mut predicate: impl FnMut(&[Value]) -> bool) -> usize {
        let before = self.map.len();
        self.map.retain(|key, _| !predicate(key));
        before - self.map.len()
    }

    /// Remove the entry for `key` only if it refers to `doc`.
    pub(crate) fn remove_doc(&mut self, key: &[Value], doc: &Document) -> bool {
        if self.map.get(key).is_some_and(|stored| is_same_doc(stored, doc)) {
            self.map.remove(key);
            return true;
        }
        false
    }

    /// All `(key, document)` entries in ascending key order.
    pub fn entries(&self) -> Cursor<'_, (&[Value], &Document)> {
        Cursor::lazy(self.map.iter().map(|(key, doc)| (key.as_slice(), &**doc)))
    }

    /// All documents in ascending key order.
    pub fn docs(&self) -> DocCursor<'_> {
        Cursor::lazy(self.map.values().map(|doc| &**doc))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of fields this index is declared over.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.arity
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Linear scan for a document handle; intended for debug assertions.
    #[must_use]
    pub fn contains_doc(&self, doc: &Document) -> bool {
        self.map.values().any(|stored| is_same_doc(stored, doc))
    }

    /// The value filter, if the index was created with one.
    #[must_use]
    pub fn value_filter(&self) -> Option<&KeyFilter> {
        self.filter.as_ref()
    }
}

/// A multi compound index over N ≥ 1 document fields: equal key tuples are
/// admitted.
pub struct CompoundMultiIndex {
    arity: usize,
    map: BTreeMap<Vec<Value>, Vec<DocRef>>,
    filter: Option<KeyFilter>,
    entries: usize,
}

impl CompoundMultiIndex {
    pub(crate) fn new(arity: usize, filter: Option<KeyFilter>) -> Self {
        debug_assert!(arity >= 1, "a compound index spans at least one field");
        Self { arity, map: BTreeMap::new(), filter, entries: 0 }
    }

    /// Insert a `(key, document)` entry. Duplicate keys are admitted.
    pub fn insert(&mut self, key: Vec<Value>, doc: DocRef) -> IndexInsert {
        debug_assert_eq!(key.len(), self.arity, "key arity mismatch");
        if let Some(filter) = &self.filter {
            if !filter(&key) {
                return IndexInsert::FilterRejected;
            }
        }
        self.map.entry(key).or_default().push(doc);
        self.entries += 1;
        IndexInsert::Inserted
    }

    /// Look up any one entry for a full key tuple.
    ///
    /// Which of several equal-keyed entries is returned is
    /// implementation-defined; callers must not rely on the tie-break.
    #[must_use]
    pub fn lookup_one(&self, key: &[Value]) -> Option<(&[Value], &Document)> {
        debug_assert_eq!(key.len(), self.arity, "key arity mismatch");
        self.map
            .get_key_value(key)
            .and_then(|(k, docs)| docs.first().map(|doc| (k.as_slice(), &**doc)))
    }

    /// All documents sharing a full key tuple.
    pub fn lookup_many(&self, key: &[Value]) -> DocCursor<'_> {
        debug_assert_eq!(key.len(), self.arity, "key arity mismatch");
        match self.map.get(key) {
            Some(docs) => Cursor::lazy(docs.iter().map(|doc| &**doc)),
            None => Cursor::empty(),
        }
    }

    /// All documents whose key starts with `prefix`, in ascending key
    /// order.
    pub fn lookup_prefix<'a>(&'a self, prefix: &'a [Value]) -> DocCursor<'a> {
        debug_assert!(
            !prefix.is_empty() && prefix.len() <= self.arity,
            "prefix arity out of range"
        );
        Cursor::lazy(
            self.map
                .range::<[Value], _>((Bound::Included(prefix), Bound::Unbounded))
                .take_while(move |(key, _)| key.starts_with(prefix))
                .flat_map(|(_, docs)| docs.iter().map(|doc| &**doc)),
        )
    }

    /// All documents whose key satisfies `predicate`, in ascending key
    /// order.
    pub fn lookup_if<'a>(
        &'a self,
        mut predicate: impl FnMut(&[Value]) -> bool + 'a,
    ) -> DocCursor<'a> {
        Cursor::lazy(
            self.map
                .iter()
                .filter(move |(key, _)| predicate(key))
                .flat_map(|(_, docs)| docs.iter().map(|doc| &**doc)),
        )
    }

    /// Remove every entry for a full key tuple; returns how many were
    /// removed.
    pub fn erase(&mut self, key: &[Value]) -> usize {
        let removed = self.map.remove(key).map_or(0, |docs| docs.len());
        self.entries -= removed;
        removed
    }

    /// Remove the single entry matching both `key` and `doc`.
    pub fn erase_entry(&mut self, key: &[Value], doc: &Document) -> bool {
        let Some(docs) = self.map.get_mut(key) else {
            return false;
        };
        let Some(pos) = docs.iter().position(|stored| is_same_doc(stored, doc)) else {
            return false;
        };
        docs.remove(pos);
        if docs.is_empty() {
            self.map.remove(key);
        }
        self.entries -= 1;
        true
    }

    /// Remove every entry whose key satisfies `predicate`; returns how many
    /// were removed.
    pub fn erase_if(&mut self, mut predicate: impl FnMut(&[Value]) -> bool) -> usize {
        let mut removed = 0;
        self.map.retain(|key, docs| {
            if predicate(key) {
                removed += docs.len();
                false
            } else {
                true
            }
        });
        self.entries -= removed;
        removed
    }

    /// All `(key, document)` entries in ascending key order.
    pub fn entries(&self) -> Cursor<'_, (&[Value], &Document)> {
        Cursor::lazy(self.map.iter().flat_map(|(key, docs)| {
            docs.iter().map(move |doc| (key.as_slice(), &**doc))
        }))
    }

    /// All documents in ascending key order.
    pub fn docs(&self) -> DocCursor<'_> {
        Cursor::lazy(self.map.values().flat_map(|docs| docs.iter().map(|doc| &**doc)))
    }

    /// Total number of entries across all keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
    }

    /// Returns `true` if the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Number of fields this index is declared over.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.arity
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.map.clear();
        self.entries = 0;
    }

    /// Linear scan for a document handle; intended for debug assertions.
    #[must_use]
    pub fn contains_doc(&self, doc: &Document) -> bool {
        self.map
            .values()
            .any(|docs| docs.iter().any(|stored| is_same_doc(stored, doc)))
    }

    /// The value filter, if the index was created with one.
    #[must_use]
    pub fn value_filter(&self) -> Option<&KeyFilter> {
        self.filter.as_ref()
    }
}
