//! Single-field indexes: one [`Value`] key per document.

use std::collections::BTreeMap;
use std::slice;

use nimbus_core::{Document, Value};

use super::{is_same_doc, DocRef, IndexInsert, KeyFilter};
use crate::cursor::{Cursor, DocCursor};

/// A unique index over one document field.
///
/// Equal keys are rejected on insert; every stored key maps to exactly one
/// document.
#[derive(Default)]
pub struct SingleUniqueIndex {
    map: BTreeMap<Value, DocRef>,
    filter: Option<KeyFilter>,
}

impl SingleUniqueIndex {
    pub(crate) fn new(filter: Option<KeyFilter>) -> Self {
        Self { map: BTreeMap::new(), filter }
    }

    /// Insert a `(key, document)` entry.
    ///
    /// Rejects keys failing the value filter (not an error) and keys that
    /// are already present.
    pub fn insert(&mut self, key: Value, doc: DocRef) -> IndexInsert {
        if let Some(filter) = &self.filter {
            if !filter(slice::from_ref(&key)) {
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

    /// Look up the entry for `key`, if present.
    #[must_use]
    pub fn lookup_one(&self, key: &Value) -> Option<(&Value, &Document)> {
        self.map.get_key_value(key).map(|(k, doc)| (k, &**doc))
    }

    /// All documents whose key satisfies `predicate`, in ascending key
    /// order.
    pub fn lookup_if<'a>(
        &'a self,
        mut predicate: impl FnMut(&Value) -> bool + 'a,
    ) -> DocCursor<'a> {
        Cursor::lazy(
            self.map
                .iter()
                .filter(move |(key, _)| predicate(key))
                .map(|(_, doc)| &**doc),
        )
    }

    /// Remove the entry for `key`. Returns the number of entries removed
    /// (0 or 1).
    pub fn erase(&mut self, key: &Value) -> usize {
        usize::from(self.map.remove(key).is_some())
    }

    /// Remove every entry whose key satisfies `predicate`; returns how many
    /// were removed.
    pub fn erase_if(&mut self, mut predicate: impl FnMut(&Value) -> bool) -> usize {
        let before = self.map.len();
        self.map.retain(|key, _| !predicate(key));
        before - self.map.len()
    }

    /// Remove the entry for `key` only if it refers to `doc`.
    pub(crate) fn remove_doc(&mut self, key: &Value, doc: &Document) -> bool {
        if self.map.get(key).is_some_and(|stored| is_same_doc(stored, doc)) {
            self.map.remove(key);
            return true;
        }
        false
    }

    /// All `(key, document)` entries in ascending key order.
    pub fn entries(&self) -> Cursor<'_, (&Value, &Document)> {
        Cursor::lazy(self.map.iter().map(|(key, doc)| (key, &**doc)))
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

    /// Number of fields this index is declared over (always 1).
    #[must_use]
    pub fn field_count(&self) -> usize {
        1
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

/// A multi index over one document field: equal keys are admitted.
#[derive(Default)]
pub struct SingleMultiIndex {
    map: BTreeMap<Value, Vec<DocRef>>,
    filter: Option<KeyFilter>,
    entries: usize,
}

impl SingleMultiIndex {
    pub(crate) fn new(filter: Option<KeyFilter>) -> Self {
        Self { map: BTreeMap::new(), filter, entries: 0 }
    }

    /// Insert a `(key, document)` entry. Duplicate keys are admitted.
    pub fn insert(&mut self, key: Value, doc: DocRef) -> IndexInsert {
        if let Some(filter) = &self.filter {
            if !filter(slice::from_ref(&key)) {
                return IndexInsert::FilterRejected;
            }
        }
        self.map.entry(key).or_default().push(doc);
        self.entries += 1;
        IndexInsert::Inserted
    }

    /// Look up any one entry for `key`.
    ///
    /// Which of several equal-keyed entries is returned is
    /// implementation-defined; callers must not rely on the tie-break.
    #[must_use]
    pub fn lookup_one(&self, key: &Value) -> Option<(&Value, &Document)> {
        self.map
            .get_key_value(key)
            .and_then(|(k, docs)| docs.first().map(|doc| (k, &**doc)))
    }

    /// All documents sharing `key`.
    pub fn lookup_many(&self, key: &Value) -> DocCursor<'_> {
        match self.map.get(key) {
            Some(docs) => Cursor::lazy(docs.iter().map(|doc| &**doc)),
            None => Cursor::empty(),
        }
    }

    /// All documents whose key satisfies `predicate`, in ascending key
    /// order.
    pub fn lookup_if<'a>(
        &'a self,
        mut predicate: impl FnMut(&Value) -> bool + 'a,
    ) -> DocCursor<'a> {
        Cursor::lazy(
            self.map
                .iter()
                .filter(move |(key, _)| predicate(key))
                .flat_map(|(_, docs)| docs.iter().map(|doc| &**doc)),
        )
    }

    /// Remove every entry for `key`; returns how many were removed.
    pub fn erase(&mut self, key: &Value) -> usize {
        let removed = self.map.remove(key).map_or(0, |docs| docs.len());
        self.entries -= removed;
        removed
    }

    /// Remove the single entry matching both `key` and `doc`.
    pub fn erase_entry(&mut self, key: &Value, doc: &Document) -> bool {
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
    pub fn erase_if(&mut self, mut predicate: impl FnMut(&Value) -> bool) -> usize {
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
    pub fn entries(&self) -> Cursor<'_, (&Value, &Document)> {
        Cursor::lazy(
            self.map
                .iter()
                .flat_map(|(key, docs)| docs.iter().map(move |doc| (key, &**doc))),
        )
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

    /// Number of fields this index is declared over (always 1).
    #[must_use]
    pub fn field_count(&self) -> usize {
        1
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

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    fn doc(name: &str) -> DocRef {
        let mut doc = Document::generated();
        doc.fields_mut().insert("name", name);
        Rc::new(doc)
    }

    #[test]
    fn unique_index_rejects_duplicate_keys() {
        let mut index = SingleUniqueIndex::new(None);
        let first = doc("a");
        let second = doc("b");

        assert_eq!(index.insert(Value::from("k"), first), IndexInsert::Inserted);
        assert_eq!(
            index.insert(Value::from("k"), second),
            IndexInsert::AlreadyExists
        );
        assert_eq!(index.len(), 1);

        let (_, found) = index.lookup_one(&Value::from("k")).expect("entry");
        assert_eq!(found.fields().get_as::<str>("name"), Ok("a"));
    }

    #[test]
    fn filter_rejection_is_not_an_error() {
        let mut index = SingleUniqueIndex::new(Some(Box::new(|key: &[Value]| {
            key[0].weak_cmp(&Value::from(3.0)) == Some(std::cmp::Ordering::Greater)
        })));

        assert_eq!(
            index.insert(Value::from(2.5), doc("low")),
            IndexInsert::FilterRejected
        );
        assert_eq!(index.insert(Value::from(3.5), doc("high")), IndexInsert::Inserted);
        assert_eq!(index.len(), 1);
        assert!(index.value_filter().is_some());
    }

    #[test]
    fn multi_index_admits_duplicates() {
        let mut index = SingleMultiIndex::new(None);
        index.insert(Value::from("x"), doc("a"));
        index.insert(Value::from("x"), doc("b"));
        index.insert(Value::from("y"), doc("c"));

        assert_eq!(index.len(), 3);
        assert_eq!(index.lookup_many(&Value::from("x")).count(), 2);
        assert_eq!(index.lookup_many(&Value::from("z")).count(), 0);
    }

    #[test]
    fn multi_erase_removes_all_matching_entries() {
        let mut index = SingleMultiIndex::new(None);
        index.insert(Value::from("x"), doc("a"));
        index.insert(Value::from("x"), doc("b"));

        assert_eq!(index.erase(&Value::from("x")), 2);
        assert!(index.is_empty());
        assert_eq!(index.erase(&Value::from("x")), 0);
    }

    #[test]
    fn erase_entry_targets_one_document() {
        let mut index = SingleMultiIndex::new(None);
        let a = doc("a");
        let b = doc("b");
        index.insert(Value::from("x"), Rc::clone(&a));
        index.insert(Value::from("x"), Rc::clone(&b));

        assert!(index.erase_entry(&Value::from("x"), &a));
        assert!(!index.erase_entry(&Value::from("x"), &a));
        assert_eq!(index.len(), 1);
        assert!(index.contains_doc(&b));
        assert!(!index.contains_doc(&a));
    }

    #[test]
    fn entries_iterate_in_ascending_key_order() {
        let mut index = SingleUniqueIndex::new(None);
        index.insert(Value::from(3), doc("c"));
        index.insert(Value::from(1), doc("a"));
        index.insert(Value::from(2), doc("b"));

        let keys: Vec<i32> = index
            .entries()
            .filter_map(|(key, _)| key.as_i32())
            .collect();
        assert_eq!(keys, [1, 2, 3]);
    }

    #[test]
    fn lookup_if_yields_documents() {
        let mut index = SingleMultiIndex::new(None);
        index.insert(Value::from(1), doc("a"));
        index.insert(Value::from(2), doc("b"));
        index.insert(Value::from(3), doc("c"));

        let names: Vec<&str> = index
            .lookup_if(|key| key.weak_cmp(&Value::from(2)) != Some(std::cmp::Ordering::Less))
            .filter_map(|doc| doc.fields().get_as::<str>("name").ok())
            .collect();
        assert_eq!(names, ["b", "c"]);
    }

    #[test]
    fn erase_if_counts_removed_entries() {
        let mut index = SingleMultiIndex::new(None);
        index.insert(Value::from(1), doc("a"));
        index.insert(Value::from(2), doc("b"));
        index.insert(Value::from(2), doc("c"));

        let removed = index.erase_if(|key| key.equals_weak(2));
        assert_eq!(removed, 2);
        assert_eq!(index.len(), 1);
    }
}
