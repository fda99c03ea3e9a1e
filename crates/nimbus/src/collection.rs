//! Collections: owners of documents and their indexes.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use nimbus_core::{Document, Value};

use crate::cursor::{Cursor, DocCursor};
use crate::index::{DocRef, IndexDef, IndexManager};
use crate::query::Query;

/// A collection of documents with a primary id index and any number of
/// secondary indexes.
///
/// Documents are shared between the storage, the primary index and every
/// secondary index; insert and erase keep all of them consistent before
/// returning. A stored document is read-only: fields are filled in before
/// insertion.
///
/// # Example
///
/// ```
/// use nimbus::{Collection, Document};
///
/// let mut coll = Collection::new();
/// let mut doc = Document::generated();
/// doc.fields_mut().insert("name", "Ron Weasley");
/// let id = doc.id().clone();
///
/// assert!(coll.insert(doc).is_some());
/// assert!(coll.lookup(&id).is_some());
/// assert!(coll.erase(&id));
/// assert!(coll.lookup(&id).is_none());
/// ```
#[derive(Default)]
pub struct Collection {
    /// Documents in insertion (storage) order.
    docs: Vec<DocRef>,
    /// Primary index from document id to document.
    primary: HashMap<Value, DocRef>,
    /// Every secondary index.
    indexes: IndexManager,
}

impl Collection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the index a declaration describes and back-fill it with every
    /// document already present.
    ///
    /// Returns `false` without side effects when an index over the same
    /// field set already exists (see [`IndexManager::create_index`]).
    pub fn create_index(&mut self, def: IndexDef) -> bool {
        let fields = def.fields().to_vec();
        let unique = def.is_unique();
        if !self.indexes.create_index(def) {
            return false;
        }
        self.indexes.backfill(&fields, unique, &self.docs);
        true
    }

    /// Insert a document, registering it with every applicable index.
    ///
    /// Returns a reference to the stored document, or `None` with no side
    /// effects when the id is already taken.
    pub fn insert(&mut self, doc: Document) -> Option<&Document> {
        if self.primary.contains_key(doc.id()) {
            debug!(id = %doc.id(), "insert refused: id already present");
            return None;
        }
        let doc = Rc::new(doc);
        self.primary.insert(doc.id().clone(), Rc::clone(&doc));
        self.indexes.register_document(&doc);
        self.docs.push(doc);
        self.debug_check_invariants();
        self.docs.last().map(|doc| &**doc)
    }

    /// Insert a fresh, empty document with the given id.
    ///
    /// Returns a reference to the stored document, or `None` when the id is
    /// already taken.
    pub fn insert_id(&mut self, id: impl Into<Value>) -> Option<&Document> {
        self.insert(Document::new(id))
    }

    /// Look up a document by id.
    #[must_use]
    pub fn lookup(&self, id: &Value) -> Option<&Document> {
        self.primary.get(id).map(|doc| &**doc)
    }

    /// Detach a document by id and yield ownership to the caller.
    ///
    /// The document is removed from the primary index, the storage and
    /// every secondary index before it is returned. Unknown ids are a soft
    /// failure.
    pub fn remove(&mut self, id: &Value) -> Option<Document> {
        let doc = self.primary.remove(id)?;
        if let Some(pos) = self.docs.iter().position(|stored| Rc::ptr_eq(stored, &doc)) {
            self.docs.remove(pos);
        }
        self.indexes.remove_document(&doc);
        self.debug_check_invariants();
        debug!(id = %doc.id(), "document removed");
        // Every other handle was just dropped, so unwrapping succeeds; the
        // clone fallback keeps this a total function regardless.
        Some(Rc::try_unwrap(doc).unwrap_or_else(|doc| (*doc).clone()))
    }

    /// Erase a document by id. Returns `false` for unknown ids.
    pub fn erase(&mut self, id: &Value) -> bool {
        self.remove(id).is_some()
    }

    /// Linear scan over the documents, yielding those matching every query.
    ///
    /// Queries are conjoined: a document matches when each query's field is
    /// present and its predicate accepts the field's value. Results come in
    /// document-storage order.
    #[must_use]
    pub fn scan(&self, queries: &[Query]) -> DocCursor<'_> {
        // The cursor drains from the back, so matches are collected in
        // reverse storage order.
        let mut matches: Vec<&Document> = Vec::new();
        for doc in self.docs.iter().rev() {
            if queries.iter().all(|query| query.matches(doc)) {
                matches.push(doc);
            }
        }
        Cursor::drain(matches)
    }

    /// Iterate over documents in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter().map(|doc| &**doc)
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Returns `true` if the collection holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// The collection's secondary indexes.
    #[must_use]
    pub fn index_manager(&self) -> &IndexManager {
        &self.indexes
    }

    /// An iteration cursor over the index covering `fields`, if any.
    ///
    /// See [`IndexManager::lookup`].
    #[must_use]
    pub fn index_lookup(&self, fields: &[&str]) -> Option<DocCursor<'_>> {
        self.indexes.lookup(fields)
    }

    /// The document storage and the primary index stay in bijection.
    fn debug_check_invariants(&self) {
        debug_assert_eq!(self.docs.len(), self.primary.len());
        debug_assert!(self
            .docs
            .iter()
            .all(|doc| self.primary.get(doc.id()).is_some_and(|p| Rc::ptr_eq(p, doc))));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::equal;
    use crate::IndexDef;

    fn student(name: &str, house: &str, gpa: f64) -> Document {
        let mut doc = Document::generated();
        doc.fields_mut().insert("name", name);
        doc.fields_mut().insert("house", house);
        doc.fields_mut().insert("gpa", gpa);
        doc
    }

    #[test]
    fn insert_then_lookup_returns_an_equal_document() {
        let mut coll = Collection::new();
        let doc = student("Harry Potter", "Gryffindor", 2.9);
        let id = doc.id().clone();
        let expected = doc.clone();

        assert!(coll.insert(doc).is_some());
        let found = coll.lookup(&id).expect("document");
        assert_eq!(*found, expected);
    }

    #[test]
    fn id_collision_is_a_soft_failure() {
        let mut coll = Collection::new();
        assert!(coll.insert_id(1_i32).is_some());
        assert!(coll.insert_id(1_i32).is_none());
        assert_eq!(coll.len(), 1);
    }

    #[test]
    fn erase_unknown_id_is_a_soft_failure() {
        let mut coll = Collection::new();
        coll.insert_id(1_i32);
        assert!(!coll.erase(&Value::from(2_i32)));
        assert!(coll.erase(&Value::from(1_i32)));
        assert!(!coll.erase(&Value::from(1_i32)));
        assert!(coll.is_empty());
    }

    #[test]
    fn remove_yields_ownership() {
        let mut coll = Collection::new();
        let doc = student("Luna Lovegood", "Ravenclaw", 3.5);
        let id = doc.id().clone();
        coll.insert(doc);

        let removed = coll.remove(&id).expect("owned document");
        assert_eq!(removed.fields().get_as::<str>("name"), Ok("Luna Lovegood"));
        assert!(coll.lookup(&id).is_none());
    }

    #[test]
    fn erase_clears_every_index() {
        let mut coll = Collection::new();
        coll.create_index(IndexDef::new(["house"]));
        coll.create_index(IndexDef::new(["name", "gpa"]).unique(true));

        let doc = student("Cho Chang", "Ravenclaw", 3.56);
        let id = doc.id().clone();
        coll.insert(doc);

        assert!(coll.erase(&id));
        let manager = coll.index_manager();
        assert_eq!(manager.single_multi("house").map(|i| i.len()), Some(0));
        assert_eq!(manager.compound_unique(&["name", "gpa"]).map(|i| i.len()), Some(0));
    }

    #[test]
    fn new_indexes_are_backfilled() {
        let mut coll = Collection::new();
        coll.insert(student("Harry Potter", "Gryffindor", 2.9));
        coll.insert(student("Luna Lovegood", "Ravenclaw", 3.5));

        assert!(coll.create_index(IndexDef::new(["house"])));
        assert_eq!(coll.index_manager().single_multi("house").map(|i| i.len()), Some(2));
    }

    #[test]
    fn scan_results_come_in_storage_order() {
        let mut coll = Collection::new();
        coll.insert(student("Harry Potter", "Gryffindor", 2.9));
        coll.insert(student("Draco Malfoy", "Slytherine", 3.12));
        coll.insert(student("Hermonie Granger", "Gryffindor", 4.0));

        let names: Vec<&str> = coll
            .scan(&[equal("house", "Gryffindor")])
            .filter_map(|doc| doc.fields().get_as::<str>("name").ok())
            .collect();
        assert_eq!(names, ["Harry Potter", "Hermonie Granger"]);
    }

    #[test]
    fn scan_with_no_queries_yields_everything() {
        let mut coll = Collection::new();
        coll.insert(student("a", "x", 1.0));
        coll.insert(student("b", "y", 2.0));

        assert_eq!(coll.scan(&[]).count(), 2);
    }

    #[test]
    fn insert_registers_with_existing_indexes() {
        let mut coll = Collection::new();
        coll.create_index(IndexDef::new(["house"]));
        coll.insert(student("Ron Weasley", "Gryffindor", 2.56));

        let cursor = coll.index_lookup(&["house"]).expect("index cursor");
        assert_eq!(cursor.count(), 1);
    }
}
