//! The index manager: registry of every secondary index of a collection.
//!
//! Four registries keyed by field name(s) hold the four index shapes. A
//! field name (or field-name tuple) lives in at most one registry of its
//! arity: a unique and a multi index over the same field set cannot
//! coexist. Document registration and removal fan out from here so that
//! every index stays consistent with document contents.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use nimbus_core::{Document, MultiString, Value};

use super::compound::{CompoundMultiIndex, CompoundUniqueIndex};
use super::single::{SingleMultiIndex, SingleUniqueIndex};
use super::{DocRef, KeyFilter};
use crate::cursor::DocCursor;

/// Declaration of a secondary index, built builder-style.
///
/// # Example
///
/// ```
/// use nimbus::{IndexDef, IndexManager, Value};
///
/// let mut manager = IndexManager::new();
/// assert!(manager.create_index(IndexDef::new(["house"])));
/// assert!(manager.create_index(
///     IndexDef::new(["name", "gpa"])
///         .unique(true)
///         .filtered(|key: &[Value]| !key[0].is_null()),
/// ));
/// // Duplicate declarations are refused without replacing.
/// assert!(!manager.create_index(IndexDef::new(["house"])));
/// ```
pub struct IndexDef {
    fields: Vec<String>,
    unique: bool,
    filter: Option<KeyFilter>,
}

impl IndexDef {
    /// Declare an index over one or more document fields.
    ///
    /// # Panics
    ///
    /// Panics if `fields` is empty: an index references at least one field.
    #[must_use]
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        assert!(!fields.is_empty(), "an index references at least one document field");
        Self { fields, unique: false, filter: None }
    }

    /// Whether the index rejects duplicate keys. Defaults to `false`.
    #[must_use]
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Attach a key filter; entries whose key fails it are skipped without
    /// error. The filter is fixed for the index's lifetime.
    #[must_use]
    pub fn filtered(mut self, filter: impl Fn(&[Value]) -> bool + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// The declared field names.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Whether the declaration is unique.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.unique
    }
}

impl fmt::Debug for IndexDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexDef")
            .field("fields", &self.fields)
            .field("unique", &self.unique)
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}

/// Registry of all secondary indexes of a collection.
#[derive(Default)]
pub struct IndexManager {
    single_unique: HashMap<String, SingleUniqueIndex>,
    single_multi: HashMap<String, SingleMultiIndex>,
    compound_unique: BTreeMap<MultiString, CompoundUniqueIndex>,
    compound_multi: BTreeMap<MultiString, CompoundMultiIndex>,
}

impl IndexManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the index a declaration describes.
    ///
    /// Returns `true` if the index was created. Returns `false` without
    /// replacing anything when the same field set already has an index in
    /// either the declared registry or its unique/multi sibling.
    pub fn create_index(&mut self, def: IndexDef) -> bool {
        let IndexDef { mut fields, unique, filter } = def;
        if fields.len() == 1 {
            let field = fields.remove(0);
            self.create_single(field, unique, filter)
        } else {
            let key = MultiString::new(&fields);
            self.create_compound(key, fields.len(), unique, filter)
        }
    }

    fn create_single(&mut self, field: String, unique: bool, filter: Option<KeyFilter>) -> bool {
        if unique {
            if self.single_multi.contains_key(&field) || self.single_unique.contains_key(&field) {
                return false;
            }
            debug!(field = %field, unique, "creating single-field index");
            self.single_unique.insert(field, SingleUniqueIndex::new(filter));
        } else {
            if self.single_unique.contains_key(&field) || self.single_multi.contains_key(&field) {
                return false;
            }
            debug!(field = %field, unique, "creating single-field index");
            self.single_multi.insert(field, SingleMultiIndex::new(filter));
        }
        true
    }

    fn create_compound(
        &mut self,
        key: MultiString,
        arity: usize,
        unique: bool,
        filter: Option<KeyFilter>,
    ) -> bool {
        if self.compound_unique.contains_key(&key) || self.compound_multi.contains_key(&key) {
            return false;
        }
        debug!(fields = %key, unique, "creating compound index");
        if unique {
            self.compound_unique.insert(key, CompoundUniqueIndex::new(arity, filter));
        } else {
            self.compound_multi.insert(key, CompoundMultiIndex::new(arity, filter));
        }
        true
    }

    /// Register a document with every index whose declared fields it
    /// carries.
    ///
    /// Indexes whose declared fields are not all present skip the document;
    /// filter rejections are skipped silently.
    pub fn register_document(&mut self, doc: &DocRef) {
        for (field, index) in &mut self.single_unique {
            if let Some(value) = doc.fields().get(field) {
                let outcome = index.insert(value.clone(), Rc::clone(doc));
                trace!(field = %field, ?outcome, "registered document with index");
            }
        }
        for (field, index) in &mut self.single_multi {
            if let Some(value) = doc.fields().get(field) {
                let outcome = index.insert(value.clone(), Rc::clone(doc));
                trace!(field = %field, ?outcome, "registered document with index");
            }
        }
        for (fields, index) in &mut self.compound_unique {
            if let Some(key) = project(doc, fields) {
                let outcome = index.insert(key, Rc::clone(doc));
                trace!(fields = %fields, ?outcome, "registered document with index");
            }
        }
        for (fields, index) in &mut self.compound_multi {
            if let Some(key) = project(doc, fields) {
                let outcome = index.insert(key, Rc::clone(doc));
                trace!(fields = %fields, ?outcome, "registered document with index");
            }
        }
    }

    /// Remove a document from every index it was registered with.
    ///
    /// After this returns, no index holds a handle to the document.
    pub fn remove_document(&mut self, doc: &DocRef) {
        for (field, index) in &mut self.single_unique {
            if let Some(value) = doc.fields().get(field) {
                index.remove_doc(value, doc);
            }
            debug_assert!(!index.contains_doc(doc), "document still indexed after removal");
        }
        for (field, index) in &mut self.single_multi {
            if let Some(value) = doc.fields().get(field) {
                index.erase_entry(value, doc);
            }
            debug_assert!(!index.contains_doc(doc), "document still indexed after removal");
        }
        for (fields, index) in &mut self.compound_unique {
            if let Some(key) = project(doc, fields) {
                index.remove_doc(&key, doc);
            }
            debug_assert!(!index.contains_doc(doc), "document still indexed after removal");
        }
        for (fields, index) in &mut self.compound_multi {
            if let Some(key) = project(doc, fields) {
                index.erase_entry(&key, doc);
            }
            debug_assert!(!index.contains_doc(doc), "document still indexed after removal");
        }
    }

    /// Register already-present documents with one just-created index.
    pub(crate) fn backfill(&mut self, fields: &[String], unique: bool, docs: &[DocRef]) {
        match (fields, unique) {
            ([field], true) => {
                if let Some(index) = self.single_unique.get_mut(field.as_str()) {
                    for doc in docs {
                        if let Some(value) = doc.fields().get(field) {
                            index.insert(value.clone(), Rc::clone(doc));
                        }
                    }
                }
            }
            ([field], false) => {
                if let Some(index) = self.single_multi.get_mut(field.as_str()) {
                    for doc in docs {
                        if let Some(value) = doc.fields().get(field) {
                            index.insert(value.clone(), Rc::clone(doc));
                        }
                    }
                }
            }
            (fields, true) => {
                let key = MultiString::new(fields);
                if let Some(index) = self.compound_unique.get_mut(&key) {
                    for doc in docs {
                        if let Some(projected) = project(doc, &key) {
                            index.insert(projected, Rc::clone(doc));
                        }
                    }
                }
            }
            (fields, false) => {
                let key = MultiString::new(fields);
                if let Some(index) = self.compound_multi.get_mut(&key) {
                    for doc in docs {
                        if let Some(projected) = project(doc, &key) {
                            index.insert(projected, Rc::clone(doc));
                        }
                    }
                }
            }
        }
    }

    /// An iteration cursor over the index covering `fields`, if any.
    ///
    /// A single field resolves to its unique or multi index. Two or more
    /// fields resolve to an exact compound match (unique first), falling
    /// back to any single-field index covering the leading field.
    #[must_use]
    pub fn lookup(&self, fields: &[&str]) -> Option<DocCursor<'_>> {
        match fields {
            [] => None,
            [field] => self.lookup_single(field),
            _ => self
                .compound_unique
                .iter()
                .find(|(key, _)| key.parts_eq(fields))
                .map(|(_, index)| index.docs())
                .or_else(|| {
                    self.compound_multi
                        .iter()
                        .find(|(key, _)| key.parts_eq(fields))
                        .map(|(_, index)| index.docs())
                })
                .or_else(|| self.lookup_single(fields[0])),
        }
    }

    fn lookup_single(&self, field: &str) -> Option<DocCursor<'_>> {
        if let Some(index) = self.single_unique.get(field) {
            return Some(index.docs());
        }
        self.single_multi.get(field).map(SingleMultiIndex::docs)
    }

    /// The unique index over `field`, if one exists.
    #[must_use]
    pub fn single_unique(&self, field: &str) -> Option<&SingleUniqueIndex> {
        self.single_unique.get(field)
    }

    /// The multi index over `field`, if one exists.
    #[must_use]
    pub fn single_multi(&self, field: &str) -> Option<&SingleMultiIndex> {
        self.single_multi.get(field)
    }

    /// The unique compound index over exactly `fields`, if one exists.
    #[must_use]
    pub fn compound_unique(&self, fields: &[&str]) -> Option<&CompoundUniqueIndex> {
        self.compound_unique
            .iter()
            .find(|(key, _)| key.parts_eq(fields))
            .map(|(_, index)| index)
    }

    /// The multi compound index over exactly `fields`, if one exists.
    #[must_use]
    pub fn compound_multi(&self, fields: &[&str]) -> Option<&CompoundMultiIndex> {
        self.compound_multi
            .iter()
            .find(|(key, _)| key.parts_eq(fields))
            .map(|(_, index)| index)
    }

    /// Total number of registered indexes across all registries.
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.single_unique.len()
            + self.single_multi.len()
            + self.compound_unique.len()
            + self.compound_multi.len()
    }

    /// Returns `true` if no indexes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index_count() == 0
    }
}

/// Project a document onto a compound index's declared fields.
///
/// Returns `None` when any declared field is missing.
fn project(doc: &Document, fields: &MultiString) -> Option<Vec<Value>> {
    fields
        .iter()
        .map(|field| doc.fields().get(field).cloned())
        .collect()
}

// Debug-format dump of every index and its entries; observable output for
// humans, not a contract for tests.
impl fmt::Display for IndexManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, index) in &self.single_unique {
            writeln!(f, "unique index on {field}:")?;
            for (key, doc) in index.entries() {
                writeln!(f, "{key} -> {doc}")?;
            }
        }
        for (field, index) in &self.single_multi {
            writeln!(f, "multi index on {field}:")?;
            for (key, doc) in index.entries() {
                writeln!(f, "{key} -> {doc}")?;
            }
        }
        for (fields, index) in &self.compound_unique {
            writeln!(f, "unique compound index on ({fields}):")?;
            for (key, doc) in index.entries() {
                writeln!(f, "{} -> {doc}", KeyList(key))?;
            }
        }
        for (fields, index) in &self.compound_multi {
            writeln!(f, "multi compound index on ({fields}):")?;
            for (key, doc) in index.entries() {
                writeln!(f, "{} -> {doc}", KeyList(key))?;
            }
        }
        Ok(())
    }
}

/// Renders a compound key as `(v1, v2, …)`.
struct KeyList<'a>(&'a [Value]);

impl fmt::Display for KeyList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str(")")
    }
}
