//! Secondary indexes over document fields.
//!
//! Four concrete index shapes cover the single-field/compound ×
//! unique/multi matrix, all backed by ordered maps from key to shared
//! document handles. The [`IndexManager`] owns every index of a collection
//! and fans document registration and removal out to the ones whose
//! declared fields the document actually carries.

pub mod compound;
pub mod manager;
pub mod single;

use std::rc::Rc;

use nimbus_core::{Document, Value};

pub use compound::{CompoundMultiIndex, CompoundUniqueIndex};
pub use manager::{IndexDef, IndexManager};
pub use single::{SingleMultiIndex, SingleUniqueIndex};

/// A shared handle to a document owned by a collection.
///
/// The collection is the logical owner; indexes and the primary id map hold
/// additional handles. Identity is pointer identity: two handles refer to
/// the same document exactly when they share an allocation.
pub type DocRef = Rc<Document>;

/// A predicate over an index key, fixed at index creation.
///
/// Single-field indexes pass a one-element slice. An insert whose key fails
/// the filter is skipped without error.
pub type KeyFilter = Box<dyn Fn(&[Value]) -> bool>;

/// Outcome of inserting a key into an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexInsert {
    /// The entry was added.
    Inserted,
    /// A unique index already holds this key; nothing changed.
    AlreadyExists,
    /// The index's key filter rejected the key; nothing changed.
    ///
    /// Not an error: filtered indexes deliberately cover a subset of
    /// documents.
    FilterRejected,
}

impl IndexInsert {
    /// Returns `true` if the entry was added.
    #[must_use]
    pub const fn is_inserted(self) -> bool {
        matches!(self, Self::Inserted)
    }
}

/// Shared pointer-identity test between a stored handle and a document.
pub(crate) fn is_same_doc(stored: &DocRef, doc: &Document) -> bool {
    std::ptr::eq(Rc::as_ptr(stored), doc)
}
