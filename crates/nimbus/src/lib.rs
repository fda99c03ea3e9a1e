//! NimbusDB
//!
//! An in-memory, schema-flexible document store with secondary indexes.
//!
//! # Overview
//!
//! Documents live in a [`Collection`], which owns the document storage, a
//! primary id index and an [`IndexManager`] holding any number of secondary
//! indexes (single-field or compound, unique or multi, each optionally
//! guarded by a key filter). Every insert and erase fans out through the
//! manager so that indexes always agree with document contents. Scans and
//! index lookups surface their results through the lazy [`Cursor`].
//!
//! # Example
//!
//! ```
//! use nimbus::{equal, greater_equal, Collection, Document, IndexDef};
//!
//! let mut students = Collection::new();
//! students.create_index(IndexDef::new(["house"]));
//!
//! let mut doc = Document::generated();
//! doc.fields_mut().insert("name", "Hermonie Granger");
//! doc.fields_mut().insert("house", "Gryffindor");
//! doc.fields_mut().insert("gpa", 4.0);
//! students.insert(doc);
//!
//! let matches: Vec<_> = students
//!     .scan(&[equal("house", "Gryffindor"), greater_equal("gpa", 3.0)])
//!     .collect();
//! assert_eq!(matches.len(), 1);
//! ```

pub mod collection;
pub mod cursor;
pub mod database;
pub mod index;
pub mod query;

// Re-export commonly used types
pub use collection::Collection;
pub use cursor::{Cursor, DocCursor};
pub use database::Database;
pub use index::{
    CompoundMultiIndex, CompoundUniqueIndex, DocRef, IndexDef, IndexInsert, IndexManager,
    KeyFilter, SingleMultiIndex, SingleUniqueIndex,
};
pub use query::{equal, greater, greater_equal, less, less_equal, not_equal, Query};

// Re-export the core data model
pub use nimbus_core::{
    Document, FieldAccessError, FieldMap, FieldType, MultiString, UniqueId, Value, ValueKind,
};
