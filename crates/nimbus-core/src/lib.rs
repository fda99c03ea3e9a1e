//! NimbusDB Core
//!
//! This crate provides the data model shared by every part of NimbusDB:
//! the dynamically typed [`Value`], the [`Document`] container and its
//! insertion-ordered [`FieldMap`], the [`UniqueId`] identifier, and the
//! compact [`MultiString`] tuple used to name compound indexes.
//!
//! # Overview
//!
//! A document is an `(id, fields)` pair. The id is itself a [`Value`]
//! (normally a generated [`UniqueId`]) and the fields map names to values of
//! any supported type. Values carry their own type tag and offer both
//! strong (tag-sensitive) and weak (cross-width numeric) comparison, which
//! is what makes a query literal like `3.0` match a `Double` field.
//!
//! # Example
//!
//! ```
//! use nimbus_core::{Document, Value};
//!
//! let mut doc = Document::generated();
//! doc.fields_mut().insert("name", "Luna Lovegood");
//! doc.fields_mut().insert("gpa", 3.5);
//! doc.fields_mut().insert("classes", Value::array(["Divination", "Charms"]));
//!
//! assert_eq!(doc.fields().get_as::<str>("name"), Ok("Luna Lovegood"));
//! assert!(doc.fields().get("gpa").is_some_and(|v| v.equals_weak(3.5_f64)));
//! ```

pub mod error;
pub mod multi_string;
pub mod types;

// Re-export commonly used types
pub use error::FieldAccessError;
pub use multi_string::MultiString;
pub use types::{Document, FieldMap, FieldType, UniqueId, Value, ValueKind};
