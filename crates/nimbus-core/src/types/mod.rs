//! Core data types: values, identifiers, field maps and documents.

pub mod document;
pub mod fields;
pub mod id;
pub mod value;


pub use document::Document;
pub use fields::{FieldMap, FieldType};
pub use id::UniqueId;
pub use value::{Value, ValueKind};
