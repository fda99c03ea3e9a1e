//! Error types for the core crate.

use thiserror::Error;

/// Outcome of a typed field access that did not produce a value.
///
/// Typed lookups through [`FieldMap::get_as`](crate::FieldMap::get_as)
/// distinguish a field that is absent from a field that is present but holds
/// a payload of a different type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum FieldAccessError {
    /// The named field does not exist in the document.
    #[error("field is missing")]
    Missing,

    /// The named field exists but holds a value of a different type.
    #[error("field holds a value of a different type")]
    WrongType,
}
