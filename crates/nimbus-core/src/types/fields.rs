//! Document field maps.
//!
//! A [`FieldMap`] maps field names to [`Value`]s. Keys are unique, inserts
//! never overwrite, and iteration preserves insertion order so that
//! documents render the same way they were built.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::FieldAccessError;
use super::{Document, UniqueId, Value};

/// Extraction of a typed payload out of a [`Value`], used by
/// [`FieldMap::get_as`].
///
/// Implementations exist for every payload type a value can hold, including
/// the unsized `str` and `[Value]` views.
pub trait FieldType {
    /// Borrow the payload from `value` if the tag matches.
    fn extract(value: &Value) -> Option<&Self>;
}

macro_rules! impl_field_type {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl FieldType for $ty {
            #[inline]
            fn extract(value: &Value) -> Option<&Self> {
                match value {
                    Value::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        })*
    };
}

impl_field_type! {
    bool => Bool,
    i32 => Int32,
    i64 => Int64,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float,
    f64 => Double,
    String => String,
    UniqueId => Id,
}

impl FieldType for str {
    #[inline]
    fn extract(value: &Value) -> Option<&Self> {
        value.as_str()
    }
}

impl FieldType for [Value] {
    #[inline]
    fn extract(value: &Value) -> Option<&Self> {
        value.as_array()
    }
}

impl FieldType for Document {
    #[inline]
    fn extract(value: &Value) -> Option<&Self> {
        value.as_document()
    }
}

/// An insertion-ordered map from field name to [`Value`].
///
/// # Example
///
/// ```
/// use nimbus_core::{FieldAccessError, FieldMap};
///
/// let mut fields = FieldMap::new();
/// assert!(fields.insert("name", "Cho Chang"));
/// assert!(fields.insert("gpa", 3.56));
/// // Inserts never overwrite.
/// assert!(!fields.insert("name", "someone else"));
///
/// assert_eq!(fields.get_as::<str>("name"), Ok("Cho Chang"));
/// assert_eq!(fields.get_as::<i64>("gpa"), Err(FieldAccessError::WrongType));
/// assert_eq!(fields.get_as::<f64>("house"), Err(FieldAccessError::Missing));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldMap {
    entries: Vec<(String, Value)>,
}

impl FieldMap {
    /// Create an empty field map.
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Insert a field, keeping any existing value.
    ///
    /// Returns `true` if the field was inserted, `false` if the name was
    /// already present (the existing value is untouched).
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.entries.push((name, value.into()));
        true
    }

    /// Look up a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key.as_str() == name)
            .map(|(_, value)| value)
    }

    /// Typed lookup distinguishing a missing field from a present field of
    /// another type.
    ///
    /// # Errors
    ///
    /// [`FieldAccessError::Missing`] when no field has this name,
    /// [`FieldAccessError::WrongType`] when the field holds a different
    /// payload type.
    pub fn get_as<T: FieldType + ?Sized>(&self, name: &str) -> Result<&T, FieldAccessError> {
        let value = self.get(name).ok_or(FieldAccessError::Missing)?;
        T::extract(value).ok_or(FieldAccessError::WrongType)
    }

    /// Returns `true` if a field with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| key.as_str() == name)
    }

    /// Iterate over fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Key-order comparison used when field maps end up inside ordered
    /// index keys. Consistent with the order-insensitive equality below.
    pub(crate) fn cmp_as_key(&self, other: &Self) -> Ordering {
        let mut left: Vec<(&str, &Value)> = self.iter().collect();
        let mut right: Vec<(&str, &Value)> = other.iter().collect();
        left.sort_unstable_by(|a, b| a.0.cmp(b.0));
        right.sort_unstable_by(|a, b| a.0.cmp(b.0));
        for ((lk, lv), (rk, rv)) in left.iter().zip(&right) {
            let by_entry = lk.cmp(rk).then_with(|| lv.cmp(rv));
            if by_entry != Ordering::Equal {
                return by_entry;
            }
        }
        left.len().cmp(&right.len())
    }
}

// Field maps compare as maps: the same names mapped to equal values,
// regardless of insertion order.
impl PartialEq for FieldMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|(key, value)| other.get(key) == Some(value))
    }
}

impl Eq for FieldMap {}
