//! Dynamically typed values stored in document fields.
//!
//! This module provides the [`Value`] enum, the unit of field storage in
//! NimbusDB. A value always knows its own type tag ([`ValueKind`]) and the
//! tag and payload never disagree.
//!
//! Two comparison regimes coexist:
//!
//! - **Strong** equality ([`Value::equals_strong`], `==`) is tag-sensitive:
//!   values of different kinds are never equal.
//! - **Weak** equality ([`Value::equals_weak`], [`Value::weak_eq`]) compares
//!   numeric payloads across widths, so `Int32(3)`, `UInt64(3)` and
//!   `Double(3.0)` all agree. Index lookups and query predicates use the
//!   weak regime.
//!
//! # Example
//!
//! ```
//! use nimbus_core::{Value, ValueKind};
//!
//! let gpa = Value::from(3.5_f64);
//! assert_eq!(gpa.kind(), ValueKind::Double);
//! assert_eq!(gpa.as_f64(), Some(3.5));
//! assert_eq!(gpa.as_str(), None);
//!
//! // Weak equality crosses numeric widths; strong equality does not.
//! assert!(gpa.equals_weak(3.5_f32));
//! assert!(!gpa.equals_strong(3.5_f32));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::{Document, UniqueId};

/// The type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// Explicit absence of a value.
    Null,
    /// Boolean.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit unsigned integer.
    UInt32,
    /// 64-bit unsigned integer.
    UInt64,
    /// 32-bit floating point.
    Float,
    /// 64-bit floating point.
    Double,
    /// UTF-8 string.
    String,
    /// Generated document identifier.
    Id,
    /// Ordered list of values.
    Array,
    /// Nested document.
    Document,
}

impl ValueKind {
    /// Get a string representation of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::Id => "id",
            Self::Array => "array",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dynamically typed value stored in a document field.
///
/// The nested [`Document`] variant is boxed: a value may contain a document
/// whose fields contain further values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Explicit absence of a value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 32-bit unsigned integer.
    UInt32(u32),
    /// 64-bit unsigned integer.
    UInt64(u64),
    /// 32-bit floating point number.
    Float(f32),
    /// 64-bit floating point number.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Generated document identifier.
    Id(UniqueId),
    /// Ordered list of values.
    Array(Vec<Value>),
    /// Nested document.
    Document(Box<Document>),
}

/// A numeric payload widened to a common representation for weak comparison.
enum Numeric {
    Int(i128),
    Float(f64),
}

fn numeric_eq(a: &Numeric, b: &Numeric) -> bool {
    match (a, b) {
        (Numeric::Int(x), Numeric::Int(y)) => x == y,
        (Numeric::Float(x), Numeric::Float(y)) => x == y,
        (Numeric::Int(x), Numeric::Float(y)) | (Numeric::Float(y), Numeric::Int(x)) => {
            (*x as f64) == *y
        }
    }
}

fn numeric_cmp(a: &Numeric, b: &Numeric) -> Option<Ordering> {
    match (a, b) {
        (Numeric::Int(x), Numeric::Int(y)) => Some(x.cmp(y)),
        (Numeric::Float(x), Numeric::Float(y)) => x.partial_cmp(y),
        (Numeric::Int(x), Numeric::Float(y)) => (*x as f64).partial_cmp(y),
        (Numeric::Float(x), Numeric::Int(y)) => x.partial_cmp(&(*y as f64)),
    }
}

impl Value {
    /// The type tag of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int32(_) => ValueKind::Int32,
            Self::Int64(_) => ValueKind::Int64,
            Self::UInt32(_) => ValueKind::UInt32,
            Self::UInt64(_) => ValueKind::UInt64,
            Self::Float(_) => ValueKind::Float,
            Self::Double(_) => ValueKind::Double,
            Self::String(_) => ValueKind::String,
            Self::Id(_) => ValueKind::Id,
            Self::Array(_) => ValueKind::Array,
            Self::Document(_) => ValueKind::Document,
        }
    }

    /// Returns `true` if the value is null.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the value as a boolean if it is one.
    #[inline]
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as a 32-bit signed integer if it is one.
    #[inline]
    #[must_use]
    pub const fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int32(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a 64-bit signed integer if it is one.
    #[inline]
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a 32-bit unsigned integer if it is one.
    #[inline]
    #[must_use]
    pub const fn as_u32(&self) -> Option<u32> {
        match self {
            Self::UInt32(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a 64-bit unsigned integer if it is one.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt64(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a 32-bit float if it is one.
    #[inline]
    #[must_use]
    pub const fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the value as a 64-bit float if it is one.
    #[inline]
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the value as a string slice if it is one.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a document identifier if it is one.
    #[inline]
    #[must_use]
    pub const fn as_id(&self) -> Option<&UniqueId> {
        match self {
            Self::Id(id) => Some(id),
            _ => None,
        }
    }

    /// Returns the value as an array slice if it is one.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the value as a nested document if it is one.
    #[inline]
    #[must_use]
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Build an array value from anything convertible to values.
    ///
    /// # Example
    ///
    /// ```
    /// use nimbus_core::Value;
    ///
    /// let classes = Value::array(["Charms", "Potions"]);
    /// assert_eq!(classes.as_array().map(<[Value]>::len), Some(2));
    /// ```
    #[must_use]
    pub fn array<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::Array(items.into_iter().map(Into::into).collect())
    }

    /// Tag-sensitive equality against anything convertible to a value.
    ///
    /// The tag must match *and* the payload must be equal.
    #[must_use]
    pub fn equals_strong<T: Into<Value>>(&self, other: T) -> bool {
        *self == other.into()
    }

    /// Weak equality against anything convertible to a value.
    ///
    /// See [`Value::weak_eq`] for the semantics.
    #[must_use]
    pub fn equals_weak<T: Into<Value>>(&self, other: T) -> bool {
        self.weak_eq(&other.into())
    }

    /// Weak equality: numeric payloads compare as numbers across widths
    /// (booleans count as 0/1); strings, identifiers, nulls, arrays and
    /// documents compare within their own family; everything else is
    /// unequal.
    #[must_use]
    pub fn weak_eq(&self, other: &Value) -> bool {
        self.weak_eq_checked(other) == Some(true)
    }

    /// Weak equality that distinguishes "unequal" from "incomparable".
    ///
    /// Returns `None` when the two values belong to different families
    /// (e.g. a string against a number), which query predicates treat as
    /// "no match" rather than "not equal".
    #[must_use]
    pub fn weak_eq_checked(&self, other: &Value) -> Option<bool> {
        if let (Some(a), Some(b)) = (self.as_numeric(), other.as_numeric()) {
            return Some(numeric_eq(&a, &b));
        }
        match (self, other) {
            (Self::Null, Self::Null) => Some(true),
            (Self::String(a), Self::String(b)) => Some(a == b),
            (Self::Id(a), Self::Id(b)) => Some(a == b),
            (Self::Array(a), Self::Array(b)) => Some(a == b),
            (Self::Document(a), Self::Document(b)) => Some(a == b),
            _ => None,
        }
    }

    /// Weak ordering across the numeric family and within strings and
    /// identifiers.
    ///
    /// Returns `None` for incomparable pairs (different families, or a NaN
    /// float), which range query predicates treat as "no match".
    #[must_use]
    pub fn weak_cmp(&self, other: &Value) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (self.as_numeric(), other.as_numeric()) {
            return numeric_cmp(&a, &b);
        }
        match (self, other) {
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Id(a), Self::Id(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Widen a numeric payload for weak comparison.
    fn as_numeric(&self) -> Option<Numeric> {
        match self {
            Self::Bool(b) => Some(Numeric::Int(i128::from(*b))),
            Self::Int32(i) => Some(Numeric::Int(i128::from(*i))),
            Self::Int64(i) => Some(Numeric::Int(i128::from(*i))),
            Self::UInt32(i) => Some(Numeric::Int(i128::from(*i))),
            Self::UInt64(i) => Some(Numeric::Int(i128::from(*i))),
            Self::Float(f) => Some(Numeric::Float(f64::from(*f))),
            Self::Double(f) => Some(Numeric::Float(*f)),
            _ => None,
        }
    }

    /// Rank used to order values of different kinds relative to each other.
    const fn kind_rank(&self) -> u8 {
        self.kind() as u8
    }
}

// Strong equality is tag-sensitive. Floats compare by bit pattern so that
// `Eq`, `Ord` and `Hash` stay mutually consistent for index keys.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int32(a), Self::Int32(b)) => a == b,
            (Self::Int64(a), Self::Int64(b)) => a == b,
            (Self::UInt32(a), Self::UInt32(b)) => a == b,
            (Self::UInt64(a), Self::UInt64(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Id(a), Self::Id(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Document(a), Self::Document(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Same-kind payloads order naturally (floats by total order); values of
// different kinds order by tag rank. `BTreeMap` keys demand a lawful total
// order, so cross-kind comparison is deterministic rather than undefined.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int32(a), Self::Int32(b)) => a.cmp(b),
            (Self::Int64(a), Self::Int64(b)) => a.cmp(b),
            (Self::UInt32(a), Self::UInt32(b)) => a.cmp(b),
            (Self::UInt64(a), Self::UInt64(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Double(a), Self::Double(b)) => a.total_cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            (Self::Id(a), Self::Id(b)) => a.cmp(b),
            (Self::Array(a), Self::Array(b)) => a.cmp(b),
            (Self::Document(a), Self::Document(b)) => a.cmp_as_key(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }
}

// Hashing is defined for scalars, strings and identifiers; hashing a null,
// array or document key is a contract violation.
impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind_rank().hash(state);
        match self {
            Self::Bool(b) => b.hash(state),
            Self::Int32(i) => i.hash(state),
            Self::Int64(i) => i.hash(state),
            Self::UInt32(i) => i.hash(state),
            Self::UInt64(i) => i.hash(state),
            Self::Float(f) => f.to_bits().hash(state),
            Self::Double(f) => f.to_bits().hash(state),
            Self::String(s) => s.hash(state),
            Self::Id(id) => id.hash(state),
            Self::Null | Self::Array(_) | Self::Document(_) => {
                debug_assert!(false, "hash is not defined for {} values", self.kind());
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int32(i) => write!(f, "{i}"),
            Self::Int64(i) => write!(f, "{i}"),
            Self::UInt32(i) => write!(f, "{i}"),
            Self::UInt64(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
            Self::Id(id) => write!(f, "{id}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Document(doc) => write!(f, "{doc}"),
        }
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    #[inline]
    fn from(i: i32) -> Self {
        Self::Int32(i)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(i: i64) -> Self {
        Self::Int64(i)
    }
}

impl From<u32> for Value {
    #[inline]
    fn from(i: u32) -> Self {
        Self::UInt32(i)
    }
}

impl From<u64> for Value {
    #[inline]
    fn from(i: u64) -> Self {
        Self::UInt64(i)
    }
}

impl From<f32> for Value {
    #[inline]
    fn from(f: f32) -> Self {
        Self::Float(f)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(f: f64) -> Self {
        Self::Double(f)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<UniqueId> for Value {
    #[inline]
    fn from(id: UniqueId) -> Self {
        Self::Id(id)
    }
}

impl From<Vec<Value>> for Value {
    #[inline]
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl From<Document> for Value {
    #[inline]
    fn from(doc: Document) -> Self {
        Self::Document(Box::new(doc))
    }
}

impl From<&Value> for Value {
    #[inline]
    fn from(value: &Value) -> Self {
        value.clone()
    }
}
