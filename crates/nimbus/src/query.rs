//! Query predicates for collection scans.
//!
//! A query pairs a field name with a predicate over that field's value.
//! The builders below cover the comparison operators using weak semantics
//! (see [`Value::weak_eq`] and [`Value::weak_cmp`]), so a literal `3.0`
//! matches an `Int32` field holding `3`. Anything else is a custom
//! predicate built with [`Query::new`].

use std::cmp::Ordering;
use std::fmt;

use nimbus_core::{Document, Value};

/// A `(field, predicate)` pair consumed by
/// [`Collection::scan`](crate::Collection::scan).
///
/// # Example
///
/// ```
/// use nimbus::{Document, Query, Value};
///
/// // A custom predicate: "classes" contains "Transfiguration".
/// let taking = Query::new("classes", |value: &Value| {
///     value
///         .as_array()
///         .is_some_and(|items| items.iter().any(|item| item.equals_weak("Transfiguration")))
/// });
///
/// let mut doc = Document::generated();
/// doc.fields_mut().insert("classes", Value::array(["Transfiguration"]));
/// assert!(taking.matches(&doc));
/// ```
pub struct Query {
    field: String,
    predicate: Box<dyn Fn(&Value) -> bool>,
}

impl Query {
    /// Pair a field name with a custom predicate.
    #[must_use]
    pub fn new(field: impl Into<String>, predicate: impl Fn(&Value) -> bool + 'static) -> Self {
        Self { field: field.into(), predicate: Box::new(predicate) }
    }

    /// The queried field name.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns `true` when the document carries the field and the predicate
    /// accepts its value.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        doc.fields()
            .get(&self.field)
            .is_some_and(|value| (self.predicate)(value))
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query").field("field", &self.field).finish_non_exhaustive()
    }
}

/// Matches fields weakly equal to `value`.
#[must_use]
pub fn equal(field: impl Into<String>, value: impl Into<Value>) -> Query {
    let value = value.into();
    Query::new(field, move |candidate: &Value| candidate.weak_eq(&value))
}

/// Matches fields comparable to `value` but weakly unequal.
///
/// A field of an incomparable family (a string probed with a number, say)
/// does not match; "different in kind" is not "not equal".
#[must_use]
pub fn not_equal(field: impl Into<String>, value: impl Into<Value>) -> Query {
    let value = value.into();
    Query::new(field, move |candidate: &Value| {
        candidate.weak_eq_checked(&value) == Some(false)
    })
}

/// Matches fields weakly less than `value`.
#[must_use]
pub fn less(field: impl Into<String>, value: impl Into<Value>) -> Query {
    let value = value.into();
    Query::new(field, move |candidate: &Value| {
        candidate.weak_cmp(&value) == Some(Ordering::Less)
    })
}

/// Matches fields weakly less than or equal to `value`.
#[must_use]
pub fn less_equal(field: impl Into<String>, value: impl Into<Value>) -> Query {
    let value = value.into();
    Query::new(field, move |candidate: &Value| {
        matches!(candidate.weak_cmp(&value), Some(Ordering::Less | Ordering::Equal))
    })
}

/// Matches fields weakly greater than `value`.
#[must_use]
pub fn greater(field: impl Into<String>, value: impl Into<Value>) -> Query {
    let value = value.into();
    Query::new(field, move |candidate: &Value| {
        candidate.weak_cmp(&value) == Some(Ordering::Greater)
    })
}

/// Matches fields weakly greater than or equal to `value`.
#[must_use]
pub fn greater_equal(field: impl Into<String>, value: impl Into<Value>) -> Query {
    let value = value.into();
    Query::new(field, move |candidate: &Value| {
        matches!(candidate.weak_cmp(&value), Some(Ordering::Greater | Ordering::Equal))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(field: &str, value: impl Into<Value>) -> Document {
        let mut doc = Document::generated();
        doc.fields_mut().insert(field, value);
        doc
    }

    #[test]
    fn equal_uses_weak_semantics() {
        let doc = doc_with("gpa", 3_i32);
        assert!(equal("gpa", 3.0).matches(&doc));
        assert!(equal("gpa", 3_u64).matches(&doc));
        assert!(!equal("gpa", 4.0).matches(&doc));
    }

    #[test]
    fn missing_fields_never_match() {
        let doc = doc_with("gpa", 3.0);
        assert!(!equal("name", "anything").matches(&doc));
        assert!(!not_equal("name", "anything").matches(&doc));
        assert!(!greater("name", 1).matches(&doc));
    }

    #[test]
    fn not_equal_requires_a_comparable_value() {
        let doc = doc_with("house", "Gryffindor");
        assert!(not_equal("house", "Slytherine").matches(&doc));
        assert!(!not_equal("house", "Gryffindor").matches(&doc));
        // A number is not comparable with a string field.
        assert!(!not_equal("house", 3_i32).matches(&doc));
    }

    #[test]
    fn range_builders() {
        let doc = doc_with("gpa", 3.12);
        assert!(greater_equal("gpa", 3.0).matches(&doc));
        assert!(greater("gpa", 3.0).matches(&doc));
        assert!(less_equal("gpa", 3.12).matches(&doc));
        assert!(!less("gpa", 3.12).matches(&doc));
        assert!(greater_equal("gpa", 3.12).matches(&doc));
    }

    #[test]
    fn string_ranges_compare_lexicographically() {
        let doc = doc_with("name", "Cho Chang");
        assert!(less("name", "Draco Malfoy").matches(&doc));
        assert!(!less("name", "Cho Chang").matches(&doc));
    }
}
