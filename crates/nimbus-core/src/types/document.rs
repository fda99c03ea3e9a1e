//! Documents: the unit of storage in a collection.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{FieldMap, UniqueId, Value};

/// A document: an identity paired with a map of fields.
///
/// The id is a [`Value`], normally a generated [`UniqueId`]. Fields are
/// filled in before the document is inserted into a collection; once
/// inserted, the collection only hands out shared references, so a stored
/// document is read-only.
///
/// # Example
///
/// ```
/// use nimbus_core::Document;
///
/// let mut doc = Document::generated();
/// doc.fields_mut().insert("name", "Draco Malfoy");
/// doc.fields_mut().insert("gpa", 3.12);
///
/// assert!(doc.id().as_id().is_some());
/// assert_eq!(doc.fields().get_as::<f64>("gpa"), Ok(&3.12));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    id: Value,
    fields: FieldMap,
}

impl Document {
    /// Create a document with the given identity and no fields.
    #[must_use]
    pub fn new(id: impl Into<Value>) -> Self {
        Self { id: id.into(), fields: FieldMap::new() }
    }

    /// Create a document with a freshly generated [`UniqueId`].
    #[must_use]
    pub fn generated() -> Self {
        Self::new(UniqueId::generate())
    }

    /// The document's identity.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> &Value {
        &self.id
    }

    /// The document's fields.
    #[inline]
    #[must_use]
    pub const fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Mutable access to the fields, for filling in a document before it is
    /// inserted into a collection.
    #[inline]
    pub fn fields_mut(&mut self) -> &mut FieldMap {
        &mut self.fields
    }

    /// Key-order comparison used when documents end up inside ordered index
    /// keys: identity first, then fields.
    pub(crate) fn cmp_as_key(&self, other: &Self) -> Ordering {
        self.id
            .cmp(&other.id)
            .then_with(|| self.fields.cmp_as_key(&other.fields))
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{\n  _id: {}", self.id)?;
        for (name, value) in self.fields.iter() {
            write!(f, ",\n  {name}: {value}")?;
        }
        f.write_str("\n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_requires_id_and_fields() {
        let mut a = Document::new(1_i32);
        a.fields_mut().insert("x", "y");

        let mut b = Document::new(1_i32);
        b.fields_mut().insert("x", "y");
        assert_eq!(a, b);

        let c = Document::new(1_i32);
        assert_ne!(a, c);

        let mut d = Document::new(2_i32);
        d.fields_mut().insert("x", "y");
        assert_ne!(a, d);
    }

    #[test]
    fn display_renders_id_then_fields() {
        let mut doc = Document::new(7_i32);
        doc.fields_mut().insert("name", "Luna Lovegood");
        doc.fields_mut().insert("classes", Value::array(["Divination", "Charms"]));

        assert_eq!(
            doc.to_string(),
            "{\n  _id: 7,\n  name: Luna Lovegood,\n  classes: [Divination, Charms]\n}"
        );
    }

    #[test]
    fn nested_documents_render_recursively() {
        let mut inner = Document::new(1_i32);
        inner.fields_mut().insert("a", 2_i32);

        let mut outer = Document::new(2_i32);
        outer.fields_mut().insert("inner", inner);

        assert_eq!(
            outer.to_string(),
            "{\n  _id: 2,\n  inner: {\n  _id: 1,\n  a: 2\n}\n}"
        );
    }
}
