//! Index family and index manager integration tests.

use std::rc::Rc;

use nimbus::{
    CompoundMultiIndex, Document, IndexDef, IndexInsert, IndexManager, SingleMultiIndex,
    SingleUniqueIndex, Value,
};

fn doc(name: &str, house: &str, gpa: f64) -> Rc<Document> {
    let mut doc = Document::generated();
    doc.fields_mut().insert("name", name);
    doc.fields_mut().insert("house", house);
    doc.fields_mut().insert("gpa", gpa);
    Rc::new(doc)
}

#[test]
fn unique_index_size_grows_by_one_on_conflict() {
    let mut manager = IndexManager::new();
    manager.create_index(IndexDef::new(["name"]).unique(true));

    let first = doc("Draco Malfoy", "Slytherine", 3.12);
    let second = doc("Draco Malfoy", "Slytherine", 2.0);
    manager.register_document(&first);
    manager.register_document(&second);

    let index = manager.single_unique("name").expect("name index");
    assert_eq!(index.len(), 1);
    assert!(index.contains_doc(&first));
    assert!(!index.contains_doc(&second));
}

#[test]
fn multi_index_counts_equal_projections() {
    let mut manager = IndexManager::new();
    manager.create_index(IndexDef::new(["house"]));

    let n = 4;
    for i in 0..n {
        manager.register_document(&doc(&format!("student_{i}"), "Ravenclaw", 3.0));
    }

    let index = manager.single_multi("house").expect("house index");
    assert_eq!(index.lookup_many(&Value::from("Ravenclaw")).count(), n);
    assert_eq!(index.len(), n);
}

#[test]
fn manager_lookup_prefers_exact_compound_match() {
    let mut manager = IndexManager::new();
    manager.create_index(IndexDef::new(["name"]));
    manager.create_index(IndexDef::new(["name", "gpa"]).unique(true));

    manager.register_document(&doc("Cho Chang", "Ravenclaw", 3.56));

    // The exact compound tuple resolves to the compound index.
    assert!(manager.lookup(&["name", "gpa"]).is_some());
    // A tuple with no exact match falls back to the single index on the
    // leading field.
    assert!(manager.lookup(&["name", "house"]).is_some());
    // No index covers the leading field at all.
    assert!(manager.lookup(&["gpa", "name"]).is_none());
}

#[test]
fn compound_multi_admits_equal_tuples() {
    let mut manager = IndexManager::new();
    manager.create_index(IndexDef::new(["house", "gpa"]));

    manager.register_document(&doc("a", "Gryffindor", 3.0));
    manager.register_document(&doc("b", "Gryffindor", 3.0));

    let index = manager.compound_multi(&["house", "gpa"]).expect("index");
    assert_eq!(index.len(), 2);

    let key = [Value::from("Gryffindor"), Value::from(3.0)];
    assert_eq!(index.lookup_many(&key).count(), 2);
}

#[test]
fn direct_index_insert_outcomes() {
    let mut index = SingleUniqueIndex::default();
    let a = doc("a", "x", 1.0);
    let b = doc("b", "x", 2.0);

    assert_eq!(index.insert(Value::from(1), Rc::clone(&a)), IndexInsert::Inserted);
    assert_eq!(index.insert(Value::from(1), Rc::clone(&b)), IndexInsert::AlreadyExists);
    assert!(index.insert(Value::from(2), b).is_inserted());
    assert_eq!(index.erase(&Value::from(1)), 1);
    assert_eq!(index.erase(&Value::from(1)), 0);
}

#[test]
fn erase_if_spans_variants() {
    let mut single = SingleMultiIndex::default();
    single.insert(Value::from(1), doc("a", "x", 1.0));
    single.insert(Value::from(2), doc("b", "x", 2.0));
    single.insert(Value::from(3), doc("c", "x", 3.0));
    assert_eq!(single.erase_if(|key| key.equals_weak(2) || key.equals_weak(3)), 2);
    assert_eq!(single.len(), 1);

    let mut manager = IndexManager::new();
    manager.create_index(IndexDef::new(["house", "gpa"]));
    manager.register_document(&doc("a", "Gryffindor", 1.0));
    manager.register_document(&doc("b", "Ravenclaw", 2.0));

    let compound: &CompoundMultiIndex =
        manager.compound_multi(&["house", "gpa"]).expect("compound index");
    assert_eq!(compound.len(), 2);
    assert_eq!(compound.lookup_if(|key| key[0].equals_weak("Ravenclaw")).count(), 1);
}

#[test]
fn cleared_indexes_are_empty_but_registered() {
    let mut manager = IndexManager::new();
    manager.create_index(IndexDef::new(["house"]));
    manager.register_document(&doc("a", "Gryffindor", 1.0));

    assert_eq!(manager.index_count(), 1);
    assert!(!manager.is_empty());
}

#[test]
fn entry_cursors_pair_keys_with_documents() {
    let mut manager = IndexManager::new();
    manager.create_index(IndexDef::new(["gpa"]));
    manager.register_document(&doc("low", "x", 2.0));
    manager.register_document(&doc("high", "x", 4.0));

    let index = manager.single_multi("gpa").expect("gpa index");
    let entries: Vec<(f64, &str)> = index
        .entries()
        .filter_map(|(key, doc)| {
            let gpa = key.as_f64()?;
            let name = doc.fields().get_as::<str>("name").ok()?;
            Some((gpa, name))
        })
        .collect();
    assert_eq!(entries, [(2.0, "low"), (4.0, "high")]);
}

#[test]
fn removing_an_unregistered_document_is_harmless() {
    let mut manager = IndexManager::new();
    manager.create_index(IndexDef::new(["house"]));

    let registered = doc("a", "Gryffindor", 1.0);
    let stranger = doc("b", "Gryffindor", 2.0);
    manager.register_document(&registered);
    manager.remove_document(&stranger);

    assert_eq!(manager.single_multi("house").map(SingleMultiIndex::len), Some(1));
}
