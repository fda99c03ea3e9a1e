//! End-to-end demo: a collection of Hogwarts students.
//!
//! This example demonstrates:
//! - Building documents with generated ids and mixed-type fields
//! - Declaring single-field and compound indexes
//! - Scanning with composed query predicates
//! - Rendering documents and index contents
//!
//! Run with: `cargo run --example hogwarts`

use nimbus::{equal, greater_equal, not_equal, Collection, Document, IndexDef, Query, Value};

fn student(name: &str, house: &str, gpa: f64, classes: &[&str]) -> Document {
    let mut doc = Document::generated();
    doc.fields_mut().insert("name", name);
    doc.fields_mut().insert("house", house);
    doc.fields_mut().insert("gpa", gpa);
    doc.fields_mut().insert("classes", Value::array(classes.iter().copied()));
    doc
}

fn average_gpa(students: &Collection, house: &str) {
    let mut total = 0.0;
    let mut count = 0_usize;
    for doc in students.scan(&[equal("house", house)]) {
        if let Ok(gpa) = doc.fields().get_as::<f64>("gpa") {
            total += gpa;
            count += 1;
        }
    }
    let avg = if count > 0 { total / count as f64 } else { 0.0 };
    println!("average gpa for {house}: {avg}");
}

fn taking_transfiguration() -> Query {
    Query::new("classes", |value: &Value| {
        value
            .as_array()
            .is_some_and(|classes| classes.iter().any(|class| class.equals_weak("Transfiguration")))
    })
}

fn main() {
    let mut students = Collection::new();
    students.create_index(IndexDef::new(["house"]));
    students.create_index(IndexDef::new(["name", "gpa"]));

    students.insert(student(
        "Harry Potter",
        "Gryffindor",
        2.9,
        &["Transfiguration", "Herbology"],
    ));
    students.insert(student("Ron Weasley", "Gryffindor", 2.56, &["Potions"]));
    students.insert(student(
        "Hermonie Granger",
        "Gryffindor",
        4.0,
        &["Charms", "Divination", "Potions", "Transfiguration"],
    ));
    students.insert(student("Luna Lovegood", "Ravenclaw", 3.5, &["Divination", "Charms"]));
    students.insert(student("Draco Malfoy", "Slytherine", 3.12, &["Charms", "Transfiguration"]));
    students.insert(student("Cho Chang", "Ravenclaw", 3.56, &["Charms", "Divination", "Herbology"]));

    println!("------------------------------------------");
    println!("all indices");
    println!("------------------------------------------");
    print!("{}", students.index_manager());

    println!("------------------------------------------");
    println!("avg gpa for each house");
    println!("------------------------------------------");
    average_gpa(&students, "Gryffindor");
    average_gpa(&students, "Ravenclaw");
    average_gpa(&students, "Slytherine");
    average_gpa(&students, "Hufflepuff");

    println!("------------------------------------------");
    println!("all gpa >= 3.0:");
    println!("------------------------------------------");
    for doc in students.scan(&[greater_equal("gpa", 3.0)]) {
        println!("{doc}");
    }

    println!("------------------------------------------");
    println!("all students taking Transfiguration:");
    println!("------------------------------------------");
    for doc in students.scan(&[taking_transfiguration()]) {
        println!("{doc}");
    }

    println!("------------------------------------------");
    println!("all students NOT in Gryffindor AND taking Transfiguration:");
    println!("------------------------------------------");
    for doc in students.scan(&[not_equal("house", "Gryffindor"), taking_transfiguration()]) {
        println!("{doc}");
    }
}
