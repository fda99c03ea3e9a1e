//! Collection benchmarks: insert, scan and index lookup throughput.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use nimbus::{equal, greater_equal, Collection, Document, IndexDef, Value};

// ============================================================================
// Helper: simple RNG for reproducible benchmarks
// ============================================================================

struct Rng {
    state: u64,
}

impl Rng {
    const fn new(seed: u64) -> Self {
        Self { state: if seed == 0 { 0x853c_49e6_748f_ea9b } else { seed } }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() as f64) / (u64::MAX as f64)
    }
}

const HOUSES: [&str; 4] = ["Gryffindor", "Ravenclaw", "Slytherine", "Hufflepuff"];

fn make_doc(rng: &mut Rng, index: u64) -> Document {
    let mut doc = Document::new(Value::from(index));
    doc.fields_mut().insert("name", format!("student_{index}"));
    doc.fields_mut()
        .insert("house", HOUSES[(rng.next_u64() % 4) as usize]);
    doc.fields_mut().insert("gpa", rng.next_f64() * 4.0);
    doc
}

fn populated_collection(count: u64) -> Collection {
    let mut rng = Rng::new(42);
    let mut coll = Collection::new();
    coll.create_index(IndexDef::new(["house"]));
    coll.create_index(IndexDef::new(["name"]).unique(true));
    for i in 0..count {
        coll.insert(make_doc(&mut rng, i));
    }
    coll
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for count in [100_u64, 1_000] {
        group.throughput(Throughput::Elements(count));
        group.bench_function(format!("indexed_{count}"), |b| {
            b.iter(|| {
                let mut rng = Rng::new(42);
                let mut coll = Collection::new();
                coll.create_index(IndexDef::new(["house"]));
                for i in 0..count {
                    coll.insert(make_doc(&mut rng, i));
                }
                black_box(coll.len())
            });
        });
    }
    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let coll = populated_collection(1_000);
    let mut group = c.benchmark_group("scan");
    group.throughput(Throughput::Elements(1_000));

    group.bench_function("equality", |b| {
        b.iter(|| {
            let queries = [equal("house", "Gryffindor")];
            black_box(coll.scan(&queries).count())
        });
    });

    group.bench_function("conjunction", |b| {
        b.iter(|| {
            let queries = [equal("house", "Ravenclaw"), greater_equal("gpa", 2.0)];
            black_box(coll.scan(&queries).count())
        });
    });
    group.finish();
}

fn bench_index_lookup(c: &mut Criterion) {
    let coll = populated_collection(1_000);
    let manager = coll.index_manager();

    c.bench_function("index_lookup_many", |b| {
        let index = manager.single_multi("house").expect("house index");
        b.iter(|| black_box(index.lookup_many(&Value::from("Gryffindor")).count()));
    });

    c.bench_function("index_lookup_one", |b| {
        let index = manager.single_unique("name").expect("name index");
        let key = Value::from("student_500");
        b.iter(|| black_box(index.lookup_one(&key).is_some()));
    });
}

criterion_group!(benches, bench_insert, bench_scan, bench_index_lookup);
criterion_main!(benches);
