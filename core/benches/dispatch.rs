//! Benchmarks for calls crossing onto the engine thread.
//!
//! Run with: `cargo bench` in the core/ directory.
//!
//! Benchmark groups:
//! 1. round_trip: a blocking call from a foreign thread versus an inline one
//! 2. properties: reading and writing object properties through handles
//! 3. instantiate: compiling once and creating documents of growing size

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use scena_core::{Component, Engine, EngineOptions, Value};

fn engine() -> Engine {
    Engine::new(EngineOptions::default()).expect("engine failed to start")
}

fn bench_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_trip");
    let engine = engine();

    group.bench_function("foreign_thread", |b| {
        b.iter(|| engine.run_on_engine_thread(|| black_box(1 + 1)).unwrap())
    });

    group.bench_function("engine_thread", |b| {
        let inner = engine.clone();
        b.iter(|| {
            let inner = inner.clone();
            engine
                .run_on_engine_thread(move || inner.run_on_engine_thread(|| black_box(1)).unwrap())
                .unwrap()
        })
    });

    group.throughput(Throughput::Elements(100));
    group.bench_function("async_batch_100", |b| {
        b.iter(|| {
            for _ in 0..100 {
                engine.run_on_engine_thread_async(|| {}).unwrap();
            }
            // Drain the queue.
            engine.run_on_engine_thread(|| ()).unwrap();
        })
    });

    group.finish();
    engine.close();
}

fn bench_properties(c: &mut Criterion) {
    let mut group = c.benchmark_group("properties");
    let engine = engine();
    let mut component = Component::new(&engine);
    component
        .set_source(
            "bench.qml",
            "import QtQuick 2.0\nRectangle { property int count: 3; width: count * 10 }",
        )
        .expect("compile failed");
    let root = component
        .create(&engine.root_context())
        .expect("create failed");

    group.bench_function("read", |b| {
        b.iter(|| black_box(root.property("width").unwrap()))
    });

    group.bench_function("write", |b| {
        let mut n = 0i32;
        b.iter(|| {
            n = n.wrapping_add(1);
            root.set_property("count", Value::Int32(n)).unwrap()
        })
    });

    group.bench_function("call", |b| {
        b.iter(|| black_box(root.call("childCount", &[]).unwrap()))
    });

    group.finish();
    engine.close();
}

/// A document with `n` children, each binding against the root.
fn generate_document(n: usize) -> String {
    let mut source = String::from("import QtQuick 2.0\nItem {\n    id: root\n    property int base: 2\n");
    for i in 0..n {
        source.push_str(&format!("    Item {{ width: root.base * {} }}\n", i));
    }
    source.push_str("}\n");
    source
}

fn bench_instantiate(c: &mut Criterion) {
    let mut group = c.benchmark_group("instantiate");
    let engine = engine();

    for size in [10, 100, 400] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut component = Component::new(&engine);
            component
                .set_source("generated.qml", &generate_document(size))
                .expect("compile failed");
            let context = engine.root_context();
            b.iter(|| {
                let root = component.create(&context).unwrap();
                root.destroy().unwrap();
            });
        });
    }

    group.finish();
    engine.close();
}

criterion_group!(benches, bench_round_trip, bench_properties, bench_instantiate);
criterion_main!(benches);
