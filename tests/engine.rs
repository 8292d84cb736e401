mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use pretty_assertions::assert_eq;
use scena::{Component, Engine, EngineOptions, Error, LogLevel, LogMessage, Value};

#[test]
fn engine_thread_is_named() {
    let engine = Engine::new(EngineOptions::default().with_thread_name("scena-it")).unwrap();
    let name = engine
        .run_on_engine_thread(|| thread::current().name().map(str::to_string))
        .unwrap();
    assert_eq!(name.as_deref(), Some("scena-it"));
    assert!(!engine.is_engine_thread());
    assert!(
        engine
            .run_on_engine_thread({
                let engine = engine.clone();
                move || engine.is_engine_thread()
            })
            .unwrap()
    );
}

#[test]
fn engines_are_independent() {
    let a = Engine::new(EngineOptions::default()).unwrap();
    let b = Engine::new(EngineOptions::default()).unwrap();
    assert_ne!(a.id(), b.id());
    assert_ne!(a, b);

    a.root_context().set("n", 1i32).unwrap();
    assert!(b.root_context().get("n").is_err());

    a.close();
    assert!(a.is_closed());
    assert!(!b.is_closed());
    b.root_context().set("n", 2i32).unwrap();
}

#[test]
fn close_is_idempotent_and_final() {
    let engine = Engine::new(EngineOptions::default()).unwrap();
    let clone = engine.clone();
    engine.close();
    clone.close();
    assert!(clone.is_closed());
    assert!(matches!(clone.object_count(), Err(Error::Closed)));
    assert!(matches!(
        clone.run_on_engine_thread(|| ()),
        Err(Error::Closed)
    ));
}

#[test]
#[should_panic(expected = "engine already closed")]
fn root_context_of_closed_engine_panics() {
    let engine = Engine::new(EngineOptions::default()).unwrap();
    engine.close();
    let _ = engine.root_context();
}

#[test]
fn close_destroys_every_object() {
    let harness = common::Harness::new();
    let root = harness.create("import QtQuick 2.0\nItem { Item {} Item {} }");
    assert_eq!(harness.engine.object_count().unwrap(), 3);
    harness.engine.close();
    assert!(!root.is_alive());
}

#[test]
fn calls_from_many_threads() {
    let harness = common::Harness::new();
    let root = harness.create("import QtQuick 2.0\nItem { property int hits: 0 }");

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let root = root.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    root.engine()
                        .unwrap()
                        .run_on_engine_thread({
                            let root = root.clone();
                            move || {
                                // Nested calls on the engine thread run inline.
                                let hits = root.property_as::<i32>("hits").unwrap();
                                root.set_property("hits", hits + 1).unwrap();
                            }
                        })
                        .unwrap();
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    assert_eq!(root.property("hits").unwrap(), Value::Int32(200));
}

#[test]
fn sync_and_async_writes_from_two_threads() {
    let harness = common::Harness::new();
    let root = harness.create("import QtQuick 2.0\nItem { property int value: 0 }");
    const WRITES: i32 = 200;

    let writer = thread::spawn({
        let root = root.clone();
        move || {
            for n in 1..=WRITES {
                root.set_property_async("value", n).unwrap();
            }
        }
    });
    let setter = thread::spawn({
        let root = root.clone();
        move || {
            for n in 1..=WRITES {
                root.set_property("value", -n).unwrap();
                // Either our own write or a later queued one, never a torn value.
                let seen = root.property_as::<i32>("value").unwrap();
                assert!(seen == -n || (1..=WRITES).contains(&seen), "{}", seen);
            }
        }
    });
    writer.join().unwrap();
    setter.join().unwrap();

    // Runs after every queued write.
    harness.engine.run_on_engine_thread(|| ()).unwrap();
    let last = root.property_as::<i32>("value").unwrap();
    assert!(last == WRITES || last == -WRITES, "{}", last);
}

#[test]
fn async_jobs_run_in_order() {
    let engine = Engine::new(EngineOptions::default()).unwrap();
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    for i in 0..20 {
        let seen = seen.clone();
        engine
            .run_on_engine_thread_async(move || seen.lock().push(i))
            .unwrap();
    }
    engine.run_on_engine_thread(|| ()).unwrap();
    assert_eq!(*seen.lock(), (0..20).collect::<Vec<_>>());
}

#[test]
fn panics_reach_the_caller() {
    let engine = Engine::new(EngineOptions::default()).unwrap();
    let result = thread::spawn({
        let engine = engine.clone();
        move || engine.run_on_engine_thread(|| -> i32 { panic!("exploded") })
    })
    .join();
    assert!(result.is_err());

    // The engine keeps working.
    assert_eq!(engine.run_on_engine_thread(|| 5).unwrap(), 5);
}

#[test]
fn loggers_may_call_back_into_the_engine() {
    let engine = Engine::new(EngineOptions::default()).unwrap();
    let counted = Arc::new(AtomicUsize::new(0));
    engine.set_logger({
        let engine = engine.clone();
        let counted = counted.clone();
        move |message: &LogMessage| {
            assert_eq!(message.level, LogLevel::Warning);
            let objects = engine.object_count().unwrap();
            counted.store(objects, Ordering::SeqCst);
        }
    });

    let mut component = Component::new(&engine);
    component
        .set_source("cb.qml", "import QtQuick 2.0\nItem { Item {} Component.onCompleted: console.warn('hi') }")
        .unwrap();
    let _root = component.create(&engine.root_context()).unwrap();
    assert_eq!(counted.load(Ordering::SeqCst), 2);

    // Break the logger's reference cycle.
    engine.close();
}

#[test]
fn dropping_every_handle_stops_the_engine() {
    let seen = Arc::new(AtomicUsize::new(0));
    {
        let engine = Engine::new(EngineOptions::default()).unwrap();
        let seen = seen.clone();
        engine
            .run_on_engine_thread_async(move || {
                seen.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
    }
    // Shutdown drains queued jobs before the thread exits.
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}
