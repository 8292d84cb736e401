use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crate::api::Error;
use crate::runtime::dispatcher::Dispatcher;

fn dispatcher() -> Dispatcher {
    Dispatcher::spawn("scena-test", || {}).unwrap()
}

#[test]
fn test_run_sync_runs_on_engine_thread() {
    let dispatcher = dispatcher();
    let name = dispatcher
        .run_sync(|| thread::current().name().map(str::to_string))
        .unwrap();
    assert_eq!(name.as_deref(), Some("scena-test"));
    assert!(!dispatcher.is_current());
    dispatcher.shutdown();
}

#[test]
fn test_async_jobs_run_in_order() {
    let dispatcher = dispatcher();
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    for i in 0..100 {
        let seen = seen.clone();
        dispatcher.run_async(move || seen.lock().push(i)).unwrap();
    }
    // A sync call is queued behind every async one.
    dispatcher.run_sync(|| ()).unwrap();
    assert_eq!(*seen.lock(), (0..100).collect::<Vec<_>>());
    dispatcher.shutdown();
}

#[test]
fn test_panic_resumes_on_caller() {
    let dispatcher = Arc::new(dispatcher());
    let d = dispatcher.clone();
    let result = thread::spawn(move || d.run_sync(|| -> i32 { panic!("boom") })).join();
    assert!(result.is_err());

    // The engine thread survives.
    assert_eq!(dispatcher.run_sync(|| 7).unwrap(), 7);
    dispatcher.shutdown();
}

#[test]
fn test_async_panic_is_contained() {
    let dispatcher = dispatcher();
    dispatcher.run_async(|| panic!("ignored")).unwrap();
    assert_eq!(dispatcher.run_sync(|| 1).unwrap(), 1);
    dispatcher.shutdown();
}

#[test]
fn test_shutdown_drains_accepted_jobs() {
    let ran = Arc::new(AtomicUsize::new(0));
    let torn_down = Arc::new(AtomicUsize::new(0));
    let flag = torn_down.clone();
    let dispatcher = Dispatcher::spawn("scena-test", move || {
        flag.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

    for _ in 0..10 {
        let ran = ran.clone();
        dispatcher
            .run_async(move || {
                ran.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
    }
    dispatcher.shutdown();

    assert_eq!(ran.load(Ordering::SeqCst), 10);
    assert_eq!(torn_down.load(Ordering::SeqCst), 1);
    assert!(matches!(dispatcher.run_sync(|| ()), Err(Error::Closed)));
    assert!(matches!(dispatcher.run_async(|| ()), Err(Error::Closed)));

    // Idempotent.
    dispatcher.shutdown();
}

#[test]
fn test_nested_sync_call_runs_inline() {
    let dispatcher = Arc::new(dispatcher());
    let inner = dispatcher.clone();
    let value = dispatcher
        .run_sync(move || {
            assert!(inner.is_current());
            inner.run_sync(|| 21).unwrap() * 2
        })
        .unwrap();
    assert_eq!(value, 42);
    dispatcher.shutdown();
}
