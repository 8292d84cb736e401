#![allow(dead_code, unused_macros)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use scena::{Component, Engine, EngineOptions, LogMessage, Object};

/// An engine whose log output is collected for inspection.
pub struct Harness {
    pub engine: Engine,
    logs: Arc<Mutex<Vec<LogMessage>>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        let engine = Engine::new(options).unwrap();
        let logs = Arc::new(Mutex::new(Vec::new()));
        let sink = logs.clone();
        engine.set_logger(move |message: &LogMessage| sink.lock().push(message.clone()));
        Harness { engine, logs }
    }

    pub fn create(&self, source: &str) -> Object {
        let mut component = Component::new(&self.engine);
        component.set_source("test.qml", source).unwrap();
        component.create(&self.engine.root_context()).unwrap()
    }

    /// Collected messages as `identifier:line: text`.
    pub fn logs(&self) -> Vec<String> {
        self.logs.lock().iter().map(|m| m.to_string()).collect()
    }

    pub fn messages(&self) -> Vec<LogMessage> {
        self.logs.lock().clone()
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.engine.close();
    }
}

/// Declare a test that instantiates `source` and checks root properties.
///
/// ```ignore
/// scene_case! {
///     name: widening,
///     bindings: { "N" => 42isize },
///     source: { "import QtQuick 2.0\nItem { width: N * 2 }" },
///     properties: { "width" => Value::Float64(84.0) },
/// }
/// ```
macro_rules! scene_case {
    (
        name: $name:ident,
        $(bindings: { $($key:literal => $value:expr),* $(,)? },)?
        source: { $source:expr },
        properties: { $($prop:literal => $expected:expr),* $(,)? }
        $(, logs: [ $($log:literal),* $(,)? ])?
        $(,)?
    ) => {
        #[test]
        fn $name() {
            let harness = crate::common::Harness::new();
            let context = harness.engine.root_context();
            $($(context.set($key, $value).unwrap();)*)?
            let root = harness.create($source);
            $(
                pretty_assertions::assert_eq!(
                    root.property($prop).unwrap(),
                    $expected,
                    "property {}",
                    $prop
                );
            )*
            #[allow(unused_mut)]
            let mut expected_logs: Vec<&str> = Vec::new();
            $($(expected_logs.push($log);)*)?
            pretty_assertions::assert_eq!(harness.logs(), expected_logs);
        }
    };
}

/// A scratch directory removed on drop.
pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(label: &str) -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "scena-it-{}-{}-{}",
            label,
            std::process::id(),
            n
        ));
        let _ = std::fs::remove_dir_all(&path);
        std::fs::create_dir_all(&path).unwrap();
        TempDir { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let file = self.path.join(name);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&file, contents).unwrap();
        file
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
