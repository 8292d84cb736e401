use std::sync::Arc;

use pretty_assertions::assert_eq;

use crate::record::{ExposeError, Record, RecordDescriptor, binding_name};
use crate::values::{HostObject, Kind, ToValue, Value};

#[derive(crate::Record)]
#[allow(non_snake_case)]
struct Settings {
    Width: f64,
    Height: i32,
    #[record(rename = "Label")]
    title: String,
    #[record(skip)]
    #[allow(dead_code)]
    cache: Vec<u8>,
    parent: Option<Arc<Settings>>,
}

fn settings() -> Settings {
    Settings {
        Width: 1.5,
        Height: 2,
        title: "main".into(),
        cache: Vec::new(),
        parent: None,
    }
}

#[test]
fn test_binding_names_are_lowercased() {
    assert_eq!(binding_name("NumberOfSides"), "numberofsides");
    assert_eq!(binding_name("x"), "x");
}

#[test]
fn test_derived_descriptor() {
    let descriptor = Settings::descriptor();
    assert_eq!(descriptor.type_name(), "Settings");

    let bindings: Vec<_> = descriptor.fields().iter().map(|f| f.binding.as_str()).collect();
    assert_eq!(bindings, vec!["width", "height", "label", "parent"]);

    let names: Vec<_> = descriptor.fields().iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["Width", "Height", "Label", "parent"]);

    assert_eq!(descriptor.field("width").unwrap().kind, Some(Kind::Float64));
    assert_eq!(descriptor.field("height").unwrap().kind, Some(Kind::Int32));
    assert_eq!(descriptor.field("parent").unwrap().kind, None);
    assert!(descriptor.field("cache").is_none());

    // Built once per type.
    assert!(core::ptr::eq(descriptor, Settings::descriptor()));
}

#[test]
fn test_snapshot_reads_current_values() {
    let mut record = settings();
    let descriptor = Settings::descriptor();
    assert_eq!(
        descriptor.snapshot(&record),
        vec![
            ("width".to_string(), Value::Float64(1.5)),
            ("height".to_string(), Value::Int32(2)),
            ("label".to_string(), Value::String("main".into())),
            ("parent".to_string(), Value::Null),
        ]
    );

    record.Height = 7;
    assert_eq!(descriptor.snapshot(&record)[1].1, Value::Int32(7));
}

#[test]
fn test_derived_host_object_fields() {
    let child = Settings {
        parent: Some(Arc::new(settings())),
        ..settings()
    };
    assert_eq!(child.field("label"), Some(Value::String("main".into())));
    assert_eq!(child.field("Label"), None);
    assert_eq!(child.field("cache"), None);
    match child.field("parent") {
        Some(Value::Host(host)) => {
            let parent = host.downcast::<Settings>().unwrap();
            assert!(Arc::ptr_eq(&parent, child.parent.as_ref().unwrap()));
        }
        other => panic!("unexpected {:?}", other),
    }
}

struct Point {
    x: i64,
    y: i64,
}

#[test]
fn test_manual_descriptor() {
    let descriptor = RecordDescriptor::<Point>::builder("Point")
        .field("x", i64::KIND, |p| p.x.to_value())
        .field("y", i64::KIND, |p| p.y.to_value())
        .build()
        .unwrap();
    assert_eq!(
        descriptor.snapshot(&Point { x: 1, y: -2 }),
        vec![
            ("x".to_string(), Value::Int64(1)),
            ("y".to_string(), Value::Int64(-2)),
        ]
    );

    // Point itself has no Debug.
    let debug = format!("{:?}", descriptor);
    assert!(debug.starts_with("RecordDescriptor { type_name: \"Point\""), "{}", debug);
    assert!(debug.contains("binding: \"y\""), "{}", debug);
}

#[test]
fn test_manual_descriptor_collision() {
    let err = RecordDescriptor::<Point>::builder("Point")
        .field("X", None, |p| p.x.to_value())
        .field("x", None, |p| p.x.to_value())
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        ExposeError::Collision {
            record: "Point",
            first: "X",
            second: "x",
            binding: "x".into(),
        }
    );
    assert_eq!(
        err.to_string(),
        "Point: fields \"X\" and \"x\" both bind as \"x\""
    );
}

#[test]
fn test_manual_descriptor_empty_name() {
    let err = RecordDescriptor::<Point>::builder("Point")
        .field("", None, |_| Value::Null)
        .build()
        .unwrap_err();
    assert_eq!(err, ExposeError::EmptyName { record: "Point" });
}
