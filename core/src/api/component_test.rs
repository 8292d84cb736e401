use indoc::indoc;
use pretty_assertions::assert_eq;

use crate::api::{Component, Engine, EngineOptions, Error, Status};
use crate::test_utils::TempDir;
use crate::values::Value;

fn engine() -> Engine {
    Engine::new(EngineOptions::default()).unwrap()
}

#[test]
fn test_status_transitions() {
    let engine = engine();
    let mut ok = Component::new(&engine);
    assert_eq!(ok.status(), Status::Uncompiled);
    ok.set_source("ok.qml", "import QtQuick 2.0\nItem {}").unwrap();
    assert_eq!(ok.status(), Status::Compiled);
    assert!(ok.error().is_none());

    let mut bad = Component::new(&engine);
    let err = bad
        .set_source("bad.qml", "import QtQuick 2.0\nItem {\n  bogus: 1\n}")
        .unwrap_err();
    assert_eq!(bad.status(), Status::Failed);
    assert_eq!(
        err.to_string(),
        "bad.qml:3 Cannot assign to non-existent property \"bogus\""
    );
    let stored = bad.error().unwrap();
    assert_eq!(stored.line(), 3);
    assert_eq!(stored.identifier(), "bad.qml");
}

#[test]
fn test_compile_errors() {
    let engine = engine();
    let cases = [
        ("Item {}", "x.qml:1 Item is not a type"),
        ("import Nope 1.0\nItem {}", "x.qml:1 module \"Nope\" is not installed"),
        (
            "import QtQuick 2.0\nItem { Window {} }",
            "x.qml:2 Window is not a type",
        ),
        (
            "import QtQuick 2.0\nItem {\n  width: 'wide'\n}",
            "x.qml:3 Invalid property assignment: number expected",
        ),
    ];
    for (source, expected) in cases {
        let mut component = Component::new(&engine);
        let err = component.set_source("x.qml", source).unwrap_err();
        assert!(matches!(err, Error::Compile(_)), "{:?}", err);
        assert_eq!(err.to_string(), expected);
    }
}

#[test]
#[should_panic(expected = "component source already set")]
fn test_set_source_twice_panics() {
    let engine = engine();
    let mut component = Component::new(&engine);
    component.set_source("a.qml", "import QtQuick 2.0\nItem {}").unwrap();
    let _ = component.set_source("a.qml", "import QtQuick 2.0\nItem {}");
}

#[test]
#[should_panic(expected = "component source already set")]
fn test_failed_component_is_terminal() {
    let engine = engine();
    let mut component = Component::new(&engine);
    let _ = component.set_source("a.qml", "Item {}");
    let _ = component.set_source("a.qml", "import QtQuick 2.0\nItem {}");
}

#[test]
#[should_panic(expected = "component has no source")]
fn test_create_uncompiled_panics() {
    let engine = engine();
    let component = Component::new(&engine);
    let _ = component.create(&engine.root_context());
}

#[test]
#[should_panic(expected = "component failed to compile: a.qml:1 Item is not a type")]
fn test_create_failed_panics() {
    let engine = engine();
    let mut component = Component::new(&engine);
    let _ = component.set_source("a.qml", "Item {}");
    let _ = component.create(&engine.root_context());
}

#[test]
#[should_panic(expected = "context belongs to a different engine")]
fn test_create_with_foreign_context_panics() {
    let first = engine();
    let second = engine();
    let mut component = Component::new(&first);
    component.set_source("a.qml", "import QtQuick 2.0\nItem {}").unwrap();
    let _ = component.create(&second.root_context());
}

#[test]
fn test_set_file() {
    let engine = engine();
    let dir = TempDir::new("component_set_file");
    dir.write("Panel.qml", "import QtQuick 2.0\nRectangle { color: 'gray' }");
    let main = dir.write(
        "main.qml",
        indoc! {"
            import QtQuick 2.0
            Item {
                Panel { objectName: 'panel' }
            }
        "},
    );

    let mut component = Component::new(&engine);
    component.set_file(&main).unwrap();
    let root = component.create(&engine.root_context()).unwrap();
    let panel = root.object_by_name("panel").unwrap();
    assert_eq!(panel.property_as::<String>("color").unwrap(), "gray");
}

#[test]
fn test_set_file_directory_imports() {
    let dir = TempDir::new("component_dir_imports");
    dir.write("lib/Tag.qml", "import QtQuick 2.0\nText { text: 'tag' }");
    dir.write("shared/Chip.qml", "import QtQuick 2.0\nText { text: 'chip' }");
    let main = dir.write(
        "app/main.qml",
        indoc! {r#"
            import QtQuick 2.0
            import "../lib"
            import "shared" as Shared
            Item {
                Tag {}
                Shared.Chip {}
            }
        "#},
    );

    let engine = Engine::new(EngineOptions::default().with_import_path(dir.path())).unwrap();
    let mut component = Component::new(&engine);
    component.set_file(&main).unwrap();
    let root = component.create(&engine.root_context()).unwrap();

    let texts: Vec<String> = root
        .children()
        .unwrap()
        .iter()
        .map(|child| child.property_as::<String>("text").unwrap())
        .collect();
    assert_eq!(texts, vec!["tag", "chip"]);
}

#[test]
fn test_set_file_missing() {
    let engine = engine();
    let dir = TempDir::new("component_missing");
    let mut component = Component::new(&engine);
    let err = component.set_file(dir.path().join("absent.qml")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }), "{:?}", err);
    assert_eq!(component.status(), Status::Uncompiled);
}

#[test]
fn test_create_window_wraps_items() {
    let engine = engine();
    let mut component = Component::new(&engine);
    component
        .set_source("w.qml", "import QtQuick 2.0\nRectangle { width: 320; height: 200 }")
        .unwrap();

    let window = component.create_window(&engine.root_context()).unwrap();
    assert!(window.is_visible().unwrap());
    assert_eq!(window.object().type_name().unwrap(), "Window");
    assert_eq!(window.root().type_name().unwrap(), "Rectangle");
    assert_eq!(
        window.root().parent().unwrap().as_ref(),
        Some(window.object())
    );
    assert_eq!(window.object().property("width").unwrap(), Value::Float64(320.0));
    assert_eq!(window.object().property("height").unwrap(), Value::Float64(200.0));

    window.hide().unwrap();
    assert!(!window.is_visible().unwrap());
    window.show().unwrap();
    assert!(window.is_visible().unwrap());
}

#[test]
fn test_create_window_keeps_window_roots() {
    let engine = engine();
    let mut component = Component::new(&engine);
    component
        .set_source(
            "w.qml",
            "import QtQuick 2.0\nimport QtQuick.Window 2.0\nWindow { title: 'main' }",
        )
        .unwrap();

    let window = component.create_window(&engine.root_context()).unwrap();
    assert_eq!(window.object(), window.root());
    assert!(window.is_visible().unwrap());
    assert_eq!(engine.object_count().unwrap(), 1);

    // `create` alone leaves a window hidden.
    let plain = component.create(&engine.root_context()).unwrap();
    assert_eq!(plain.property("visible").unwrap(), Value::Bool(false));
}

#[test]
fn test_create_window_failure_leaves_nothing_behind() {
    let engine = engine();
    let mut component = Component::new(&engine);
    component
        .set_source(
            "gone.qml",
            indoc! {"
                import QtQuick 2.0
                Rectangle {
                    id: root
                    width: 50
                    Item {}
                    Component.onCompleted: root.destroy()
                }
            "},
        )
        .unwrap();

    let err = component.create_window(&engine.root_context()).unwrap_err();
    assert!(matches!(err, Error::Destroyed(_)), "{:?}", err);
    assert_eq!(engine.object_count().unwrap(), 0);

    // The engine keeps working.
    let mut other = Component::new(&engine);
    other
        .set_source("ok.qml", "import QtQuick 2.0\nItem { width: 5 }")
        .unwrap();
    let window = other.create_window(&engine.root_context()).unwrap();
    assert_eq!(engine.object_count().unwrap(), 2);
    assert_eq!(window.object().property("width").unwrap(), Value::Float64(5.0));
}
