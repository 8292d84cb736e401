use indoc::indoc;
use pretty_assertions::assert_eq;

use crate::parser::ast::{
    BindingValue, DocumentAst, ExprKind, ImportKind, Literal, Member, StmtKind,
};

use super::parse;

fn document(source: &str) -> DocumentAst {
    parse(source).unwrap_or_else(|e| panic!("Document parsing failed:\n{}\n{}", source, e))
}

#[test]
fn test_imports() {
    let doc = document(indoc! {r#"
        import QtQuick 2.0
        import QtQuick.Window 2.1 as W
        import "controls"
        Item {}
    "#});

    assert_eq!(doc.imports.len(), 3);
    assert_eq!(
        doc.imports[0].kind,
        ImportKind::Module {
            name: "QtQuick".to_string(),
            version: Some("2.0".to_string()),
        }
    );
    assert_eq!(doc.imports[1].qualifier.as_deref(), Some("W"));
    assert_eq!(
        doc.imports[2].kind,
        ImportKind::Directory("controls".to_string())
    );
    assert_eq!(doc.imports[2].line, 3);
    assert_eq!(doc.root.type_name, "Item");
    assert_eq!(doc.root.line, 4);
}

#[test]
fn test_qualified_type() {
    let doc = document("import QtQuick.Window 2.0 as W\nW.Window { }");
    assert_eq!(doc.root.qualifier.as_deref(), Some("W"));
    assert_eq!(doc.root.type_name, "Window");
}

#[test]
fn test_members() {
    let doc = document(indoc! {r#"
        Rectangle {
            id: root
            property int count: 3
            property string label
            width: 100; height: 50
            function double(x) { return x * 2 }
            Component.onCompleted: console.log("ready")
            Text { text: "hi" }
        }
    "#});

    let members = &doc.root.members;
    assert_eq!(members.len(), 8);

    match &members[0] {
        Member::Binding(b) => {
            assert_eq!(b.name, "id");
            assert!(matches!(&b.value, BindingValue::Expr(e) if e.kind == ExprKind::Ident("root".into())));
            assert_eq!(b.line, 2);
        }
        other => panic!("unexpected member {:?}", other),
    }
    match &members[1] {
        Member::Property(p) => {
            assert_eq!(p.kind, "int");
            assert_eq!(p.name, "count");
            assert!(p.value.is_some());
        }
        other => panic!("unexpected member {:?}", other),
    }
    match &members[2] {
        Member::Property(p) => assert!(p.value.is_none()),
        other => panic!("unexpected member {:?}", other),
    }
    match &members[5] {
        Member::Function(f) => {
            assert_eq!(f.name, "double");
            assert_eq!(f.params, vec!["x"]);
            assert!(matches!(f.body[0].kind, StmtKind::Return(Some(_))));
        }
        other => panic!("unexpected member {:?}", other),
    }
    match &members[6] {
        Member::Attached(h) => {
            assert_eq!(h.attached, "Component");
            assert_eq!(h.name, "onCompleted");
            assert_eq!(h.body.len(), 1);
            assert_eq!(h.line, 7);
        }
        other => panic!("unexpected member {:?}", other),
    }
    match &members[7] {
        Member::Child(child) => assert_eq!(child.type_name, "Text"),
        other => panic!("unexpected member {:?}", other),
    }
}

#[test]
fn test_object_valued_binding() {
    let doc = document("Item { data: Item { x: 1 } }");
    match &doc.root.members[0] {
        Member::Binding(b) => assert!(matches!(&b.value, BindingValue::Object(o) if o.type_name == "Item")),
        other => panic!("unexpected member {:?}", other),
    }
}

#[test]
fn test_statements() {
    let doc = document(indoc! {r#"
        Item {
            function f(a, b) {
                var total = a
                if (b > 0) total += b; else { total = 0 }
                obj.width = total
                return
            }
        }
    "#});

    let Member::Function(f) = &doc.root.members[0] else {
        panic!("expected function");
    };
    assert_eq!(f.body.len(), 4);
    assert!(matches!(&f.body[0].kind, StmtKind::Var { name, init: Some(_) } if name == "total"));
    match &f.body[1].kind {
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            assert!(matches!(then_branch.kind, StmtKind::Assign { op: Some(_), .. }));
            assert!(matches!(else_branch.as_deref().map(|s| &s.kind), Some(StmtKind::Block(_))));
        }
        other => panic!("unexpected statement {:?}", other),
    }
    match &f.body[2].kind {
        StmtKind::Assign { target, op, .. } => {
            assert_eq!(*op, None);
            assert!(matches!(&target.kind, ExprKind::Member { name, .. } if name == "width"));
        }
        other => panic!("unexpected statement {:?}", other),
    }
    assert_eq!(f.body[3].kind, StmtKind::Return(None));
    assert_eq!(f.body[3].line, 6);
}

#[test]
fn test_literals() {
    let doc = document(indoc! {r#"
        Item {
            a: 0x1F
            b: 1.5e2
            c: 'it\'s'
            d: "tab\tnew\nline"
            e: null
            f: -4
        }
    "#});

    let literals: Vec<Option<Literal>> = doc
        .root
        .members
        .iter()
        .map(|m| match m {
            Member::Binding(b) => match &b.value {
                BindingValue::Expr(e) => e.as_literal(),
                _ => None,
            },
            _ => None,
        })
        .collect();

    assert_eq!(
        literals,
        vec![
            Some(Literal::Number(31.0)),
            Some(Literal::Number(150.0)),
            Some(Literal::String("it's".into())),
            Some(Literal::String("tab\tnew\nline".into())),
            Some(Literal::Null),
            Some(Literal::Number(-4.0)),
        ]
    );
}

#[test]
fn test_comments_are_ignored() {
    let doc = document(indoc! {r#"
        // leading comment
        Item { /* inline */ width: 10 // trailing
        }
    "#});
    assert_eq!(doc.root.members.len(), 1);
}

#[test]
fn test_keywords_are_not_identifiers() {
    assert!(parse("Item { var: 1 }").is_err());
    assert!(parse("Item { x: return }").is_err());
}

#[test]
fn test_syntax_errors() {
    assert!(parse("").is_err());
    assert!(parse("Item {").is_err());
    assert!(parse("Item {} Item {}").is_err());
    assert!(parse("item {}").is_err());
    assert!(parse("Item { width: }").is_err());
}
