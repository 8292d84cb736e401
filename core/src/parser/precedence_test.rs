use crate::parser::ast::{BindingValue, Expr, Member};

use super::parse;

// Helper function to parse an expression and return the AST.
//
// We test precedence by comparing whether two expressions parenthesized in
// different ways yield the same AST.
fn ast(source: &str) -> Expr {
    let document = format!("Item {{ value: {} }}", source);
    let parsed = parse(&document)
        .unwrap_or_else(|e| panic!("Expression parsing failed: {}\n{}", source, e));
    match parsed.root.members.into_iter().next() {
        Some(Member::Binding(binding)) => match binding.value {
            BindingValue::Expr(expr) => expr,
            other => panic!("expected expression, got {:?}", other),
        },
        other => panic!("expected binding, got {:?}", other),
    }
}

#[test]
fn test_addition_vs_subtraction() {
    assert_eq!(ast("a + b - c"), ast("(a + b) - c"));
    assert_eq!(ast("a - b + c"), ast("(a - b) + c"));
    assert_eq!(
        ast("a + b - c + d - e + f"),
        ast("((((a + b) - c) + d) - e) + f")
    );
}

#[test]
fn test_multiplication_vs_division() {
    assert_eq!(ast("a * b / c"), ast("(a * b) / c"));
    assert_eq!(ast("a / b * c % d"), ast("((a / b) * c) % d"));
}

#[test]
fn test_addition_vs_multiplication() {
    assert_eq!(ast("a + b * c"), ast("a + (b * c)"));
    assert_eq!(ast("a * b + c"), ast("(a * b) + c"));
}

#[test]
fn test_and_vs_or() {
    assert_eq!(ast("a && b || c"), ast("(a && b) || c"));
    assert_eq!(ast("a || b && c"), ast("a || (b && c)"));
}

#[test]
fn test_comparison_vs_logical() {
    assert_eq!(ast("a < b && c >= d"), ast("(a < b) && (c >= d)"));
    assert_eq!(ast("a == b || c !== d"), ast("(a == b) || (c !== d)"));
}

#[test]
fn test_equality_vs_relational() {
    assert_eq!(ast("a < b == c > d"), ast("(a < b) == (c > d)"));
}

#[test]
fn test_unary_vs_binary() {
    assert_eq!(ast("-a * b"), ast("(-a) * b"));
    assert_eq!(ast("!a && b"), ast("(!a) && b"));
    assert_eq!(ast("-a.b"), ast("-(a.b)"));
}

#[test]
fn test_ternary_is_lowest_and_right_associative() {
    assert_eq!(ast("a || b ? c : d"), ast("(a || b) ? c : d"));
    assert_eq!(ast("a ? b : c ? d : e"), ast("a ? b : (c ? d : e)"));
    assert_eq!(ast("a ? b + 1 : c"), ast("a ? (b + 1) : c"));
}

#[test]
fn test_postfix_binds_tightest() {
    assert_eq!(ast("a.b(c) + d"), ast("((a.b)(c)) + d"));
    assert_eq!(ast("a.b.c"), ast("(a.b).c"));
}
