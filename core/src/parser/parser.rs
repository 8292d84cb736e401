use ecow::EcoString;
use lazy_static::lazy_static;
use pest::Parser;
use pest::error::{Error as PestError, ErrorVariant};
use pest::iterators::Pair;
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;

use crate::parser::ast::{
    AttachedHandler, Binding, BindingValue, BinaryOp, DocumentAst, Expr, ExprKind, FunctionDecl,
    Import, ImportKind, Literal, LogicalOp, Member, ObjectDef, PropertyDecl, Stmt, StmtKind,
    UnaryOp,
};

lazy_static! {
    // Note: precedence is defined lowest to highest.
    static ref PRATT_PARSER: PrattParser<Rule> = PrattParser::new()
        // (lowest precedence)
        .op(Op::infix(Rule::ternary_op, Assoc::Right))   // `a ? b : c`
        .op(Op::infix(Rule::or_op, Assoc::Left))         // `||`
        .op(Op::infix(Rule::and_op, Assoc::Left))        // `&&`
        .op(
            Op::infix(Rule::strict_eq, Assoc::Left) |
            Op::infix(Rule::strict_ne, Assoc::Left) |
            Op::infix(Rule::eq, Assoc::Left) |
            Op::infix(Rule::ne, Assoc::Left)
        )                                               // `===`, `!==`, `==`, `!=`
        .op(
            Op::infix(Rule::lt, Assoc::Left) |
            Op::infix(Rule::le, Assoc::Left) |
            Op::infix(Rule::gt, Assoc::Left) |
            Op::infix(Rule::ge, Assoc::Left)
        )                                               // `<`, `<=`, `>`, `>=`
        .op(
            Op::infix(Rule::add, Assoc::Left) |
            Op::infix(Rule::sub, Assoc::Left)
        )                                               // `+`, `-`
        .op(
            Op::infix(Rule::mul, Assoc::Left) |
            Op::infix(Rule::div, Assoc::Left) |
            Op::infix(Rule::rem, Assoc::Left)
        )                                               // `*`, `/`, `%`
        .op(
            Op::prefix(Rule::neg) |
            Op::prefix(Rule::plus) |
            Op::prefix(Rule::not)
        )                                               // `-`, `+`, `!`
        .op(
            Op::postfix(Rule::call_op) |
            Op::postfix(Rule::member_access)
        )                                               // `()`, `.`
        // (highest precedence)
        ;
}

#[derive(Parser)]
#[grammar = "parser/document.pest"]
pub(crate) struct DocumentParser;

type ParseResult<T> = Result<T, PestError<Rule>>;

pub(crate) fn parse(source: &str) -> ParseResult<DocumentAst> {
    let mut pairs = DocumentParser::parse(Rule::document, source)?;
    let document = next(&mut pairs, "document")?;
    let span = document.as_span();

    let mut imports = Vec::new();
    let mut root = None;
    for pair in document.into_inner() {
        match pair.as_rule() {
            Rule::import_decl => imports.push(parse_import(pair)?),
            Rule::object => root = Some(parse_object(pair)?),
            _ => {}
        }
    }

    let root = root.ok_or_else(|| error_at(span, "missing root object"))?;
    Ok(DocumentAst { imports, root })
}

fn parse_import(pair: Pair<Rule>) -> ParseResult<Import> {
    let span = pair.as_span();
    let line = pair.line_col().0;

    let mut kind = None;
    let mut version = None;
    let mut qualifier = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::string => kind = Some(ImportKind::Directory(unescape(&inner)?.to_string())),
            Rule::module_name => {
                kind = Some(ImportKind::Module {
                    name: inner.as_str().to_string(),
                    version: None,
                })
            }
            Rule::version => version = Some(inner.as_str().to_string()),
            Rule::qualifier => qualifier = Some(EcoString::from(inner.as_str())),
            _ => {}
        }
    }

    let kind = match (kind, version) {
        (Some(ImportKind::Module { name, .. }), version) => ImportKind::Module { name, version },
        (Some(kind), _) => kind,
        (None, _) => return Err(error_at(span, "missing import target")),
    };

    Ok(Import {
        kind,
        qualifier,
        span: span.start()..span.end(),
        line,
    })
}

fn parse_object(pair: Pair<Rule>) -> ParseResult<ObjectDef> {
    let mut inner = pair.into_inner();
    let type_ref = next(&mut inner, "type reference")?;
    let span = type_ref.as_span();
    let line = type_ref.line_col().0;

    let mut names = type_ref.into_inner();
    let (qualifier, type_name) = match (names.next(), names.next()) {
        (Some(q), Some(t)) => (Some(EcoString::from(q.as_str())), EcoString::from(t.as_str())),
        (Some(t), None) => (None, EcoString::from(t.as_str())),
        _ => return Err(error_at(span, "missing type name")),
    };

    let members = inner.map(parse_member).collect::<ParseResult<_>>()?;
    Ok(ObjectDef {
        qualifier,
        type_name,
        members,
        span: span.start()..span.end(),
        line,
    })
}

fn parse_member(pair: Pair<Rule>) -> ParseResult<Member> {
    let span = pair.as_span();
    let line = pair.line_col().0;
    match pair.as_rule() {
        Rule::object => Ok(Member::Child(parse_object(pair)?)),

        Rule::property_decl => {
            let mut inner = pair.into_inner().filter(|p| p.as_rule() != Rule::kw_property);
            let kind = EcoString::from(next(&mut inner, "property type")?.as_str());
            let name_pair = next(&mut inner, "property name")?;
            let name_span = name_pair.as_span();
            let value = inner.next().map(parse_binding_value).transpose()?;
            Ok(Member::Property(PropertyDecl {
                kind,
                name: EcoString::from(name_pair.as_str()),
                value,
                span: name_span.start()..name_span.end(),
                line,
            }))
        }

        Rule::function_decl => {
            let mut inner = pair.into_inner().filter(|p| p.as_rule() != Rule::kw_function);
            let name_pair = next(&mut inner, "function name")?;
            let name_span = name_pair.as_span();
            let params = next(&mut inner, "parameter list")?
                .into_inner()
                .map(|p| EcoString::from(p.as_str()))
                .collect();
            let body = parse_block(next(&mut inner, "function body")?)?;
            Ok(Member::Function(FunctionDecl {
                name: EcoString::from(name_pair.as_str()),
                params,
                body,
                span: name_span.start()..name_span.end(),
                line,
            }))
        }

        Rule::attached => {
            let mut inner = pair.into_inner();
            let attached_pair = next(&mut inner, "attached type")?;
            let attached_span = attached_pair.as_span();
            let attached = EcoString::from(attached_pair.as_str());
            let name = EcoString::from(next(&mut inner, "handler name")?.as_str());
            let handler = next(&mut inner, "handler body")?;
            let body = match handler.as_rule() {
                Rule::block => parse_block(handler)?,
                _ => {
                    let line = handler.line_col().0;
                    vec![Stmt {
                        kind: StmtKind::Expr(parse_expr(handler)?),
                        line,
                    }]
                }
            };
            Ok(Member::Attached(AttachedHandler {
                attached,
                name,
                body,
                span: attached_span.start()..attached_span.end(),
                line,
            }))
        }

        Rule::binding => {
            let mut inner = pair.into_inner();
            let name_pair = next(&mut inner, "property name")?;
            let name_span = name_pair.as_span();
            let value = parse_binding_value(next(&mut inner, "binding value")?)?;
            Ok(Member::Binding(Binding {
                name: EcoString::from(name_pair.as_str()),
                value,
                span: name_span.start()..name_span.end(),
                line,
            }))
        }

        rule => Err(error_at(span, &format!("unexpected {:?} in object body", rule))),
    }
}

fn parse_binding_value(pair: Pair<Rule>) -> ParseResult<BindingValue> {
    match pair.as_rule() {
        Rule::object => Ok(BindingValue::Object(parse_object(pair)?)),
        Rule::block => Ok(BindingValue::Block(parse_block(pair)?)),
        _ => Ok(BindingValue::Expr(parse_expr(pair)?)),
    }
}

fn parse_block(pair: Pair<Rule>) -> ParseResult<Vec<Stmt>> {
    pair.into_inner().map(parse_stmt).collect()
}

fn parse_stmt(pair: Pair<Rule>) -> ParseResult<Stmt> {
    let line = pair.line_col().0;
    let span = pair.as_span();
    let kind = match pair.as_rule() {
        Rule::var_stmt => {
            let mut inner = pair.into_inner().filter(|p| p.as_rule() != Rule::kw_var);
            let name = EcoString::from(next(&mut inner, "variable name")?.as_str());
            let init = inner.next().map(parse_expr).transpose()?;
            StmtKind::Var { name, init }
        }

        Rule::return_stmt => {
            let mut inner = pair.into_inner().filter(|p| p.as_rule() != Rule::kw_return);
            StmtKind::Return(inner.next().map(parse_expr).transpose()?)
        }

        Rule::if_stmt => {
            let mut inner = pair
                .into_inner()
                .filter(|p| !matches!(p.as_rule(), Rule::kw_if | Rule::kw_else));
            let cond = parse_expr(next(&mut inner, "condition")?)?;
            let then_branch = Box::new(parse_stmt(next(&mut inner, "statement")?)?);
            let else_branch = inner.next().map(parse_stmt).transpose()?.map(Box::new);
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            }
        }

        Rule::assign_stmt => {
            let mut inner = pair.into_inner();
            let target = parse_lvalue(next(&mut inner, "assignment target")?)?;
            let op = match next(&mut inner, "assignment operator")?.as_str() {
                "+=" => Some(BinaryOp::Add),
                "-=" => Some(BinaryOp::Sub),
                "*=" => Some(BinaryOp::Mul),
                "/=" => Some(BinaryOp::Div),
                _ => None,
            };
            let value = parse_expr(next(&mut inner, "assigned value")?)?;
            StmtKind::Assign { target, op, value }
        }

        Rule::expr_stmt => {
            let mut inner = pair.into_inner();
            StmtKind::Expr(parse_expr(next(&mut inner, "expression")?)?)
        }

        Rule::block => StmtKind::Block(parse_block(pair)?),

        Rule::empty_stmt => StmtKind::Empty,

        rule => return Err(error_at(span, &format!("unexpected {:?} in block", rule))),
    };
    Ok(Stmt { kind, line })
}

fn parse_lvalue(pair: Pair<Rule>) -> ParseResult<Expr> {
    let line = pair.line_col().0;
    let mut inner = pair.into_inner();
    let first = next(&mut inner, "identifier")?;
    let mut expr = Expr::new(ExprKind::Ident(EcoString::from(first.as_str())), line);
    for segment in inner {
        expr = Expr::new(
            ExprKind::Member {
                object: Box::new(expr),
                name: EcoString::from(segment.as_str()),
            },
            line,
        );
    }
    Ok(expr)
}

pub(crate) fn parse_expr(pair: Pair<Rule>) -> ParseResult<Expr> {
    let line = pair.line_col().0;
    match pair.as_rule() {
        Rule::expression => PRATT_PARSER
            .map_primary(parse_expr)
            .map_prefix(|op, rhs| {
                let line = op.line_col().0;
                let op = match op.as_rule() {
                    Rule::neg => UnaryOp::Neg,
                    Rule::plus => UnaryOp::Plus,
                    Rule::not => UnaryOp::Not,
                    _ => unreachable!("Unknown prefix operator: {:?}", op.as_rule()),
                };
                Ok(Expr::new(
                    ExprKind::Unary {
                        op,
                        operand: Box::new(rhs?),
                    },
                    line,
                ))
            })
            .map_infix(|lhs, op, rhs| {
                let lhs = lhs?;
                let line = lhs.line;
                let logical = match op.as_rule() {
                    Rule::and_op => Some(LogicalOp::And),
                    Rule::or_op => Some(LogicalOp::Or),
                    _ => None,
                };
                if let Some(op) = logical {
                    return Ok(Expr::new(
                        ExprKind::Logical {
                            op,
                            left: Box::new(lhs),
                            right: Box::new(rhs?),
                        },
                        line,
                    ));
                }
                let op = match op.as_rule() {
                    Rule::ternary_op => {
                        let mut inner = op.into_inner();
                        let then_branch = parse_expr(next(&mut inner, "ternary branch")?)?;
                        return Ok(Expr::new(
                            ExprKind::Conditional {
                                cond: Box::new(lhs),
                                then_branch: Box::new(then_branch),
                                else_branch: Box::new(rhs?),
                            },
                            line,
                        ));
                    }
                    Rule::add => BinaryOp::Add,
                    Rule::sub => BinaryOp::Sub,
                    Rule::mul => BinaryOp::Mul,
                    Rule::div => BinaryOp::Div,
                    Rule::rem => BinaryOp::Rem,
                    Rule::eq => BinaryOp::Eq,
                    Rule::ne => BinaryOp::Ne,
                    Rule::strict_eq => BinaryOp::StrictEq,
                    Rule::strict_ne => BinaryOp::StrictNe,
                    Rule::lt => BinaryOp::Lt,
                    Rule::le => BinaryOp::Le,
                    Rule::gt => BinaryOp::Gt,
                    Rule::ge => BinaryOp::Ge,
                    _ => unreachable!("Unknown binary operator: {:?}", op.as_rule()),
                };
                Ok(Expr::new(
                    ExprKind::Binary {
                        op,
                        left: Box::new(lhs),
                        right: Box::new(rhs?),
                    },
                    line,
                ))
            })
            .map_postfix(|lhs, op| {
                let lhs = lhs?;
                let line = lhs.line;
                match op.as_rule() {
                    Rule::call_op => {
                        let args = op.into_inner().map(parse_expr).collect::<ParseResult<_>>()?;
                        Ok(Expr::new(
                            ExprKind::Call {
                                callee: Box::new(lhs),
                                args,
                            },
                            line,
                        ))
                    }
                    Rule::member_access => {
                        let span = op.as_span();
                        let name = op
                            .into_inner()
                            .next()
                            .ok_or_else(|| error_at(span, "missing member name"))?;
                        Ok(Expr::new(
                            ExprKind::Member {
                                object: Box::new(lhs),
                                name: EcoString::from(name.as_str()),
                            },
                            line,
                        ))
                    }
                    _ => unreachable!("Unknown postfix operator: {:?}", op.as_rule()),
                }
            })
            .parse(pair.into_inner()),

        Rule::grouped => {
            let mut inner = pair.into_inner();
            parse_expr(next(&mut inner, "expression")?)
        }

        Rule::number => {
            let text = pair.as_str();
            let value = parse_number(text).ok_or_else(|| {
                error_at(pair.as_span(), &format!("invalid number literal '{}'", text))
            })?;
            Ok(Expr::new(ExprKind::Literal(Literal::Number(value)), line))
        }

        Rule::string => Ok(Expr::new(
            ExprKind::Literal(Literal::String(unescape(&pair)?)),
            line,
        )),

        Rule::boolean => Ok(Expr::new(
            ExprKind::Literal(Literal::Bool(pair.as_str() == "true")),
            line,
        )),

        Rule::null_lit => Ok(Expr::new(ExprKind::Literal(Literal::Null), line)),

        Rule::ident => Ok(Expr::new(
            ExprKind::Ident(EcoString::from(pair.as_str())),
            line,
        )),

        rule => Err(error_at(
            pair.as_span(),
            &format!("Unhandled rule: {:?}", rule),
        )),
    }
}

fn parse_number(text: &str) -> Option<f64> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok().map(|n| n as f64),
        None => text.parse().ok(),
    }
}

/// Decode the body of a string literal pair.
fn unescape(pair: &Pair<Rule>) -> ParseResult<EcoString> {
    let raw = pair.as_str();
    let body = &raw[1..raw.len() - 1];
    let mut out = EcoString::new();
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| error_at(pair.as_span(), "invalid unicode escape"))?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => return Err(error_at(pair.as_span(), "unterminated escape")),
        }
    }
    Ok(out)
}

fn next<'i>(
    pairs: &mut impl Iterator<Item = Pair<'i, Rule>>,
    what: &str,
) -> ParseResult<Pair<'i, Rule>> {
    // The grammar guarantees these pairs; a miss is a grammar/builder mismatch.
    pairs.next().ok_or_else(|| {
        PestError::new_from_pos(
            ErrorVariant::CustomError {
                message: format!("missing {}", what),
            },
            pest::Position::from_start(""),
        )
    })
}

fn error_at(span: pest::Span<'_>, message: &str) -> PestError<Rule> {
    PestError::new_from_span(
        ErrorVariant::CustomError {
            message: message.to_string(),
        },
        span,
    )
}
