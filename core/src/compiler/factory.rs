//! Compiled document representation.

use std::sync::Arc;

use ecow::EcoString;

use crate::parser::ast::{Expr, FunctionDecl, Stmt};
use crate::runtime::types::TypeInfo;
use crate::values::PropertyKind;

/// A type-checked document, ready to be instantiated any number of times.
#[derive(Debug)]
pub(crate) struct Factory {
    pub identifier: Arc<str>,
    pub root: CompiledObject,
}

#[derive(Debug, Clone)]
pub(crate) enum ObjectType {
    Native(Arc<TypeInfo>),
    /// A type defined by another document (`Button.qml`).
    Document(Arc<Factory>),
}

impl ObjectType {
    /// The native type at the bottom of this type.
    pub(crate) fn native(&self) -> &Arc<TypeInfo> {
        match self {
            ObjectType::Native(ty) => ty,
            ObjectType::Document(factory) => factory.root.ty.native(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct CompiledObject {
    pub ty: ObjectType,
    /// The type name as written in the document.
    pub type_name: EcoString,
    pub line: usize,
    pub id: Option<EcoString>,
    pub properties: Vec<CompiledProperty>,
    pub bindings: Vec<CompiledBinding>,
    pub children: Vec<CompiledObject>,
    pub functions: Vec<Arc<FunctionDecl>>,
    pub on_completed: Vec<Handler>,
}

impl CompiledObject {
    /// Kind of property `name` on instances of this object, if it exists.
    pub(crate) fn property_kind(&self, name: &str) -> Option<PropertyKind> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.kind)
            .or_else(|| match &self.ty {
                ObjectType::Native(ty) => ty.property(name).map(|p| p.kind),
                ObjectType::Document(factory) => factory.root.property_kind(name),
            })
    }
}

/// A `property <kind> <name>` declaration.
#[derive(Debug)]
pub(crate) struct CompiledProperty {
    pub name: EcoString,
    pub kind: PropertyKind,
}

#[derive(Debug)]
pub(crate) struct CompiledBinding {
    pub name: EcoString,
    pub value: CompiledValue,
    pub line: usize,
}

#[derive(Debug)]
pub(crate) enum CompiledValue {
    Expr(Arc<Expr>),
    Block(Arc<Vec<Stmt>>),
    Object(Box<CompiledObject>),
}

/// A `Component.onCompleted` handler.
#[derive(Debug, Clone)]
pub(crate) struct Handler {
    pub body: Arc<Vec<Stmt>>,
    pub line: usize,
}
