//! Native type descriptions.

use std::sync::Arc;

use crate::api::Error;
use crate::runtime::heap::ObjectAddr;
use crate::runtime::state::State;
use crate::values::{PropertyKind, Variant};

/// A method implemented by the engine for every object of a native type.
pub(crate) type NativeMethod = fn(&mut State, ObjectAddr, &[Variant]) -> Result<Variant, Error>;

#[derive(Debug, Clone)]
pub(crate) struct PropertyInfo {
    pub name: &'static str,
    pub kind: PropertyKind,
    pub default: Variant,
}

#[derive(Clone)]
pub(crate) struct MethodInfo {
    pub name: &'static str,
    pub arity: usize,
    pub call: NativeMethod,
}

impl core::fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// A native type with its flattened property and method tables.
///
/// Inherited members come first, in base-to-derived order.
#[derive(Debug)]
pub(crate) struct TypeInfo {
    pub name: &'static str,
    /// Base type names, nearest first.
    pub ancestors: Vec<&'static str>,
    pub properties: Vec<PropertyInfo>,
    pub methods: Vec<MethodInfo>,
}

impl TypeInfo {
    pub(crate) fn builder(name: &'static str) -> TypeBuilder {
        TypeBuilder {
            info: TypeInfo {
                name,
                ancestors: Vec::new(),
                properties: Vec::new(),
                methods: Vec::new(),
            },
        }
    }

    pub(crate) fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub(crate) fn method(&self, name: &str) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Whether this type is `name` or derives from it.
    pub(crate) fn inherits(&self, name: &str) -> bool {
        self.name == name || self.ancestors.iter().any(|a| *a == name)
    }
}

pub(crate) struct TypeBuilder {
    info: TypeInfo,
}

impl TypeBuilder {
    pub(crate) fn extends(mut self, base: &TypeInfo) -> Self {
        self.info.ancestors.push(base.name);
        self.info.ancestors.extend(base.ancestors.iter().copied());
        self.info.properties.extend(base.properties.iter().cloned());
        self.info.methods.extend(base.methods.iter().cloned());
        self
    }

    /// Declare a property, or change the default of an inherited one.
    pub(crate) fn property(
        mut self,
        name: &'static str,
        kind: PropertyKind,
        default: Variant,
    ) -> Self {
        let info = PropertyInfo {
            name,
            kind,
            default,
        };
        match self.info.properties.iter_mut().find(|p| p.name == name) {
            Some(existing) => *existing = info,
            None => self.info.properties.push(info),
        }
        self
    }

    pub(crate) fn method(mut self, name: &'static str, arity: usize, call: NativeMethod) -> Self {
        self.info.methods.push(MethodInfo { name, arity, call });
        self
    }

    pub(crate) fn build(self) -> Arc<TypeInfo> {
        Arc::new(self.info)
    }
}
