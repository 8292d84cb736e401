//! Host records exposed to documents as groups of bindings.
//!
//! A [`Record`] describes its fields once per type through a
//! [`RecordDescriptor`]. [`Context::expose`](crate::Context::expose) walks
//! the descriptor and binds every field under its binding name, the field
//! name lowercased.
//!
//! Descriptors are usually produced by `#[derive(Record)]`, which checks for
//! colliding binding names at compile time. Hand-built descriptors check at
//! [`RecordDescriptorBuilder::build`].

use thiserror::Error;

use crate::values::{Kind, Value};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExposeError {
    #[error(
        "{record}: fields \"{first}\" and \"{second}\" both bind as \"{binding}\""
    )]
    Collision {
        record: &'static str,
        first: &'static str,
        second: &'static str,
        binding: String,
    },

    #[error("{record}: field name is empty")]
    EmptyName { record: &'static str },
}

/// The name a field is bound under.
pub fn binding_name(field: &str) -> String {
    field.to_ascii_lowercase()
}

/// How to read one field of `T`.
pub struct FieldDescriptor<T> {
    pub name: &'static str,
    pub binding: String,
    /// Kind of the field, `None` when it depends on the value (`Option`, `Value`).
    pub kind: Option<Kind>,
    pub get: fn(&T) -> Value,
}

impl<T> core::fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("binding", &self.binding)
            .field("kind", &self.kind)
            .finish()
    }
}

/// The exported fields of a record type, in declaration order.
pub struct RecordDescriptor<T> {
    type_name: &'static str,
    fields: Vec<FieldDescriptor<T>>,
}

impl<T> core::fmt::Debug for RecordDescriptor<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecordDescriptor")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .finish()
    }
}

impl<T> RecordDescriptor<T> {
    pub fn builder(type_name: &'static str) -> RecordDescriptorBuilder<T> {
        RecordDescriptorBuilder {
            type_name,
            fields: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }

    /// Look a field up by binding name.
    pub fn field(&self, binding: &str) -> Option<&FieldDescriptor<T>> {
        self.fields.iter().find(|f| f.binding == binding)
    }

    /// Current values of every field, paired with their binding names.
    pub fn snapshot(&self, record: &T) -> Vec<(String, Value)> {
        self.fields
            .iter()
            .map(|f| (f.binding.clone(), (f.get)(record)))
            .collect()
    }
}

pub struct RecordDescriptorBuilder<T> {
    type_name: &'static str,
    fields: Vec<FieldDescriptor<T>>,
}

impl<T> RecordDescriptorBuilder<T> {
    pub fn field(mut self, name: &'static str, kind: Option<Kind>, get: fn(&T) -> Value) -> Self {
        self.fields.push(FieldDescriptor {
            name,
            binding: binding_name(name),
            kind,
            get,
        });
        self
    }

    pub fn build(self) -> Result<RecordDescriptor<T>, ExposeError> {
        for (i, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(ExposeError::EmptyName {
                    record: self.type_name,
                });
            }
            if let Some(first) = self.fields[..i].iter().find(|f| f.binding == field.binding) {
                return Err(ExposeError::Collision {
                    record: self.type_name,
                    first: first.name,
                    second: field.name,
                    binding: field.binding.clone(),
                });
            }
        }
        Ok(RecordDescriptor {
            type_name: self.type_name,
            fields: self.fields,
        })
    }
}

/// A struct whose fields can be exposed to documents.
pub trait Record: Sized + 'static {
    fn descriptor() -> &'static RecordDescriptor<Self>;
}

#[cfg(test)]
#[path = "record_test.rs"]
mod record_test;
