use core::any::Any;
use core::fmt;
use std::sync::Arc;

use crate::values::Value;

/// A host record that can be placed in the engine by reference.
///
/// Documents read fields of a host record through [`HostObject::field`] each
/// time the expression is evaluated, so mutations made through interior
/// mutability on the host side are visible to later evaluations.
pub trait HostObject: Any + Send + Sync {
    /// Current value of the field bound under `name`, if any.
    fn field(&self, name: &str) -> Option<Value> {
        let _ = name;
        None
    }
}

/// A shared reference to a host record.
///
/// Equality and hashing follow the identity of the underlying allocation.
#[derive(Clone)]
pub struct HostRef {
    any: Arc<dyn Any + Send + Sync>,
    object: Arc<dyn HostObject>,
    type_name: &'static str,
}

impl HostRef {
    pub fn new<T: HostObject>(value: Arc<T>) -> Self {
        HostRef {
            any: value.clone(),
            object: value,
            type_name: core::any::type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Recover the concrete record if it is a `T`.
    pub fn downcast<T: HostObject>(&self) -> Option<Arc<T>> {
        self.any.clone().downcast::<T>().ok()
    }

    pub fn field(&self, name: &str) -> Option<Value> {
        self.object.field(name)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.any) as *const () as usize
    }
}

impl PartialEq for HostRef {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for HostRef {}

impl core::hash::Hash for HostRef {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.addr().hash(state)
    }
}

impl fmt::Debug for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostRef")
            .field("type", &self.type_name)
            .field("addr", &format_args!("{:#x}", self.addr()))
            .finish()
    }
}

impl fmt::Display for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = self.type_name.rsplit("::").next().unwrap_or(self.type_name);
        write!(f, "{}@{:#x}", short, self.addr())
    }
}
