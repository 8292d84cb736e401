//! The native object heap.
//!
//! Objects are addressed by [`ObjectAddr`]. Addresses come from a
//! monotonically increasing counter and are never reused, so a stale address
//! can only miss, never alias a newer object.

use core::fmt;
use core::num::NonZeroU64;
use std::sync::Arc;

use ecow::EcoString;
use hashbrown::HashMap;

use crate::api::Error;
use crate::evaluator::Scope;
use crate::parser::ast::FunctionDecl;
use crate::runtime::types::TypeInfo;
use crate::values::{PropertyKind, Variant};

/// Address of a native object inside its engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectAddr(NonZeroU64);

impl ObjectAddr {
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for ObjectAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub name: EcoString,
    pub kind: PropertyKind,
    pub value: Variant,
}

/// A document `function` bound to the scope it was declared in.
#[derive(Debug, Clone)]
pub(crate) struct BoundFunction {
    pub decl: Arc<FunctionDecl>,
    pub scope: Scope,
}

#[derive(Debug)]
pub(crate) struct NativeObject {
    pub ty: Arc<TypeInfo>,
    /// Name reported to the host; differs from `ty.name` for document types.
    pub type_name: EcoString,
    slots: Vec<Slot>,
    index: HashMap<EcoString, usize>,
    pub parent: Option<ObjectAddr>,
    pub children: Vec<ObjectAddr>,
    /// Objects created as property values, destroyed along with this one.
    pub owned: Vec<ObjectAddr>,
    pub functions: HashMap<EcoString, BoundFunction>,
}

impl NativeObject {
    pub(crate) fn new(ty: Arc<TypeInfo>, type_name: EcoString) -> Self {
        let mut object = NativeObject {
            slots: Vec::with_capacity(ty.properties.len()),
            index: HashMap::with_capacity(ty.properties.len()),
            ty: ty.clone(),
            type_name,
            parent: None,
            children: Vec::new(),
            owned: Vec::new(),
            functions: HashMap::new(),
        };
        for property in &ty.properties {
            object.declare(property.name.into(), property.kind, property.default.clone());
        }
        object
    }

    /// Add a property slot, replacing an existing one of the same name.
    pub(crate) fn declare(&mut self, name: EcoString, kind: PropertyKind, value: Variant) {
        match self.index.get(&name) {
            Some(&i) => self.slots[i] = Slot { name, kind, value },
            None => {
                self.index.insert(name.clone(), self.slots.len());
                self.slots.push(Slot { name, kind, value });
            }
        }
    }

    pub(crate) fn slot(&self, name: &str) -> Option<&Slot> {
        self.index.get(name).map(|&i| &self.slots[i])
    }

    pub(crate) fn slot_mut(&mut self, name: &str) -> Option<&mut Slot> {
        self.index.get(name).map(|&i| &mut self.slots[i])
    }

    /// Slots in declaration order.
    pub(crate) fn slots(&self) -> &[Slot] {
        &self.slots
    }
}

#[derive(Debug, Default)]
pub(crate) struct Heap {
    objects: HashMap<ObjectAddr, NativeObject>,
    next: u64,
}

impl Heap {
    pub(crate) fn alloc(&mut self, object: NativeObject) -> ObjectAddr {
        self.next += 1;
        let addr = ObjectAddr(NonZeroU64::MIN.saturating_add(self.next - 1));
        self.objects.insert(addr, object);
        addr
    }

    pub(crate) fn contains(&self, addr: ObjectAddr) -> bool {
        self.objects.contains_key(&addr)
    }

    pub(crate) fn get(&self, addr: ObjectAddr) -> Result<&NativeObject, Error> {
        self.objects.get(&addr).ok_or(Error::Destroyed(addr))
    }

    pub(crate) fn get_mut(&mut self, addr: ObjectAddr) -> Result<&mut NativeObject, Error> {
        self.objects.get_mut(&addr).ok_or(Error::Destroyed(addr))
    }

    pub(crate) fn len(&self) -> usize {
        self.objects.len()
    }

    /// Make `child` the last child of `parent`, detaching it from any previous parent.
    pub(crate) fn adopt(&mut self, parent: ObjectAddr, child: ObjectAddr) -> Result<(), Error> {
        self.get(parent)?;
        if let Some(old) = self.get(child)?.parent {
            if let Ok(old) = self.get_mut(old) {
                old.children.retain(|c| *c != child);
            }
        }
        self.get_mut(child)?.parent = Some(parent);
        self.get_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Remove `addr` together with its children and owned objects.
    ///
    /// Returns every removed address, `addr` first.
    pub(crate) fn destroy(&mut self, addr: ObjectAddr) -> Result<Vec<ObjectAddr>, Error> {
        let parent = self.get(addr)?.parent;
        if let Some(parent) = parent.and_then(|p| self.objects.get_mut(&p)) {
            parent.children.retain(|c| *c != addr);
            parent.owned.retain(|c| *c != addr);
        }

        let mut removed = Vec::new();
        let mut pending = vec![addr];
        while let Some(next) = pending.pop() {
            if let Some(object) = self.objects.remove(&next) {
                removed.push(next);
                pending.extend(object.children.iter().rev());
                pending.extend(object.owned.iter().rev());
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::modules;

    fn item() -> NativeObject {
        let ty = modules::module(modules::QTQUICK).unwrap().get("Item").unwrap();
        NativeObject::new(ty.clone(), "Item".into())
    }

    #[test]
    fn test_addresses_are_not_reused() {
        let mut heap = Heap::default();
        let a = heap.alloc(item());
        heap.destroy(a).unwrap();
        let b = heap.alloc(item());
        assert_ne!(a, b);
        assert!(matches!(heap.get(a), Err(Error::Destroyed(addr)) if addr == a));
    }

    #[test]
    fn test_destroy_is_recursive() {
        let mut heap = Heap::default();
        let root = heap.alloc(item());
        let child = heap.alloc(item());
        let grandchild = heap.alloc(item());
        heap.adopt(root, child).unwrap();
        heap.adopt(child, grandchild).unwrap();

        let removed = heap.destroy(child).unwrap();
        assert_eq!(removed, vec![child, grandchild]);
        assert!(heap.get(root).unwrap().children.is_empty());
        assert_eq!(heap.len(), 1);
    }

    #[test]
    fn test_adopt_moves_between_parents() {
        let mut heap = Heap::default();
        let a = heap.alloc(item());
        let b = heap.alloc(item());
        let child = heap.alloc(item());
        heap.adopt(a, child).unwrap();
        heap.adopt(b, child).unwrap();
        assert!(heap.get(a).unwrap().children.is_empty());
        assert_eq!(heap.get(b).unwrap().children, vec![child]);
        assert_eq!(heap.get(child).unwrap().parent, Some(b));
    }

    #[test]
    fn test_slots_follow_type_defaults() {
        let object = item();
        assert_eq!(object.slot("visible").unwrap().value, Variant::Bool(true));
        assert_eq!(object.slot("width").unwrap().kind, PropertyKind::Real);
        assert!(object.slot("color").is_none());
    }
}
