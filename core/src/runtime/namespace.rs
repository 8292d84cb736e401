//! Hierarchical name scopes.

use core::fmt;

use ecow::EcoString;
use hashbrown::HashMap;

use crate::values::Variant;

/// Identifier of a scope inside its engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ContextId(u32);

impl ContextId {
    pub(crate) const ROOT: ContextId = ContextId(0);
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
struct Scope {
    parent: Option<ContextId>,
    names: HashMap<EcoString, usize>,
    bindings: Vec<(EcoString, Variant)>,
}

/// Every scope of an engine, keyed by id.
#[derive(Debug)]
pub(crate) struct Namespaces {
    scopes: HashMap<ContextId, Scope>,
    next: u32,
}

impl Namespaces {
    pub(crate) fn new() -> Self {
        let mut scopes = HashMap::new();
        scopes.insert(ContextId::ROOT, Scope::default());
        Namespaces { scopes, next: 1 }
    }

    pub(crate) fn create(&mut self, parent: Option<ContextId>) -> ContextId {
        let id = ContextId(self.next);
        self.next += 1;
        self.scopes.insert(
            id,
            Scope {
                parent,
                ..Scope::default()
            },
        );
        id
    }

    pub(crate) fn contains(&self, id: ContextId) -> bool {
        self.scopes.contains_key(&id)
    }

    /// Bind `name` in `id`, replacing a previous binding in the same scope.
    ///
    /// Returns `false` when the scope no longer exists.
    pub(crate) fn set(&mut self, id: ContextId, name: &str, value: Variant) -> bool {
        let Some(scope) = self.scopes.get_mut(&id) else {
            return false;
        };
        match scope.names.get(name) {
            Some(&i) => scope.bindings[i].1 = value,
            None => {
                let name = EcoString::from(name);
                scope.names.insert(name.clone(), scope.bindings.len());
                scope.bindings.push((name, value));
            }
        }
        true
    }

    pub(crate) fn get_local(&self, id: ContextId, name: &str) -> Option<&Variant> {
        let scope = self.scopes.get(&id)?;
        scope.names.get(name).map(|&i| &scope.bindings[i].1)
    }

    /// Innermost-to-outermost lookup starting at `id`.
    pub(crate) fn get(&self, id: ContextId, name: &str) -> Option<&Variant> {
        let mut current = Some(id);
        while let Some(id) = current {
            if let Some(value) = self.get_local(id, name) {
                return Some(value);
            }
            current = self.scopes.get(&id)?.parent;
        }
        None
    }

    /// Lookup that starts at the parent of `id`.
    pub(crate) fn lookup_inherited(&self, id: ContextId, name: &str) -> Option<&Variant> {
        let parent = self.scopes.get(&id)?.parent?;
        self.get(parent, name)
    }

    pub(crate) fn remove(&mut self, id: ContextId) {
        if id != ContextId::ROOT {
            self.scopes.remove(&id);
        }
    }

    /// Bindings of `id` in insertion order.
    pub(crate) fn bindings(&self, id: ContextId) -> impl Iterator<Item = (&str, &Variant)> {
        self.scopes
            .get(&id)
            .into_iter()
            .flat_map(|scope| scope.bindings.iter().map(|(n, v)| (n.as_str(), v)))
    }

    pub(crate) fn len(&self) -> usize {
        self.scopes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_falls_through_to_parent() {
        let mut ns = Namespaces::new();
        let child = ns.create(Some(ContextId::ROOT));
        ns.set(ContextId::ROOT, "a", Variant::Int32(1));
        ns.set(child, "b", Variant::Int32(2));

        assert_eq!(ns.get(child, "a"), Some(&Variant::Int32(1)));
        assert_eq!(ns.get(child, "b"), Some(&Variant::Int32(2)));
        assert_eq!(ns.get(ContextId::ROOT, "b"), None);
    }

    #[test]
    fn test_innermost_binding_shadows() {
        let mut ns = Namespaces::new();
        let child = ns.create(Some(ContextId::ROOT));
        ns.set(ContextId::ROOT, "a", Variant::Int32(1));
        ns.set(child, "a", Variant::Int32(2));

        assert_eq!(ns.get(child, "a"), Some(&Variant::Int32(2)));
        assert_eq!(ns.lookup_inherited(child, "a"), Some(&Variant::Int32(1)));
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut ns = Namespaces::new();
        ns.set(ContextId::ROOT, "a", Variant::Int32(1));
        ns.set(ContextId::ROOT, "b", Variant::Int32(2));
        ns.set(ContextId::ROOT, "a", Variant::Int32(3));

        let names: Vec<_> = ns.bindings(ContextId::ROOT).map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(ns.get(ContextId::ROOT, "a"), Some(&Variant::Int32(3)));
    }

    #[test]
    fn test_removed_scope_misses() {
        let mut ns = Namespaces::new();
        let child = ns.create(Some(ContextId::ROOT));
        ns.remove(child);
        assert!(!ns.set(child, "a", Variant::Null));
        assert!(!ns.contains(child));
        ns.remove(ContextId::ROOT);
        assert!(ns.contains(ContextId::ROOT));
    }
}
