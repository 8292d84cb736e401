//! The installed native modules and their types.

use std::sync::Arc;

use hashbrown::HashMap;
use lazy_static::lazy_static;

use crate::api::Error;
use crate::runtime::heap::ObjectAddr;
use crate::runtime::state::State;
use crate::runtime::types::TypeInfo;
use crate::values::{PropertyKind, Variant};

pub(crate) const QTQUICK: &str = "QtQuick";
pub(crate) const QTQUICK_WINDOW: &str = "QtQuick.Window";

#[derive(Debug)]
pub(crate) struct Module {
    types: HashMap<&'static str, Arc<TypeInfo>>,
}

impl Module {
    pub(crate) fn get(&self, type_name: &str) -> Option<&Arc<TypeInfo>> {
        self.types.get(type_name)
    }
}

lazy_static! {
    static ref MODULES: HashMap<&'static str, Module> = builtin_modules();
}

/// Look up an installed module by its dotted name.
pub(crate) fn module(name: &str) -> Option<&'static Module> {
    MODULES.get(name)
}

/// The top-level window type used by `create_window`.
pub(crate) fn window_type() -> &'static Arc<TypeInfo> {
    &MODULES[QTQUICK_WINDOW].types["Window"]
}

fn builtin_modules() -> HashMap<&'static str, Module> {
    use PropertyKind::{Bool, Real, String as Text};

    let real = |n: f64| Variant::Float64(n);
    let string = |s: &str| Variant::String(s.into());

    let item = TypeInfo::builder("Item")
        .property("objectName", Text, string(""))
        .property("x", Real, real(0.0))
        .property("y", Real, real(0.0))
        .property("z", Real, real(0.0))
        .property("width", Real, real(0.0))
        .property("height", Real, real(0.0))
        .property("opacity", Real, real(1.0))
        .property("visible", Bool, Variant::Bool(true))
        .property("enabled", Bool, Variant::Bool(true))
        .method("destroy", 0, destroy)
        .method("childCount", 0, child_count)
        .build();

    let rectangle = TypeInfo::builder("Rectangle")
        .extends(&item)
        .property("color", Text, string("white"))
        .property("radius", Real, real(0.0))
        .build();

    let text = TypeInfo::builder("Text")
        .extends(&item)
        .property("text", Text, string(""))
        .property("color", Text, string("black"))
        .build();

    let window = TypeInfo::builder("Window")
        .extends(&item)
        .property("title", Text, string(""))
        .property("color", Text, string("white"))
        .property("visible", Bool, Variant::Bool(false))
        .method("show", 0, show)
        .method("hide", 0, hide)
        .build();

    let mut modules = HashMap::new();
    modules.insert(QTQUICK, make_module([item, rectangle, text]));
    modules.insert(QTQUICK_WINDOW, make_module([window]));
    modules
}

fn make_module<const N: usize>(types: [Arc<TypeInfo>; N]) -> Module {
    Module {
        types: types.into_iter().map(|ty| (ty.name, ty)).collect(),
    }
}

fn destroy(state: &mut State, this: ObjectAddr, _args: &[Variant]) -> Result<Variant, Error> {
    state.destroy_object(this)?;
    Ok(Variant::Null)
}

fn child_count(state: &mut State, this: ObjectAddr, _args: &[Variant]) -> Result<Variant, Error> {
    let count = state.heap.get(this)?.children.len();
    Ok(Variant::Int32(count as i32))
}

fn show(state: &mut State, this: ObjectAddr, _args: &[Variant]) -> Result<Variant, Error> {
    state.write_property(this, "visible", Variant::Bool(true))?;
    Ok(Variant::Null)
}

fn hide(state: &mut State, this: ObjectAddr, _args: &[Variant]) -> Result<Variant, Error> {
    state.write_property(this, "visible", Variant::Bool(false))?;
    Ok(Variant::Null)
}
