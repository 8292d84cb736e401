//! Top-level windows.

use super::{Object, Result};

/// A top-level window holding an instantiated document.
///
/// Nothing is rendered: the window is a native `Window` object whose
/// `visible` property reflects [`show`](Window::show) and
/// [`hide`](Window::hide).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    window: Object,
    root: Object,
}

impl Window {
    pub(crate) fn new(window: Object, root: Object) -> Self {
        Window { window, root }
    }

    pub fn show(&self) -> Result<()> {
        self.window.call("show", &[]).map(drop)
    }

    pub fn hide(&self) -> Result<()> {
        self.window.call("hide", &[]).map(drop)
    }

    pub fn is_visible(&self) -> Result<bool> {
        self.window.property_as("visible")
    }

    /// The `Window` object itself.
    pub fn object(&self) -> &Object {
        &self.window
    }

    /// The root of the instantiated document; the same object as
    /// [`object`](Window::object) when the document's root is a `Window`.
    pub fn root(&self) -> &Object {
        &self.root
    }
}
