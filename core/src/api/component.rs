//! Compiled documents.

use core::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{Context, Engine, Error, Object, Result, Window};
use crate::compiler::{CompileError, Factory, compile};
use crate::runtime::heap::{NativeObject, ObjectAddr};
use crate::runtime::instantiate::instantiate;
use crate::runtime::modules;
use crate::runtime::state::State;
use crate::values::Variant;

/// Compilation status of a [`Component`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// No source has been set yet.
    Uncompiled,
    /// Ready to create objects.
    Compiled,
    /// Compilation failed; see [`Component::error`].
    Failed,
}

enum Stage {
    Uncompiled,
    Compiled(Arc<Factory>),
    Failed(CompileError),
}

/// A document compiled into a factory of object trees.
///
/// A component is given its source once, with [`set_source`] or
/// [`set_file`], and can then [`create`] any number of independent trees.
///
/// [`set_source`]: Component::set_source
/// [`set_file`]: Component::set_file
/// [`create`]: Component::create
pub struct Component {
    engine: Engine,
    stage: Stage,
}

impl Component {
    /// # Panics
    ///
    /// Panics if the engine is closed.
    pub fn new(engine: &Engine) -> Self {
        if engine.is_closed() {
            panic!("engine already closed");
        }
        Component {
            engine: engine.clone(),
            stage: Stage::Uncompiled,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Compile `text`. `identifier` names the document in diagnostics and log
    /// output; when it is a path, relative imports resolve against its
    /// directory.
    ///
    /// # Panics
    ///
    /// Panics if the component already has a source.
    pub fn set_source(&mut self, identifier: &str, text: &str) -> Result<()> {
        let base_dir = Path::new(identifier)
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty() && dir.is_dir())
            .map(Path::to_path_buf);
        self.compile(identifier.to_string(), text.to_string(), base_dir)
    }

    /// Read and compile the document at `path`, which also becomes its
    /// identifier.
    ///
    /// A file that cannot be read leaves the component uncompiled.
    ///
    /// # Panics
    ///
    /// Panics if the component already has a source.
    pub fn set_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.assert_uncompiled();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        let base_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        self.compile(path.display().to_string(), text, Some(base_dir))
    }

    fn assert_uncompiled(&self) {
        if !matches!(self.stage, Stage::Uncompiled) {
            panic!("component source already set");
        }
    }

    fn compile(&mut self, identifier: String, text: String, base_dir: Option<PathBuf>) -> Result<()> {
        self.assert_uncompiled();
        let result = self.engine.with_state(move |state| {
            let import_paths = &state.options.import_paths;
            Ok(compile(
                &mut state.documents,
                import_paths,
                &identifier,
                &text,
                base_dir.as_deref(),
            ))
        })?;

        match result {
            Ok(factory) => {
                self.stage = Stage::Compiled(factory);
                Ok(())
            }
            Err(err) => {
                tracing::debug!(error = %err, "document failed to compile");
                self.stage = Stage::Failed(err.clone());
                Err(Error::Compile(err))
            }
        }
    }

    pub fn status(&self) -> Status {
        match self.stage {
            Stage::Uncompiled => Status::Uncompiled,
            Stage::Compiled(_) => Status::Compiled,
            Stage::Failed(_) => Status::Failed,
        }
    }

    /// The compile error, if compilation failed.
    pub fn error(&self) -> Option<&CompileError> {
        match &self.stage {
            Stage::Failed(err) => Some(err),
            _ => None,
        }
    }

    fn factory(&self, context: &Context) -> Arc<Factory> {
        if context.engine() != &self.engine {
            panic!("context belongs to a different engine");
        }
        match &self.stage {
            Stage::Compiled(factory) => factory.clone(),
            Stage::Uncompiled => panic!("component has no source"),
            Stage::Failed(err) => panic!("component failed to compile: {}", err),
        }
    }

    /// Instantiate the document with `context` as the parent of its scope
    /// and return the root object.
    ///
    /// Binding failures are logged as warnings and leave the property at
    /// its default.
    ///
    /// # Panics
    ///
    /// Panics if the component is not compiled or `context` belongs to
    /// another engine.
    pub fn create(&self, context: &Context) -> Result<Object> {
        let factory = self.factory(context);
        let parent = context.id();
        self.engine.with_state(move |state| {
            let root = instantiate(state, &factory, parent)?;
            state.wrap(root)
        })
    }

    /// Like [`create`](Component::create), and place the result in a visible
    /// top-level window.
    ///
    /// A root that is a `Window` is shown as is. Any other root becomes the
    /// only child of a new window of the same size.
    pub fn create_window(&self, context: &Context) -> Result<Window> {
        let factory = self.factory(context);
        let parent = context.id();
        let (window, root) = self.engine.with_state(move |state| {
            let root = instantiate(state, &factory, parent)?;
            let window = match place_in_window(state, root) {
                Ok(window) => window,
                Err(err) => {
                    // Nothing else references the new tree.
                    let _ = state.destroy_object(root);
                    return Err(err);
                }
            };
            Ok((state.wrap(window)?, state.wrap(root)?))
        })?;
        Ok(Window::new(window, root))
    }
}

/// Show `root` in a window: itself when it is a `Window`, otherwise a new
/// window of the same size holding it as its only child.
fn place_in_window(state: &mut State, root: ObjectAddr) -> Result<ObjectAddr> {
    if state.heap.get(root)?.ty.inherits("Window") {
        state.write_property(root, "visible", Variant::Bool(true))?;
        return Ok(root);
    }

    let ty = modules::window_type();
    let window = state
        .heap
        .alloc(NativeObject::new(ty.clone(), ty.name.into()));
    let placed = (|| {
        for name in ["width", "height"] {
            let size = state.read_property(root, name)?;
            state.write_property(window, name, size)?;
        }
        state.heap.adopt(window, root)?;
        state.write_property(window, "visible", Variant::Bool(true))
    })();
    if let Err(err) = placed {
        let _ = state.destroy_object(window);
        return Err(err);
    }
    Ok(window)
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("engine", &self.engine.id())
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
#[path = "component_test.rs"]
mod component_test;
