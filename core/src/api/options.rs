//! Configuration options for the Scena engine.

use std::path::PathBuf;

/// Configuration options for an [`Engine`](super::Engine).
///
/// # Example
///
/// ```
/// use scena_core::api::EngineOptions;
///
/// let options = EngineOptions::default()
///     .with_import_path("/usr/share/scena/imports")
///     .with_max_call_depth(256);
/// assert_eq!(options.max_call_depth, 256);
/// ```
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Directories searched for `import "dir"` after the document's own
    /// directory, in order.
    ///
    /// Default: empty
    pub import_paths: Vec<PathBuf>,

    /// Name of the engine thread.
    ///
    /// Default: `"scena-engine"`
    pub thread_name: String,

    /// Maximum nesting of document function calls (for recursion protection).
    ///
    /// Default: 256
    pub max_call_depth: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            import_paths: Vec::new(),
            thread_name: "scena-engine".to_string(),
            max_call_depth: 256,
        }
    }
}

impl EngineOptions {
    pub fn with_import_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.import_paths.push(path.into());
        self
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}
