use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ecow::EcoString;
use hashbrown::{HashMap, HashSet};

use crate::compiler::CompileError;
use crate::compiler::factory::{
    CompiledBinding, CompiledObject, CompiledProperty, CompiledValue, Factory, Handler, ObjectType,
};
use crate::parser::ast::{Binding, BindingValue, ExprKind, ImportKind, Literal, Member, ObjectDef};
use crate::parser::{self, ast::Expr};
use crate::runtime::modules::{self, Module};
use crate::values::PropertyKind;

/// Extension of documents that define reusable types.
const DOCUMENT_EXTENSION: &str = "qml";

/// Compiled file types of one engine, plus the files currently being compiled.
#[derive(Debug, Default)]
pub(crate) struct DocumentCache {
    documents: HashMap<PathBuf, Arc<Factory>>,
    loading: HashSet<PathBuf>,
}

impl DocumentCache {
    pub(crate) fn len(&self) -> usize {
        self.documents.len()
    }
}

/// Compile document `text` into a factory.
///
/// `base_dir` is the directory of the document, if it has one: it is imported
/// implicitly and relative directory imports are resolved against it first.
pub(crate) fn compile(
    cache: &mut DocumentCache,
    import_paths: &[PathBuf],
    identifier: &str,
    text: &str,
    base_dir: Option<&Path>,
) -> Result<Arc<Factory>, CompileError> {
    let source: Arc<str> = Arc::from(text);
    let ast = parser::parse(text).map_err(|e| CompileError::from_pest(identifier, &source, e))?;

    let mut compiler = Compiler {
        cache,
        import_paths,
        identifier: Arc::from(identifier),
        source,
        base_dir: base_dir.map(Path::to_path_buf),
        imports: Vec::new(),
        ids: HashSet::new(),
    };

    for import in &ast.imports {
        let target = match &import.kind {
            ImportKind::Module { name, .. } => {
                let module = modules::module(name).ok_or_else(|| {
                    compiler.error(
                        import.span.clone(),
                        format!("module \"{}\" is not installed", name),
                    )
                })?;
                ImportTarget::Module(module)
            }
            ImportKind::Directory(dir) => {
                let path = compiler.resolve_directory(dir).ok_or_else(|| {
                    compiler.error(
                        import.span.clone(),
                        format!("\"{}\": no such directory", dir),
                    )
                })?;
                ImportTarget::Directory(path)
            }
        };
        compiler.imports.push(ResolvedImport {
            target,
            qualifier: import.qualifier.clone(),
        });
    }
    if let Some(dir) = compiler.base_dir.clone().filter(|d| d.is_dir()) {
        compiler.imports.push(ResolvedImport {
            target: ImportTarget::Directory(dir),
            qualifier: None,
        });
    }

    let root = compiler.compile_object(&ast.root)?;
    Ok(Arc::new(Factory {
        identifier: compiler.identifier,
        root,
    }))
}

enum ImportTarget {
    Module(&'static Module),
    Directory(PathBuf),
}

struct ResolvedImport {
    target: ImportTarget,
    qualifier: Option<EcoString>,
}

struct Compiler<'c> {
    cache: &'c mut DocumentCache,
    import_paths: &'c [PathBuf],
    identifier: Arc<str>,
    source: Arc<str>,
    base_dir: Option<PathBuf>,
    imports: Vec<ResolvedImport>,
    /// Object ids declared so far; unique per document.
    ids: HashSet<EcoString>,
}

impl Compiler<'_> {
    fn error(&self, span: Range<usize>, message: impl Into<String>) -> CompileError {
        CompileError::at(&self.identifier, &self.source, span, message)
    }

    fn resolve_directory(&self, dir: &str) -> Option<PathBuf> {
        let dir = Path::new(dir);
        if dir.is_absolute() {
            return dir.is_dir().then(|| dir.to_path_buf());
        }
        self.base_dir
            .iter()
            .chain(self.import_paths)
            .map(|base| base.join(dir))
            .find(|candidate| candidate.is_dir())
    }

    fn resolve_type(&mut self, def: &ObjectDef) -> Result<ObjectType, CompileError> {
        let visible = |import: &&ResolvedImport| import.qualifier == def.qualifier;

        // Native types shadow document types of the same name.
        for import in self.imports.iter().filter(visible) {
            if let ImportTarget::Module(module) = &import.target {
                if let Some(ty) = module.get(&def.type_name) {
                    return Ok(ObjectType::Native(ty.clone()));
                }
            }
        }

        let file_name = format!("{}.{}", def.type_name, DOCUMENT_EXTENSION);
        let file = self
            .imports
            .iter()
            .filter(visible)
            .find_map(|import| match &import.target {
                ImportTarget::Directory(dir) => Some(dir.join(&file_name)).filter(|p| p.is_file()),
                ImportTarget::Module(_) => None,
            });
        if let Some(path) = file {
            return self.load_file_type(&def.type_name, &path, def.span.clone());
        }

        let full_name = match &def.qualifier {
            Some(qualifier) => format!("{}.{}", qualifier, def.type_name),
            None => def.type_name.to_string(),
        };
        Err(self.error(def.span.clone(), format!("{} is not a type", full_name)))
    }

    fn load_file_type(
        &mut self,
        type_name: &str,
        path: &Path,
        span: Range<usize>,
    ) -> Result<ObjectType, CompileError> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if let Some(factory) = self.cache.documents.get(&key) {
            return Ok(ObjectType::Document(factory.clone()));
        }
        if !self.cache.loading.insert(key.clone()) {
            return Err(self.error(
                span,
                format!("Type {} unavailable: cyclic dependency", type_name),
            ));
        }

        tracing::debug!(path = %path.display(), "compiling file type {}", type_name);
        let result = match fs::read_to_string(path) {
            Ok(text) => compile(
                self.cache,
                self.import_paths,
                &path.display().to_string(),
                &text,
                path.parent(),
            )
            .map_err(|inner| inner.unavailable(type_name, self.error(span.clone(), ""))),
            Err(err) => Err(self.error(
                span.clone(),
                format!("Type {} unavailable: {}", type_name, err),
            )),
        };
        self.cache.loading.remove(&key);

        let factory = result?;
        self.cache.documents.insert(key, factory.clone());
        Ok(ObjectType::Document(factory))
    }

    fn compile_object(&mut self, def: &ObjectDef) -> Result<CompiledObject, CompileError> {
        let ty = self.resolve_type(def)?;
        let mut object = CompiledObject {
            ty,
            type_name: def.type_name.clone(),
            line: def.line,
            id: None,
            properties: Vec::new(),
            bindings: Vec::new(),
            children: Vec::new(),
            functions: Vec::new(),
            on_completed: Vec::new(),
        };

        // Declarations first, so bindings may precede the property they target.
        for member in &def.members {
            if let Member::Property(decl) = member {
                let kind = declared_kind(&decl.kind).ok_or_else(|| {
                    self.error(
                        decl.span.clone(),
                        format!("Invalid property type \"{}\"", decl.kind),
                    )
                })?;
                if object.property_kind(&decl.name).is_some() {
                    return Err(self.error(decl.span.clone(), "Duplicate property name"));
                }
                object.properties.push(CompiledProperty {
                    name: decl.name.clone(),
                    kind,
                });
            }
        }

        let mut assigned = HashSet::new();
        for member in &def.members {
            match member {
                Member::Property(decl) => {
                    if let Some(value) = &decl.value {
                        let binding = Binding {
                            name: decl.name.clone(),
                            value: value.clone(),
                            span: decl.span.clone(),
                            line: decl.line,
                        };
                        self.compile_binding(&mut object, &mut assigned, &binding)?;
                    }
                }
                Member::Binding(binding) if binding.name == "id" => {
                    self.compile_id(&mut object, binding)?;
                }
                Member::Binding(binding) => {
                    self.compile_binding(&mut object, &mut assigned, binding)?;
                }
                Member::Function(decl) => {
                    if object.functions.iter().any(|f| f.name == decl.name) {
                        return Err(self.error(decl.span.clone(), "Duplicate method name"));
                    }
                    object.functions.push(Arc::new(decl.clone()));
                }
                Member::Attached(handler) => {
                    if handler.attached != "Component" {
                        return Err(self.error(handler.span.clone(), "Non-existent attached object"));
                    }
                    if handler.name != "onCompleted" {
                        return Err(self.error(
                            handler.span.clone(),
                            format!("Cannot assign to non-existent property \"{}\"", handler.name),
                        ));
                    }
                    object.on_completed.push(Handler {
                        body: Arc::new(handler.body.clone()),
                        line: handler.line,
                    });
                }
                Member::Child(child) => {
                    let child = self.compile_object(child)?;
                    object.children.push(child);
                }
            }
        }

        Ok(object)
    }

    fn compile_id(&mut self, object: &mut CompiledObject, binding: &Binding) -> Result<(), CompileError> {
        let name = match &binding.value {
            BindingValue::Expr(Expr {
                kind: ExprKind::Ident(name),
                ..
            }) => name.clone(),
            _ => return Err(self.error(binding.span.clone(), "Invalid use of id property")),
        };
        if object.id.is_some() {
            return Err(self.error(binding.span.clone(), "Property value set multiple times"));
        }
        if name.starts_with(|c: char| c.is_ascii_uppercase()) {
            return Err(self.error(
                binding.span.clone(),
                "IDs cannot start with an uppercase letter",
            ));
        }
        if !self.ids.insert(name.clone()) {
            return Err(self.error(binding.span.clone(), "id is not unique"));
        }
        object.id = Some(name);
        Ok(())
    }

    fn compile_binding(
        &mut self,
        object: &mut CompiledObject,
        assigned: &mut HashSet<EcoString>,
        binding: &Binding,
    ) -> Result<(), CompileError> {
        let span = binding.span.clone();
        let kind = object.property_kind(&binding.name).ok_or_else(|| {
            self.error(
                span.clone(),
                format!("Cannot assign to non-existent property \"{}\"", binding.name),
            )
        })?;
        if !assigned.insert(binding.name.clone()) {
            return Err(self.error(span, "Property value set multiple times"));
        }

        let value = match &binding.value {
            BindingValue::Expr(expr) => {
                if let Some(expected) = literal_mismatch(kind, expr) {
                    return Err(self.error(
                        span,
                        format!("Invalid property assignment: {} expected", expected),
                    ));
                }
                CompiledValue::Expr(Arc::new(expr.clone()))
            }
            BindingValue::Block(body) => CompiledValue::Block(Arc::new(body.clone())),
            BindingValue::Object(def) => {
                if !matches!(kind, PropertyKind::Var | PropertyKind::Object) {
                    return Err(self.error(
                        span,
                        format!("Cannot assign object to property \"{}\"", binding.name),
                    ));
                }
                CompiledValue::Object(Box::new(self.compile_object(def)?))
            }
        };

        object.bindings.push(CompiledBinding {
            name: binding.name.clone(),
            value,
            line: binding.line,
        });
        Ok(())
    }
}

fn declared_kind(keyword: &str) -> Option<PropertyKind> {
    PropertyKind::from_keyword(keyword).or_else(|| {
        keyword
            .starts_with(|c: char| c.is_ascii_uppercase())
            .then_some(PropertyKind::Object)
    })
}

/// What a literal binding should have been, when it cannot fit `kind`.
fn literal_mismatch(kind: PropertyKind, expr: &Expr) -> Option<&'static str> {
    let literal = expr.as_literal()?;
    match (kind, literal) {
        (PropertyKind::Var, _) | (_, Literal::Null) => None,
        (PropertyKind::Int, Literal::Number(n))
            if n.fract() == 0.0 && n >= i32::MIN as f64 && n <= i32::MAX as f64 =>
        {
            None
        }
        (PropertyKind::Int, _) => Some("int"),
        (PropertyKind::Real, Literal::Number(_)) => None,
        (PropertyKind::Real, _) => Some("number"),
        (PropertyKind::Bool, Literal::Bool(_)) => None,
        (PropertyKind::Bool, _) => Some("boolean"),
        (PropertyKind::String, Literal::String(_)) => None,
        (PropertyKind::String, _) => Some("string"),
        (PropertyKind::Object, _) => Some("object"),
    }
}
