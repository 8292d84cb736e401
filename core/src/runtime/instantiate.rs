//! Turns a compiled [`Factory`] into a tree of native objects.
//!
//! Instantiation happens in two passes. The first allocates every object,
//! declares document properties, registers ids and binds functions, queueing
//! binding expressions. The second evaluates the queued bindings in document
//! order and then runs the `Component.onCompleted` handlers, so every
//! expression sees the complete tree and all ids.
//!
//! Failures in the second pass never abort the instantiation: they are
//! logged as warnings and the property keeps its previous value.

use std::sync::Arc;

use ecow::EcoString;

use crate::api::Error;
use crate::compiler::factory::Handler;
use crate::compiler::{CompiledObject, CompiledValue, Factory, ObjectType};
use crate::evaluator::{Evaluator, Exception, Scope};
use crate::parser::ast::{Expr, Stmt};
use crate::runtime::heap::{BoundFunction, NativeObject, ObjectAddr};
use crate::runtime::namespace::ContextId;
use crate::runtime::state::State;
use crate::values::Variant;

enum Code {
    Expr(Arc<Expr>),
    Block(Arc<Vec<Stmt>>),
}

struct PendingBinding {
    scope: Scope,
    this: ObjectAddr,
    name: EcoString,
    code: Code,
    line: usize,
}

struct PendingHandler {
    scope: Scope,
    this: ObjectAddr,
    handler: Handler,
}

struct Builder<'s> {
    state: &'s mut State,
    bindings: Vec<PendingBinding>,
    handlers: Vec<PendingHandler>,
}

/// Instantiate `factory` with `context` as the parent of its document scope.
pub(crate) fn instantiate(
    state: &mut State,
    factory: &Arc<Factory>,
    context: ContextId,
) -> Result<ObjectAddr, Error> {
    let mut builder = Builder {
        state,
        bindings: Vec::new(),
        handlers: Vec::new(),
    };
    let root = builder.alloc(&factory.root.type_name, &factory.root.ty)?;
    builder.document(factory, context, root)?;
    builder.finish();

    tracing::debug!(
        identifier = %factory.identifier,
        %root,
        objects = builder.state.heap.len(),
        "instantiated document"
    );
    Ok(root)
}

impl Builder<'_> {
    /// Allocate an object of `ty`. Document types get their own document
    /// built into the new object first.
    fn alloc(&mut self, type_name: &EcoString, ty: &ObjectType) -> Result<ObjectAddr, Error> {
        let object = NativeObject::new(ty.native().clone(), type_name.clone());
        let addr = self.state.heap.alloc(object);
        if let ObjectType::Document(inner) = ty {
            self.document(inner, ContextId::ROOT, addr)?;
        }
        Ok(addr)
    }

    /// Build the members of `factory`'s root into the already allocated `root`,
    /// in a fresh document scope under `parent`.
    fn document(
        &mut self,
        factory: &Arc<Factory>,
        parent: ContextId,
        root: ObjectAddr,
    ) -> Result<(), Error> {
        let context = self.state.namespaces.create(Some(parent));
        self.state.instances.entry(root).or_default().push(context);
        let scope = Scope {
            context,
            root,
            identifier: factory.identifier.clone(),
        };
        self.members(&factory.root, root, &scope)
    }

    fn members(
        &mut self,
        compiled: &CompiledObject,
        addr: ObjectAddr,
        scope: &Scope,
    ) -> Result<(), Error> {
        {
            let object = self.state.heap.get_mut(addr)?;
            for property in &compiled.properties {
                object.declare(
                    property.name.clone(),
                    property.kind,
                    property.kind.default_value(),
                );
            }
            for decl in &compiled.functions {
                let function = BoundFunction {
                    decl: decl.clone(),
                    scope: scope.clone(),
                };
                object.functions.insert(decl.name.clone(), function);
            }
        }
        if let Some(id) = &compiled.id {
            self.state
                .namespaces
                .set(scope.context, id, Variant::Object(addr));
        }

        for binding in &compiled.bindings {
            let code = match &binding.value {
                CompiledValue::Expr(expr) => Code::Expr(expr.clone()),
                CompiledValue::Block(body) => Code::Block(body.clone()),
                CompiledValue::Object(value) => {
                    let owned = self.object(value, scope)?;
                    self.state.heap.get_mut(addr)?.owned.push(owned);
                    self.state
                        .write_property(addr, &binding.name, Variant::Object(owned))?;
                    continue;
                }
            };
            self.bindings.push(PendingBinding {
                scope: scope.clone(),
                this: addr,
                name: binding.name.clone(),
                code,
                line: binding.line,
            });
        }

        for child in &compiled.children {
            let child = self.object(child, scope)?;
            self.state.heap.adopt(addr, child)?;
        }

        for handler in &compiled.on_completed {
            self.handlers.push(PendingHandler {
                scope: scope.clone(),
                this: addr,
                handler: handler.clone(),
            });
        }
        Ok(())
    }

    fn object(&mut self, compiled: &CompiledObject, scope: &Scope) -> Result<ObjectAddr, Error> {
        let addr = self.alloc(&compiled.type_name, &compiled.ty)?;
        tracing::trace!(%addr, line = compiled.line, "created {}", compiled.type_name);
        self.members(compiled, addr, scope)?;
        Ok(addr)
    }

    fn finish(&mut self) {
        for pending in core::mem::take(&mut self.bindings) {
            if !self.state.heap.contains(pending.this) {
                continue;
            }
            let mut evaluator = Evaluator::new(self.state);
            let result = match &pending.code {
                Code::Expr(expr) => evaluator.eval_expr(&pending.scope, pending.this, expr),
                Code::Block(body) => evaluator.run_block(&pending.scope, pending.this, body),
            };
            match result {
                Ok(value) => {
                    if let Err(err) = self.state.write_property(pending.this, &pending.name, value) {
                        let text = match err {
                            Error::TypeMismatch { expected, found } => {
                                format!("Unable to assign {} to {}", found, expected)
                            }
                            other => other.to_string(),
                        };
                        self.state
                            .warn(&pending.scope.identifier, pending.line, text);
                    }
                }
                Err(exception) => self.report(exception),
            }
        }

        for pending in core::mem::take(&mut self.handlers) {
            if !self.state.heap.contains(pending.this) {
                continue;
            }
            tracing::trace!(
                identifier = %pending.scope.identifier,
                line = pending.handler.line,
                "running onCompleted"
            );
            let result = Evaluator::new(self.state).run_block(
                &pending.scope,
                pending.this,
                &pending.handler.body,
            );
            if let Err(exception) = result {
                self.report(exception);
            }
        }
    }

    fn report(&mut self, exception: Exception) {
        let text = exception.text();
        self.state.warn(&exception.identifier, exception.line, text);
    }
}
