//! Module exposure base.
//!
//! A capability module declares, once, an explicit table mapping public
//! operation names to its own methods. [`Module::new`] freezes that table
//! into an [`RpcSurface`]: the only path from a caller-supplied name to code.
//! Nothing else on the module (public or private) is reachable through it.
//!
//! Every invocation through the surface yields either the handler's value or
//! an [`OperationFailure`]. Unknown names are rejected before any handler
//! runs, and a handler that panics is reported as `invocation_error` instead
//! of unwinding into the caller.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use func_common::{CallArgs, OperationFailure};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;

use crate::domain::ExposureError;

/// Future returned by every exposed handler.
pub type HandlerFuture = BoxFuture<'static, Result<Value, OperationFailure>>;

type Handler = Arc<dyn Fn(CallArgs) -> HandlerFuture + Send + Sync>;
type Method<M> = Box<dyn Fn(Arc<M>, CallArgs) -> HandlerFuture + Send + Sync>;

// ===================================================================
// Declaration side
// ===================================================================

/// A unit of host functionality with a fixed set of exposed operations.
pub trait CapabilityModule: Send + Sync + Sized + 'static {
    /// Module name, used in logs and collision reports.
    const NAME: &'static str;

    /// List every exposed operation. Called exactly once, by [`Module::new`].
    fn declare(table: &mut ExposureTable<Self>);
}

/// Declarations collected from [`CapabilityModule::declare`].
pub struct ExposureTable<M> {
    entries: Vec<(&'static str, Method<M>)>,
}

impl<M: CapabilityModule> ExposureTable<M> {
    /// Expose `method` under `name`.
    ///
    /// The method receives the module instance it is bound to and the raw
    /// call arguments; its success value is serialized for the caller.
    pub fn expose<F, Fut, T>(&mut self, name: &'static str, method: F) -> &mut Self
    where
        F: Fn(Arc<M>, CallArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, OperationFailure>> + Send + 'static,
        T: Serialize + 'static,
    {
        let erased: Method<M> = Box::new(move |module, args| {
            let pending = method(module, args);
            async move { pending.await.and_then(|value| reply(&value)) }.boxed()
        });
        self.entries.push((name, erased));
        self
    }
}

fn reply<T: Serialize>(value: &T) -> Result<Value, OperationFailure> {
    serde_json::to_value(value)
        .map_err(|e| OperationFailure::invocation(format!("result could not be encoded: {e}")))
}

// ===================================================================
// Module: owns the capability and its frozen surface
// ===================================================================

/// A capability bound to its frozen exposure table.
pub struct Module<M> {
    capability: Arc<M>,
    surface: RpcSurface,
}

impl<M: CapabilityModule> Module<M> {
    /// Bind `capability` to the operations it declares and freeze them.
    ///
    /// # Errors
    ///
    /// Returns [`ExposureError`] if the declaration contains an empty name or
    /// the same name twice.
    pub fn new(capability: M) -> Result<Self, ExposureError> {
        let capability = Arc::new(capability);
        let mut table = ExposureTable {
            entries: Vec::new(),
        };
        M::declare(&mut table);

        let mut operations: BTreeMap<&'static str, Handler> = BTreeMap::new();
        for (name, method) in table.entries {
            if name.is_empty() {
                return Err(ExposureError::EmptyName { module: M::NAME });
            }
            if operations.contains_key(name) {
                return Err(ExposureError::DuplicateOperation {
                    module: M::NAME,
                    operation: name,
                });
            }
            let bound = Arc::clone(&capability);
            let handler: Handler = Arc::new(move |args| method(Arc::clone(&bound), args));
            operations.insert(name, handler);
        }

        tracing::debug!(
            module = M::NAME,
            operations = ?operations.keys().collect::<Vec<_>>(),
            "module exposure frozen"
        );

        Ok(Self {
            capability,
            surface: RpcSurface {
                module: M::NAME,
                operations: Arc::new(operations),
            },
        })
    }

    /// The dispatch object for the transport layer.
    ///
    /// Returns a handle onto the table frozen at construction; calling it
    /// any number of times exposes the identical set of names.
    #[must_use]
    pub fn register_rpc(&self) -> RpcSurface {
        self.surface.clone()
    }

    /// Direct, in-process access to the capability.
    #[must_use]
    pub fn capability(&self) -> &M {
        &self.capability
    }
}

impl<M> fmt::Debug for Module<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("surface", &self.surface)
            .finish_non_exhaustive()
    }
}

// ===================================================================
// RpcSurface: the name-addressable view
// ===================================================================

/// Whitelisted, name-addressable view of one module.
#[derive(Clone)]
pub struct RpcSurface {
    module: &'static str,
    operations: Arc<BTreeMap<&'static str, Handler>>,
}

impl RpcSurface {
    #[must_use]
    pub fn module(&self) -> &'static str {
        self.module
    }

    /// Exposed operation names, sorted.
    #[must_use]
    pub fn operations(&self) -> Vec<&'static str> {
        self.operations.keys().copied().collect()
    }

    #[must_use]
    pub fn exposes(&self, operation: &str) -> bool {
        self.operations.contains_key(operation)
    }

    /// Invoke `operation` with `args`.
    ///
    /// The returned future always resolves: to the handler's value, to the
    /// handler's own failure, to `unknown_operation` if the name is not
    /// exposed, or to `invocation_error` if the handler panicked.
    pub fn invoke(&self, operation: &str, args: CallArgs) -> HandlerFuture {
        let Some((&name, handler)) = self.operations.get_key_value(operation) else {
            tracing::debug!(module = self.module, operation, "operation not exposed");
            let failure = OperationFailure::unknown_operation(operation);
            return futures::future::ready(Err(failure)).boxed();
        };

        let pending = match std::panic::catch_unwind(AssertUnwindSafe(|| handler(args))) {
            Ok(pending) => pending,
            Err(panic) => return futures::future::ready(Err(fault(name, &*panic))).boxed(),
        };

        AssertUnwindSafe(pending)
            .catch_unwind()
            .map(move |outcome| outcome.unwrap_or_else(|panic| Err(fault(name, &*panic))))
            .boxed()
    }
}

impl fmt::Debug for RpcSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcSurface")
            .field("module", &self.module)
            .field("operations", &self.operations())
            .finish()
    }
}

fn fault(operation: &str, panic: &(dyn Any + Send)) -> OperationFailure {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler faulted".to_string());
    tracing::error!(operation, %message, "handler faulted");
    OperationFailure::invocation(format!("operation '{operation}' failed: {message}"))
}
