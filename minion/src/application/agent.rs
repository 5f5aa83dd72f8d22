//! Agent-wide surface composed from every module's [`RpcSurface`].
//!
//! Composition happens once at startup and fails if two modules expose the
//! same operation name. Dispatch resolves the name against the composed
//! table and runs the invocation on its own tokio task, so a long-running
//! host command never stalls unrelated calls.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use func_common::{Call, OperationFailure};
use serde_json::Value;

use crate::application::exposure::RpcSurface;
use crate::domain::ExposureError;

/// Every exposed operation of the agent, keyed by operation name.
#[derive(Clone, Debug)]
pub struct AgentSurface {
    routes: Arc<BTreeMap<&'static str, RpcSurface>>,
}

impl AgentSurface {
    /// Merge module surfaces into one table.
    ///
    /// # Errors
    ///
    /// Returns [`ExposureError::Collision`] if an operation name is exposed
    /// by more than one module.
    pub fn compose<I>(surfaces: I) -> Result<Self, ExposureError>
    where
        I: IntoIterator<Item = RpcSurface>,
    {
        let mut routes: BTreeMap<&'static str, RpcSurface> = BTreeMap::new();
        for surface in surfaces {
            for operation in surface.operations() {
                if let Some(existing) = routes.get(operation) {
                    return Err(ExposureError::Collision {
                        operation,
                        first: existing.module(),
                        second: surface.module(),
                    });
                }
                routes.insert(operation, surface.clone());
            }
        }
        Ok(Self {
            routes: Arc::new(routes),
        })
    }

    /// `(operation, module)` pairs, sorted by operation.
    #[must_use]
    pub fn operations(&self) -> Vec<(&'static str, &'static str)> {
        self.routes
            .iter()
            .map(|(operation, surface)| (*operation, surface.module()))
            .collect()
    }

    /// Dispatch one call on a dedicated worker task.
    ///
    /// Unknown names are rejected here, before any worker is spawned. A
    /// worker that does not complete (panic or runtime shutdown) yields
    /// `invocation_error`.
    pub async fn dispatch(&self, call: Call) -> Result<Value, OperationFailure> {
        let Call { operation, args } = call;
        let Some(surface) = self.routes.get(operation.as_str()) else {
            tracing::warn!(%operation, "rejected unknown operation");
            return Err(OperationFailure::unknown_operation(&operation));
        };
        let module = surface.module();

        tracing::info!(%operation, module, "dispatching");
        let started = Instant::now();
        let worker = tokio::spawn(surface.invoke(&operation, args));

        let outcome = match worker.await {
            Ok(outcome) => outcome,
            Err(join) => Err(OperationFailure::invocation(format!(
                "worker for '{operation}' did not complete: {join}"
            ))),
        };

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &outcome {
            Ok(_) => tracing::info!(%operation, module, elapsed_ms, "call completed"),
            Err(failure) => tracing::warn!(
                %operation,
                module,
                elapsed_ms,
                kind = %failure.kind,
                message = %failure.message,
                "call failed"
            ),
        }
        outcome
    }
}
