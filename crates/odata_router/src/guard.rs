use tracing::debug;

use crate::error::{RoutingError, UNBOUND_OPERATION_IN_FILTER};
use crate::model::EdmModel;
use crate::query::{CallNode, FilterExpr};
use crate::routing::config::RouteOptions;

/// Rejects `$filter` and `$search` expressions that call unbound operations.
///
/// Unbound operations are only reachable through their own path segment, so
/// a call inside a boolean expression is a client error.
#[derive(Debug, Clone, Copy)]
pub struct UnboundOperationGuard<'a> {
    model: &'a EdmModel,
    options: &'a RouteOptions,
}

impl<'a> UnboundOperationGuard<'a> {
    pub fn new(model: &'a EdmModel, options: &'a RouteOptions) -> Self {
        Self { model, options }
    }

    /// A call is unbound when the parser flagged it, or when its name only
    /// resolves to unbound operations or imports in the model.
    pub fn is_unbound(&self, call: &CallNode) -> bool {
        call.unbound
            || self
                .model
                .is_unbound_callable(&call.name, self.options.case_insensitive)
    }

    pub fn validate(&self, expr: &FilterExpr) -> Result<(), RoutingError> {
        match expr.calls().into_iter().find(|call| self.is_unbound(call)) {
            Some(call) => {
                debug!(operation = %call.name, "Unbound operation in query expression");
                Err(RoutingError::bad_request(UNBOUND_OPERATION_IN_FILTER))
            }
            None => Ok(()),
        }
    }
}

/// Convenience wrapper over [`UnboundOperationGuard::validate`].
pub fn validate_filter(
    expr: &FilterExpr,
    model: &EdmModel,
    options: &RouteOptions,
) -> Result<(), RoutingError> {
    UnboundOperationGuard::new(model, options).validate(expr)
}
