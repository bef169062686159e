use std::sync::Arc;

use crate::error::RoutingError;
use crate::guard::UnboundOperationGuard;
use crate::query::FilterExpr;
use crate::routing::config::RouteOptions;
use crate::routing::registry::TemplateRegistry;
use crate::routing::resolver::{PathResolver, RouteMatch};

/// What the request pipeline hands over for one request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteRequest {
    pub prefix: String,
    pub method: String,
    /// Percent-decoded path segments after the prefix.
    pub segments: Vec<String>,
    pub filter: Option<FilterExpr>,
    pub search: Option<FilterExpr>,
}

impl RouteRequest {
    pub fn new(prefix: &str, method: &str, segments: &[&str]) -> Self {
        Self {
            prefix: prefix.to_string(),
            method: method.to_string(),
            segments: segments.iter().map(|s| s.to_string()).collect(),
            filter: None,
            search: None,
        }
    }

    pub fn with_filter(mut self, filter: FilterExpr) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_search(mut self, search: FilterExpr) -> Self {
        self.search = Some(search);
        self
    }
}

/// Entry point for request routing: query-option validation, then path
/// resolution against the frozen registry.
#[derive(Debug, Clone)]
pub struct Router {
    resolver: PathResolver,
}

impl Router {
    pub fn new(registry: TemplateRegistry) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    pub fn from_shared(registry: Arc<TemplateRegistry>) -> Self {
        Self {
            resolver: PathResolver::new(registry),
        }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        self.resolver.registry()
    }

    pub fn options(&self) -> &RouteOptions {
        self.registry().options()
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Route one request. `$filter` and `$search` are checked against the
    /// model of the first prefix that matches, before any path matching.
    pub fn route(&self, request: &RouteRequest) -> Result<RouteMatch<'_>, RoutingError> {
        let registry = self.registry();
        let model = registry
            .matching_prefixes(&request.prefix)
            .next()
            .map(|(group, _)| Arc::clone(&group.model));

        if let Some(model) = model {
            let guard = UnboundOperationGuard::new(&model, registry.options());
            for expr in request.filter.iter().chain(&request.search) {
                guard.validate(expr)?;
            }
        }

        self.resolver
            .resolve(&request.prefix, &request.method, &request.segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdmModel, EdmPrimitive, EntityType, Operation};
    use crate::path::{Literal, RoutePrefix};
    use crate::query::BinaryOp;
    use crate::routing::handler::HandlerRef;
    use crate::routing::registry::RouteEntry;
    use crate::template::{PathTemplate, Segment};

    fn router() -> Router {
        let model = Arc::new(
            EdmModel::new("Default")
                .with_entity_type(EntityType::new("Customer").with_key("ID", EdmPrimitive::Int32))
                .with_entity_set("Customers", "Customer")
                .with_operation(
                    Operation::function("Default", "GetName")
                        .with_parameter("CustomerId", EdmPrimitive::Int32),
                ),
        );
        let mut builder = TemplateRegistry::builder(RouteOptions::default());
        builder
            .register(RouteEntry::new(
                RoutePrefix::parse("odata").unwrap(),
                PathTemplate::new(vec![Segment::EntitySet("Customers".into())]),
                model,
                HandlerRef::new("Customers", "Get", &[]),
                "GET",
            ))
            .unwrap();
        Router::new(builder.build())
    }

    fn unbound_filter() -> FilterExpr {
        FilterExpr::binary(
            BinaryOp::Eq,
            FilterExpr::call("Default.GetName", vec![FilterExpr::literal(Literal::Int(407))]),
            FilterExpr::literal(Literal::String("Name 7".into())),
        )
    }

    #[test]
    fn test_route_without_query_options() {
        let router = router();
        let matched = router
            .route(&RouteRequest::new("odata", "GET", &["Customers"]))
            .unwrap();
        assert_eq!(matched.entry.handler.name(), "Get");
    }

    #[test]
    fn test_guard_runs_before_path_matching() {
        let router = router();
        let request = RouteRequest::new("odata", "GET", &["Customers"]).with_filter(unbound_filter());
        assert!(matches!(
            router.route(&request),
            Err(RoutingError::BadRequest { .. })
        ));

        // path would not match either; the guard still answers first
        let request = RouteRequest::new("odata", "GET", &["Nowhere"]).with_search(unbound_filter());
        assert!(matches!(
            router.route(&request),
            Err(RoutingError::BadRequest { .. })
        ));
    }

    #[test]
    fn test_unknown_prefix_is_not_found() {
        let router = router();
        let request = RouteRequest::new("missing", "GET", &["Customers"]).with_filter(unbound_filter());
        assert!(matches!(
            router.route(&request),
            Err(RoutingError::NotFound { .. })
        ));
    }
}
