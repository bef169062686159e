//! Model-driven URL routing for OData-style services.
//!
//! At startup a [`ConventionBinder`] reads the entity data model and the
//! available handler groups and registers one [`RouteEntry`] per recognised
//! handler. The frozen [`TemplateRegistry`] is then shared by every request:
//! a [`Router`] validates `$filter` / `$search` and resolves the path to a
//! handler plus its bound key and argument values.

pub mod error;
pub mod guard;
pub mod model;
pub mod path;
pub mod query;
pub mod routing;
pub mod template;

pub use error::{ConfigurationError, RoutingError, TokenError, UNBOUND_OPERATION_IN_FILTER};
pub use guard::{UnboundOperationGuard, validate_filter};
pub use model::{
    EdmModel, EdmPrimitive, EdmTypeRef, EntitySet, EntityType, NavigationProperty, Operation,
    OperationBinding, OperationImport, OperationKind, Parameter, Property,
};
pub use path::{Literal, PathToken, RoutePrefix, TokenArgs, tokenize};
pub use query::{BinaryOp, CallNode, FilterExpr, UnaryOp};
pub use routing::{
    BindReport, ConventionBinder, HandlerDescriptor, HandlerGroup, HandlerRef, PathResolver,
    RegistryBuilder, RouteEntry, RouteMatch, RouteOptions, RouteRequest, Router, TemplateRegistry,
    UnresolvedConvention,
};
pub use template::{
    Bindings, KeyPlaceholder, MatchResult, OperationSegment, PathTemplate, Segment,
};
