//! Startup-time route construction and per-request resolution.

pub mod config;
pub mod convention;
pub mod handler;
pub mod registry;
pub mod resolver;
pub mod router;

pub use config::RouteOptions;
pub use convention::{BindReport, ConventionBinder, UnresolvedConvention};
pub use handler::{HandlerDescriptor, HandlerGroup, HandlerRef};
pub use registry::{PrefixRoutes, RegistryBuilder, RouteEntry, TemplateRegistry};
pub use resolver::{PathResolver, RouteMatch};
pub use router::{RouteRequest, Router};
