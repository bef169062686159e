//! Turns handler names and parameter lists into route templates.
//!
//! Each handler group gets a lookup table from handler name to the
//! conventions that name can stand for. A handler is routed when exactly one
//! of its candidate conventions accepts its parameter list.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::ConfigurationError;
use crate::model::{EdmModel, EntitySet, EntityType, Operation, OperationBinding, OperationKind};
use crate::path::{RoutePrefix, is_identifier};
use crate::routing::config::RouteOptions;
use crate::routing::handler::{HandlerDescriptor, HandlerGroup, HandlerRef};
use crate::routing::registry::{RegistryBuilder, RouteEntry};
use crate::template::{KeyPlaceholder, OperationSegment, PathTemplate, Segment};

const METADATA_HANDLER: &str = "GetMetadata";
const SERVICE_DOCUMENT_HANDLER: &str = "GetServiceDocument";
const DYNAMIC_NAVIGATION_HANDLER: &str = "GetNavigation";

/// The closed set of handler conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Convention {
    /// `Get` / `Get{EntitySet}` with no parameters.
    Collection,
    /// `Get` / `Get{EntityType}` with one parameter per key property.
    /// `explicit` marks the `Get{EntityType}` spelling, which cannot mean
    /// anything else.
    ByKey { explicit: bool },
    /// `Get{NavigationProperty}` with the key parameters.
    Navigation(String),
    /// `Get{Property}` with the key parameters.
    NamedValue(String),
    /// `GetNavigation` in a dynamic group: any navigation name.
    AnyNavigation,
    /// Handler named after a function or action.
    Operation(String),
    Metadata,
    ServiceDocument,
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Convention::Collection => f.write_str("collection"),
            Convention::ByKey { .. } => f.write_str("by-key"),
            Convention::Navigation(name) => write!(f, "navigation '{name}'"),
            Convention::NamedValue(name) => write!(f, "named value '{name}'"),
            Convention::AnyNavigation => f.write_str("any navigation"),
            Convention::Operation(name) => write!(f, "operation '{name}'"),
            Convention::Metadata => f.write_str("metadata"),
            Convention::ServiceDocument => f.write_str("service document"),
        }
    }
}

/// A handler that no convention accepted. Not fatal: another routing
/// provider may still claim it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedConvention {
    pub handler: HandlerRef,
    pub reason: String,
}

impl fmt::Display for UnresolvedConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.handler, self.reason)
    }
}

/// Outcome of one binder run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BindReport {
    /// Number of route entries registered.
    pub registered: usize,
    pub unresolved: Vec<UnresolvedConvention>,
}

/// What a group of handlers is routed against.
enum GroupScope<'m> {
    EntitySet {
        set: &'m EntitySet,
        entity_type: &'m EntityType,
    },
    Metadata,
    /// Entity sets named at request time. `named_values` are the `Get{X}`
    /// names the group routes as static properties.
    Dynamic {
        named_values: Vec<String>,
    },
    Other,
}

/// Result of trying one convention against one handler.
enum Fit {
    Routes(Vec<(PathTemplate, &'static str)>),
    Skip(String),
    Fail(ConfigurationError),
}

/// Builds route entries for one prefix and model from handler groups.
///
/// Runs once at startup, before the registry is frozen.
#[derive(Debug, Clone)]
pub struct ConventionBinder {
    prefix: RoutePrefix,
    model: Arc<EdmModel>,
}

impl ConventionBinder {
    pub fn new(prefix: &str, model: Arc<EdmModel>) -> Result<Self, ConfigurationError> {
        Ok(Self {
            prefix: RoutePrefix::parse(prefix)?,
            model,
        })
    }

    /// Register a route entry for every handler a convention accepts.
    ///
    /// The builder is handed back only on success: after the first
    /// configuration error it is dropped with its partial table.
    pub fn bind(
        &self,
        groups: &[HandlerGroup],
        mut builder: RegistryBuilder,
    ) -> Result<(RegistryBuilder, BindReport), ConfigurationError> {
        let options = builder.options().clone();
        self.check_entity_sets()?;

        let mut report = BindReport::default();
        for group in groups {
            let scope = self.scope_for(group, &options);
            let table = self.convention_table(&scope, &options);

            for handler in &group.handlers {
                let Some(candidates) = table.get(&table_key(&handler.name, &options)) else {
                    debug!(handler = %handler.handler, "Handler matches no convention name");
                    continue;
                };

                match self.resolve_handler(handler, candidates, &scope, &options)? {
                    Ok(routes) => {
                        for (template, method) in routes {
                            builder.register(RouteEntry::new(
                                self.prefix.clone(),
                                template,
                                Arc::clone(&self.model),
                                handler.handler.clone(),
                                method,
                            ))?;
                            report.registered += 1;
                        }
                    }
                    Err(unresolved) => {
                        warn!(
                            prefix = %self.prefix,
                            handler = %unresolved.handler,
                            reason = %unresolved.reason,
                            "Unresolved routing convention"
                        );
                        report.unresolved.push(unresolved);
                    }
                }
            }
        }

        info!(
            prefix = %self.prefix,
            routes = report.registered,
            unresolved = report.unresolved.len(),
            "Convention binding complete"
        );
        Ok((builder, report))
    }

    fn check_entity_sets(&self) -> Result<(), ConfigurationError> {
        for set in self.model.entity_sets() {
            if self.model.entity_type(&set.entity_type).is_none() {
                return Err(ConfigurationError::UnknownEntityType {
                    entity_set: set.name.clone(),
                    entity_type: set.entity_type.clone(),
                });
            }
        }
        Ok(())
    }

    fn scope_for(&self, group: &HandlerGroup, options: &RouteOptions) -> GroupScope<'_> {
        if group.dynamic {
            let mut named_values: Vec<String> = Vec::new();
            for name in group.handlers.iter().filter_map(|h| dynamic_named_value(&h.name)) {
                if !named_values.iter().any(|n| n == name) {
                    named_values.push(name.to_string());
                }
            }
            return GroupScope::Dynamic { named_values };
        }
        if options.names_equal(&group.name, &options.metadata_group) {
            return GroupScope::Metadata;
        }

        self.model
            .entity_sets()
            .iter()
            .find(|set| options.names_equal(&set.name, &group.name))
            .and_then(|set| {
                self.model
                    .entity_type(&set.entity_type)
                    .map(|entity_type| GroupScope::EntitySet { set, entity_type })
            })
            .unwrap_or(GroupScope::Other)
    }

    /// Handler name to candidate conventions, for one group.
    fn convention_table(
        &self,
        scope: &GroupScope<'_>,
        options: &RouteOptions,
    ) -> HashMap<String, Vec<Convention>, ahash::RandomState> {
        let mut table: HashMap<String, Vec<Convention>, ahash::RandomState> = HashMap::default();
        let mut add = |name: String, convention: Convention| {
            let entry = table.entry(table_key(&name, options)).or_default();
            if !entry.contains(&convention) {
                entry.push(convention);
            }
        };

        match scope {
            GroupScope::EntitySet { set, entity_type } => {
                add("Get".into(), Convention::Collection);
                add("Get".into(), Convention::ByKey { explicit: false });
                add(format!("Get{}", set.name), Convention::Collection);
                add(
                    format!("Get{}", entity_type.name),
                    Convention::ByKey { explicit: true },
                );
                for nav in &entity_type.navigation {
                    add(
                        format!("Get{}", nav.name),
                        Convention::Navigation(nav.name.clone()),
                    );
                }
                for prop in entity_type.keys.iter().chain(&entity_type.properties) {
                    add(
                        format!("Get{}", prop.name),
                        Convention::NamedValue(prop.name.clone()),
                    );
                }
                for op in self.model.operations() {
                    if bound_type(op) == Some(entity_type.name.as_str()) {
                        add(op.name.clone(), Convention::Operation(op.name.clone()));
                    }
                }
            }
            GroupScope::Metadata => {
                add(METADATA_HANDLER.into(), Convention::Metadata);
                add(SERVICE_DOCUMENT_HANDLER.into(), Convention::ServiceDocument);
            }
            GroupScope::Dynamic { named_values } => {
                add("Get".into(), Convention::Collection);
                add("Get".into(), Convention::ByKey { explicit: false });
                add(DYNAMIC_NAVIGATION_HANDLER.into(), Convention::AnyNavigation);
                for name in named_values {
                    add(format!("Get{name}"), Convention::NamedValue(name.clone()));
                }
            }
            GroupScope::Other => {}
        }

        for op in self.model.operations().iter().filter(|op| !op.is_bound()) {
            add(op.name.clone(), Convention::Operation(op.name.clone()));
        }

        table
    }

    /// `Ok(Ok(routes))` when exactly one convention fits, `Ok(Err(_))` when
    /// none does and the handler should be left to other providers.
    fn resolve_handler(
        &self,
        handler: &HandlerDescriptor,
        candidates: &[Convention],
        scope: &GroupScope<'_>,
        options: &RouteOptions,
    ) -> Result<Result<Vec<(PathTemplate, &'static str)>, UnresolvedConvention>, ConfigurationError>
    {
        let parameters = self.route_parameters(handler);
        let mut fitted = Vec::new();
        let mut skipped = Vec::new();
        let mut failure = None;

        for convention in candidates {
            match self.try_convention(convention, handler, &parameters, scope, options) {
                Fit::Routes(routes) => fitted.push((convention, routes)),
                Fit::Skip(reason) => skipped.push(format!("{convention}: {reason}")),
                Fit::Fail(err) => {
                    failure.get_or_insert(err);
                }
            }
        }

        match fitted.len() {
            1 => Ok(Ok(fitted.remove(0).1)),
            0 => match failure {
                Some(err) => Err(err),
                None => Ok(Err(UnresolvedConvention {
                    handler: handler.handler.clone(),
                    reason: skipped.join("; "),
                })),
            },
            _ => Err(ConfigurationError::AmbiguousConvention {
                handler: handler.handler.clone(),
                conventions: fitted
                    .iter()
                    .map(|(c, _)| c.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    /// Handler parameters that come from the request path. Parameters named
    /// after a prefix placeholder are bound from the prefix instead.
    fn route_parameters<'h>(&self, handler: &'h HandlerDescriptor) -> Vec<&'h str> {
        handler
            .parameters
            .iter()
            .map(String::as_str)
            .filter(|p| !self.prefix.parameter_names().any(|name| name == *p))
            .collect()
    }

    fn try_convention(
        &self,
        convention: &Convention,
        handler: &HandlerDescriptor,
        parameters: &[&str],
        scope: &GroupScope<'_>,
        options: &RouteOptions,
    ) -> Fit {
        let arity = parameters.len();

        match (convention, scope) {
            (Convention::Metadata, _) if arity == 0 => {
                Fit::Routes(vec![(PathTemplate::new(vec![Segment::Metadata]), "GET")])
            }
            (Convention::ServiceDocument, _) if arity == 0 => {
                Fit::Routes(vec![(PathTemplate::service_document(), "GET")])
            }
            (Convention::Metadata | Convention::ServiceDocument, _) => {
                Fit::Skip(format!("expects no parameters, declares {arity}"))
            }
            (Convention::Operation(name), _) => {
                self.try_operation(name, handler, parameters, scope, options)
            }
            (_, GroupScope::Dynamic { named_values }) => {
                let keyed = PathTemplate::new(vec![Segment::DynamicEntitySetWithKey]);
                match convention {
                    Convention::Collection if arity == 0 => {
                        let collection = PathTemplate::new(vec![Segment::DynamicEntitySet]);
                        let count = collection.with_segment(Segment::Count);
                        Fit::Routes(vec![(collection, "GET"), (count, "GET")])
                    }
                    Convention::Collection => {
                        Fit::Skip(format!("expects no parameters, declares {arity}"))
                    }
                    _ if arity == 0 => Fit::Skip("expects key parameters, declares none".into()),
                    Convention::ByKey { .. } => Fit::Routes(vec![(keyed, "GET")]),
                    Convention::AnyNavigation => Fit::Routes(vec![(
                        keyed.with_segment(Segment::DynamicNavigation {
                            excluded: named_values.clone(),
                        }),
                        "GET",
                    )]),
                    Convention::NamedValue(prop) => Fit::Routes(vec![(
                        keyed.with_segment(Segment::StaticNamedValue(prop.clone())),
                        "GET",
                    )]),
                    _ => Fit::Skip("not applicable to a dynamic group".into()),
                }
            }
            (_, GroupScope::EntitySet { set, entity_type }) => {
                let keys = entity_type.keys.len();
                let collection = PathTemplate::new(vec![Segment::EntitySet(set.name.clone())]);
                let by_key = PathTemplate::new(vec![key_segment(set, entity_type)]);

                match convention {
                    Convention::Collection if arity == 0 => {
                        let count = collection.with_segment(Segment::Count);
                        Fit::Routes(vec![(collection, "GET"), (count, "GET")])
                    }
                    Convention::Collection => {
                        Fit::Skip(format!("expects no parameters, declares {arity}"))
                    }
                    _ if keys == 0 => Fit::Skip(format!(
                        "entity type '{}' declares no key",
                        entity_type.name
                    )),
                    _ if arity != keys => {
                        let reason = format!("expects {keys} key parameter(s), declares {arity}");
                        match convention {
                            Convention::ByKey { explicit: true } => {
                                Fit::Fail(ConfigurationError::MalformedConvention {
                                    handler: handler.handler.clone(),
                                    reason,
                                })
                            }
                            _ => Fit::Skip(reason),
                        }
                    }
                    Convention::ByKey { .. } => Fit::Routes(vec![(by_key, "GET")]),
                    Convention::Navigation(nav) => {
                        let template = by_key.with_segment(Segment::Navigation(nav.clone()));
                        let count = entity_type
                            .navigation_property(nav)
                            .is_some_and(|n| n.collection)
                            .then(|| (template.with_segment(Segment::Count), "GET"));
                        Fit::Routes(std::iter::once((template, "GET")).chain(count).collect())
                    }
                    Convention::NamedValue(prop) => Fit::Routes(vec![(
                        by_key.with_segment(Segment::StaticNamedValue(prop.clone())),
                        "GET",
                    )]),
                    _ => Fit::Skip("not applicable to an entity set".into()),
                }
            }
            _ => Fit::Skip("group is not an entity set".into()),
        }
    }

    /// Overload resolution: the overload whose parameter names equal the
    /// handler's (after key parameters for entity-bound operations) wins.
    fn try_operation(
        &self,
        name: &str,
        handler: &HandlerDescriptor,
        parameters: &[&str],
        scope: &GroupScope<'_>,
        options: &RouteOptions,
    ) -> Fit {
        let scope_type = match scope {
            GroupScope::EntitySet { entity_type, .. } => Some(entity_type.name.as_str()),
            _ => None,
        };

        let applicable: Vec<&Operation> = self
            .model
            .operations_named(name)
            .filter(|op| match bound_type(op) {
                None => true,
                Some(t) => Some(t) == scope_type,
            })
            .collect();
        if applicable.is_empty() {
            return Fit::Skip(format!("no overload of '{name}' applies to this group"));
        }

        let matching: Vec<&Operation> = applicable
            .into_iter()
            .filter(|op| {
                let declared = match (&op.binding, scope) {
                    (OperationBinding::Entity(_), GroupScope::EntitySet { entity_type, .. }) => {
                        match parameters.get(entity_type.keys.len()..) {
                            Some(rest) => rest,
                            None => return false,
                        }
                    }
                    _ => parameters,
                };
                same_names(declared, op, options)
            })
            .collect();

        match matching.as_slice() {
            [] => Fit::Fail(ConfigurationError::NoMatchingOverload {
                handler: handler.handler.clone(),
                operation: name.to_string(),
            }),
            [op] => Fit::Routes(self.operation_routes(op, scope)),
            many => Fit::Fail(ConfigurationError::AmbiguousOverload {
                handler: handler.handler.clone(),
                operation: name.to_string(),
                candidates: many.len(),
            }),
        }
    }

    fn operation_routes(
        &self,
        op: &Operation,
        scope: &GroupScope<'_>,
    ) -> Vec<(PathTemplate, &'static str)> {
        let parameters: Vec<_> = op
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.ty.clone()))
            .collect();
        let method = op.kind.http_method();

        let templates: Vec<PathTemplate> = match (&op.binding, scope) {
            (OperationBinding::Unbound, _) => {
                let mut names: Vec<&str> = Vec::new();
                for import in self.model.imports_for(&op.name) {
                    if !names.contains(&import.name.as_str()) {
                        names.push(&import.name);
                    }
                }
                if names.is_empty() {
                    names.push(&op.name);
                }
                names
                    .into_iter()
                    .map(|name| {
                        PathTemplate::new(vec![Segment::OperationCall(OperationSegment {
                            name: name.to_string(),
                            namespace: None,
                            kind: op.kind,
                            bound: false,
                            parameters: parameters.clone(),
                        })])
                    })
                    .collect()
            }
            (binding, GroupScope::EntitySet { set, entity_type }) => {
                let receiver = match binding {
                    OperationBinding::Entity(_) => key_segment(set, entity_type),
                    _ => Segment::EntitySet(set.name.clone()),
                };
                vec![PathTemplate::new(vec![
                    receiver,
                    Segment::OperationCall(OperationSegment {
                        name: op.name.clone(),
                        namespace: Some(op.namespace.clone()),
                        kind: op.kind,
                        bound: true,
                        parameters,
                    }),
                ])]
            }
            // bound overloads are filtered to entity-set scopes
            _ => Vec::new(),
        };

        let counted = op.kind == OperationKind::Function && op.returns_collection;
        let continuations = self.entity_continuations(op);
        templates
            .into_iter()
            .flat_map(|template| {
                let count = counted.then(|| (template.with_segment(Segment::Count), method));
                let tails: Vec<_> = continuations
                    .iter()
                    .map(|tail| {
                        let extended = tail
                            .iter()
                            .fold(template.clone(), |t, segment| t.with_segment(segment.clone()));
                        (extended, method)
                    })
                    .collect();
                std::iter::once((template, method)).chain(count).chain(tails)
            })
            .collect()
    }

    /// Segment tails that may follow a function returning a single entity:
    /// each property, each navigation, and `$count` after collection
    /// navigations.
    fn entity_continuations(&self, op: &Operation) -> Vec<Vec<Segment>> {
        let Some(type_name) = op.composable_entity() else {
            return Vec::new();
        };
        let Some(entity_type) = self.model.entity_type(type_name) else {
            warn!(
                operation = %op.name,
                entity_type = type_name,
                "Return type not in model; result is not composable"
            );
            return Vec::new();
        };

        let mut tails: Vec<Vec<Segment>> = entity_type
            .keys
            .iter()
            .chain(&entity_type.properties)
            .map(|p| vec![Segment::StaticNamedValue(p.name.clone())])
            .collect();
        for nav in &entity_type.navigation {
            tails.push(vec![Segment::Navigation(nav.name.clone())]);
            if nav.collection {
                tails.push(vec![Segment::Navigation(nav.name.clone()), Segment::Count]);
            }
        }
        tails
    }
}

fn table_key(name: &str, options: &RouteOptions) -> String {
    if options.case_insensitive {
        name.to_ascii_lowercase()
    } else {
        name.to_string()
    }
}

fn bound_type(op: &Operation) -> Option<&str> {
    match &op.binding {
        OperationBinding::Unbound => None,
        OperationBinding::Entity(t) | OperationBinding::Collection(t) => Some(t),
    }
}

fn key_segment(set: &EntitySet, entity_type: &EntityType) -> Segment {
    Segment::EntitySetWithKey {
        entity_set: set.name.clone(),
        keys: entity_type
            .keys
            .iter()
            .map(|k| KeyPlaceholder {
                name: k.name.clone(),
                ty: k.ty,
            })
            .collect(),
    }
}

/// `Name` for a `GetName` handler; `GetNavigation` is reserved.
fn dynamic_named_value(handler_name: &str) -> Option<&str> {
    handler_name
        .strip_prefix("Get")
        .filter(|rest| is_identifier(rest) && *rest != "Navigation")
}

/// Parameter-name sets equal, ignoring order.
fn same_names(declared: &[&str], op: &Operation, options: &RouteOptions) -> bool {
    declared.len() == op.parameters.len()
        && op.parameters.iter().all(|p| {
            declared
                .iter()
                .filter(|d| options.names_equal(d, &p.name))
                .count()
                == 1
        })
}
