use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::RoutingError;
use crate::path::tokenize;
use crate::routing::registry::{RouteEntry, TemplateRegistry};
use crate::template::{Bindings, MatchResult};

/// A resolved request: the entry that matched and the values bound from the
/// prefix and the path.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch<'r> {
    pub entry: &'r RouteEntry,
    pub bindings: Bindings,
}

impl fmt::Display for RouteMatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.entry)
    }
}

/// Stateless matcher over a frozen [`TemplateRegistry`].
///
/// Clones share the registry, so one resolver can be handed to every request
/// worker.
#[derive(Debug, Clone)]
pub struct PathResolver {
    registry: Arc<TemplateRegistry>,
}

impl PathResolver {
    pub fn new(registry: Arc<TemplateRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Find the handler for a request.
    ///
    /// `segments` are the percent-decoded path segments after the prefix.
    /// Entries are tried in registration order and the first match wins.
    pub fn resolve<S: AsRef<str>>(
        &self,
        prefix: &str,
        method: &str,
        segments: &[S],
    ) -> Result<RouteMatch<'_>, RoutingError> {
        let tokens = tokenize(segments).inspect_err(|e| {
            debug!(prefix, method, error = %e, "Rejected malformed path");
        })?;
        let options = self.registry.options();

        for (group, prefix_values) in self.registry.matching_prefixes(prefix) {
            let candidates = group
                .entries
                .iter()
                .filter(|entry| entry.method.eq_ignore_ascii_case(method));

            for entry in candidates {
                if let MatchResult::Matched(mut bindings) = entry.template.try_match(&tokens, options)
                {
                    bindings.prefix = prefix_values;
                    debug!(
                        prefix,
                        method,
                        template = %entry.template,
                        handler = %entry.handler,
                        "Resolved route"
                    );
                    return Ok(RouteMatch { entry, bindings });
                }
            }
        }

        let path = segments
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join("/");
        debug!(prefix, method, path = %path, "No route matched");
        Err(RoutingError::NotFound {
            prefix: prefix.trim_matches('/').to_string(),
            method: method.to_ascii_uppercase(),
            path,
        })
    }
}
