use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::error::ConfigurationError;
use crate::model::EdmModel;
use crate::path::RoutePrefix;
use crate::routing::config::RouteOptions;
use crate::routing::handler::HandlerRef;
use crate::template::PathTemplate;

/// One registered route: a template under a prefix, served by a handler for
/// one HTTP method.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteEntry {
    pub prefix: RoutePrefix,
    pub template: PathTemplate,
    pub model: Arc<EdmModel>,
    pub handler: HandlerRef,
    /// Upper-case HTTP method.
    pub method: String,
}

impl RouteEntry {
    pub fn new(
        prefix: RoutePrefix,
        template: PathTemplate,
        model: Arc<EdmModel>,
        handler: HandlerRef,
        method: &str,
    ) -> Self {
        Self {
            prefix,
            template,
            model,
            handler,
            method: method.to_ascii_uppercase(),
        }
    }

    /// Path as a client would write it, with placeholders.
    pub fn route_path(&self) -> String {
        match (self.prefix.as_str(), self.template.is_empty()) {
            (prefix, true) => prefix.to_string(),
            ("", false) => self.template.to_string(),
            (prefix, false) => format!("{prefix}/{}", self.template),
        }
    }
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} /{} -> {}", self.method, self.route_path(), self.handler)
    }
}

/// Entries registered under one prefix, all bound to the same model.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixRoutes {
    pub prefix: RoutePrefix,
    pub model: Arc<EdmModel>,
    pub entries: Vec<RouteEntry>,
}

/// The immutable route table. Built once through [`RegistryBuilder`] and then
/// only read, so it can be shared across request threads without locking.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateRegistry {
    groups: Vec<PrefixRoutes>,
    index: HashMap<String, usize, ahash::RandomState>,
    options: RouteOptions,
}

impl TemplateRegistry {
    pub fn builder(options: RouteOptions) -> RegistryBuilder {
        RegistryBuilder::new(options)
    }

    /// Entries registered under exactly this prefix template, in
    /// registration order.
    pub fn entries_for(&self, prefix: &str) -> &[RouteEntry] {
        self.index
            .get(prefix.trim_matches('/'))
            .map(|&i| self.groups[i].entries.as_slice())
            .unwrap_or(&[])
    }

    /// Every entry, grouped by prefix in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.groups.iter().flat_map(|g| g.entries.iter())
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &RoutePrefix> {
        self.groups.iter().map(|g| &g.prefix)
    }

    pub fn model_for(&self, prefix: &str) -> Option<&Arc<EdmModel>> {
        self.index
            .get(prefix.trim_matches('/'))
            .map(|&i| &self.groups[i].model)
    }

    /// Prefix groups whose template matches a request prefix, with the bound
    /// placeholder values.
    pub fn matching_prefixes<'a, 'p>(
        &'a self,
        request_prefix: &'p str,
    ) -> impl Iterator<Item = (&'a PrefixRoutes, Vec<(String, String)>)> + use<'a, 'p> {
        self.groups
            .iter()
            .filter_map(move |g| g.prefix.bind(request_prefix).map(|values| (g, values)))
    }

    pub fn options(&self) -> &RouteOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mutable phase of the route table. Rejects any entry whose template could
/// match the same request as an entry already registered under the same
/// prefix and method.
#[derive(Debug)]
pub struct RegistryBuilder {
    registry: TemplateRegistry,
}

impl RegistryBuilder {
    pub fn new(options: RouteOptions) -> Self {
        Self {
            registry: TemplateRegistry {
                groups: Vec::new(),
                index: HashMap::default(),
                options,
            },
        }
    }

    pub fn options(&self) -> &RouteOptions {
        &self.registry.options
    }

    pub fn register(&mut self, entry: RouteEntry) -> Result<(), ConfigurationError> {
        let registry = &mut self.registry;
        let key = entry.prefix.as_str().to_string();

        if let Some(&i) = registry.index.get(&key) {
            let model = &registry.groups[i].model;
            if !Arc::ptr_eq(model, &entry.model) && **model != *entry.model {
                return Err(ConfigurationError::ModelMismatch(key));
            }
        }

        // prefixes like `odata/{ds}` and `odata/v1` can both bind one request
        let clash = registry
            .groups
            .iter()
            .filter(|group| group.prefix.overlaps(&entry.prefix))
            .flat_map(|group| group.entries.iter())
            .find(|existing| {
                existing.method == entry.method
                    && existing.template.overlaps(&entry.template, &registry.options)
            });
        if let Some(existing) = clash {
            return Err(ConfigurationError::DuplicateTemplate {
                prefix: entry.prefix.to_string(),
                method: entry.method.clone(),
                template: entry.template.to_string(),
                handler: entry.handler.clone(),
                existing: existing.route_path(),
                existing_handler: existing.handler.clone(),
            });
        }

        let slot = match registry.index.get(&key) {
            Some(&i) => i,
            None => {
                registry.groups.push(PrefixRoutes {
                    prefix: entry.prefix.clone(),
                    model: Arc::clone(&entry.model),
                    entries: Vec::new(),
                });
                let i = registry.groups.len() - 1;
                registry.index.insert(key, i);
                i
            }
        };

        info!(
            method = %entry.method,
            route = %entry.route_path(),
            handler = %entry.handler,
            "Registered route"
        );
        registry.groups[slot].entries.push(entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Freeze the table.
    pub fn build(self) -> TemplateRegistry {
        self.registry
    }
}
