use std::fmt;
use std::sync::Arc;

/// Opaque reference to a handler, handed back to the hosting framework when a
/// route matches. Cheap to clone; identity is (group, name, parameters).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerRef {
    group: Arc<str>,
    name: Arc<str>,
    parameters: Arc<[String]>,
}

impl HandlerRef {
    pub fn new(group: &str, name: &str, parameters: &[String]) -> Self {
        Self {
            group: Arc::from(group),
            name: Arc::from(name),
            parameters: Arc::from(parameters),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.group, self.name, self.parameters.join(", "))
    }
}

/// Structural description of one handler: its name and declared parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerDescriptor {
    pub name: String,
    pub parameters: Vec<String>,
    pub handler: HandlerRef,
}

impl HandlerDescriptor {
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// The handlers of one logical controller group.
///
/// A group named after an entity set gets the entity-set conventions; the
/// group named by [`RouteOptions::metadata_group`](super::RouteOptions) gets
/// the metadata conventions; every group may host operation handlers.
/// A dynamic group serves every entity set of a model that is only known at
/// request time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerGroup {
    pub name: String,
    pub handlers: Vec<HandlerDescriptor>,
    pub dynamic: bool,
}

impl HandlerGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: Vec::new(),
            dynamic: false,
        }
    }

    /// A group whose `Get`, `GetNavigation` and `Get{Property}` handlers
    /// route any entity set name.
    pub fn dynamic(name: impl Into<String>) -> Self {
        Self {
            dynamic: true,
            ..Self::new(name)
        }
    }

    /// Add a handler declared with the given parameter names.
    ///
    /// # Example
    /// ```
    /// use odata_router::HandlerGroup;
    ///
    /// let group = HandlerGroup::new("Customers")
    ///     .with_handler("Get", &[])
    ///     .with_handler("Get", &["key"]);
    /// assert_eq!(group.handlers.len(), 2);
    /// ```
    pub fn with_handler(mut self, name: &str, parameters: &[&str]) -> Self {
        let parameters: Vec<String> = parameters.iter().map(|p| p.to_string()).collect();
        let handler = HandlerRef::new(&self.name, name, &parameters);
        self.handlers.push(HandlerDescriptor {
            name: name.to_string(),
            parameters,
            handler,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_ref_display() {
        let group = HandlerGroup::new("Customers").with_handler("GetOrders", &["key"]);
        let handler = &group.handlers[0].handler;
        assert_eq!(handler.to_string(), "Customers.GetOrders(key)");
        assert_eq!(handler.group(), "Customers");
        assert_eq!(handler.name(), "GetOrders");
        assert_eq!(handler.parameters(), ["key".to_string()]);
    }

    #[test]
    fn test_overloads_have_distinct_refs() {
        let group = HandlerGroup::new("Customers")
            .with_handler("Get", &[])
            .with_handler("Get", &["key"]);
        assert_ne!(group.handlers[0].handler, group.handlers[1].handler);
        assert_eq!(group.handlers[0].arity(), 0);
        assert_eq!(group.handlers[1].arity(), 1);
        assert!(!group.dynamic);
        assert!(HandlerGroup::dynamic("HandleAll").dynamic);
    }
}
