/// Options that change how request segments are compared against templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOptions {
    /// Accept `Namespace.Operation(...)` for operation segments.
    pub enable_qualified_operation_call: bool,

    /// Accept the bare operation name for bound operation segments.
    /// Operation imports are always addressed by their bare import name.
    pub enable_unqualified_operation_call: bool,

    /// Accept `Function` without `()` for functions that take no parameters.
    pub enable_non_parenthesis_for_empty_parameter_function: bool,

    /// Compare identifiers ignoring ASCII case.
    pub case_insensitive: bool,

    /// Handler group whose `GetMetadata` / `GetServiceDocument` handlers are
    /// routed to `$metadata` and the service root.
    pub metadata_group: String,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            enable_qualified_operation_call: true,
            enable_unqualified_operation_call: true,
            enable_non_parenthesis_for_empty_parameter_function: false,
            case_insensitive: false,
            metadata_group: "Metadata".to_string(),
        }
    }
}

impl RouteOptions {
    pub fn with_qualified_operation_call(mut self, enabled: bool) -> Self {
        self.enable_qualified_operation_call = enabled;
        self
    }

    pub fn with_unqualified_operation_call(mut self, enabled: bool) -> Self {
        self.enable_unqualified_operation_call = enabled;
        self
    }

    pub fn with_non_parenthesis_for_empty_parameter_function(mut self, enabled: bool) -> Self {
        self.enable_non_parenthesis_for_empty_parameter_function = enabled;
        self
    }

    pub fn with_case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }

    /// Set the metadata group name.
    pub fn with_metadata_group(mut self, name: impl Into<String>) -> Self {
        self.metadata_group = name.into();
        self
    }

    /// Identifier comparison honouring [`Self::case_insensitive`].
    pub(crate) fn names_equal(&self, a: &str, b: &str) -> bool {
        if self.case_insensitive {
            a.eq_ignore_ascii_case(b)
        } else {
            a == b
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RouteOptions::default();
        assert!(options.enable_qualified_operation_call);
        assert!(options.enable_unqualified_operation_call);
        assert!(!options.enable_non_parenthesis_for_empty_parameter_function);
        assert!(!options.case_insensitive);
        assert_eq!(options.metadata_group, "Metadata");
    }

    #[test]
    fn test_names_equal() {
        let strict = RouteOptions::default();
        assert!(strict.names_equal("Customers", "Customers"));
        assert!(!strict.names_equal("Customers", "customers"));

        let relaxed = RouteOptions::default().with_case_insensitive(true);
        assert!(relaxed.names_equal("Customers", "cUsToMeRs"));
    }
}
