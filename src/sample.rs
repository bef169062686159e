//! A small customer/order catalog with handler groups that exercise every
//! routing convention.

use std::sync::Arc;

use odata_router::{
    BindReport, ConfigurationError, ConventionBinder, EdmModel, EdmPrimitive, EdmTypeRef,
    EntityType, HandlerGroup, Operation, RouteOptions, TemplateRegistry,
};

pub const NAMESPACE: &str = "Default";
pub const DEFAULT_PREFIX: &str = "odata";

pub fn model() -> EdmModel {
    let gender = EdmTypeRef::Enum(format!("{NAMESPACE}.Gender"));
    let address = EdmTypeRef::Complex(format!("{NAMESPACE}.Address"));

    EdmModel::new(NAMESPACE)
        .with_entity_type(
            EntityType::new("ConventionCustomer")
                .with_key("ID", EdmPrimitive::Int32)
                .with_property("Name", EdmPrimitive::String)
                .with_navigation("Orders", "ConventionOrder", true),
        )
        .with_entity_type(
            EntityType::new("ConventionOrder")
                .with_key("OrderName", EdmPrimitive::String)
                .with_property("Price", EdmPrimitive::Decimal),
        )
        .with_entity_type(
            EntityType::new("Customer")
                .with_key("ID", EdmPrimitive::Int32)
                .with_property("Name", EdmPrimitive::String),
        )
        .with_entity_set("ConventionCustomers", "ConventionCustomer")
        .with_entity_set("ConventionOrders", "ConventionOrder")
        .with_entity_set("Customers", "Customer")
        .with_operation(
            Operation::function(NAMESPACE, "GetAllConventionCustomers").returning_collection(),
        )
        .with_operation(
            Operation::function(NAMESPACE, "GetAllConventionCustomers")
                .with_parameter("CustomerName", EdmPrimitive::String)
                .returning_collection(),
        )
        .with_operation(
            Operation::function(NAMESPACE, "GetConventionCustomerById")
                .with_parameter("CustomerId", EdmPrimitive::Int32)
                .returning_entity("ConventionCustomer"),
        )
        .with_operation(
            Operation::function(NAMESPACE, "GetConventionOrderByCustomerIdAndOrderName")
                .with_parameter("CustomerId", EdmPrimitive::Int32)
                .with_parameter("OrderName", EdmPrimitive::String),
        )
        .with_operation(
            Operation::function(NAMESPACE, "GetConventionCustomerNameById")
                .with_parameter("CustomerId", EdmPrimitive::Int32),
        )
        .with_operation(Operation::function(NAMESPACE, "GetDefinedGenders").returning_collection())
        .with_operation(
            Operation::function(NAMESPACE, "AdvancedFunction")
                .with_parameter("nums", EdmTypeRef::Collection(Box::new(EdmPrimitive::Int32.into())))
                .with_parameter("genders", EdmTypeRef::Collection(Box::new(gender.clone())))
                .with_parameter("location", address.clone())
                .with_parameter("gender", gender),
        )
        .with_operation(
            Operation::action(NAMESPACE, "UpdateAddress")
                .with_parameter("Address", address)
                .with_parameter("ID", EdmPrimitive::Int32),
        )
        .with_operation(Operation::action(NAMESPACE, "ResetDataSource"))
        .with_operation(
            Operation::function(NAMESPACE, "CalculateSalary")
                .bound_to_entity("Customer")
                .with_parameter("month", EdmPrimitive::Int32),
        )
        .with_operation(
            Operation::action(NAMESPACE, "UpdateAddress")
                .bound_to_entity("Customer")
                .with_parameter("street", EdmPrimitive::String),
        )
        .with_operation(
            Operation::function(NAMESPACE, "TopCustomers")
                .bound_to_collection("Customer")
                .with_parameter("count", EdmPrimitive::Int32)
                .returning_collection(),
        )
        .with_import("GetAllConventionCustomersImport", "GetAllConventionCustomers")
        .with_import("GetAllConventionCustomersImport", "GetAllConventionCustomers")
        .with_import("GetConventionCustomerByIdImport", "GetConventionCustomerById")
        .with_import(
            "GetConventionOrderByCustomerIdAndOrderNameImport",
            "GetConventionOrderByCustomerIdAndOrderName",
        )
        .with_import("GetConventionCustomerNameByIdImport", "GetConventionCustomerNameById")
        .with_import("GetDefinedGenders", "GetDefinedGenders")
        .with_import("AdvancedFunction", "AdvancedFunction")
        .with_import("UpdateAddress", "UpdateAddress")
        .with_import("ResetDataSource", "ResetDataSource")
}

pub fn handler_groups() -> Vec<HandlerGroup> {
    vec![
        HandlerGroup::new("ConventionCustomers")
            .with_handler("Get", &[])
            .with_handler("Get", &["key"])
            .with_handler("GetOrders", &["key"])
            .with_handler("GetName", &["key"])
            .with_handler("GetAllConventionCustomers", &[])
            .with_handler("GetAllConventionCustomers", &["CustomerName"])
            .with_handler("GetConventionCustomerById", &["CustomerId"])
            .with_handler(
                "GetConventionOrderByCustomerIdAndOrderName",
                &["CustomerId", "OrderName"],
            )
            .with_handler("GetConventionCustomerNameById", &["CustomerId"])
            .with_handler("GetDefinedGenders", &[])
            .with_handler("AdvancedFunction", &["nums", "genders", "location", "gender"])
            .with_handler("UpdateAddress", &["Address", "ID"])
            .with_handler("ResetDataSource", &[])
            // not a convention name; left for other providers
            .with_handler("Seed", &["count"]),
        HandlerGroup::new("ConventionOrders")
            .with_handler("GetConventionOrders", &[])
            .with_handler("GetConventionOrder", &["key"]),
        HandlerGroup::new("Customers")
            .with_handler("Get", &[])
            .with_handler("GetCustomer", &["key"])
            .with_handler("CalculateSalary", &["key", "month"])
            .with_handler("UpdateAddress", &["key", "street"])
            .with_handler("TopCustomers", &["count"])
            // wrong arity for any accessor
            .with_handler("Get", &["key", "extra"]),
        HandlerGroup::new("Metadata")
            .with_handler("GetMetadata", &[])
            .with_handler("GetServiceDocument", &[]),
    ]
}

/// Bind the sample catalog under `prefix` and freeze the registry.
pub fn build_registry(
    prefix: &str,
    options: RouteOptions,
) -> Result<(TemplateRegistry, BindReport), ConfigurationError> {
    let binder = ConventionBinder::new(prefix, Arc::new(model()))?;
    let (builder, report) = binder.bind(&handler_groups(), TemplateRegistry::builder(options))?;
    Ok((builder.build(), report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_binds_cleanly() {
        let (registry, report) = build_registry(DEFAULT_PREFIX, RouteOptions::default()).unwrap();
        assert!(!registry.is_empty());
        assert_eq!(report.registered, registry.len());
        assert_eq!(report.unresolved.len(), 1);
        assert_eq!(report.unresolved[0].handler.group(), "Customers");

        let composed = registry
            .entries()
            .any(|e| e.template.to_string() == "GetConventionCustomerByIdImport(CustomerId={CustomerId})/Name");
        assert!(composed);
    }

    #[test]
    fn test_sample_binds_under_templated_prefix() {
        let (registry, _) =
            build_registry("odata/{datasource}", RouteOptions::default()).unwrap();
        assert!(registry.model_for("odata/{datasource}").is_some());
    }
}
