//! Read-only view of the entity data model the routes are built against.
//!
//! The model is produced by an external builder; this module only carries the
//! parts routing needs: entity sets, key and property lists, navigation
//! properties, and operation signatures.

use std::fmt;

use crate::path::Literal;

/// Primitive types usable as keys and operation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdmPrimitive {
    Boolean,
    Int32,
    Int64,
    Decimal,
    Double,
    String,
    Guid,
}

impl EdmPrimitive {
    /// Whether a non-null literal fits this type.
    pub fn accepts(&self, literal: &Literal) -> bool {
        match (self, literal) {
            (EdmPrimitive::Boolean, Literal::Boolean(_)) => true,
            (EdmPrimitive::Int32, Literal::Int(v)) => i32::try_from(*v).is_ok(),
            (EdmPrimitive::Int64, Literal::Int(_)) => true,
            (EdmPrimitive::Decimal | EdmPrimitive::Double, Literal::Int(_) | Literal::Decimal(_)) => {
                true
            }
            (EdmPrimitive::String, Literal::String(_)) => true,
            (EdmPrimitive::Guid, Literal::Guid(_)) => true,
            (_, Literal::Alias(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for EdmPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EdmPrimitive::Boolean => "Edm.Boolean",
            EdmPrimitive::Int32 => "Edm.Int32",
            EdmPrimitive::Int64 => "Edm.Int64",
            EdmPrimitive::Decimal => "Edm.Decimal",
            EdmPrimitive::Double => "Edm.Double",
            EdmPrimitive::String => "Edm.String",
            EdmPrimitive::Guid => "Edm.Guid",
        };
        f.write_str(name)
    }
}

/// Type of an operation parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdmTypeRef {
    Primitive(EdmPrimitive),
    Enum(String),
    Complex(String),
    Entity(String),
    Collection(Box<EdmTypeRef>),
}

impl EdmTypeRef {
    /// Whether an inline argument literal fits this type.
    ///
    /// Structured values can only be passed through parameter aliases; enum
    /// members are written as strings.
    pub fn accepts(&self, literal: &Literal) -> bool {
        match (self, literal) {
            (_, Literal::Alias(_)) | (_, Literal::Null) => true,
            (EdmTypeRef::Primitive(p), lit) => p.accepts(lit),
            (EdmTypeRef::Enum(_), Literal::String(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for EdmTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdmTypeRef::Primitive(p) => write!(f, "{p}"),
            EdmTypeRef::Enum(name) | EdmTypeRef::Complex(name) | EdmTypeRef::Entity(name) => {
                f.write_str(name)
            }
            EdmTypeRef::Collection(inner) => write!(f, "Collection({inner})"),
        }
    }
}

impl From<EdmPrimitive> for EdmTypeRef {
    fn from(p: EdmPrimitive) -> Self {
        EdmTypeRef::Primitive(p)
    }
}

/// A structural (primitive-valued) property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub ty: EdmPrimitive,
}

impl Property {
    pub fn new(name: impl Into<String>, ty: EdmPrimitive) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationProperty {
    pub name: String,
    /// Name of the target entity type.
    pub target: String,
    pub collection: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityType {
    pub name: String,
    /// Key properties, in declaration order.
    pub keys: Vec<Property>,
    /// Non-key structural properties.
    pub properties: Vec<Property>,
    pub navigation: Vec<NavigationProperty>,
}

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keys: Vec::new(),
            properties: Vec::new(),
            navigation: Vec::new(),
        }
    }

    pub fn with_key(mut self, name: impl Into<String>, ty: EdmPrimitive) -> Self {
        self.keys.push(Property::new(name, ty));
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, ty: EdmPrimitive) -> Self {
        self.properties.push(Property::new(name, ty));
        self
    }

    pub fn with_navigation(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        collection: bool,
    ) -> Self {
        self.navigation.push(NavigationProperty {
            name: name.into(),
            target: target.into(),
            collection,
        });
        self
    }

    pub fn navigation_property(&self, name: &str) -> Option<&NavigationProperty> {
        self.navigation.iter().find(|n| n.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySet {
    pub name: String,
    pub entity_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Side-effect free, invoked with GET and inline arguments.
    Function,
    /// Invoked with POST, arguments in the request body.
    Action,
}

impl OperationKind {
    pub fn http_method(&self) -> &'static str {
        match self {
            OperationKind::Function => "GET",
            OperationKind::Action => "POST",
        }
    }
}

/// What an operation is bound to, if anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationBinding {
    Unbound,
    /// Bound to a single entity of the named type.
    Entity(String),
    /// Bound to a collection of the named entity type.
    Collection(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: EdmTypeRef,
}

/// A declared function or action signature.
///
/// `parameters` never includes the binding parameter of a bound operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub namespace: String,
    pub name: String,
    pub kind: OperationKind,
    pub binding: OperationBinding,
    pub parameters: Vec<Parameter>,
    pub returns_collection: bool,
    /// Entity type of the result, when the operation returns entities.
    pub returns_entity: Option<String>,
}

impl Operation {
    pub fn function(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(namespace, name, OperationKind::Function)
    }

    pub fn action(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(namespace, name, OperationKind::Action)
    }

    fn new(namespace: impl Into<String>, name: impl Into<String>, kind: OperationKind) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            kind,
            binding: OperationBinding::Unbound,
            parameters: Vec::new(),
            returns_collection: false,
            returns_entity: None,
        }
    }

    pub fn bound_to_entity(mut self, entity_type: impl Into<String>) -> Self {
        self.binding = OperationBinding::Entity(entity_type.into());
        self
    }

    pub fn bound_to_collection(mut self, entity_type: impl Into<String>) -> Self {
        self.binding = OperationBinding::Collection(entity_type.into());
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, ty: impl Into<EdmTypeRef>) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            ty: ty.into(),
        });
        self
    }

    pub fn returning_collection(mut self) -> Self {
        self.returns_collection = true;
        self
    }

    /// Returns a single entity of `entity_type`; the result can be followed
    /// by a property or navigation segment.
    pub fn returning_entity(mut self, entity_type: impl Into<String>) -> Self {
        self.returns_entity = Some(entity_type.into());
        self
    }

    /// The entity type a path may continue into after this operation.
    pub fn composable_entity(&self) -> Option<&str> {
        match (&self.kind, self.returns_collection, &self.returns_entity) {
            (OperationKind::Function, false, Some(entity_type)) => Some(entity_type),
            _ => None,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.binding != OperationBinding::Unbound
    }

    /// `{namespace}.{name}`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

/// Exposes an unbound operation at the service root under its own name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationImport {
    pub name: String,
    /// Unqualified name of the imported operation; covers all its overloads.
    pub operation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EdmModel {
    namespace: String,
    entity_types: Vec<EntityType>,
    entity_sets: Vec<EntitySet>,
    operations: Vec<Operation>,
    imports: Vec<OperationImport>,
}

impl EdmModel {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    pub fn with_entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_types.push(entity_type);
        self
    }

    pub fn with_entity_set(mut self, name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        self.entity_sets.push(EntitySet {
            name: name.into(),
            entity_type: entity_type.into(),
        });
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn with_import(mut self, name: impl Into<String>, operation: impl Into<String>) -> Self {
        self.imports.push(OperationImport {
            name: name.into(),
            operation: operation.into(),
        });
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn entity_sets(&self) -> &[EntitySet] {
        &self.entity_sets
    }

    pub fn entity_types(&self) -> &[EntityType] {
        &self.entity_types
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn imports(&self) -> &[OperationImport] {
        &self.imports
    }

    pub fn entity_set(&self, name: &str) -> Option<&EntitySet> {
        self.entity_sets.iter().find(|s| s.name == name)
    }

    pub fn entity_type(&self, name: &str) -> Option<&EntityType> {
        self.entity_types.iter().find(|t| t.name == name)
    }

    /// All overloads declared under `name`, bound or not.
    pub fn operations_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Operation> + 'a {
        self.operations.iter().filter(move |op| op.name == name)
    }

    /// Imports that expose the operation called `operation`.
    pub fn imports_for<'a>(
        &'a self,
        operation: &'a str,
    ) -> impl Iterator<Item = &'a OperationImport> + 'a {
        self.imports.iter().filter(move |i| i.operation == operation)
    }

    /// Whether `name` can only be invoked as an unbound operation: it names an
    /// import, or every operation it resolves to (qualified or bare) is unbound.
    pub fn is_unbound_callable(&self, name: &str, case_insensitive: bool) -> bool {
        let eq = |a: &str, b: &str| {
            if case_insensitive {
                a.eq_ignore_ascii_case(b)
            } else {
                a == b
            }
        };

        if self.imports.iter().any(|i| eq(&i.name, name)) {
            return true;
        }

        let mut matched = self
            .operations
            .iter()
            .filter(|op| eq(&op.qualified_name(), name) || eq(&op.name, name))
            .peekable();

        matched.peek().is_some() && matched.all(|op| !op.is_bound())
    }
}
