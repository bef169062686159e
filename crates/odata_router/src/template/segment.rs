use std::fmt;

use crate::model::{EdmPrimitive, EdmTypeRef, OperationKind};
use crate::path::{Literal, PathToken, TokenArgs, is_identifier};
use crate::routing::config::RouteOptions;

pub const METADATA_SEGMENT: &str = "$metadata";
pub const COUNT_SEGMENT: &str = "$count";

/// A key property slot of an [`Segment::EntitySetWithKey`] segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPlaceholder {
    pub name: String,
    pub ty: EdmPrimitive,
}

/// The operation half of a [`Segment::OperationCall`] segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationSegment {
    /// Path name: the import name for imports, otherwise the operation name.
    pub name: String,
    /// Present when the segment may be written namespace-qualified.
    pub namespace: Option<String>,
    pub kind: OperationKind,
    pub bound: bool,
    /// Non-binding parameters in declaration order.
    pub parameters: Vec<(String, EdmTypeRef)>,
}

impl OperationSegment {
    /// Every identifier this segment answers to under `options`.
    pub fn accepted_identifiers(&self, options: &RouteOptions) -> Vec<String> {
        match &self.namespace {
            None => vec![self.name.clone()],
            Some(ns) => {
                let mut names = Vec::with_capacity(2);
                if options.enable_qualified_operation_call {
                    names.push(format!("{ns}.{}", self.name));
                }
                if options.enable_unqualified_operation_call {
                    names.push(self.name.clone());
                }
                names
            }
        }
    }

    fn has_plain_identifier(&self, options: &RouteOptions) -> bool {
        self.accepted_identifiers(options)
            .iter()
            .any(|name| is_identifier(name))
    }

    fn identifier_matches(&self, identifier: &str, options: &RouteOptions) -> bool {
        self.accepted_identifiers(options)
            .iter()
            .any(|name| options.names_equal(name, identifier))
    }

    fn accepts_bare(&self, options: &RouteOptions) -> bool {
        match self.kind {
            OperationKind::Action => true,
            OperationKind::Function => {
                self.parameters.is_empty()
                    && options.enable_non_parenthesis_for_empty_parameter_function
            }
        }
    }

    fn bind_arguments(
        &self,
        args: Option<&TokenArgs>,
        options: &RouteOptions,
    ) -> Option<Vec<(String, Literal)>> {
        match (self.kind, args) {
            (_, None) if self.accepts_bare(options) => Some(Vec::new()),
            (OperationKind::Function, Some(TokenArgs::Named(pairs)))
                if pairs.len() == self.parameters.len() =>
            {
                self.parameters
                    .iter()
                    .map(|(name, ty)| {
                        let (_, value) = pairs.iter().find(|(n, _)| options.names_equal(n, name))?;
                        ty.accepts(value).then(|| (name.clone(), value.clone()))
                    })
                    .collect()
            }
            _ => None,
        }
    }

    fn same_parameter_names(&self, other: &OperationSegment, options: &RouteOptions) -> bool {
        self.parameters.len() == other.parameters.len()
            && self.parameters.iter().all(|(name, _)| {
                other
                    .parameters
                    .iter()
                    .any(|(o, _)| options.names_equal(name, o))
            })
    }

    fn overlaps(&self, other: &OperationSegment, options: &RouteOptions) -> bool {
        let shares_identifier = self
            .accepted_identifiers(options)
            .iter()
            .any(|name| other.identifier_matches(name, options));
        if !shares_identifier {
            return false;
        }

        match (self.kind, other.kind) {
            (OperationKind::Action, OperationKind::Action) => true,
            (OperationKind::Function, OperationKind::Function) => {
                self.same_parameter_names(other, options)
            }
            _ => self.accepts_bare(options) && other.accepts_bare(options),
        }
    }
}

/// One structural component of a path template. Segments never refer to a
/// handler; they only describe which request segments they accept.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// `Customers`
    EntitySet(String),
    /// `Customers(1)` or `Customers(ID=1)`. With no placeholders the key
    /// values are bound untyped.
    EntitySetWithKey {
        entity_set: String,
        keys: Vec<KeyPlaceholder>,
    },
    /// `Orders` after a keyed entity
    Navigation(String),
    /// A structural property such as `Name` after a keyed entity
    StaticNamedValue(String),
    /// `Default.CalculateSalary(month=2)`, `GetAllImport()`, `UpdateAddress`
    OperationCall(OperationSegment),
    /// `$count`
    Count,
    /// `$metadata`
    Metadata,
    /// Any entity set of a model only known at request time.
    DynamicEntitySet,
    /// Any entity set with an untyped key, e.g. `Products(1)`.
    DynamicEntitySetWithKey,
    /// Any navigation name after a keyed entity, except the names that
    /// sibling templates route as static named values.
    DynamicNavigation { excluded: Vec<String> },
}

/// Values extracted by a successful [`Segment::bind`].
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    Nothing,
    Keys(Vec<(String, Literal)>),
    Navigation(String),
    NamedValue(String),
    Arguments(Vec<(String, Literal)>),
    Count,
    EntitySet(String),
    KeyedEntitySet {
        entity_set: String,
        keys: Vec<(String, Literal)>,
    },
}

impl Segment {
    pub fn matches(&self, token: &PathToken, options: &RouteOptions) -> bool {
        self.bind(token, options).is_some()
    }

    /// Match one token and extract what it carries. A mismatch is `None`,
    /// never an error, so the caller can move on to the next template.
    pub fn bind(&self, token: &PathToken, options: &RouteOptions) -> Option<BoundValue> {
        let ident = token.identifier.as_str();
        match self {
            Segment::EntitySet(name) => {
                (token.is_bare() && options.names_equal(name, ident)).then_some(BoundValue::Nothing)
            }
            Segment::EntitySetWithKey { entity_set, keys } => {
                if !options.names_equal(entity_set, ident) {
                    return None;
                }
                bind_keys(keys, token.args.as_ref(), options).map(BoundValue::Keys)
            }
            Segment::Navigation(name) => (token.is_bare() && options.names_equal(name, ident))
                .then(|| BoundValue::Navigation(name.clone())),
            Segment::StaticNamedValue(name) => (token.is_bare()
                && options.names_equal(name, ident))
            .then(|| BoundValue::NamedValue(name.clone())),
            Segment::OperationCall(op) => {
                if !op.identifier_matches(ident, options) {
                    return None;
                }
                op.bind_arguments(token.args.as_ref(), options)
                    .map(BoundValue::Arguments)
            }
            // system segments are always lower-case
            Segment::Count => (token.is_bare() && ident == COUNT_SEGMENT).then_some(BoundValue::Count),
            Segment::Metadata => {
                (token.is_bare() && ident == METADATA_SEGMENT).then_some(BoundValue::Nothing)
            }
            Segment::DynamicEntitySet => (token.is_bare() && is_identifier(ident))
                .then(|| BoundValue::EntitySet(ident.to_string())),
            Segment::DynamicEntitySetWithKey => {
                if !is_identifier(ident) {
                    return None;
                }
                bind_untyped_keys(token.args.as_ref()?).map(|keys| BoundValue::KeyedEntitySet {
                    entity_set: ident.to_string(),
                    keys,
                })
            }
            Segment::DynamicNavigation { excluded } => (token.is_bare()
                && is_identifier(ident)
                && !excluded.iter().any(|name| options.names_equal(name, ident)))
            .then(|| BoundValue::Navigation(ident.to_string())),
        }
    }

    /// Segments that accept a family of identifiers rather than one name.
    pub fn is_dynamic(&self) -> bool {
        matches!(
            self,
            Segment::DynamicEntitySet
                | Segment::DynamicEntitySetWithKey
                | Segment::DynamicNavigation { .. }
        )
    }

    /// Whether some request token could match both segments.
    pub fn overlaps(&self, other: &Segment, options: &RouteOptions) -> bool {
        use Segment::*;

        if other.is_dynamic() && !self.is_dynamic() {
            return other.overlaps(self, options);
        }

        match (self, other) {
            (EntitySet(a), EntitySet(b)) => options.names_equal(a, b),
            (
                EntitySetWithKey {
                    entity_set: a,
                    keys: ka,
                },
                EntitySetWithKey {
                    entity_set: b,
                    keys: kb,
                },
            ) => {
                options.names_equal(a, b)
                    && (ka.is_empty() || kb.is_empty() || ka.len() == kb.len())
            }
            (Navigation(a) | StaticNamedValue(a), Navigation(b) | StaticNamedValue(b)) => {
                options.names_equal(a, b)
            }
            (Count, Count) | (Metadata, Metadata) => true,
            (OperationCall(a), OperationCall(b)) => a.overlaps(b, options),
            (OperationCall(op), EntitySet(name) | Navigation(name) | StaticNamedValue(name))
            | (EntitySet(name) | Navigation(name) | StaticNamedValue(name), OperationCall(op)) => {
                op.identifier_matches(name, options) && op.accepts_bare(options)
            }
            (OperationCall(op), EntitySetWithKey { entity_set, keys })
            | (EntitySetWithKey { entity_set, keys }, OperationCall(op)) => {
                op.kind == OperationKind::Function
                    && op.identifier_matches(entity_set, options)
                    && if keys.is_empty() {
                        !op.parameters.is_empty()
                    } else {
                        op.parameters.len() == keys.len()
                            && keys.iter().all(|k| {
                                op.parameters
                                    .iter()
                                    .any(|(p, _)| options.names_equal(p, &k.name))
                            })
                    }
            }
            (DynamicEntitySetWithKey, DynamicEntitySetWithKey) => true,
            (DynamicEntitySetWithKey, EntitySetWithKey { entity_set, .. }) => {
                is_identifier(entity_set)
            }
            (DynamicEntitySetWithKey, OperationCall(op)) => {
                op.kind == OperationKind::Function
                    && !op.parameters.is_empty()
                    && op.has_plain_identifier(options)
            }
            (DynamicEntitySet | DynamicNavigation { .. }, DynamicEntitySet | DynamicNavigation { .. }) => {
                true
            }
            (
                DynamicEntitySet | DynamicNavigation { .. },
                EntitySet(name) | Navigation(name) | StaticNamedValue(name),
            ) => is_identifier(name) && !self.excludes(name, options),
            (DynamicEntitySet | DynamicNavigation { .. }, OperationCall(op)) => {
                op.accepts_bare(options)
                    && op
                        .accepted_identifiers(options)
                        .iter()
                        .any(|name| is_identifier(name) && !self.excludes(name, options))
            }
            _ => false,
        }
    }
}

impl Segment {
    fn excludes(&self, name: &str, options: &RouteOptions) -> bool {
        match self {
            Segment::DynamicNavigation { excluded } => {
                excluded.iter().any(|e| options.names_equal(e, name))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::EntitySet(name) | Segment::Navigation(name) | Segment::StaticNamedValue(name) => {
                f.write_str(name)
            }
            Segment::EntitySetWithKey { entity_set, keys } => {
                let parts: Vec<String> = match keys.as_slice() {
                    [] => vec!["{key}".to_string()],
                    [single] => vec![format!("{{{}}}", single.name)],
                    many => many
                        .iter()
                        .map(|k| format!("{0}={{{0}}}", k.name))
                        .collect(),
                };
                write!(f, "{entity_set}({})", parts.join(","))
            }
            Segment::OperationCall(op) => {
                if let Some(ns) = &op.namespace {
                    write!(f, "{ns}.")?;
                }
                f.write_str(&op.name)?;
                if op.kind == OperationKind::Function {
                    let parts: Vec<String> = op
                        .parameters
                        .iter()
                        .map(|(name, _)| format!("{name}={{{name}}}"))
                        .collect();
                    write!(f, "({})", parts.join(","))?;
                }
                Ok(())
            }
            Segment::Count => f.write_str(COUNT_SEGMENT),
            Segment::Metadata => f.write_str(METADATA_SEGMENT),
            Segment::DynamicEntitySet => f.write_str("{entityset}"),
            Segment::DynamicEntitySetWithKey => f.write_str("{entityset}({key})"),
            Segment::DynamicNavigation { .. } => f.write_str("{navigation}"),
        }
    }
}

fn bind_keys(
    keys: &[KeyPlaceholder],
    args: Option<&TokenArgs>,
    options: &RouteOptions,
) -> Option<Vec<(String, Literal)>> {
    let args = args?;
    if keys.is_empty() {
        return bind_untyped_keys(args);
    }
    if args.len() != keys.len() {
        return None;
    }

    match args {
        TokenArgs::Positional(values) => keys
            .iter()
            .zip(values)
            .map(|(key, value)| key.ty.accepts(value).then(|| (key.name.clone(), value.clone())))
            .collect(),
        TokenArgs::Named(pairs) => keys
            .iter()
            .map(|key| {
                let (_, value) = pairs.iter().find(|(n, _)| options.names_equal(n, &key.name))?;
                key.ty.accepts(value).then(|| (key.name.clone(), value.clone()))
            })
            .collect(),
    }
}

/// Key values for a segment whose key properties are unknown. A single
/// positional value binds as `key`, several as `key1`..`keyN`; named values
/// keep their names. Null never addresses an entity.
fn bind_untyped_keys(args: &TokenArgs) -> Option<Vec<(String, Literal)>> {
    let keys: Vec<(String, Literal)> = match args {
        TokenArgs::Positional(values) if values.len() == 1 => {
            vec![("key".to_string(), values[0].clone())]
        }
        TokenArgs::Positional(values) => values
            .iter()
            .enumerate()
            .map(|(i, value)| (format!("key{}", i + 1), value.clone()))
            .collect(),
        TokenArgs::Named(pairs) => pairs.clone(),
    };

    (!keys.is_empty() && keys.iter().all(|(_, value)| *value != Literal::Null)).then_some(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(raw: &str) -> PathToken {
        PathToken::parse(raw).unwrap()
    }

    fn customers_by_key() -> Segment {
        Segment::EntitySetWithKey {
            entity_set: "Customers".into(),
            keys: vec![KeyPlaceholder {
                name: "ID".into(),
                ty: EdmPrimitive::Int32,
            }],
        }
    }

    fn order_lines_by_key() -> Segment {
        Segment::EntitySetWithKey {
            entity_set: "OrderLines".into(),
            keys: vec![
                KeyPlaceholder {
                    name: "OrderId".into(),
                    ty: EdmPrimitive::Int32,
                },
                KeyPlaceholder {
                    name: "Line".into(),
                    ty: EdmPrimitive::String,
                },
            ],
        }
    }

    fn calculate_salary() -> OperationSegment {
        OperationSegment {
            name: "CalculateSalary".into(),
            namespace: Some("Default".into()),
            kind: OperationKind::Function,
            bound: true,
            parameters: vec![("month".into(), EdmPrimitive::Int32.into())],
        }
    }

    fn update_address() -> OperationSegment {
        OperationSegment {
            name: "UpdateAddress".into(),
            namespace: Some("Default".into()),
            kind: OperationKind::Action,
            bound: true,
            parameters: Vec::new(),
        }
    }

    #[test]
    fn test_entity_set_requires_bare_token() {
        let options = RouteOptions::default();
        let seg = Segment::EntitySet("Customers".into());
        assert!(seg.matches(&token("Customers"), &options));
        assert!(!seg.matches(&token("Customers(1)"), &options));
        assert!(!seg.matches(&token("customers"), &options));
        assert!(seg.matches(&token("customers"), &options.clone().with_case_insensitive(true)));
    }

    #[test]
    fn test_single_key_binding() {
        let options = RouteOptions::default();
        let seg = customers_by_key();
        assert_eq!(
            seg.bind(&token("Customers(1)"), &options),
            Some(BoundValue::Keys(vec![("ID".into(), Literal::Int(1))]))
        );
        assert_eq!(
            seg.bind(&token("Customers(ID=1)"), &options),
            Some(BoundValue::Keys(vec![("ID".into(), Literal::Int(1))]))
        );
    }

    #[test]
    fn test_key_type_and_arity_mismatch_is_silent() {
        let options = RouteOptions::default();
        let seg = customers_by_key();
        assert!(!seg.matches(&token("Customers('abc')"), &options));
        assert!(!seg.matches(&token("Customers(1,2)"), &options));
        assert!(!seg.matches(&token("Customers()"), &options));
        assert!(!seg.matches(&token("Customers"), &options));
        assert!(!seg.matches(&token("Customers(Other=1)"), &options));
        assert!(!seg.matches(&token("Customers(null)"), &options));
    }

    #[test]
    fn test_composite_key_positional_and_named() {
        let options = RouteOptions::default();
        let seg = order_lines_by_key();
        let expected = Some(BoundValue::Keys(vec![
            ("OrderId".into(), Literal::Int(7)),
            ("Line".into(), Literal::String("a".into())),
        ]));
        assert_eq!(seg.bind(&token("OrderLines(7,'a')"), &options), expected);
        assert_eq!(
            seg.bind(&token("OrderLines(Line='a',OrderId=7)"), &options),
            expected
        );
        assert!(!seg.matches(&token("OrderLines(7)"), &options));
    }

    #[test]
    fn test_qualified_and_unqualified_calls() {
        let options = RouteOptions::default();
        let seg = Segment::OperationCall(calculate_salary());
        assert_eq!(
            seg.bind(&token("Default.CalculateSalary(month=2)"), &options),
            Some(BoundValue::Arguments(vec![("month".into(), Literal::Int(2))]))
        );
        assert!(seg.matches(&token("CalculateSalary(month=2)"), &options));

        let strict = RouteOptions::default().with_unqualified_operation_call(false);
        assert!(!seg.matches(&token("CalculateSalary(month=2)"), &strict));
        assert!(seg.matches(&token("Default.CalculateSalary(month=2)"), &strict));
    }

    #[test]
    fn test_function_argument_rules() {
        let options = RouteOptions::default();
        let seg = Segment::OperationCall(calculate_salary());
        assert!(!seg.matches(&token("Default.CalculateSalary(month='x')"), &options));
        assert!(!seg.matches(&token("Default.CalculateSalary(year=2)"), &options));
        assert!(!seg.matches(&token("Default.CalculateSalary(2)"), &options));
        assert!(!seg.matches(&token("Default.CalculateSalary"), &options));
        assert!(seg.matches(&token("Default.CalculateSalary(month=@m)"), &options));
    }

    #[test]
    fn test_empty_function_without_parentheses() {
        let seg = Segment::OperationCall(OperationSegment {
            name: "GetAll".into(),
            namespace: None,
            kind: OperationKind::Function,
            bound: false,
            parameters: Vec::new(),
        });
        let options = RouteOptions::default();
        assert!(seg.matches(&token("GetAll()"), &options));
        assert!(!seg.matches(&token("GetAll"), &options));

        let relaxed = options.with_non_parenthesis_for_empty_parameter_function(true);
        assert!(seg.matches(&token("GetAll"), &relaxed));
    }

    #[test]
    fn test_action_takes_no_inline_arguments() {
        let options = RouteOptions::default();
        let seg = Segment::OperationCall(update_address());
        assert_eq!(
            seg.bind(&token("Default.UpdateAddress"), &options),
            Some(BoundValue::Arguments(Vec::new()))
        );
        assert!(!seg.matches(&token("Default.UpdateAddress()"), &options));
    }

    #[test]
    fn test_system_segments() {
        let options = RouteOptions::default().with_case_insensitive(true);
        assert!(Segment::Metadata.matches(&token("$metadata"), &options));
        assert!(Segment::Count.matches(&token("$count"), &options));
        assert!(!Segment::Count.matches(&token("$metadata"), &options));
    }

    #[test]
    fn test_overlaps() {
        let options = RouteOptions::default();
        let nav = Segment::Navigation("UpdateAddress".into());
        let action = Segment::OperationCall(update_address());
        assert!(nav.overlaps(&action, &options));
        assert!(action.overlaps(&nav, &options));

        let strict = RouteOptions::default().with_unqualified_operation_call(false);
        assert!(!nav.overlaps(&action, &strict));

        let function = Segment::OperationCall(calculate_salary());
        assert!(!function.overlaps(&action, &options));
        assert!(function.overlaps(&function.clone(), &options));
        assert!(!customers_by_key().overlaps(&Segment::EntitySet("Customers".into()), &options));
    }

    #[test]
    fn test_dynamic_segments_bind_names() {
        let options = RouteOptions::default();
        assert_eq!(
            Segment::DynamicEntitySet.bind(&token("Products"), &options),
            Some(BoundValue::EntitySet("Products".into()))
        );
        assert!(!Segment::DynamicEntitySet.matches(&token("Products(1)"), &options));
        assert!(!Segment::DynamicEntitySet.matches(&token("$metadata"), &options));
        assert!(!Segment::DynamicEntitySet.matches(&token("Default.Reset"), &options));

        assert_eq!(
            Segment::DynamicEntitySetWithKey.bind(&token("Products(5)"), &options),
            Some(BoundValue::KeyedEntitySet {
                entity_set: "Products".into(),
                keys: vec![("key".into(), Literal::Int(5))],
            })
        );
        assert_eq!(
            Segment::DynamicEntitySetWithKey.bind(&token("Lines(7,'a')"), &options),
            Some(BoundValue::KeyedEntitySet {
                entity_set: "Lines".into(),
                keys: vec![
                    ("key1".into(), Literal::Int(7)),
                    ("key2".into(), Literal::String("a".into())),
                ],
            })
        );
        assert!(!Segment::DynamicEntitySetWithKey.matches(&token("Products()"), &options));
        assert!(!Segment::DynamicEntitySetWithKey.matches(&token("Products(null)"), &options));
        assert!(!Segment::DynamicEntitySetWithKey.matches(&token("Products"), &options));

        let nav = Segment::DynamicNavigation {
            excluded: vec!["Name".into()],
        };
        assert_eq!(
            nav.bind(&token("DetailInfo"), &options),
            Some(BoundValue::Navigation("DetailInfo".into()))
        );
        assert!(!nav.matches(&token("Name"), &options));
        assert!(!nav.matches(&token("$count"), &options));
    }

    #[test]
    fn test_keyless_placeholder_binds_untyped() {
        let options = RouteOptions::default();
        let seg = Segment::EntitySetWithKey {
            entity_set: "Logs".into(),
            keys: Vec::new(),
        };
        assert_eq!(
            seg.bind(&token("Logs(ID=3)"), &options),
            Some(BoundValue::Keys(vec![("ID".into(), Literal::Int(3))]))
        );
        assert!(!seg.matches(&token("Logs()"), &options));
        assert!(!seg.overlaps(&customers_by_key(), &options));
        assert!(seg.overlaps(
            &Segment::EntitySetWithKey {
                entity_set: "Logs".into(),
                keys: vec![KeyPlaceholder {
                    name: "ID".into(),
                    ty: EdmPrimitive::Int32,
                }],
            },
            &options
        ));
        assert_eq!(seg.to_string(), "Logs({key})");
    }

    #[test]
    fn test_dynamic_overlaps() {
        let options = RouteOptions::default();
        let nav = Segment::DynamicNavigation {
            excluded: vec!["Name".into()],
        };
        assert!(nav.overlaps(&Segment::Navigation("Orders".into()), &options));
        assert!(Segment::StaticNamedValue("Price".into()).overlaps(&nav, &options));
        assert!(!nav.overlaps(&Segment::StaticNamedValue("Name".into()), &options));
        assert!(!nav.overlaps(&Segment::Count, &options));
        assert!(Segment::DynamicEntitySet.overlaps(&nav, &options));

        assert!(Segment::DynamicEntitySetWithKey.overlaps(&customers_by_key(), &options));
        assert!(!Segment::DynamicEntitySetWithKey.overlaps(&Segment::DynamicEntitySet, &options));
        assert!(
            Segment::OperationCall(calculate_salary())
                .overlaps(&Segment::DynamicEntitySetWithKey, &options)
        );
        let strict = RouteOptions::default().with_unqualified_operation_call(false);
        assert!(
            !Segment::OperationCall(calculate_salary())
                .overlaps(&Segment::DynamicEntitySetWithKey, &strict)
        );
        assert!(Segment::DynamicEntitySet.overlaps(&Segment::OperationCall(update_address()), &options));
    }

    #[test]
    fn test_display() {
        assert_eq!(customers_by_key().to_string(), "Customers({ID})");
        assert_eq!(Segment::DynamicEntitySetWithKey.to_string(), "{entityset}({key})");
        assert_eq!(
            order_lines_by_key().to_string(),
            "OrderLines(OrderId={OrderId},Line={Line})"
        );
        assert_eq!(
            Segment::OperationCall(calculate_salary()).to_string(),
            "Default.CalculateSalary(month={month})"
        );
        assert_eq!(
            Segment::OperationCall(update_address()).to_string(),
            "Default.UpdateAddress"
        );
    }
}
