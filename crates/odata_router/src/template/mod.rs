//! Path templates: ordered sequences of typed segments describing one route
//! shape, independent of any handler.

mod segment;

use std::fmt;

pub use segment::{
    BoundValue, COUNT_SEGMENT, KeyPlaceholder, METADATA_SEGMENT, OperationSegment, Segment,
};

use crate::model::OperationKind;
use crate::path::{Literal, PathToken};
use crate::routing::config::RouteOptions;

/// Values bound while matching a request against a template.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bindings {
    /// Placeholder values from the route prefix, e.g. `datasource`.
    pub prefix: Vec<(String, String)>,
    /// Entity set named by a dynamic segment.
    pub entity_set: Option<String>,
    /// Key values in key declaration order.
    pub keys: Vec<(String, Literal)>,
    pub navigation: Option<String>,
    pub named_value: Option<String>,
    /// Operation arguments in signature order.
    pub arguments: Vec<(String, Literal)>,
    /// The path ended in `$count`.
    pub count: bool,
}

impl Bindings {
    pub fn key(&self, name: &str) -> Option<&Literal> {
        self.keys.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn argument(&self, name: &str) -> Option<&Literal> {
        self.arguments.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn prefix_value(&self, name: &str) -> Option<&str> {
        self.prefix
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        *self == Bindings::default()
    }

    fn apply(&mut self, value: BoundValue) {
        match value {
            BoundValue::Nothing => {}
            BoundValue::Keys(keys) => self.keys.extend(keys),
            BoundValue::Navigation(name) => self.navigation = Some(name),
            BoundValue::NamedValue(name) => self.named_value = Some(name),
            BoundValue::Arguments(args) => self.arguments.extend(args),
            BoundValue::Count => self.count = true,
            BoundValue::EntitySet(name) => self.entity_set = Some(name),
            BoundValue::KeyedEntitySet { entity_set, keys } => {
                self.entity_set = Some(entity_set);
                self.keys.extend(keys);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    NoMatch,
    Matched(Bindings),
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched(_))
    }

    pub fn into_bindings(self) -> Option<Bindings> {
        match self {
            MatchResult::Matched(bindings) => Some(bindings),
            MatchResult::NoMatch => None,
        }
    }
}

/// One candidate route shape. The empty template addresses the service
/// document at the prefix root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathTemplate {
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn service_document() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Copy of this template with `segment` appended.
    pub fn with_segment(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// Match tokens position by position. Lengths must be equal; the first
    /// segment that does not match ends the attempt.
    pub fn try_match(&self, tokens: &[PathToken], options: &RouteOptions) -> MatchResult {
        if tokens.len() != self.segments.len() {
            return MatchResult::NoMatch;
        }

        let mut bindings = Bindings::default();
        for (segment, token) in self.segments.iter().zip(tokens) {
            match segment.bind(token, options) {
                Some(value) => bindings.apply(value),
                None => return MatchResult::NoMatch,
            }
        }
        MatchResult::Matched(bindings)
    }

    /// Whether some token sequence could match both templates.
    pub fn overlaps(&self, other: &PathTemplate, options: &RouteOptions) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.overlaps(b, options))
    }

    /// Write concrete path segments from bindings; the inverse of
    /// [`Self::try_match`]. Returns `None` if a required value is missing.
    pub fn render(&self, bindings: &Bindings, options: &RouteOptions) -> Option<Vec<String>> {
        self.segments
            .iter()
            .map(|segment| render_segment(segment, bindings, options))
            .collect()
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

fn render_segment(segment: &Segment, bindings: &Bindings, options: &RouteOptions) -> Option<String> {
    match segment {
        Segment::EntitySet(name) | Segment::Navigation(name) | Segment::StaticNamedValue(name) => {
            Some(name.clone())
        }
        Segment::EntitySetWithKey { entity_set, keys } if keys.is_empty() => {
            Some(format!("{entity_set}({})", render_untyped_keys(bindings)?))
        }
        Segment::EntitySetWithKey { entity_set, keys } => {
            let parts = match keys.as_slice() {
                [single] => vec![bindings.key(&single.name)?.to_string()],
                many => many
                    .iter()
                    .map(|k| Some(format!("{}={}", k.name, bindings.key(&k.name)?)))
                    .collect::<Option<Vec<_>>>()?,
            };
            Some(format!("{entity_set}({})", parts.join(",")))
        }
        Segment::OperationCall(op) => {
            let mut out = op.accepted_identifiers(options).into_iter().next()?;
            if op.kind == OperationKind::Function {
                let parts = op
                    .parameters
                    .iter()
                    .map(|(name, _)| Some(format!("{name}={}", bindings.argument(name)?)))
                    .collect::<Option<Vec<_>>>()?;
                out.push_str(&format!("({})", parts.join(",")));
            }
            Some(out)
        }
        Segment::Count => Some(COUNT_SEGMENT.to_string()),
        Segment::Metadata => Some(METADATA_SEGMENT.to_string()),
        Segment::DynamicEntitySet => bindings.entity_set.clone(),
        Segment::DynamicEntitySetWithKey => Some(format!(
            "{}({})",
            bindings.entity_set.as_deref()?,
            render_untyped_keys(bindings)?
        )),
        Segment::DynamicNavigation { .. } => bindings.navigation.clone(),
    }
}

fn render_untyped_keys(bindings: &Bindings) -> Option<String> {
    match bindings.keys.as_slice() {
        [] => None,
        [(name, value)] if name == "key" => Some(value.to_string()),
        many => Some(
            many.iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join(","),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EdmPrimitive;
    use crate::path::tokenize;

    fn customer_orders() -> PathTemplate {
        PathTemplate::new(vec![
            Segment::EntitySetWithKey {
                entity_set: "Customers".into(),
                keys: vec![KeyPlaceholder {
                    name: "ID".into(),
                    ty: EdmPrimitive::Int32,
                }],
            },
            Segment::Navigation("Orders".into()),
        ])
    }

    #[test]
    fn test_match_binds_in_order() {
        let options = RouteOptions::default();
        let tokens = tokenize(&["Customers(5)", "Orders"]).unwrap();
        let bindings = customer_orders()
            .try_match(&tokens, &options)
            .into_bindings()
            .unwrap();
        assert_eq!(bindings.key("ID"), Some(&Literal::Int(5)));
        assert_eq!(bindings.navigation.as_deref(), Some("Orders"));
    }

    #[test]
    fn test_length_must_be_exact() {
        let options = RouteOptions::default();
        let template = customer_orders();
        assert!(!template.try_match(&tokenize(&["Customers(5)"]).unwrap(), &options).is_match());
        assert!(!template
            .try_match(&tokenize(&["Customers(5)", "Orders", "$count"]).unwrap(), &options)
            .is_match());
    }

    #[test]
    fn test_service_document_matches_only_empty_path() {
        let options = RouteOptions::default();
        let template = PathTemplate::service_document();
        let empty: [&str; 0] = [];
        assert_eq!(
            template.try_match(&tokenize(&empty).unwrap(), &options),
            MatchResult::Matched(Bindings::default())
        );
        assert!(!template.try_match(&tokenize(&["Customers"]).unwrap(), &options).is_match());
        assert_eq!(template.to_string(), "");
    }

    #[test]
    fn test_render_round_trip() {
        let options = RouteOptions::default();
        let template = customer_orders();
        let bindings = Bindings {
            keys: vec![("ID".into(), Literal::Int(42))],
            ..Default::default()
        };
        let rendered = template.render(&bindings, &options).unwrap();
        assert_eq!(rendered, vec!["Customers(42)", "Orders"]);

        let tokens = tokenize(&rendered).unwrap();
        let matched = template.try_match(&tokens, &options).into_bindings().unwrap();
        assert_eq!(matched.keys, bindings.keys);
    }

    #[test]
    fn test_render_missing_value() {
        let options = RouteOptions::default();
        assert!(customer_orders().render(&Bindings::default(), &options).is_none());
    }

    #[test]
    fn test_template_overlap() {
        let options = RouteOptions::default();
        let a = customer_orders();
        let b = customer_orders();
        assert!(a.overlaps(&b, &options));
        assert!(!a.overlaps(&a.with_segment(Segment::Count), &options));
        assert!(PathTemplate::service_document().overlaps(&PathTemplate::default(), &options));
    }

    #[test]
    fn test_dynamic_template_round_trip() {
        let options = RouteOptions::default();
        let template = PathTemplate::new(vec![
            Segment::DynamicEntitySetWithKey,
            Segment::DynamicNavigation {
                excluded: Vec::new(),
            },
        ]);
        let tokens = tokenize(&["Products(3)", "DetailInfo"]).unwrap();
        let bindings = template.try_match(&tokens, &options).into_bindings().unwrap();
        assert_eq!(bindings.entity_set.as_deref(), Some("Products"));
        assert_eq!(bindings.key("key"), Some(&Literal::Int(3)));
        assert_eq!(bindings.navigation.as_deref(), Some("DetailInfo"));

        let rendered = template.render(&bindings, &options).unwrap();
        assert_eq!(rendered, vec!["Products(3)", "DetailInfo"]);
        assert_eq!(template.to_string(), "{entityset}({key})/{navigation}");
    }

    #[test]
    fn test_display() {
        assert_eq!(customer_orders().to_string(), "Customers({ID})/Orders");
    }
}
