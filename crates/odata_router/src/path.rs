use std::fmt;

use uuid::Uuid;

use crate::error::{ConfigurationError, TokenError};

/// A literal value written inside a path segment, e.g. the `1` in
/// `Customers(1)` or the `'Name 1'` in `Fn(CustomerName='Name 1')`.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Int(i64),
    Decimal(f64),
    String(String),
    Guid(Uuid),
    /// A parameter alias (`@name`) whose value arrives in the query string.
    Alias(String),
}

impl Literal {
    /// Parse a single literal in URL syntax.
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        let raw = raw.trim();
        let invalid = || TokenError::InvalidLiteral(raw.to_owned());

        if raw.is_empty() {
            return Err(invalid());
        }

        if raw.ends_with('\'') {
            // 'text' or a typed literal such as Namespace.Gender'Male'
            let open = raw.find('\'').ok_or_else(invalid)?;
            if open > 0 && !raw[..open].split('.').all(is_identifier) {
                return Err(invalid());
            }
            return unquote(&raw[open..]).map(Literal::String);
        }

        if raw.starts_with('\'') {
            return Err(TokenError::UnterminatedString(raw.to_owned()));
        }

        if let Some(alias) = raw.strip_prefix('@') {
            if !is_identifier(alias) {
                return Err(invalid());
            }
            return Ok(Literal::Alias(alias.to_owned()));
        }

        match raw {
            "null" => return Ok(Literal::Null),
            "true" => return Ok(Literal::Boolean(true)),
            "false" => return Ok(Literal::Boolean(false)),
            _ => {}
        }

        if raw.len() == 36 && raw.as_bytes()[8] == b'-' {
            return Uuid::parse_str(raw).map(Literal::Guid).map_err(|_| invalid());
        }

        if let Ok(v) = raw.parse::<i64>() {
            return Ok(Literal::Int(v));
        }

        let numeric = raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'));
        if numeric {
            if let Ok(v) = raw.parse::<f64>() {
                return Ok(Literal::Decimal(v));
            }
        }

        Err(invalid())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Boolean(v) => write!(f, "{v}"),
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Decimal(v) => write!(f, "{v:?}"),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Guid(g) => write!(f, "{g}"),
            Literal::Alias(a) => write!(f, "@{a}"),
        }
    }
}

/// Argument list written in parentheses after a segment identifier.
///
/// `()` parses as an empty named list.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenArgs {
    Positional(Vec<Literal>),
    Named(Vec<(String, Literal)>),
}

impl TokenArgs {
    pub fn len(&self) -> usize {
        match self {
            TokenArgs::Positional(values) => values.len(),
            TokenArgs::Named(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One request path segment split into its identifier and optional arguments.
///
/// Example: `Default.CalculateSalary(month=2)`
/// - `identifier`: `Default.CalculateSalary`
/// - `args`: `Named([("month", Int(2))])`
#[derive(Debug, Clone, PartialEq)]
pub struct PathToken {
    pub identifier: String,
    pub args: Option<TokenArgs>,
}

impl PathToken {
    /// Parse a percent-decoded path segment.
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        if raw.is_empty() {
            return Err(TokenError::Empty);
        }

        let Some(open) = raw.find('(') else {
            if raw.contains(')') {
                return Err(TokenError::UnbalancedParentheses(raw.to_owned()));
            }
            if !is_segment_identifier(raw) {
                return Err(TokenError::InvalidIdentifier(raw.to_owned()));
            }
            return Ok(PathToken {
                identifier: raw.to_owned(),
                args: None,
            });
        };

        let identifier = &raw[..open];
        if !is_segment_identifier(identifier) {
            return Err(TokenError::InvalidIdentifier(raw.to_owned()));
        }

        let close = find_closing_paren(raw, open)?;
        if close + 1 != raw.len() {
            return Err(TokenError::TrailingCharacters(raw.to_owned()));
        }

        let args = parse_args(raw, &raw[open + 1..close])?;

        Ok(PathToken {
            identifier: identifier.to_owned(),
            args: Some(args),
        })
    }

    /// A token with no argument list.
    pub fn is_bare(&self) -> bool {
        self.args.is_none()
    }
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)?;
        match &self.args {
            None => Ok(()),
            Some(TokenArgs::Positional(values)) => {
                let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "({})", parts.join(","))
            }
            Some(TokenArgs::Named(pairs)) => {
                let parts: Vec<String> = pairs.iter().map(|(n, v)| format!("{n}={v}")).collect();
                write!(f, "({})", parts.join(","))
            }
        }
    }
}

/// Parse every raw segment, failing on the first malformed one.
pub fn tokenize<S: AsRef<str>>(segments: &[S]) -> Result<Vec<PathToken>, TokenError> {
    segments.iter().map(|s| PathToken::parse(s.as_ref())).collect()
}

/// One segment of a route prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrefixSegment {
    Literal(String),
    /// `{name}` binds any single request segment.
    Parameter(String),
}

/// A route prefix such as `odata` or `odata/{datasource}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutePrefix {
    raw: String,
    segments: Vec<PrefixSegment>,
}

impl RoutePrefix {
    /// Parse a prefix template. Leading and trailing slashes are ignored; the
    /// empty prefix routes at the root.
    pub fn parse(prefix: &str) -> Result<Self, ConfigurationError> {
        let trimmed = prefix.trim_matches('/');
        let invalid = || ConfigurationError::InvalidPrefix(prefix.to_owned());

        let mut segments = Vec::new();
        if !trimmed.is_empty() {
            for part in trimmed.split('/') {
                let segment = match part.strip_prefix('{') {
                    Some(rest) => {
                        let name = rest.strip_suffix('}').ok_or_else(invalid)?;
                        if !is_identifier(name) {
                            return Err(invalid());
                        }
                        PrefixSegment::Parameter(name.to_owned())
                    }
                    None if part.is_empty() || part.contains(['{', '}']) => return Err(invalid()),
                    None => PrefixSegment::Literal(part.to_owned()),
                };
                segments.push(segment);
            }
        }

        Ok(RoutePrefix {
            raw: trimmed.to_owned(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PrefixSegment] {
        &self.segments
    }

    /// Names of the `{name}` placeholders, in order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            PrefixSegment::Parameter(name) => Some(name.as_str()),
            PrefixSegment::Literal(_) => None,
        })
    }

    /// Whether some request prefix binds both templates. A placeholder
    /// overlaps any literal.
    pub fn overlaps(&self, other: &RoutePrefix) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (PrefixSegment::Literal(a), PrefixSegment::Literal(b)) => a == b,
                    _ => true,
                })
    }

    /// Match a request prefix, returning the placeholder values on success.
    pub fn bind(&self, request_prefix: &str) -> Option<Vec<(String, String)>> {
        let trimmed = request_prefix.trim_matches('/');
        let parts: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };
        self.bind_segments(&parts)
    }

    /// Like [`Self::bind`], over an already split prefix.
    pub fn bind_segments<S: AsRef<str>>(&self, parts: &[S]) -> Option<Vec<(String, String)>> {
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut values = Vec::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            let part = part.as_ref();
            match segment {
                PrefixSegment::Literal(lit) if lit == part => {}
                PrefixSegment::Literal(_) => return None,
                PrefixSegment::Parameter(_) if part.is_empty() => return None,
                PrefixSegment::Parameter(name) => values.push((name.clone(), part.to_owned())),
            }
        }
        Some(values)
    }
}

impl fmt::Display for RoutePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Identifiers in segments may be namespace-qualified (`Default.Op`) or
/// system segments (`$metadata`).
fn is_segment_identifier(s: &str) -> bool {
    let body = s.strip_prefix('$').unwrap_or(s);
    !body.is_empty() && body.split('.').all(is_identifier)
}

fn unquote(quoted: &str) -> Result<String, TokenError> {
    let inner = quoted
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .filter(|_| quoted.len() >= 2)
        .ok_or_else(|| TokenError::UnterminatedString(quoted.to_owned()))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            // a lone quote inside the literal ends it early
            if chars.next_if_eq(&'\'').is_none() {
                return Err(TokenError::InvalidLiteral(quoted.to_owned()));
            }
        }
        out.push(c);
    }
    Ok(out)
}

fn find_closing_paren(raw: &str, open: usize) -> Result<usize, TokenError> {
    let mut depth = 0usize;
    let mut in_string = false;
    for (i, c) in raw.char_indices().skip_while(|(i, _)| *i < open) {
        match c {
            '\'' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }
    if in_string {
        Err(TokenError::UnterminatedString(raw.to_owned()))
    } else {
        Err(TokenError::UnbalancedParentheses(raw.to_owned()))
    }
}

/// Split on `sep` where it is not inside a quoted string or nested parens.
fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '\'' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth = depth.saturating_sub(1),
            c if c == sep && !in_string && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn parse_args(segment: &str, inner: &str) -> Result<TokenArgs, TokenError> {
    if inner.trim().is_empty() {
        return Ok(TokenArgs::Named(Vec::new()));
    }

    let mut positional = Vec::new();
    let mut named: Vec<(String, Literal)> = Vec::new();

    for part in split_top_level(inner, ',') {
        match split_top_level(part, '=').as_slice() {
            [value] => positional.push(Literal::parse(value)?),
            [name, value] => {
                let name = name.trim();
                if !is_identifier(name) {
                    return Err(TokenError::InvalidIdentifier(segment.to_owned()));
                }
                if named.iter().any(|(n, _)| n == name) {
                    return Err(TokenError::DuplicateArgument {
                        segment: segment.to_owned(),
                        name: name.to_owned(),
                    });
                }
                named.push((name.to_owned(), Literal::parse(value)?));
            }
            _ => return Err(TokenError::InvalidLiteral(part.to_owned())),
        }
    }

    match (positional.is_empty(), named.is_empty()) {
        (false, true) => Ok(TokenArgs::Positional(positional)),
        (true, false) => Ok(TokenArgs::Named(named)),
        _ => Err(TokenError::MixedArguments(segment.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_segment() {
        let token = PathToken::parse("Customers").unwrap();
        assert_eq!(token.identifier, "Customers");
        assert!(token.is_bare());
    }

    #[test]
    fn test_parse_positional_key() {
        let token = PathToken::parse("Customers(1)").unwrap();
        assert_eq!(token.identifier, "Customers");
        assert_eq!(token.args, Some(TokenArgs::Positional(vec![Literal::Int(1)])));
    }

    #[test]
    fn test_parse_named_arguments() {
        let token =
            PathToken::parse("GetOrder(CustomerId=408,OrderName='OrderName 5')").unwrap();
        assert_eq!(
            token.args,
            Some(TokenArgs::Named(vec![
                ("CustomerId".into(), Literal::Int(408)),
                ("OrderName".into(), Literal::String("OrderName 5".into())),
            ]))
        );
    }

    #[test]
    fn test_parse_qualified_and_system_identifiers() {
        let token = PathToken::parse("Default.CalculateSalary(month=2)").unwrap();
        assert_eq!(token.identifier, "Default.CalculateSalary");
        assert_eq!(PathToken::parse("$metadata").unwrap().identifier, "$metadata");
        assert_eq!(PathToken::parse("$count").unwrap().identifier, "$count");
    }

    #[test]
    fn test_parse_empty_parens() {
        let token = PathToken::parse("GetAll()").unwrap();
        assert_eq!(token.args, Some(TokenArgs::Named(Vec::new())));
    }

    #[test]
    fn test_quoted_string_with_special_characters() {
        let token = PathToken::parse("People('O''Neil, (a=b)')").unwrap();
        assert_eq!(
            token.args,
            Some(TokenArgs::Positional(vec![Literal::String(
                "O'Neil, (a=b)".into()
            )]))
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(Literal::parse("null").unwrap(), Literal::Null);
        assert_eq!(Literal::parse("true").unwrap(), Literal::Boolean(true));
        assert_eq!(Literal::parse("-12").unwrap(), Literal::Int(-12));
        assert_eq!(Literal::parse("1.5").unwrap(), Literal::Decimal(1.5));
        assert_eq!(Literal::parse("@a").unwrap(), Literal::Alias("a".into()));
        assert_eq!(
            Literal::parse("Default.Gender'Male'").unwrap(),
            Literal::String("Male".into())
        );
        assert!(matches!(
            Literal::parse("c6b6b4b2-4a6f-4e4a-9c5e-2f0b8e1f6a11").unwrap(),
            Literal::Guid(_)
        ));
        assert!(Literal::parse("abc").is_err());
    }

    #[test]
    fn test_literal_display_round_trip() {
        for raw in ["'it''s'", "42", "true", "@p", "null"] {
            let literal = Literal::parse(raw).unwrap();
            assert_eq!(literal.to_string(), raw);
        }
    }

    #[test]
    fn test_malformed_segments() {
        assert_eq!(PathToken::parse(""), Err(TokenError::Empty));
        assert!(matches!(
            PathToken::parse("Customers(1"),
            Err(TokenError::UnbalancedParentheses(_))
        ));
        assert!(matches!(
            PathToken::parse("Customers(1)x"),
            Err(TokenError::TrailingCharacters(_))
        ));
        assert!(matches!(
            PathToken::parse("Customers('abc)"),
            Err(TokenError::UnterminatedString(_))
        ));
        assert!(matches!(
            PathToken::parse("F(1,a=2)"),
            Err(TokenError::MixedArguments(_))
        ));
        assert!(matches!(
            PathToken::parse("F(a=1,a=2)"),
            Err(TokenError::DuplicateArgument { .. })
        ));
        assert!(matches!(
            PathToken::parse("Bad Name"),
            Err(TokenError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_tokenize_stops_on_first_error() {
        assert_eq!(tokenize(&["Customers(1)", "Orders"]).unwrap().len(), 2);
        assert!(tokenize(&["Customers(1)", "Orders("]).is_err());
    }

    #[test]
    fn test_route_prefix_literal() {
        let prefix = RoutePrefix::parse("/odata/").unwrap();
        assert_eq!(prefix.as_str(), "odata");
        assert_eq!(prefix.bind("odata"), Some(Vec::new()));
        assert_eq!(prefix.bind("other"), None);
    }

    #[test]
    fn test_route_prefix_with_parameter() {
        let prefix = RoutePrefix::parse("odata/{datasource}").unwrap();
        assert_eq!(
            prefix.bind("odata/sales"),
            Some(vec![("datasource".to_string(), "sales".to_string())])
        );
        assert_eq!(prefix.bind("odata"), None);
    }

    #[test]
    fn test_route_prefix_overlap() {
        let parse = |p: &str| RoutePrefix::parse(p).unwrap();
        assert!(parse("odata/{ds}").overlaps(&parse("odata/v1")));
        assert!(parse("odata/v1").overlaps(&parse("{a}/{b}")));
        assert!(!parse("odata/v1").overlaps(&parse("odata/v2")));
        assert!(!parse("odata").overlaps(&parse("odata/{ds}")));
        assert_eq!(
            parse("{tenant}/odata/{ds}").parameter_names().collect::<Vec<_>>(),
            ["tenant", "ds"]
        );
    }

    #[test]
    fn test_route_prefix_empty_and_invalid() {
        let root = RoutePrefix::parse("").unwrap();
        assert_eq!(root.bind("/"), Some(Vec::new()));
        assert!(RoutePrefix::parse("odata/{bad").is_err());
        assert!(RoutePrefix::parse("odata//x").is_err());
    }
}
