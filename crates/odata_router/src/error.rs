use thiserror::Error;

use crate::routing::handler::HandlerRef;

/// Reason attached to [`RoutingError::BadRequest`] when a filter or search
/// expression calls an unbound operation.
pub const UNBOUND_OPERATION_IN_FILTER: &str = "unbound operation not permitted in filter";

/// Errors that can occur while parsing a raw path segment into a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TokenError {
    #[error("empty path segment")]
    Empty,

    #[error("invalid identifier in segment '{0}'")]
    InvalidIdentifier(String),

    #[error("unbalanced parentheses in segment '{0}'")]
    UnbalancedParentheses(String),

    #[error("unterminated string literal in segment '{0}'")]
    UnterminatedString(String),

    #[error("unexpected characters after ')' in segment '{0}'")]
    TrailingCharacters(String),

    #[error("invalid literal '{0}'")]
    InvalidLiteral(String),

    /// Positional and named arguments may not be mixed in one argument list.
    #[error("mixed positional and named arguments in segment '{0}'")]
    MixedArguments(String),

    #[error("argument '{name}' given more than once in segment '{segment}'")]
    DuplicateArgument { segment: String, name: String },
}

/// Errors raised while building the route table. All of them are fatal: a
/// process that hits one must not start serving requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// Two templates under the same prefix and method can match the same request.
    #[error(
        "template '{template}' for {method} under '{prefix}' ({handler}) overlaps '{existing}' ({existing_handler})"
    )]
    DuplicateTemplate {
        prefix: String,
        method: String,
        template: String,
        handler: HandlerRef,
        existing: String,
        existing_handler: HandlerRef,
    },

    /// More than one operation overload fits the handler's parameter list.
    #[error("handler {handler} matches {candidates} overloads of operation '{operation}'")]
    AmbiguousOverload {
        handler: HandlerRef,
        operation: String,
        candidates: usize,
    },

    /// The handler is named after an operation but no overload fits its parameters.
    #[error("handler {handler} matches no overload of operation '{operation}'")]
    NoMatchingOverload {
        handler: HandlerRef,
        operation: String,
    },

    /// The handler fits more than one convention at once.
    #[error("handler {handler} is claimed by several conventions: {conventions}")]
    AmbiguousConvention {
        handler: HandlerRef,
        conventions: String,
    },

    #[error("malformed convention for handler {handler}: {reason}")]
    MalformedConvention { handler: HandlerRef, reason: String },

    #[error("entity set '{entity_set}' refers to unknown entity type '{entity_type}'")]
    UnknownEntityType {
        entity_set: String,
        entity_type: String,
    },

    #[error("invalid route prefix '{0}'")]
    InvalidPrefix(String),

    /// A prefix was registered against two different models.
    #[error("prefix '{0}' is already bound to a different model")]
    ModelMismatch(String),
}

/// Per-request routing failures, returned as values to the request pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RoutingError {
    #[error("no route matches {method} '{prefix}/{path}'")]
    NotFound {
        prefix: String,
        method: String,
        path: String,
    },

    #[error("bad request: {reason}")]
    BadRequest { reason: String },

    /// Startup-only: surfaced when a host wraps route table construction
    /// into the same error type it uses for requests.
    #[error(transparent)]
    AmbiguousRegistration(#[from] ConfigurationError),
}

impl RoutingError {
    pub const STATUS_NOT_FOUND: u16 = 404;
    pub const STATUS_BAD_REQUEST: u16 = 400;
    pub const STATUS_INTERNAL: u16 = 500;

    pub fn bad_request(reason: impl Into<String>) -> Self {
        RoutingError::BadRequest {
            reason: reason.into(),
        }
    }

    /// HTTP status the pipeline should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            RoutingError::NotFound { .. } => Self::STATUS_NOT_FOUND,
            RoutingError::BadRequest { .. } => Self::STATUS_BAD_REQUEST,
            RoutingError::AmbiguousRegistration(_) => Self::STATUS_INTERNAL,
        }
    }
}

impl From<TokenError> for RoutingError {
    fn from(err: TokenError) -> Self {
        RoutingError::bad_request(err.to_string())
    }
}
