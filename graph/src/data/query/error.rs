use thiserror::Error;

/// Why a client supplied cursor was rejected.
///
/// Neither variant carries the cursor text; cursors come straight from
/// clients and must not be echoed back or written to logs.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("malformed cursor: {0}")]
    MalformedCursor(String),
    #[error("cursor contains a value of a type that is not allowed: {0}")]
    DisallowedType(String),
    /// A keyset with more key values than a cursor can carry was passed
    /// to the encoder. `(count, limit)`
    #[error("cursor cannot carry {0} key values, the limit is {1}")]
    TooManyValues(usize, usize),
}

/// Error caused while turning the arguments and selection of a connection
/// field into a fetch window and a fetch plan.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum QueryExecutionError {
    /// A pagination argument is negative, too large, or conflicts with
    /// another argument. `(argument, reason)`
    #[error("Invalid value provided for argument `{0}`: {1}")]
    InvalidArgumentError(String, String),
    #[error("Invalid cursor: {0}")]
    InvalidCursor(#[from] CursorError),
    /// The selection refers to a type that is not registered in the schema
    /// descriptor.
    #[error("No type is registered for the name `{0}`")]
    UnmappableTypeError(String),
    /// `(type, part)`: the element root part `part` is not a field of `type`
    #[error("The element root part `{1}` wasn't found on type `{0}`")]
    UnknownElementRoot(String, String),
    /// A fragment spreads itself, directly or through other fragments.
    #[error("query has fragment cycle including `{0}`")]
    CyclicalFragment(String),
}

impl QueryExecutionError {
    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        QueryExecutionError::InvalidArgumentError(argument.into(), reason.into())
    }

    /// The argument an `InvalidArgumentError` is about.
    pub fn argument(&self) -> Option<&str> {
        match self {
            QueryExecutionError::InvalidArgumentError(argument, _) => Some(argument.as_str()),
            _ => None,
        }
    }

    /// Client errors are reported back to the client as-is. Everything else
    /// points at a misconfigured schema descriptor and is not something the
    /// client can fix.
    pub fn is_client_error(&self) -> bool {
        use QueryExecutionError::*;
        match self {
            InvalidArgumentError(_, _) | InvalidCursor(_) | CyclicalFragment(_) => true,
            UnmappableTypeError(_) | UnknownElementRoot(_, _) => false,
        }
    }
}
