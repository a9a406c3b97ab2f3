use thiserror::Error;

/// Mistakes in a statically declared schema, detected once when the schema is built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("position {0} is declared more than once")]
    DuplicatePosition(usize),
    #[error("positions must form the range 1..={count}, found {found}")]
    NonContiguousPositions { count: usize, found: usize },
    #[error("at most one variadic position is allowed")]
    MultipleVariadic,
    #[error("position `{0}` breaks the required, optional, variadic ordering")]
    InvalidPositionOrder(&'static str),
    #[error("keyword `{0}` is declared more than once")]
    DuplicateKeyword(&'static str),
    #[error("keyword `{0}` must be uppercase")]
    LowercaseKeyword(&'static str),
}

/// Failures while binding a token array to an argument struct.
///
/// Indexes count from the command name, so index 1 is the first argument.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgumentError {
    #[error("wrong number of arguments: expected at least {required}, got {provided}")]
    NotEnoughArguments { required: usize, provided: usize },
    #[error("unknown argument `{token}` at index {index}")]
    UnknownKeyword { token: String, index: usize },
    #[error("argument `{token}` at index {index} is repeated")]
    DuplicateKeyword { token: String, index: usize },
    #[error("`{second}` cannot be combined with `{first}` ({group})")]
    ConflictingKeywords {
        group: &'static str,
        first: &'static str,
        second: &'static str,
    },
    #[error("`{keyword}` requires a value")]
    MissingValue { keyword: &'static str },
    #[error("invalid value `{value}` for `{field}`: expected {expected}")]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("invalid argument schema: {0}")]
    InvalidSchema(#[from] SchemaError),
}
