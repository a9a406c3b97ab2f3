use thiserror::Error;

use crate::{
    arguments::ArgumentError,
    key_value_store::{DataKind, StoreError},
    resp::RespValue,
};

/// Broad category of a command failure, used to pick the wire error prefix and to decide
/// whether the connection survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed request, unknown command or bad arguments. The connection continues.
    Command,
    /// The key holds another data type. Nothing was modified.
    Type,
    /// The connection was shut down while the command was suspended.
    Cancelled,
}

impl ErrorKind {
    pub fn prefix(self) -> &'static str {
        match self {
            ErrorKind::Type => "WRONGTYPE",
            ErrorKind::Command | ErrorKind::Cancelled => "ERR",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("request must be a non-empty array of bulk strings")]
    InvalidCommand,
    #[error("argument {index} must be a bulk string")]
    InvalidCommandArgument { index: usize },
    #[error("argument {index} is not valid UTF-8")]
    InvalidUtf8Argument { index: usize },
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error(transparent)]
    InvalidArguments(#[from] ArgumentError),
    #[error("operation against a key holding the wrong kind of value (expected {expected}, found {actual})")]
    WrongType { expected: DataKind, actual: DataKind },
    #[error("invalid expire time")]
    InvalidExpireTime,
    #[error("timeout must be a non-negative number")]
    InvalidTimeout,
    #[error("multiple keys are not supported")]
    UnsupportedMultipleKeys,
    #[error("command cancelled")]
    Cancelled,
}

impl From<StoreError> for CommandError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::WrongType { expected, actual } => {
                CommandError::WrongType { expected, actual }
            }
        }
    }
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::WrongType { .. } => ErrorKind::Type,
            CommandError::Cancelled => ErrorKind::Cancelled,
            _ => ErrorKind::Command,
        }
    }

    pub fn as_resp(&self) -> RespValue {
        RespValue::SimpleError(format!("{} {}", self.kind().prefix(), self))
    }
}

/// A handler failure tagged with the command that produced it.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("error while handling command `{command}`: {source}")]
pub struct HandleCommandError {
    pub command: String,
    #[source]
    pub source: CommandError,
}

impl HandleCommandError {
    pub fn new(command: impl Into<String>, source: CommandError) -> Self {
        Self {
            command: command.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }

    pub fn as_resp(&self) -> RespValue {
        RespValue::SimpleError(format!("{} {}", self.kind().prefix(), self))
    }
}
