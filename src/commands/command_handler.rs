use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    commands::{
        append::append,
        blpop::blpop,
        command_error::{CommandError, HandleCommandError},
        echo::echo,
        exists::exists,
        get::get,
        llen::llen,
        lpop_and_rpop::{lpop, rpop},
        lrange::lrange,
        ping::ping,
        rpush_and_lpush::{lpush, rpush},
        set::set,
        type_command::type_command,
    },
    database::SharedDatabase,
    resp::RespValue,
    state::ClientId,
};

/// Per-connection information handed to every command.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    pub client_id: ClientId,
    /// Cancelled when the connection goes away or the server shuts down.
    pub cancellation: CancellationToken,
}

impl CommandContext {
    pub fn new(client_id: ClientId, cancellation: CancellationToken) -> Self {
        Self {
            client_id,
            cancellation,
        }
    }
}

/// A request decoded into its uppercased command name and raw tokens.
#[derive(Debug, PartialEq, Clone)]
pub struct CommandHandler {
    pub name: String,
    /// Every token of the request, the command name included at index 0.
    pub arguments: Vec<String>,
}

impl CommandHandler {
    /// Builds a handler from a decoded request, which must be a non-empty array of bulk
    /// strings holding valid UTF-8.
    pub fn new(input: RespValue) -> Result<Self, CommandError> {
        let RespValue::Array(elements) = input else {
            return Err(CommandError::InvalidCommand);
        };

        if elements.is_empty() {
            return Err(CommandError::InvalidCommand);
        }

        let mut arguments: Vec<String> = Vec::with_capacity(elements.len());

        for (index, element) in elements.into_iter().enumerate() {
            let RespValue::BulkString(bytes) = element else {
                return Err(CommandError::InvalidCommandArgument { index });
            };
            let argument = String::from_utf8(bytes.to_vec())
                .map_err(|_| CommandError::InvalidUtf8Argument { index })?;

            arguments.push(argument);
        }

        Ok(Self {
            name: arguments[0].to_uppercase(),
            arguments,
        })
    }

    /// Runs the command against the shared database.
    ///
    /// Failures are tagged with the command name so the reply tells which command failed.
    pub async fn handle_command(
        &self,
        db: SharedDatabase,
        context: &CommandContext,
    ) -> Result<RespValue, HandleCommandError> {
        let arguments = self.arguments.as_slice();

        let result = match self.name.as_str() {
            "PING" => ping(arguments),
            "ECHO" => echo(arguments),
            "GET" => get(Arc::clone(&db), arguments).await,
            "SET" => set(Arc::clone(&db), arguments).await,
            "APPEND" => append(Arc::clone(&db), arguments).await,
            "RPUSH" => rpush(Arc::clone(&db), arguments).await,
            "LPUSH" => lpush(Arc::clone(&db), arguments).await,
            "LRANGE" => lrange(Arc::clone(&db), arguments).await,
            "LLEN" => llen(Arc::clone(&db), arguments).await,
            "LPOP" => lpop(Arc::clone(&db), arguments).await,
            "RPOP" => rpop(Arc::clone(&db), arguments).await,
            "BLPOP" => blpop(Arc::clone(&db), context, arguments).await,
            "TYPE" => type_command(Arc::clone(&db), arguments).await,
            "EXISTS" => exists(Arc::clone(&db), arguments).await,
            _ => Err(CommandError::UnknownCommand(self.arguments[0].clone())),
        };

        result.map_err(|source| HandleCommandError::new(&self.name, source))
    }
}
