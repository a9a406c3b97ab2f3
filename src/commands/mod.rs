mod append;
mod blpop;
mod command_error;
mod command_handler;
mod echo;
mod exists;
mod get;
mod llen;
mod lpop_and_rpop;
mod lrange;
mod ping;
mod rpush_and_lpush;
mod set;
mod type_command;

pub use command_error::{CommandError, ErrorKind, HandleCommandError};
pub use command_handler::{CommandContext, CommandHandler};
pub use lrange::resolve_range_indexes;
