use crate::{
    arguments::{CommandArguments, Schema, SchemaCell, SchemaError},
    commands::command_error::CommandError,
    resp::RespValue,
};

#[derive(Debug, Default, PartialEq)]
pub struct PingArguments {
    pub message: Option<String>,
}

impl CommandArguments for PingArguments {
    fn schema() -> Result<&'static Schema<Self>, SchemaError> {
        static SCHEMA: SchemaCell<PingArguments> = SchemaCell::new();

        SCHEMA.get_or_build(|schema| {
            schema.optional(1, "message", None, |arguments, raw| {
                arguments.message = Some(raw.to_string());
                Ok(())
            })
        })
    }
}

/// Handles the PING command.
///
/// Replies with the simple string `PONG`, or echoes the optional message as a bulk string.
pub fn ping(arguments: &[String]) -> Result<RespValue, CommandError> {
    let ping_arguments = PingArguments::parse(arguments)?;

    match ping_arguments.message {
        Some(message) => Ok(RespValue::bulk_string(message)),
        None => Ok(RespValue::simple_string("PONG")),
    }
}
