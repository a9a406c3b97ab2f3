use crate::{
    arguments::{CommandArguments, Schema, SchemaCell, SchemaError},
    commands::command_error::CommandError,
    resp::RespValue,
};

#[derive(Debug, Default, PartialEq)]
pub struct EchoArguments {
    pub message: String,
}

impl CommandArguments for EchoArguments {
    fn schema() -> Result<&'static Schema<Self>, SchemaError> {
        static SCHEMA: SchemaCell<EchoArguments> = SchemaCell::new();

        SCHEMA.get_or_build(|schema| {
            schema.required(1, "message", |arguments, raw| {
                arguments.message = raw.to_string();
                Ok(())
            })
        })
    }
}

/// Handles the ECHO command.
///
/// The ECHO command returns the exact string provided as an argument.
///
/// # Arguments
///
/// * `arguments` - The full request, `["ECHO", message]`
///
/// # Returns
///
/// * `Ok(RespValue::BulkString)` - The echoed message
/// * `Err(CommandError::InvalidArguments)` - If the message is missing
///
/// # Examples
///
/// ```ignore
/// // ECHO "hello world"
/// let result = echo(&["ECHO".to_string(), "hello world".to_string()]);
/// // Returns: RespValue::BulkString("hello world")
/// ```
pub fn echo(arguments: &[String]) -> Result<RespValue, CommandError> {
    let echo_arguments = EchoArguments::parse(arguments)?;

    Ok(RespValue::bulk_string(echo_arguments.message))
}
