use crate::{
    arguments::{CommandArguments, Schema, SchemaCell, SchemaError},
    commands::command_error::CommandError,
    database::SharedDatabase,
    resp::RespValue,
};

#[derive(Debug, Default, PartialEq)]
pub struct AppendArguments {
    pub key: String,
    pub value: String,
}

impl CommandArguments for AppendArguments {
    fn schema() -> Result<&'static Schema<Self>, SchemaError> {
        static SCHEMA: SchemaCell<AppendArguments> = SchemaCell::new();

        SCHEMA.get_or_build(|schema| {
            schema
                .required(1, "key", |arguments, raw| {
                    arguments.key = raw.to_string();
                    Ok(())
                })
                .required(2, "value", |arguments, raw| {
                    arguments.value = raw.to_string();
                    Ok(())
                })
        })
    }
}

/// Handles the APPEND command.
///
/// Appends the value to the string at key, creating it when absent, and replies with the
/// new length. An existing expiration is kept.
pub async fn append(db: SharedDatabase, arguments: &[String]) -> Result<RespValue, CommandError> {
    let append_arguments = AppendArguments::parse(arguments)?;

    let mut db_guard = db.lock().await;
    let length = db_guard
        .store
        .append(&append_arguments.key, &append_arguments.value)?;

    Ok(RespValue::Integer(length as i64))
}
