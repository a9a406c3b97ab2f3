use crate::{
    arguments::{CommandArguments, Schema, SchemaCell, SchemaError},
    commands::command_error::CommandError,
    database::SharedDatabase,
    resp::RespValue,
};

#[derive(Debug, Default, PartialEq)]
pub struct ExistsArguments {
    pub keys: Vec<String>,
}

impl CommandArguments for ExistsArguments {
    fn schema() -> Result<&'static Schema<Self>, SchemaError> {
        static SCHEMA: SchemaCell<ExistsArguments> = SchemaCell::new();

        SCHEMA.get_or_build(|schema| {
            schema.variadic(1, "keys", 1, |arguments, raw| {
                arguments.keys.push(raw.to_string());
                Ok(())
            })
        })
    }
}

/// Handles the EXISTS command.
///
/// Counts how many of the given keys exist. A key named twice is counted twice.
pub async fn exists(db: SharedDatabase, arguments: &[String]) -> Result<RespValue, CommandError> {
    let exists_arguments = ExistsArguments::parse(arguments)?;

    let mut db_guard = db.lock().await;
    let count = exists_arguments
        .keys
        .iter()
        .filter(|key| db_guard.store.contains_key(key))
        .count();

    Ok(RespValue::Integer(count as i64))
}
