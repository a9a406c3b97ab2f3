use crate::{
    arguments::{CommandArguments, Schema, SchemaCell, SchemaError},
    commands::command_error::CommandError,
    database::SharedDatabase,
    resp::RespValue,
};

#[derive(Debug, Default, PartialEq)]
pub struct GetArguments {
    pub key: String,
}

impl CommandArguments for GetArguments {
    fn schema() -> Result<&'static Schema<Self>, SchemaError> {
        static SCHEMA: SchemaCell<GetArguments> = SchemaCell::new();

        SCHEMA.get_or_build(|schema| {
            schema.required(1, "key", |arguments, raw| {
                arguments.key = raw.to_string();
                Ok(())
            })
        })
    }
}

/// Handles the GET command.
///
/// Retrieves the string stored at a key. An expired key is removed from the store and
/// reported as missing.
///
/// # Returns
///
/// * `Ok(RespValue::BulkString)` - The stored value
/// * `Ok(RespValue::Null)` - If the key does not exist or has expired
/// * `Err(CommandError::WrongType)` - If the key holds a list
///
/// # Examples
///
/// ```ignore
/// // GET mykey
/// let result = get(db, &["GET".to_string(), "mykey".to_string()]).await;
/// // Returns: RespValue::BulkString("hello") or RespValue::Null
/// ```
pub async fn get(db: SharedDatabase, arguments: &[String]) -> Result<RespValue, CommandError> {
    let get_arguments = GetArguments::parse(arguments)?;

    let mut db_guard = db.lock().await;

    match db_guard.store.get_string(&get_arguments.key)? {
        Some(value) => Ok(RespValue::bulk_string(value)),
        None => Ok(RespValue::Null),
    }
}
