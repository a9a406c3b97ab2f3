use crate::{
    arguments::{coerce, CommandArguments, Schema, SchemaCell, SchemaError},
    commands::command_error::CommandError,
    database::SharedDatabase,
    key_value_store::ListEnd,
    resp::RespValue,
};

#[derive(Debug, Default, PartialEq)]
pub struct PopArguments {
    pub key: String,
    pub count: Option<usize>,
}

impl CommandArguments for PopArguments {
    fn schema() -> Result<&'static Schema<Self>, SchemaError> {
        static SCHEMA: SchemaCell<PopArguments> = SchemaCell::new();

        SCHEMA.get_or_build(|schema| {
            schema
                .required(1, "key", |arguments, raw| {
                    arguments.key = raw.to_string();
                    Ok(())
                })
                .optional(2, "count", None, |arguments, raw| {
                    arguments.count = Some(coerce(raw)?);
                    Ok(())
                })
        })
    }
}

/// Handles the LPOP command.
///
/// Removes and returns elements from the head of a list.
///
/// # Returns
///
/// * `Ok(RespValue::BulkString)` - The popped element when no count is given
/// * `Ok(RespValue::Array)` - Up to `count` popped elements when a count is given
/// * `Ok(RespValue::Null)` - If the key does not exist
/// * `Err(CommandError::WrongType)` - If the key holds a string
///
/// # Examples
///
/// ```ignore
/// // LPOP mylist 2
/// let result = lpop(db, &tokens(&["LPOP", "mylist", "2"])).await;
/// // Returns: RespValue::Array([BulkString("a"), BulkString("b")])
/// ```
pub async fn lpop(db: SharedDatabase, arguments: &[String]) -> Result<RespValue, CommandError> {
    pop(db, arguments, ListEnd::Left).await
}

/// Handles the RPOP command, the tail-end counterpart of [`lpop`].
pub async fn rpop(db: SharedDatabase, arguments: &[String]) -> Result<RespValue, CommandError> {
    pop(db, arguments, ListEnd::Right).await
}

async fn pop(db: SharedDatabase, arguments: &[String], end: ListEnd) -> Result<RespValue, CommandError> {
    let pop_arguments = PopArguments::parse(arguments)?;

    let mut db_guard = db.lock().await;

    match pop_arguments.count {
        None => Ok(db_guard
            .store
            .pop_one(&pop_arguments.key, end)?
            .map_or(RespValue::Null, RespValue::bulk_string)),
        Some(count) => Ok(db_guard
            .store
            .pop(&pop_arguments.key, end, count)?
            .map_or(RespValue::Null, RespValue::array_of_bulk_strings)),
    }
}
