use crate::{
    arguments::{CommandArguments, Schema, SchemaCell, SchemaError},
    commands::command_error::CommandError,
    database::SharedDatabase,
    key_value_store::ListEnd,
    resp::RespValue,
};

#[derive(Debug, Default, PartialEq)]
pub struct PushArguments {
    pub key: String,
    pub values: Vec<String>,
}

impl CommandArguments for PushArguments {
    fn schema() -> Result<&'static Schema<Self>, SchemaError> {
        static SCHEMA: SchemaCell<PushArguments> = SchemaCell::new();

        SCHEMA.get_or_build(|schema| {
            schema
                .required(1, "key", |arguments, raw| {
                    arguments.key = raw.to_string();
                    Ok(())
                })
                .variadic(2, "values", 1, |arguments, raw| {
                    arguments.values.push(raw.to_string());
                    Ok(())
                })
        })
    }
}

pub async fn rpush(db: SharedDatabase, arguments: &[String]) -> Result<RespValue, CommandError> {
    push(db, arguments, ListEnd::Right).await
}

pub async fn lpush(db: SharedDatabase, arguments: &[String]) -> Result<RespValue, CommandError> {
    push(db, arguments, ListEnd::Left).await
}

/// Pushes the values onto one end of the list and replies with the new length.
///
/// Each successful call wakes at most one blocked waiter on the key, however many values
/// were pushed. The push and the wake-up happen under the same lock.
async fn push(
    db: SharedDatabase,
    arguments: &[String],
    end: ListEnd,
) -> Result<RespValue, CommandError> {
    let push_arguments = PushArguments::parse(arguments)?;

    let mut db_guard = db.lock().await;
    let length = db_guard
        .store
        .push(&push_arguments.key, push_arguments.values, end)?;
    db_guard.state.notify_waiter(&push_arguments.key);

    Ok(RespValue::Integer(length as i64))
}
