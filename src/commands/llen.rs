use crate::{
    arguments::{CommandArguments, Schema, SchemaCell, SchemaError},
    commands::command_error::CommandError,
    database::SharedDatabase,
    resp::RespValue,
};

#[derive(Debug, Default, PartialEq)]
pub struct LlenArguments {
    pub key: String,
}

impl CommandArguments for LlenArguments {
    fn schema() -> Result<&'static Schema<Self>, SchemaError> {
        static SCHEMA: SchemaCell<LlenArguments> = SchemaCell::new();

        SCHEMA.get_or_build(|schema| {
            schema.required(1, "key", |arguments, raw| {
                arguments.key = raw.to_string();
                Ok(())
            })
        })
    }
}

pub async fn llen(db: SharedDatabase, arguments: &[String]) -> Result<RespValue, CommandError> {
    let llen_arguments = LlenArguments::parse(arguments)?;

    let mut db_guard = db.lock().await;
    let length = db_guard.store.list_len(&llen_arguments.key)?;

    Ok(RespValue::Integer(length as i64))
}
