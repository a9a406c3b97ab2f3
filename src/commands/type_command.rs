use crate::{
    arguments::{CommandArguments, Schema, SchemaCell, SchemaError},
    commands::command_error::CommandError,
    database::SharedDatabase,
    resp::RespValue,
};

#[derive(Debug, Default, PartialEq)]
pub struct TypeArguments {
    pub key: String,
}

impl CommandArguments for TypeArguments {
    fn schema() -> Result<&'static Schema<Self>, SchemaError> {
        static SCHEMA: SchemaCell<TypeArguments> = SchemaCell::new();

        SCHEMA.get_or_build(|schema| {
            schema.required(1, "key", |arguments, raw| {
                arguments.key = raw.to_string();
                Ok(())
            })
        })
    }
}

pub async fn type_command(
    db: SharedDatabase,
    arguments: &[String],
) -> Result<RespValue, CommandError> {
    let type_arguments = TypeArguments::parse(arguments)?;

    let mut db_guard = db.lock().await;

    match db_guard.store.kind_of(&type_arguments.key) {
        Some(kind) => Ok(RespValue::simple_string(kind.to_string())),
        None => Ok(RespValue::simple_string("none")),
    }
}
