use jiff::{SignedDuration, Timestamp};

use crate::{
    arguments::{
        coerce, CoerceError, CommandArguments, EnumGroup, Schema, SchemaCell, SchemaError,
    },
    commands::command_error::CommandError,
    database::SharedDatabase,
    key_value_store::{DataKind, DataType, Value},
    resp::RespValue,
};

/// The chosen `EX`/`PX`/`EXAT`/`PXAT`/`KEEPTTL` alternative and its value.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ExpireGroup {
    pub key: Option<&'static str>,
    pub value: i64,
}

impl ExpireGroup {
    /// Resolves the expiration instant of the new entry.
    ///
    /// `EX` and `PX` are relative to now, `EXAT` and `PXAT` are absolute Unix times, and
    /// `KEEPTTL` carries over the expiration of the entry being replaced. Without any of
    /// them the new entry never expires.
    pub fn expiration(&self, previous: Option<Timestamp>) -> Result<Option<Timestamp>, CommandError> {
        let expiration = match self.key {
            Some("EX") => Timestamp::now().checked_add(SignedDuration::from_secs(self.value)),
            Some("PX") => Timestamp::now().checked_add(SignedDuration::from_millis(self.value)),
            Some("EXAT") => Timestamp::from_second(self.value),
            Some("PXAT") => Timestamp::from_millisecond(self.value),
            Some("KEEPTTL") => return Ok(previous),
            _ => return Ok(None),
        };

        expiration
            .map(Some)
            .map_err(|_| CommandError::InvalidExpireTime)
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct SetArguments {
    pub key: String,
    pub value: String,
    /// `NX` or `XX`
    pub condition: Option<&'static str>,
    pub expire: ExpireGroup,
    pub get: bool,
}

impl CommandArguments for SetArguments {
    fn schema() -> Result<&'static Schema<Self>, SchemaError> {
        static SCHEMA: SchemaCell<SetArguments> = SchemaCell::new();

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
                .flag("GET", "get", |arguments, _| {
                    arguments.get = true;
                    Ok(())
                })
                .enum_group(
                    EnumGroup::new("condition", |arguments: &mut SetArguments, token| {
                        arguments.condition = Some(token)
                    })
                    .flag("NX")
                    .flag("XX"),
                )
                .enum_group(
                    EnumGroup::new("expire", |arguments: &mut SetArguments, token| {
                        arguments.expire.key = Some(token)
                    })
                    .value("EX", "seconds", set_expire_value)
                    .value("PX", "milliseconds", set_expire_value)
                    .value("EXAT", "unix-time-seconds", set_expire_value)
                    .value("PXAT", "unix-time-milliseconds", set_expire_value)
                    .flag("KEEPTTL"),
                )
        })
    }
}

fn set_expire_value(arguments: &mut SetArguments, raw: &str) -> Result<(), CoerceError> {
    arguments.expire.value = coerce(raw)?;
    Ok(())
}

/// Handles the SET command.
///
/// Stores a string under the key, replacing any previous value whatever its type.
///
/// # Options
///
/// * `NX` / `XX` - Only set when the key is absent / present. A failed condition replies
///   `Null` and changes nothing.
/// * `EX s` / `PX ms` / `EXAT ts` / `PXAT ts-ms` / `KEEPTTL` - Expiration of the new entry.
///   A non-positive relative time yields an entry that is already expired.
/// * `GET` - Reply with the previous string instead of `OK` (`Null` when there was none).
///   Fails with a wrong-type error, without writing, when the previous value is a list.
///
/// # Examples
///
/// ```ignore
/// // SET mykey hello PX 1000
/// let result = set(db, &tokens(&["SET", "mykey", "hello", "PX", "1000"])).await;
/// // Returns: RespValue::SimpleString("OK")
/// ```
pub async fn set(db: SharedDatabase, arguments: &[String]) -> Result<RespValue, CommandError> {
    let set_arguments = SetArguments::parse(arguments)?;

    let mut db_guard = db.lock().await;
    let store = &mut db_guard.store;

    let previous = store.get(&set_arguments.key);
    let exists = previous.is_some();
    let previous_expiration = previous.and_then(|value| value.expiration);

    let previous_string = match previous {
        Some(Value {
            data: DataType::String(value),
            ..
        }) => Some(value.clone()),
        Some(value) if set_arguments.get => {
            return Err(CommandError::WrongType {
                expected: DataKind::String,
                actual: value.kind(),
            })
        }
        _ => None,
    };

    let expiration = set_arguments.expire.expiration(previous_expiration)?;

    let condition_met = match set_arguments.condition {
        Some("NX") => !exists,
        Some("XX") => exists,
        _ => true,
    };

    if !condition_met {
        return Ok(RespValue::Null);
    }

    store.write(
        set_arguments.key,
        Value {
            data: DataType::String(set_arguments.value),
            expiration,
        },
    );

    if !set_arguments.get {
        return Ok(RespValue::simple_string("OK"));
    }

    Ok(previous_string.map_or(RespValue::Null, RespValue::bulk_string))
}
