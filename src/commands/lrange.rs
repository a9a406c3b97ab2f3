use std::ops::Range;

use crate::{
    arguments::{coerce, CommandArguments, Schema, SchemaCell, SchemaError},
    commands::command_error::CommandError,
    database::SharedDatabase,
    resp::RespValue,
};

/// Represents the parsed arguments for the LRANGE command.
#[derive(Debug, Default, PartialEq)]
pub struct LrangeArguments {
    /// The key name to retrieve from the store
    pub key: String,
    /// The starting index for the range (can be negative to count from the end)
    pub start_index: i64,
    /// The inclusive ending index for the range (can be negative to count from the end)
    pub end_index: i64,
}

impl CommandArguments for LrangeArguments {
    fn schema() -> Result<&'static Schema<Self>, SchemaError> {
        static SCHEMA: SchemaCell<LrangeArguments> = SchemaCell::new();

        SCHEMA.get_or_build(|schema| {
            schema
                .required(1, "key", |arguments, raw| {
                    arguments.key = raw.to_string();
                    Ok(())
                })
                .required(2, "start", |arguments, raw| {
                    arguments.start_index = coerce(raw)?;
                    Ok(())
                })
                .required(3, "stop", |arguments, raw| {
                    arguments.end_index = coerce(raw)?;
                    Ok(())
                })
        })
    }
}

/// Handles the LRANGE command.
///
/// Returns a range of elements from a list stored at the given key.
/// Both start and end indices can be negative to count from the end of the list.
/// If the key doesn't exist or the range is empty, returns an empty array.
///
/// # Arguments
///
/// * `db` - The shared store
/// * `arguments` - The full request: `["LRANGE", key, start_index, end_index]`
///
/// # Returns
///
/// * `Ok(RespValue::Array)` - The requested range of elements
/// * `Err(CommandError::InvalidArguments)` - If an index is not a valid integer
/// * `Err(CommandError::WrongType)` - If the key holds a string
///
/// # Examples
///
/// ```ignore
/// // LRANGE mylist -2 -1  (get last 2 elements)
/// let result = lrange(db, &tokens(&["LRANGE", "mylist", "-2", "-1"])).await;
/// // Returns: RespValue::Array([BulkString("val4"), BulkString("val5")])
/// ```
pub async fn lrange(db: SharedDatabase, arguments: &[String]) -> Result<RespValue, CommandError> {
    let lrange_arguments = LrangeArguments::parse(arguments)?;

    let mut db_guard = db.lock().await;

    let Some(list) = db_guard.store.list(&lrange_arguments.key)? else {
        return Ok(RespValue::Array(Vec::new()));
    };

    let Some(range) = resolve_range_indexes(
        list.len(),
        lrange_arguments.start_index,
        lrange_arguments.end_index,
    ) else {
        return Ok(RespValue::Array(Vec::new()));
    };

    Ok(RespValue::array_of_bulk_strings(list.range(range).cloned()))
}

/// Converts an inclusive, possibly negative index pair into a half-open range over a list
/// of `length` elements.
///
/// A negative index counts from the end and is clamped at zero. The stop index is made
/// exclusive and clamped to the length. `None` means the window is empty.
///
/// # Examples
///
/// ```text
/// // For a list of length 5:
/// // resolve_range_indexes(5, 0, 2) -> Some(0..3)
/// // resolve_range_indexes(5, -2, -1) -> Some(3..5)
/// // resolve_range_indexes(5, 5, 10) -> None
/// ```
pub fn resolve_range_indexes(length: usize, start_index: i64, end_index: i64) -> Option<Range<usize>> {
    let length = i64::try_from(length).unwrap_or(i64::MAX);
    let resolve = |index: i64| {
        if index < 0 {
            (length + index).max(0)
        } else {
            index
        }
    };

    let start = resolve(start_index);
    let end = resolve(end_index).saturating_add(1).min(length);

    if start >= length || start >= end {
        return None;
    }

    Some(start as usize..end as usize)
}
