use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::{
    arguments::{coerce, CommandArguments, Schema, SchemaCell, SchemaError},
    commands::{command_error::CommandError, command_handler::CommandContext},
    database::SharedDatabase,
    key_value_store::ListEnd,
    resp::RespValue,
    state::WaitOutcome,
};

#[derive(Debug, Default, PartialEq)]
pub struct BlpopArguments {
    pub key: String,
    pub other_keys: Vec<String>,
    pub timeout_seconds: f64,
}

impl CommandArguments for BlpopArguments {
    fn schema() -> Result<&'static Schema<Self>, SchemaError> {
        static SCHEMA: SchemaCell<BlpopArguments> = SchemaCell::new();

        SCHEMA.get_or_build(|schema| {
            schema
                .required(1, "key", |arguments, raw| {
                    arguments.key = raw.to_string();
                    Ok(())
                })
                .variadic(2, "keys", 0, |arguments, raw| {
                    arguments.other_keys.push(raw.to_string());
                    Ok(())
                })
                .required(3, "timeout", |arguments, raw| {
                    arguments.timeout_seconds = coerce(raw)?;
                    Ok(())
                })
        })
    }
}

impl BlpopArguments {
    /// Deadline for the wait, `None` when the timeout is zero and the wait is unbounded.
    fn deadline(&self) -> Result<Option<Instant>, CommandError> {
        if self.timeout_seconds == 0.0 {
            return Ok(None);
        }

        let timeout = Duration::try_from_secs_f64(self.timeout_seconds)
            .map_err(|_| CommandError::InvalidTimeout)?;

        // Too far in the future to represent, treat as unbounded.
        Ok(Instant::now().checked_add(timeout))
    }
}

/// Handles the BLPOP command.
///
/// Pops the head of the list at key, suspending the caller until an element is pushed when
/// the list is empty.
///
/// The first attempt and the waiter registration happen under one lock, so a push can never
/// slip in between. Once woken, the pop is retried; when another client drained the list
/// first, the waiter goes back to the head of the queue and keeps waiting until its deadline.
/// A wake-up that arrives while timing out or being cancelled is handed to the next waiter,
/// and so is one that leaves elements behind.
///
/// # Returns
///
/// * `Ok(RespValue::Array)` - `[key, element]`
/// * `Ok(RespValue::Null)` - If the timeout elapsed first
/// * `Err(CommandError::Cancelled)` - If the connection was shut down while waiting
/// * `Err(CommandError::UnsupportedMultipleKeys)` - If more than one key is given
/// * `Err(CommandError::InvalidTimeout)` - If the timeout is negative
pub async fn blpop(
    db: SharedDatabase,
    context: &CommandContext,
    arguments: &[String],
) -> Result<RespValue, CommandError> {
    let blpop_arguments = BlpopArguments::parse(arguments)?;

    if !blpop_arguments.other_keys.is_empty() {
        return Err(CommandError::UnsupportedMultipleKeys);
    }

    let deadline = blpop_arguments.deadline()?;
    let key = blpop_arguments.key;

    let mut handle = {
        let mut db_guard = db.lock().await;

        if let Some(value) = db_guard.store.pop_one(&key, ListEnd::Left)? {
            return Ok(RespValue::array_of_bulk_strings([key, value]));
        }

        db_guard.state.add_waiter(&key, context.client_id)
    };

    loop {
        let outcome = handle.wait(deadline, &context.cancellation).await;
        let mut db_guard = db.lock().await;

        match outcome {
            WaitOutcome::Woken => {
                if let Some(value) = db_guard.store.pop_one(&key, ListEnd::Left)? {
                    // A single push may have brought more than one element.
                    if db_guard.store.list_len(&key)? > 0 {
                        db_guard.state.notify_waiter(&key);
                    }

                    return Ok(RespValue::array_of_bulk_strings([key, value]));
                }

                debug!(key = %key, client_id = context.client_id, "woken with nothing to pop");
                handle = db_guard.state.requeue_waiter(handle);
            }
            WaitOutcome::TimedOut | WaitOutcome::Cancelled => {
                if !db_guard.state.remove_waiter(&key, handle.id) {
                    db_guard.state.notify_waiter(&key);
                }

                return match outcome {
                    WaitOutcome::Cancelled => Err(CommandError::Cancelled),
                    _ => Ok(RespValue::Null),
                };
            }
        }
    }
}
