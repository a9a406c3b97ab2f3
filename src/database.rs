use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{key_value_store::KeyValueStore, state::State};

/// The store and its blocking waiters, guarded together by one lock.
///
/// Commands take the lock once per atomic step, so "list is empty, register a waiter" and
/// "push, wake a waiter" can never interleave.
#[derive(Debug, Default)]
pub struct Database {
    pub store: KeyValueStore,
    pub state: State,
}

pub type SharedDatabase = Arc<Mutex<Database>>;

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedDatabase {
        Arc::new(Mutex::new(Self::new()))
    }
}
