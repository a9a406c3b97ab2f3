//! Keyed storage for string and list values with lazy expiry.
//!
//! Expired entries are never swept in the background. Every access goes through
//! [`KeyValueStore::expire_if_needed`] first, so a key whose expiration has passed is
//! deleted the next time any command touches it.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use jiff::Timestamp;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    String(String),
    List(VecDeque<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    String,
    List,
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKind::String => f.write_str("string"),
            DataKind::List => f.write_str("list"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub data: DataType,
    pub expiration: Option<Timestamp>,
}

impl Value {
    pub fn new(data: DataType) -> Self {
        Self {
            data,
            expiration: None,
        }
    }

    pub fn kind(&self) -> DataKind {
        match self.data {
            DataType::String(_) => DataKind::String,
            DataType::List(_) => DataKind::List,
        }
    }

    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expiration.is_some_and(|expiration| now >= expiration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEnd {
    Left,
    Right,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("operation against a key holding the wrong kind of value (expected {expected}, found {actual})")]
    WrongType { expected: DataKind, actual: DataKind },
}

#[derive(Debug, Default)]
pub struct KeyValueStore {
    entries: HashMap<String, Value>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones nobody has touched yet.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn expire_if_needed(&mut self, key: &str) {
        let now = Timestamp::now();

        if self
            .entries
            .get(key)
            .is_some_and(|value| value.is_expired_at(now))
        {
            self.entries.remove(key);
            debug!(key, "removed expired key");
        }
    }

    pub fn get(&mut self, key: &str) -> Option<&Value> {
        self.expire_if_needed(key);
        self.entries.get(key)
    }

    pub fn contains_key(&mut self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn kind_of(&mut self, key: &str) -> Option<DataKind> {
        self.get(key).map(Value::kind)
    }

    /// Looks up a live entry that must hold `expected`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(value))` - The key exists with the expected type
    /// * `Ok(None)` - The key is absent or has just expired
    /// * `Err(StoreError::WrongType)` - The key holds another type, nothing is modified
    pub fn read(&mut self, key: &str, expected: DataKind) -> Result<Option<&Value>, StoreError> {
        match self.get(key) {
            Some(value) if value.kind() != expected => Err(StoreError::WrongType {
                expected,
                actual: value.kind(),
            }),
            value => Ok(value),
        }
    }

    fn read_mut(&mut self, key: &str, expected: DataKind) -> Result<Option<&mut Value>, StoreError> {
        self.expire_if_needed(key);

        match self.entries.get_mut(key) {
            Some(value) if value.kind() != expected => Err(StoreError::WrongType {
                expected,
                actual: value.kind(),
            }),
            value => Ok(value),
        }
    }

    /// Creates or replaces the entry, whatever type it held before.
    pub fn write(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn get_string(&mut self, key: &str) -> Result<Option<&str>, StoreError> {
        Ok(match self.read(key, DataKind::String)? {
            Some(Value {
                data: DataType::String(value),
                ..
            }) => Some(value.as_str()),
            _ => None,
        })
    }

    /// Appends to a string value, creating it when absent, and returns the new length in bytes.
    pub fn append(&mut self, key: &str, suffix: &str) -> Result<usize, StoreError> {
        if let Some(value) = self.read_mut(key, DataKind::String)? {
            if let DataType::String(ref mut current) = value.data {
                current.push_str(suffix);
                return Ok(current.len());
            }
        }

        self.write(key, Value::new(DataType::String(suffix.to_string())));
        Ok(suffix.len())
    }

    pub fn list(&mut self, key: &str) -> Result<Option<&VecDeque<String>>, StoreError> {
        Ok(match self.read(key, DataKind::List)? {
            Some(Value {
                data: DataType::List(list),
                ..
            }) => Some(list),
            _ => None,
        })
    }

    pub fn list_len(&mut self, key: &str) -> Result<usize, StoreError> {
        Ok(self.list(key)?.map_or(0, VecDeque::len))
    }

    /// Pushes `values` one by one onto the chosen end and returns the new list length.
    ///
    /// Pushing `a b c` to the left leaves `c b a` at the head, as LPUSH does.
    pub fn push(&mut self, key: &str, values: Vec<String>, end: ListEnd) -> Result<usize, StoreError> {
        self.expire_if_needed(key);

        let value = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Value::new(DataType::List(VecDeque::new())));
        let actual = value.kind();

        let DataType::List(ref mut list) = value.data else {
            return Err(StoreError::WrongType {
                expected: DataKind::List,
                actual,
            });
        };

        for item in values {
            match end {
                ListEnd::Left => list.push_front(item),
                ListEnd::Right => list.push_back(item),
            }
        }

        Ok(list.len())
    }

    /// Removes up to `count` elements from one end, in pop order.
    ///
    /// Returns `Ok(None)` when the key does not exist. A list emptied by the pop is deleted.
    pub fn pop(
        &mut self,
        key: &str,
        end: ListEnd,
        count: usize,
    ) -> Result<Option<Vec<String>>, StoreError> {
        let Some(value) = self.read_mut(key, DataKind::List)? else {
            return Ok(None);
        };
        let DataType::List(ref mut list) = value.data else {
            return Ok(None);
        };

        let count = count.min(list.len());
        let popped: Vec<String> = match end {
            ListEnd::Left => list.drain(..count).collect(),
            ListEnd::Right => {
                let start = list.len() - count;
                list.drain(start..).rev().collect()
            }
        };

        if list.is_empty() {
            self.entries.remove(key);
        }

        Ok(Some(popped))
    }

    pub fn pop_one(&mut self, key: &str, end: ListEnd) -> Result<Option<String>, StoreError> {
        Ok(self
            .pop(key, end, 1)?
            .and_then(|popped| popped.into_iter().next()))
    }
}
