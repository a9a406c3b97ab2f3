//! A small Redis-compatible server.
//!
//! Clients speak RESP over TCP and get a shared in-memory keyspace holding strings and
//! lists:
//!
//! - String operations (GET, SET, APPEND) with optional expiry
//! - List operations (LPUSH, RPUSH, LPOP, RPOP, LRANGE, LLEN)
//! - Blocking pops (BLPOP) served to waiting clients in arrival order
//! - Introspection (PING, ECHO, TYPE, EXISTS)
//!
//! Command arguments are described declaratively (see [`arguments`]) and bound onto plain
//! structs before a handler runs.

pub mod arguments;
pub mod commands;
pub mod connection;
pub mod database;
pub mod input;
pub mod key_value_store;
pub mod resp;
pub mod server;
pub mod state;
