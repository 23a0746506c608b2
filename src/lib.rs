//! An in-process Redis mock for tests.
//!
//! A [`Client`] owns a keyspace and an embedded Lua VM and implements a subset
//! of the Redis command surface with Redis semantics:
//!
//! - Keys: DEL, EXISTS, EXPIRE, PEXPIRE, EXPIREAT, PEXPIREAT, TTL, PTTL, KEYS
//! - Strings: GET, SET, SETNX, MGET, INCR, DECR
//! - Sets: SADD, SREM, SMEMBERS, SCARD
//! - JSON documents: JSON.GET, JSON.SET
//! - Scripting: EVAL (with `redis.call`, `cjson` and `cmsgpack`), EVALSHA
//! - FLUSHALL / FLUSHDB and MULTI/EXEC style transactions
//!
//! Expired keys are removed by one timer task per key, and reads never see a
//! key past its deadline.

pub mod client;
pub mod commands;
pub mod config;
pub mod input;
pub mod key_value_store;
pub mod pattern;
pub mod reply;
pub mod scripting;

pub use client::{create_client, create_client_pool, Client, ClientOptions, JsonCommands};
pub use commands::{transactions::Multi, CommandError, SetCondition, SetOptions};
pub use key_value_store::ExpiryMode;
pub use reply::Reply;
