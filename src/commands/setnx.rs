use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::CommandError,
    key_value_store::{DataType, Item, KeyValueStore},
};

pub struct SetnxArguments {
    pub key: String,
    pub value: Bytes,
}

impl SetnxArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.len() != 2 {
            return Err(CommandError::WrongArity("setnx".to_string()));
        }

        Ok(Self {
            key: String::from_utf8_lossy(&arguments[0]).into_owned(),
            value: arguments[1].clone(),
        })
    }
}

/// Handles the Redis SETNX command: 1 if the key was created, 0 if it
/// already existed (whatever its type).
pub async fn setnx(
    store: Arc<Mutex<KeyValueStore>>,
    arguments: SetnxArguments,
) -> Result<i64, CommandError> {
    let mut store_guard = store.lock().await;

    if store_guard.contains(&arguments.key) {
        return Ok(0);
    }

    store_guard.set(arguments.key, Item::new(DataType::String(arguments.value)));

    Ok(1)
}
