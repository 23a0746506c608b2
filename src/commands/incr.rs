use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::CommandError,
    key_value_store::{DataType, Item, KeyValueStore},
};

pub struct IncrArguments {
    pub key: String,
}

impl IncrArguments {
    pub fn parse(command: &str, arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::WrongArity(command.to_lowercase()));
        }

        Ok(Self {
            key: arguments[0].clone(),
        })
    }
}

/// Adds `delta` to the base-10 integer stored under the key.
///
/// A missing key starts from 0. The key keeps its expiration.
pub async fn incr_by(
    store: Arc<Mutex<KeyValueStore>>,
    arguments: IncrArguments,
    delta: i64,
) -> Result<i64, CommandError> {
    let mut store_guard = store.lock().await;

    let Some(value) = store_guard.get_mut(&arguments.key) else {
        store_guard.set(
            arguments.key,
            Item::new(DataType::String(Bytes::from(delta.to_string()))),
        );
        return Ok(delta);
    };

    match value.data {
        DataType::String(ref mut stored_data) => {
            let int = std::str::from_utf8(stored_data)
                .ok()
                .and_then(|text| text.parse::<i64>().ok())
                .ok_or(CommandError::NotAnInteger)?;
            let incremented_int = int
                .checked_add(delta)
                .ok_or(CommandError::IncrementOverflow)?;
            *stored_data = Bytes::from(incremented_int.to_string());

            Ok(incremented_int)
        }
        _ => Err(CommandError::WrongType),
    }
}

pub async fn incr(
    store: Arc<Mutex<KeyValueStore>>,
    arguments: IncrArguments,
) -> Result<i64, CommandError> {
    incr_by(store, arguments, 1).await
}

pub async fn decr(
    store: Arc<Mutex<KeyValueStore>>,
    arguments: IncrArguments,
) -> Result<i64, CommandError> {
    incr_by(store, arguments, -1).await
}
