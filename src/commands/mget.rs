use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::CommandError,
    key_value_store::{DataType, KeyValueStore},
};

pub struct MgetArguments {
    pub keys: Vec<String>,
}

impl MgetArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.is_empty() {
            return Err(CommandError::WrongArity("mget".to_string()));
        }

        Ok(Self { keys: arguments })
    }
}

/// Handles the Redis MGET command. Missing keys and keys holding anything
/// other than a string yield `None` at their position.
pub async fn mget(
    store: Arc<Mutex<KeyValueStore>>,
    arguments: MgetArguments,
) -> Result<Vec<Option<Bytes>>, CommandError> {
    let mut store_guard = store.lock().await;
    let mut values = Vec::with_capacity(arguments.keys.len());

    for key in &arguments.keys {
        let value = match store_guard.get(key) {
            Some(item) => match item.data {
                DataType::String(ref s) => Some(s.clone()),
                _ => None,
            },
            None => None,
        };

        values.push(value);
    }

    Ok(values)
}
