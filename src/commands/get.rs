use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::CommandError,
    key_value_store::{DataType, KeyValueStore},
};

/// Represents the parsed arguments for GET command
pub struct GetArguments {
    /// The key name to retrieve from the store
    pub key: String,
}

impl GetArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::WrongArity("get".to_string()));
        }

        Ok(Self {
            key: arguments[0].clone(),
        })
    }
}

/// Handles the Redis GET command.
///
/// Retrieves the value associated with a key from the key-value store.
/// An expired key reads as absent even when its eviction has not run yet.
///
/// # Returns
///
/// * `Ok(Some(value))` - The string stored under the key
/// * `Ok(None)` - If the key does not exist or has expired
/// * `Err(CommandError::WrongType)` - If the key holds a set or a JSON document
///
/// # Examples
///
/// ```ignore
/// // GET mykey
/// let result = get(store, GetArguments { key: "mykey".to_string() }).await;
/// // Returns: Ok(Some(Bytes::from("hello"))) or Ok(None)
/// ```
pub async fn get(
    store: Arc<Mutex<KeyValueStore>>,
    arguments: GetArguments,
) -> Result<Option<Bytes>, CommandError> {
    let mut store_guard = store.lock().await;

    match store_guard.get(&arguments.key) {
        Some(item) => match item.data {
            DataType::String(ref s) => Ok(Some(s.clone())),
            _ => Err(CommandError::WrongType),
        },
        None => Ok(None),
    }
}
