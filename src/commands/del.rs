use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{commands::CommandError, key_value_store::KeyValueStore};

pub struct DelArguments {
    pub keys: Vec<String>,
}

impl DelArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.is_empty() {
            return Err(CommandError::WrongArity("del".to_string()));
        }

        Ok(Self { keys: arguments })
    }
}

/// Handles the Redis DEL command. Returns how many of the keys existed.
pub async fn del(
    store: Arc<Mutex<KeyValueStore>>,
    arguments: DelArguments,
) -> Result<i64, CommandError> {
    let mut store_guard = store.lock().await;
    let mut removed = 0;

    for key in &arguments.keys {
        if store_guard.delete(key) {
            removed += 1;
        }
    }

    Ok(removed)
}
