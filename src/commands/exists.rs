use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{commands::CommandError, key_value_store::KeyValueStore};

pub struct ExistsArguments {
    pub keys: Vec<String>,
}

impl ExistsArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.is_empty() {
            return Err(CommandError::WrongArity("exists".to_string()));
        }

        Ok(Self { keys: arguments })
    }
}

/// Handles the Redis EXISTS command.
///
/// A key mentioned several times is counted once per mention, so
/// `EXISTS k k` on an existing `k` returns 2.
pub async fn exists(
    store: Arc<Mutex<KeyValueStore>>,
    arguments: ExistsArguments,
) -> Result<i64, CommandError> {
    let mut store_guard = store.lock().await;

    Ok(arguments
        .keys
        .iter()
        .filter(|key| store_guard.contains(key))
        .count() as i64)
}
