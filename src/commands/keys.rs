use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{commands::CommandError, key_value_store::KeyValueStore, pattern::Pattern};

pub struct KeysArguments {
    pub pattern: String,
}

impl KeysArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::WrongArity("keys".to_string()));
        }

        Ok(KeysArguments {
            pattern: arguments[0].clone(),
        })
    }
}

pub async fn keys(
    store: Arc<Mutex<KeyValueStore>>,
    arguments: KeysArguments,
) -> Result<Vec<String>, CommandError> {
    let pattern = Pattern::new(&arguments.pattern)?;
    let mut store_guard = store.lock().await;

    let mut keys = store_guard.keys(&pattern);
    keys.sort();

    Ok(keys)
}
