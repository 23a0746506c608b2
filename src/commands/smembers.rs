use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    commands::CommandError,
    key_value_store::{DataType, KeyValueStore},
};

pub struct SmembersArguments {
    pub key: String,
}

impl SmembersArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::WrongArity("smembers".to_string()));
        }

        Ok(Self {
            key: arguments[0].clone(),
        })
    }
}

/// Handles the Redis SMEMBERS command. Members come back sorted so replies
/// are deterministic.
pub async fn smembers(
    store: Arc<Mutex<KeyValueStore>>,
    arguments: SmembersArguments,
) -> Result<Vec<String>, CommandError> {
    let mut store_guard = store.lock().await;

    match store_guard.get(&arguments.key) {
        Some(item) => match item.data {
            DataType::Set(ref members) => {
                let mut members: Vec<String> = members.iter().cloned().collect();
                members.sort();
                Ok(members)
            }
            _ => Err(CommandError::WrongType),
        },
        None => Ok(Vec::new()),
    }
}
