use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    commands::CommandError,
    key_value_store::{KeyValueStore, TimeToLive},
};

pub struct TtlArguments {
    pub key: String,
}

impl TtlArguments {
    pub fn parse(command: &str, arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::WrongArity(command.to_lowercase()));
        }

        Ok(Self {
            key: arguments[0].clone(),
        })
    }
}

async fn time_to_live(store: Arc<Mutex<KeyValueStore>>, key: &str) -> TimeToLive {
    store.lock().await.time_to_live(key)
}

/// Handles the Redis TTL command: seconds left, -1 without expiration, -2 if
/// the key does not exist.
pub async fn ttl(
    store: Arc<Mutex<KeyValueStore>>,
    arguments: TtlArguments,
) -> Result<i64, CommandError> {
    Ok(time_to_live(store, &arguments.key).await.as_seconds())
}

/// Handles the Redis PTTL command, the millisecond variant of TTL.
pub async fn pttl(
    store: Arc<Mutex<KeyValueStore>>,
    arguments: TtlArguments,
) -> Result<i64, CommandError> {
    Ok(time_to_live(store, &arguments.key).await.as_millis())
}
