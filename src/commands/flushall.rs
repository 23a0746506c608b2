use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{commands::CommandError, key_value_store::KeyValueStore};

pub struct FlushallArguments;

impl FlushallArguments {
    /// Accepts the optional `ASYNC` / `SYNC` modifier; both flush right away.
    pub fn parse(command: &str, arguments: Vec<String>) -> Result<Self, CommandError> {
        match arguments.as_slice() {
            [] => Ok(Self),
            [mode] if matches!(mode.to_uppercase().as_str(), "ASYNC" | "SYNC") => Ok(Self),
            [_] => Err(CommandError::SyntaxError),
            _ => Err(CommandError::WrongArity(command.to_lowercase())),
        }
    }
}

/// Handles FLUSHALL and FLUSHDB. Pending evictions are cancelled before the
/// keyspace is cleared.
pub async fn flushall(
    store: Arc<Mutex<KeyValueStore>>,
    _arguments: FlushallArguments,
) -> Result<(), CommandError> {
    store.lock().await.flush();

    Ok(())
}
