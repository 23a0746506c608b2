use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    commands::CommandError,
    key_value_store::{DataType, KeyValueStore},
};

pub struct ScardArguments {
    pub key: String,
}

impl ScardArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::WrongArity("scard".to_string()));
        }

        Ok(Self {
            key: arguments[0].clone(),
        })
    }
}

pub async fn scard(
    store: Arc<Mutex<KeyValueStore>>,
    arguments: ScardArguments,
) -> Result<i64, CommandError> {
    let mut store_guard = store.lock().await;

    match store_guard.get(&arguments.key) {
        Some(item) => match item.data {
            DataType::Set(ref members) => Ok(members.len() as i64),
            _ => Err(CommandError::WrongType),
        },
        None => Ok(0),
    }
}
