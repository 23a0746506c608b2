use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::{
    commands::{json::path, CommandError},
    key_value_store::{DataType, KeyValueStore},
};

pub struct JsonGetArguments {
    pub key: String,
    pub paths: Vec<String>,
}

impl JsonGetArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.is_empty() {
            return Err(CommandError::WrongArity("json.get".to_string()));
        }

        Ok(Self {
            key: arguments[0].clone(),
            paths: arguments[1..].to_vec(),
        })
    }
}

/// Handles the JSON.GET command.
///
/// Without a path the whole document is returned. A single path yields the
/// list of matching nodes; several paths yield an object mapping each path to
/// its list of matches.
pub async fn json_get(
    store: Arc<Mutex<KeyValueStore>>,
    arguments: JsonGetArguments,
) -> Result<Option<Value>, CommandError> {
    let mut store_guard = store.lock().await;

    let Some(item) = store_guard.get(&arguments.key) else {
        return Ok(None);
    };

    let DataType::Json(ref document) = item.data else {
        return Err(CommandError::WrongType);
    };

    match arguments.paths.as_slice() {
        [] => Ok(Some(document.clone())),
        [single] => Ok(Some(Value::Array(path::query(document, single)?))),
        paths => {
            let mut results = Map::new();
            for p in paths {
                results.insert(p.clone(), Value::Array(path::query(document, p)?));
            }
            Ok(Some(Value::Object(results)))
        }
    }
}
