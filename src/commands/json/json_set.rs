use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::trace;

use crate::{
    commands::{json::path, set::SetCondition, CommandError},
    key_value_store::{DataType, Item, KeyValueStore},
};

pub struct JsonSetArguments {
    pub key: String,
    pub path: String,
    pub value: Value,
    pub condition: Option<SetCondition>,
}

impl JsonSetArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() < 3 {
            return Err(CommandError::WrongArity("json.set".to_string()));
        }

        let value = serde_json::from_str(&arguments[2])
            .map_err(|e| CommandError::InvalidJson(e.to_string()))?;

        let condition = match arguments.get(3).map(|c| c.to_uppercase()) {
            None => None,
            Some(c) if c == "NX" => Some(SetCondition::Nx),
            Some(c) if c == "XX" => Some(SetCondition::Xx),
            Some(_) => return Err(CommandError::SyntaxError),
        };

        if arguments.len() > 4 {
            return Err(CommandError::SyntaxError);
        }

        Ok(Self {
            key: arguments[0].clone(),
            path: arguments[1].clone(),
            value,
            condition,
        })
    }
}

/// Handles the JSON.SET command.
///
/// At the root path the document is created or replaced (an existing key keeps
/// its expiration). Any other path requires the document to exist and
/// overwrites every node the path selects; `None` is returned when nothing was
/// written, either because NX/XX rejected the write or no node matched.
pub async fn json_set(
    store: Arc<Mutex<KeyValueStore>>,
    arguments: JsonSetArguments,
) -> Result<Option<String>, CommandError> {
    let JsonSetArguments {
        key,
        path: json_path,
        value,
        condition,
    } = arguments;

    let mut store_guard = store.lock().await;

    let Some(item) = store_guard.get_mut(&key) else {
        if condition == Some(SetCondition::Xx) {
            return Ok(None);
        }

        if !path::is_root(&json_path) {
            return Err(CommandError::RootMustExist);
        }

        store_guard.set(key, Item::new(DataType::Json(value)));
        return Ok(Some("OK".to_string()));
    };

    let DataType::Json(ref mut document) = item.data else {
        return Err(CommandError::WrongType);
    };

    if path::is_root(&json_path) {
        if condition == Some(SetCondition::Nx) {
            return Ok(None);
        }

        *document = value;
        return Ok(Some("OK".to_string()));
    }

    let matched = !path::query(document, &json_path)?.is_empty();

    match condition {
        Some(SetCondition::Nx) if matched => return Ok(None),
        Some(SetCondition::Xx) if !matched => return Ok(None),
        _ => {}
    }

    let applied = path::apply(document, &json_path, &value)?;
    trace!(key, path = json_path, applied, "patched JSON document");

    if applied > 0 {
        Ok(Some("OK".to_string()))
    } else {
        Ok(None)
    }
}
