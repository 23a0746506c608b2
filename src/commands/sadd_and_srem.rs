use std::{collections::HashSet, sync::Arc};

use tokio::sync::Mutex;

use crate::{
    commands::CommandError,
    key_value_store::{DataType, Item, KeyValueStore},
};

/// Parsed arguments shared by SADD and SREM.
pub struct SetMembersOperation {
    pub key: String,
    pub members: Vec<String>,
}

impl SetMembersOperation {
    pub fn parse(command: &str, arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::WrongArity(command.to_lowercase()));
        }

        Ok(Self {
            key: arguments[0].clone(),
            members: arguments[1..].to_vec(),
        })
    }
}

/// Handles the Redis SADD command. Returns the number of members that were
/// not already in the set. Adding no members never creates the key.
pub async fn sadd(
    store: Arc<Mutex<KeyValueStore>>,
    arguments: SetMembersOperation,
) -> Result<i64, CommandError> {
    let mut store_guard = store.lock().await;

    if arguments.members.is_empty() {
        return match store_guard.get(&arguments.key).map(|item| &item.data) {
            Some(DataType::Set(_)) | None => Ok(0),
            Some(_) => Err(CommandError::WrongType),
        };
    }

    let Some(item) = store_guard.get_mut(&arguments.key) else {
        let members: HashSet<String> = arguments.members.into_iter().collect();
        let added = members.len() as i64;
        store_guard.set(arguments.key, Item::new(DataType::Set(members)));
        return Ok(added);
    };

    match item.data {
        DataType::Set(ref mut members) => Ok(arguments
            .members
            .into_iter()
            .filter(|member| members.insert(member.clone()))
            .count() as i64),
        _ => Err(CommandError::WrongType),
    }
}

/// Handles the Redis SREM command. Returns the number of members removed;
/// a set left empty is deleted.
pub async fn srem(
    store: Arc<Mutex<KeyValueStore>>,
    arguments: SetMembersOperation,
) -> Result<i64, CommandError> {
    let mut store_guard = store.lock().await;

    let Some(item) = store_guard.get_mut(&arguments.key) else {
        return Ok(0);
    };

    if arguments.members.is_empty() {
        return match item.data {
            DataType::Set(_) => Ok(0),
            _ => Err(CommandError::WrongType),
        };
    }

    let (removed, now_empty) = match item.data {
        DataType::Set(ref mut members) => {
            let removed = arguments
                .members
                .iter()
                .filter(|member| members.remove(member.as_str()))
                .count() as i64;
            (removed, members.is_empty())
        }
        _ => return Err(CommandError::WrongType),
    };

    if now_empty {
        store_guard.delete(&arguments.key);
    }

    Ok(removed)
}
