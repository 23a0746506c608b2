//! Thin adapter over `serde_json_path`: the two operations the JSON commands
//! need, querying matches and overwriting every match in place.

use serde_json::Value;
use serde_json_path::JsonPath;

use crate::commands::CommandError;

pub const ROOT: &str = "$";

pub fn is_root(path: &str) -> bool {
    path.trim() == ROOT
}

fn compile(path: &str) -> Result<JsonPath, CommandError> {
    JsonPath::parse(path).map_err(|e| CommandError::InvalidJsonPath(e.to_string()))
}

/// Returns clones of every node `path` selects in `document`.
pub fn query(document: &Value, path: &str) -> Result<Vec<Value>, CommandError> {
    let path = compile(path)?;

    Ok(path.query(document).all().into_iter().cloned().collect())
}

/// Replaces every node `path` selects with `value`. Returns how many nodes
/// were written.
pub fn apply(document: &mut Value, path: &str, value: &Value) -> Result<usize, CommandError> {
    let path = compile(path)?;

    let pointers: Vec<String> = path
        .query_located(document)
        .locations()
        .map(|location| location.to_json_pointer())
        .collect();

    let mut applied = 0;

    for pointer in pointers {
        if let Some(node) = document.pointer_mut(&pointer) {
            *node = value.clone();
            applied += 1;
        }
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn query_collects_every_match() {
        let document = json!({"a": {"n": 1}, "b": {"n": 2}});

        assert_eq!(query(&document, "$..n"), Ok(vec![json!(1), json!(2)]));
        assert_eq!(query(&document, "$.missing"), Ok(vec![]));
    }

    #[test]
    fn apply_overwrites_matches_only() {
        let mut document = json!({"a": {"n": 1}, "b": {"n": 2}});

        assert_eq!(apply(&mut document, "$..n", &json!(0)), Ok(2));
        assert_eq!(document, json!({"a": {"n": 0}, "b": {"n": 0}}));
        assert_eq!(apply(&mut document, "$.c", &json!(0)), Ok(0));
    }

    #[test]
    fn invalid_path_is_an_error() {
        assert!(matches!(
            query(&json!({}), "$[?"),
            Err(CommandError::InvalidJsonPath(_))
        ));
    }
}
