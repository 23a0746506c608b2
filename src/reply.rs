use bytes::Bytes;

use crate::{commands::CommandError, scripting::HostValue};

/// The result of a command, shaped like a Redis reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Null,
    SimpleString(String),
    Integer(i64),
    /// Binary-safe payload, as stored under a string key.
    BulkString(Bytes),
    Array(Vec<Reply>),
    /// A parsed JSON document or JSONPath result returned by JSON.GET.
    Json(serde_json::Value),
}

impl Reply {
    pub fn ok() -> Self {
        Reply::SimpleString("OK".to_string())
    }

    /// The reply as text, if it is a string holding valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Reply::SimpleString(s) => Some(s),
            Reply::BulkString(bytes) => std::str::from_utf8(bytes).ok(),
            _ => None,
        }
    }

    /// Converts a command result into the value a script receives from
    /// `redis.call`. A top-level null is "no value" (Lua `nil`); nulls
    /// nested in arrays keep their identity as the null sentinel.
    pub fn into_host_value(self) -> HostValue {
        match self {
            Reply::Null => HostValue::Undefined,
            other => other.into_nested_host_value(),
        }
    }

    fn into_nested_host_value(self) -> HostValue {
        match self {
            Reply::Null => HostValue::Null,
            Reply::SimpleString(s) => HostValue::String(Bytes::from(s)),
            Reply::BulkString(bytes) => HostValue::String(bytes),
            Reply::Integer(i) => HostValue::Number(i as f64),
            Reply::Array(items) => HostValue::Array(
                items
                    .into_iter()
                    .map(Reply::into_nested_host_value)
                    .collect(),
            ),
            Reply::Json(value) => HostValue::from_json(value),
        }
    }

    /// Formats the reply the way `redis-cli` prints it.
    pub fn to_cli_string(&self) -> String {
        match self {
            Reply::Null => "(nil)".to_string(),
            Reply::SimpleString(s) => s.clone(),
            Reply::Integer(i) => format!("(integer) {}", i),
            Reply::BulkString(bytes) => quote(bytes),
            Reply::Json(value) => quote(value.to_string().as_bytes()),
            Reply::Array(items) if items.is_empty() => "(empty array)".to_string(),
            Reply::Array(items) => {
                let width = items.len().to_string().len();
                let mut lines = Vec::new();

                for (i, item) in items.iter().enumerate() {
                    let prefix = format!("{:>width$}) ", i + 1, width = width);
                    let padding = " ".repeat(prefix.len());

                    for (n, line) in item.to_cli_string().lines().enumerate() {
                        if n == 0 {
                            lines.push(format!("{}{}", prefix, line));
                        } else {
                            lines.push(format!("{}{}", padding, line));
                        }
                    }
                }

                lines.join("\n")
            }
        }
    }
}

/// Quotes a bulk string like `redis-cli`: printable ASCII as is, everything
/// else escaped.
fn quote(bytes: &[u8]) -> String {
    let mut quoted = String::with_capacity(bytes.len() + 2);
    quoted.push('"');

    for &byte in bytes {
        match byte {
            b'"' => quoted.push_str("\\\""),
            b'\\' => quoted.push_str("\\\\"),
            b'\n' => quoted.push_str("\\n"),
            b'\r' => quoted.push_str("\\r"),
            b'\t' => quoted.push_str("\\t"),
            0x20..=0x7e => quoted.push(byte as char),
            _ => quoted.push_str(&format!("\\x{:02x}", byte)),
        }
    }

    quoted.push('"');
    quoted
}

impl From<Option<Bytes>> for Reply {
    fn from(value: Option<Bytes>) -> Self {
        value.map_or(Reply::Null, Reply::BulkString)
    }
}

impl From<i64> for Reply {
    fn from(value: i64) -> Self {
        Reply::Integer(value)
    }
}

impl From<bool> for Reply {
    fn from(value: bool) -> Self {
        Reply::Integer(value as i64)
    }
}

impl From<Vec<String>> for Reply {
    fn from(value: Vec<String>) -> Self {
        Reply::Array(value
            .into_iter()
            .map(|s| Reply::BulkString(Bytes::from(s)))
            .collect())
    }
}

/// Encodes a script's return value as a reply.
///
/// Strings pass through, numbers are floored to integers, `true` is 1 and
/// `false` is null, arrays are encoded element by element. A table carrying
/// a string `err` field raises that error; one carrying a string `ok` field
/// becomes a status reply; any other table is an empty array.
pub fn encode(value: HostValue) -> Result<Reply, CommandError> {
    match value {
        HostValue::String(s) => Ok(Reply::BulkString(s)),
        HostValue::Number(n) => Ok(Reply::Integer(n.floor() as i64)),
        HostValue::Bool(true) => Ok(Reply::Integer(1)),
        HostValue::Bool(false) => Ok(Reply::Null),
        HostValue::Array(items) => Ok(Reply::Array(
            items
                .into_iter()
                .map(encode)
                .collect::<Result<Vec<_>, _>>()?,
        )),
        HostValue::Object(map) => {
            if let Some(HostValue::String(err)) = map.get("err") {
                return Err(CommandError::ErrorReply(
                    String::from_utf8_lossy(err).into_owned(),
                ));
            }

            if let Some(HostValue::String(ok)) = map.get("ok") {
                return Ok(Reply::SimpleString(
                    String::from_utf8_lossy(ok).into_owned(),
                ));
            }

            Ok(Reply::Array(Vec::new()))
        }
        HostValue::Undefined | HostValue::Null => Ok(Reply::Null),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn scalars_encode_like_redis() {
        assert_eq!(encode(HostValue::Bool(true)), Ok(Reply::Integer(1)));
        assert_eq!(encode(HostValue::Bool(false)), Ok(Reply::Null));
        assert_eq!(encode(HostValue::Number(3.7)), Ok(Reply::Integer(3)));
        assert_eq!(encode(HostValue::Number(-0.5)), Ok(Reply::Integer(-1)));
        assert_eq!(encode(HostValue::Undefined), Ok(Reply::Null));
    }

    #[test]
    fn tables_with_err_or_ok() {
        let mut err = BTreeMap::new();
        err.insert("err".to_string(), HostValue::String("boom".into()));
        assert_eq!(
            encode(HostValue::Object(err)),
            Err(CommandError::ErrorReply("boom".into()))
        );

        let mut ok = BTreeMap::new();
        ok.insert("ok".to_string(), HostValue::String("FINE".into()));
        assert_eq!(
            encode(HostValue::Object(ok)),
            Ok(Reply::SimpleString("FINE".into()))
        );

        let mut other = BTreeMap::new();
        other.insert("x".to_string(), HostValue::Number(1.0));
        assert_eq!(encode(HostValue::Object(other)), Ok(Reply::Array(vec![])));
    }

    #[test]
    fn nested_null_stays_null() {
        let reply = Reply::Array(vec![Reply::BulkString("a".into()), Reply::Null]);

        assert_eq!(
            reply.into_host_value(),
            HostValue::Array(vec![HostValue::String("a".into()), HostValue::Null])
        );
        assert_eq!(Reply::Null.into_host_value(), HostValue::Undefined);
    }

    #[test]
    fn cli_formatting() {
        assert_eq!(Reply::Integer(2).to_cli_string(), "(integer) 2");
        assert_eq!(Reply::BulkString("v".into()).to_cli_string(), "\"v\"");
        assert_eq!(
            Reply::BulkString(Bytes::from_static(b"a\"b\x93\n")).to_cli_string(),
            r#""a\"b\x93\n""#
        );
        assert_eq!(
            Reply::Array(vec![Reply::Integer(1), Reply::Null]).to_cli_string(),
            "1) (integer) 1\n2) (nil)"
        );
        assert_eq!(Reply::Array(vec![]).to_cli_string(), "(empty array)");
    }
}
