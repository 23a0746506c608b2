//! The embedded Lua interpreter: VM setup, the `redis`, `cjson` and
//! `cmsgpack` libraries, and the mapping between `mlua::Value` and
//! `GuestValue`.

use std::io::Cursor;

use bytes::{BufMut, Bytes, BytesMut};
use mlua::{Function, Lua, MultiValue, Table, Value};

use crate::{
    commands::{CommandError, CommandHandler, EvalArguments},
    scripting::{
        bridge,
        marshal::{guest_to_host, host_to_guest, GuestKey, GuestValue, HostValue},
    },
};

/// Tables nested deeper than this are rejected instead of recursing forever
/// on self-referencing tables.
const MAX_NESTING: usize = 128;

const SCRIPT_NAME: &str = "@user_script";

/// Globals a script must not reach.
const SANDBOXED_GLOBALS: &[&str] = &["dofile", "loadfile", "io", "os", "require", "module"];

/// What a host function hands back to Lua.
pub enum HostReturn {
    Single(HostValue),
    /// Spread into several Lua return values.
    Multiple(Vec<HostValue>),
}

pub fn create_vm() -> mlua::Result<Lua> {
    let lua = Lua::new();
    let globals = lua.globals();

    for name in SANDBOXED_GLOBALS {
        globals.set(*name, Value::Nil)?;
    }

    globals.set("redis", redis_library(&lua)?)?;
    globals.set("cjson", cjson_library(&lua)?)?;
    globals.set("cmsgpack", cmsgpack_library(&lua)?)?;

    Ok(lua)
}

/// Runs one script with `KEYS` and `ARGV` bound and returns its first result.
///
/// Must be called on a thread where a host bridge is installed, otherwise
/// every `redis.call` fails.
pub fn run(lua: &Lua, arguments: EvalArguments) -> Result<HostValue, CommandError> {
    let globals = lua.globals();
    globals
        .set("KEYS", arguments.keys)
        .map_err(|e| from_lua_error(&e))?;
    globals
        .set("ARGV", arguments.args)
        .map_err(|e| from_lua_error(&e))?;

    let values: MultiValue = lua
        .load(arguments.script.as_str())
        .set_name(SCRIPT_NAME)
        .eval()
        .map_err(|e| from_lua_error(&e))?;

    let first = values.into_iter().next().unwrap_or(Value::Nil);
    let guest = lua_to_guest(&first, 0).map_err(|e| from_lua_error(&e))?;

    Ok(guest_to_host(guest))
}

/// Recovers the command failure behind a Lua error, so a script that dies
/// in `redis.call` reports the command's own error.
pub fn from_lua_error(error: &mlua::Error) -> CommandError {
    match error {
        mlua::Error::CallbackError { cause, .. } => from_lua_error(cause),
        mlua::Error::WithContext { cause, .. } => from_lua_error(cause),
        mlua::Error::ExternalError(external) => match external.downcast_ref::<CommandError>() {
            Some(command_error) => command_error.clone(),
            None => CommandError::ScriptError(external.to_string()),
        },
        mlua::Error::RuntimeError(message) => CommandError::ScriptError(message.clone()),
        mlua::Error::SyntaxError { message, .. } => CommandError::ScriptError(message.clone()),
        other => CommandError::ScriptError(other.to_string()),
    }
}

pub fn lua_to_guest(value: &Value, depth: usize) -> mlua::Result<GuestValue> {
    if depth > MAX_NESTING {
        return Err(mlua::Error::RuntimeError(
            "reached the maximum table nesting level".to_string(),
        ));
    }

    let guest = match value {
        Value::Nil => GuestValue::Nil,
        Value::Boolean(b) => GuestValue::Boolean(*b),
        Value::LightUserData(data) if data.0.is_null() => GuestValue::Null,
        Value::Integer(i) => GuestValue::Number(*i as f64),
        Value::Number(n) => GuestValue::Number(*n),
        Value::String(s) => GuestValue::String(Bytes::copy_from_slice(&s.as_bytes())),
        Value::Table(table) => {
            let mut entries = Vec::new();

            for pair in table.clone().pairs::<Value, Value>() {
                let (key, value) = pair?;

                let key = match key {
                    Value::Integer(i) => GuestKey::Index(i),
                    Value::Number(n) if n.fract() == 0.0 => GuestKey::Index(n as i64),
                    Value::Number(n) => GuestKey::Name(n.to_string()),
                    Value::String(s) => GuestKey::Name(s.to_string_lossy().to_string()),
                    _ => continue,
                };

                entries.push((key, lua_to_guest(&value, depth + 1)?));
            }

            GuestValue::Table(entries)
        }
        _ => GuestValue::Nil,
    };

    Ok(guest)
}

pub fn guest_to_lua(lua: &Lua, value: GuestValue) -> mlua::Result<Value> {
    let value = match value {
        GuestValue::Nil => Value::Nil,
        GuestValue::Null => Value::NULL,
        GuestValue::Boolean(b) => Value::Boolean(b),
        GuestValue::Number(n) => Value::Number(n),
        GuestValue::String(s) => Value::String(lua.create_string(&s)?),
        GuestValue::Table(entries) => {
            let table = lua.create_table()?;

            for (key, value) in entries {
                let key = match key {
                    GuestKey::Index(i) => Value::Integer(i),
                    GuestKey::Name(name) => Value::String(lua.create_string(&name)?),
                };
                table.raw_set(key, guest_to_lua(lua, value)?)?;
            }

            Value::Table(table)
        }
    };

    Ok(value)
}

fn to_host_values(arguments: MultiValue) -> mlua::Result<Vec<HostValue>> {
    arguments
        .iter()
        .map(|value| lua_to_guest(value, 0).map(guest_to_host))
        .collect()
}

fn to_lua_values(lua: &Lua, result: HostReturn) -> mlua::Result<MultiValue> {
    let values = match result {
        HostReturn::Single(value) => vec![value],
        HostReturn::Multiple(values) => values,
    };

    values
        .into_iter()
        .map(|value| guest_to_lua(lua, host_to_guest(value)))
        .collect()
}

/// Wraps a host function so Lua arguments and results are marshalled and a
/// host failure is raised as a single Lua error.
fn host_function<F>(lua: &Lua, function: F) -> mlua::Result<Function>
where
    F: Fn(Vec<HostValue>) -> Result<HostReturn, CommandError> + Send + 'static,
{
    lua.create_function(move |lua, arguments: MultiValue| {
        let arguments = to_host_values(arguments)?;
        let result = function(arguments).map_err(mlua::Error::external)?;
        to_lua_values(lua, result)
    })
}

fn redis_library(lua: &Lua) -> mlua::Result<Table> {
    let redis = lua.create_table()?;

    redis.set(
        "call",
        host_function(lua, |arguments| redis_call(arguments).map(HostReturn::Single))?,
    )?;

    // Argument conversion happens inside so that it fails into `{err = ...}`
    // like any other command error.
    redis.set(
        "pcall",
        lua.create_function(|lua, arguments: MultiValue| {
            let value = to_host_values(arguments)
                .map_err(|e| from_lua_error(&e))
                .and_then(redis_call)
                .unwrap_or_else(|e| error_table(e.to_string()));
            to_lua_values(lua, HostReturn::Single(value))
        })?,
    )?;

    redis.set(
        "error_reply",
        host_function(lua, |arguments| {
            Ok(HostReturn::Single(error_table(first_bytes(&arguments))))
        })?,
    )?;

    redis.set(
        "status_reply",
        host_function(lua, |arguments| {
            let mut status = std::collections::BTreeMap::new();
            status.insert("ok".to_string(), HostValue::String(first_bytes(&arguments)));
            Ok(HostReturn::Single(HostValue::Object(status)))
        })?,
    )?;

    redis.set(
        "replicate_commands",
        host_function(lua, |_| Ok(HostReturn::Single(HostValue::Bool(true))))?,
    )?;

    Ok(redis)
}

fn error_table(message: impl Into<Bytes>) -> HostValue {
    let mut error = std::collections::BTreeMap::new();
    error.insert("err".to_string(), HostValue::String(message.into()));
    HostValue::Object(error)
}

fn first_bytes(arguments: &[HostValue]) -> Bytes {
    match arguments.first() {
        Some(HostValue::String(s)) => s.clone(),
        Some(HostValue::Number(n)) => Bytes::from(number_argument(*n)),
        _ => Bytes::new(),
    }
}

fn number_argument(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e17 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// `redis.call(name, ...)`: validates the arguments, resolves the command and
/// forces it to completion through the host bridge.
fn redis_call(arguments: Vec<HostValue>) -> Result<HostValue, CommandError> {
    let mut arguments = arguments
        .into_iter()
        .map(|argument| match argument {
            HostValue::String(s) => Ok(s),
            HostValue::Number(n) => Ok(Bytes::from(number_argument(n))),
            _ => Err(CommandError::InvalidScriptArgument),
        })
        .collect::<Result<Vec<Bytes>, _>>()?;

    if arguments.is_empty() {
        return Err(CommandError::WrongArity("redis.call".to_string()));
    }

    let name = String::from_utf8_lossy(&arguments.remove(0)).into_owned();
    let command = CommandHandler::new(&name, arguments)?;

    if !command.name.is_script_callable() {
        return Err(CommandError::NotAllowedFromScript);
    }

    let reply = bridge::call_host(command)?;

    Ok(reply.into_host_value())
}

fn cjson_library(lua: &Lua) -> mlua::Result<Table> {
    let cjson = lua.create_table()?;

    cjson.set(
        "encode",
        host_function(lua, |arguments| {
            let value = arguments.into_iter().next().unwrap_or(HostValue::Undefined);
            let text = serde_json::to_string(&value.to_json())
                .map_err(|e| CommandError::InvalidJson(e.to_string()))?;
            Ok(HostReturn::Single(HostValue::String(Bytes::from(text))))
        })?,
    )?;

    cjson.set(
        "decode",
        host_function(lua, |arguments| {
            let text = match arguments.first() {
                Some(HostValue::String(s)) => std::str::from_utf8(s)
                    .map_err(|e| CommandError::InvalidJson(e.to_string()))?,
                _ => return Err(CommandError::InvalidJson("expected a string".to_string())),
            };
            let value: serde_json::Value = serde_json::from_str(text)
                .map_err(|e| CommandError::InvalidJson(e.to_string()))?;
            Ok(HostReturn::Single(HostValue::from_json(value)))
        })?,
    )?;

    cjson.set("null", Value::NULL)?;

    Ok(cjson)
}

fn cmsgpack_library(lua: &Lua) -> mlua::Result<Table> {
    let cmsgpack = lua.create_table()?;

    // Packed bytes are not UTF-8, so these two work on raw Lua strings.
    cmsgpack.set(
        "pack",
        lua.create_function(|lua, arguments: MultiValue| {
            let mut writer = BytesMut::new().writer();

            for value in to_host_values(arguments)? {
                rmp_serde::encode::write(&mut writer, &value.to_json())
                    .map_err(mlua::Error::external)?;
            }

            lua.create_string(writer.into_inner())
        })?,
    )?;

    cmsgpack.set(
        "unpack",
        lua.create_function(|lua, packed: mlua::String| {
            let bytes = packed.as_bytes().to_vec();
            let mut cursor = Cursor::new(bytes.as_slice());
            let mut values = Vec::new();

            while (cursor.position() as usize) < bytes.len() {
                let value: serde_json::Value =
                    rmp_serde::from_read(&mut cursor).map_err(mlua::Error::external)?;
                values.push(HostValue::from_json(value));
            }

            to_lua_values(lua, HostReturn::Multiple(values))
        })?,
    )?;

    Ok(cmsgpack)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(lua: &Lua, script: &str) -> HostValue {
        let value: Value = lua.load(script).eval().unwrap();
        guest_to_host(lua_to_guest(&value, 0).unwrap())
    }

    #[test]
    fn cjson_round_trips_through_lua() {
        let lua = create_vm().unwrap();

        assert_eq!(
            eval(&lua, r#"return cjson.encode(cjson.decode('{"a":[1,2]}'))"#),
            HostValue::String(r#"{"a":[1,2]}"#.into())
        );
        assert_eq!(eval(&lua, "return cjson.decode('null') == cjson.null"), HostValue::Bool(true));
    }

    #[test]
    fn cmsgpack_unpacks_every_value() {
        let lua = create_vm().unwrap();

        assert_eq!(
            eval(&lua, "local a, b = cmsgpack.unpack(cmsgpack.pack(1, 'two')); return {a, b}"),
            HostValue::Array(vec![HostValue::Number(1.0), HostValue::String("two".into())])
        );
    }

    #[test]
    fn reply_helpers_build_tables() {
        let lua = create_vm().unwrap();

        assert_eq!(eval(&lua, "return redis.status_reply('FINE').ok"), HostValue::String("FINE".into()));
        assert_eq!(eval(&lua, "return redis.error_reply('bad').err"), HostValue::String("bad".into()));
        assert_eq!(eval(&lua, "return redis.replicate_commands()"), HostValue::Bool(true));
    }

    #[test]
    fn sandbox_hides_os_and_io() {
        let lua = create_vm().unwrap();

        assert_eq!(eval(&lua, "return os == nil and io == nil"), HostValue::Bool(true));
    }

    #[test]
    fn call_without_bridge_fails() {
        let lua = create_vm().unwrap();

        let error = lua
            .load("return redis.call('get', 'k')")
            .eval::<Value>()
            .unwrap_err();
        assert!(matches!(from_lua_error(&error), CommandError::ScriptError(_)));
    }

    #[test]
    fn cyclic_tables_hit_the_nesting_limit() {
        let lua = create_vm().unwrap();
        let value: Value = lua.load("local t = {}; t.self = t; return t").eval().unwrap();

        assert!(lua_to_guest(&value, 0).is_err());
    }
}
