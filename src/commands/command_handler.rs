use std::{fmt, sync::Arc};

use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    commands::{
        command_error::CommandError,
        del::{del, DelArguments},
        exists::{exists, ExistsArguments},
        expire::{expire, ExpireArguments, ExpireUnit},
        flushall::{flushall, FlushallArguments},
        get::{get, GetArguments},
        incr::{decr, incr, IncrArguments},
        json::{json_get, json_set, JsonGetArguments, JsonSetArguments},
        keys::{keys, KeysArguments},
        mget::{mget, MgetArguments},
        sadd_and_srem::{sadd, srem, SetMembersOperation},
        scard::{scard, ScardArguments},
        set::{set, SetArguments},
        setnx::{setnx, SetnxArguments},
        smembers::{smembers, SmembersArguments},
        ttl::{pttl, ttl, TtlArguments},
    },
    key_value_store::KeyValueStore,
    reply::Reply,
};

/// Every command the mock understands. The registry below is the only way
/// to turn a textual name into one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    Del,
    Exists,
    Expire,
    PExpire,
    ExpireAt,
    PExpireAt,
    Ttl,
    PTtl,
    Keys,
    Get,
    Set,
    SetNx,
    MGet,
    Incr,
    Decr,
    SAdd,
    SRem,
    SMembers,
    SCard,
    JsonGet,
    JsonSet,
    Eval,
    EvalSha,
    FlushAll,
    FlushDb,
}

const REGISTRY: &[(&str, CommandName)] = &[
    ("DEL", CommandName::Del),
    ("EXISTS", CommandName::Exists),
    ("EXPIRE", CommandName::Expire),
    ("PEXPIRE", CommandName::PExpire),
    ("EXPIREAT", CommandName::ExpireAt),
    ("PEXPIREAT", CommandName::PExpireAt),
    ("TTL", CommandName::Ttl),
    ("PTTL", CommandName::PTtl),
    ("KEYS", CommandName::Keys),
    ("GET", CommandName::Get),
    ("SET", CommandName::Set),
    ("SETNX", CommandName::SetNx),
    ("MGET", CommandName::MGet),
    ("INCR", CommandName::Incr),
    ("DECR", CommandName::Decr),
    ("SADD", CommandName::SAdd),
    ("SREM", CommandName::SRem),
    ("SMEMBERS", CommandName::SMembers),
    ("SCARD", CommandName::SCard),
    ("JSON.GET", CommandName::JsonGet),
    ("JSON.SET", CommandName::JsonSet),
    ("EVAL", CommandName::Eval),
    ("EVALSHA", CommandName::EvalSha),
    ("FLUSHALL", CommandName::FlushAll),
    ("FLUSHDB", CommandName::FlushDb),
];

impl CommandName {
    /// Case-insensitive registry lookup.
    pub fn resolve(name: &str) -> Option<Self> {
        REGISTRY
            .iter()
            .find(|(registered, _)| registered.eq_ignore_ascii_case(name))
            .map(|(_, command)| *command)
    }

    pub fn as_str(&self) -> &'static str {
        REGISTRY
            .iter()
            .find(|(_, command)| command == self)
            .map(|(name, _)| *name)
            .unwrap_or("UNKNOWN")
    }

    /// Scripts may reach every command except the scripting ones.
    pub fn is_script_callable(&self) -> bool {
        !matches!(self, CommandName::Eval | CommandName::EvalSha)
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One command invocation: a registry id plus its arguments as raw bytes.
#[derive(Debug, PartialEq, Clone)]
pub struct CommandHandler {
    pub name: CommandName,
    pub arguments: Vec<Bytes>,
}

/// Reads arguments that are keys, options or numbers as text. Invalid UTF-8
/// is replaced rather than rejected.
pub(crate) fn text_arguments(arguments: &[Bytes]) -> Vec<String> {
    arguments
        .iter()
        .map(|argument| String::from_utf8_lossy(argument).into_owned())
        .collect()
}

impl CommandHandler {
    pub fn new<I, A>(name: &str, arguments: I) -> Result<Self, CommandError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Bytes>,
    {
        let Some(name) = CommandName::resolve(name) else {
            return Err(CommandError::UnknownCommand(name.to_string()));
        };

        Ok(Self::from_parts(name, arguments))
    }

    pub fn from_parts<I, A>(name: CommandName, arguments: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Bytes>,
    {
        Self {
            name,
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses the arguments and runs the command against the keyspace.
    ///
    /// EVAL and EVALSHA need a scripting engine and are rejected here; the
    /// client routes them before reaching this point.
    pub async fn handle_command(
        self,
        store: Arc<Mutex<KeyValueStore>>,
    ) -> Result<Reply, CommandError> {
        debug!(command = %self.name, arguments = ?self.arguments, "dispatching command");

        let command = self.name.as_str();
        let raw_arguments = self.arguments;
        let arguments = text_arguments(&raw_arguments);

        match self.name {
            CommandName::Del => del(store, DelArguments::parse(arguments)?)
                .await
                .map(Reply::from),
            CommandName::Exists => exists(store, ExistsArguments::parse(arguments)?)
                .await
                .map(Reply::from),
            CommandName::Expire => {
                let arguments =
                    ExpireArguments::parse(command, arguments, ExpireUnit::Seconds, false)?;
                expire(store, arguments).await.map(Reply::from)
            }
            CommandName::PExpire => {
                let arguments =
                    ExpireArguments::parse(command, arguments, ExpireUnit::Milliseconds, false)?;
                expire(store, arguments).await.map(Reply::from)
            }
            CommandName::ExpireAt => {
                let arguments =
                    ExpireArguments::parse(command, arguments, ExpireUnit::Seconds, true)?;
                expire(store, arguments).await.map(Reply::from)
            }
            CommandName::PExpireAt => {
                let arguments =
                    ExpireArguments::parse(command, arguments, ExpireUnit::Milliseconds, true)?;
                expire(store, arguments).await.map(Reply::from)
            }
            CommandName::Ttl => ttl(store, TtlArguments::parse(command, arguments)?)
                .await
                .map(Reply::from),
            CommandName::PTtl => pttl(store, TtlArguments::parse(command, arguments)?)
                .await
                .map(Reply::from),
            CommandName::Keys => keys(store, KeysArguments::parse(arguments)?)
                .await
                .map(Reply::from),
            CommandName::Get => get(store, GetArguments::parse(arguments)?)
                .await
                .map(Reply::from),
            CommandName::Set => {
                let arguments = SetArguments::parse(raw_arguments)?;
                let with_get = arguments.options.get;

                match set(store, arguments).await? {
                    Some(_) if !with_get => Ok(Reply::ok()),
                    value => Ok(Reply::from(value)),
                }
            }
            CommandName::SetNx => setnx(store, SetnxArguments::parse(raw_arguments)?)
                .await
                .map(Reply::from),
            CommandName::MGet => {
                let values = mget(store, MgetArguments::parse(arguments)?).await?;
                Ok(Reply::Array(values.into_iter().map(Reply::from).collect()))
            }
            CommandName::Incr => incr(store, IncrArguments::parse(command, arguments)?)
                .await
                .map(Reply::from),
            CommandName::Decr => decr(store, IncrArguments::parse(command, arguments)?)
                .await
                .map(Reply::from),
            CommandName::SAdd => sadd(store, SetMembersOperation::parse(command, arguments)?)
                .await
                .map(Reply::from),
            CommandName::SRem => srem(store, SetMembersOperation::parse(command, arguments)?)
                .await
                .map(Reply::from),
            CommandName::SMembers => smembers(store, SmembersArguments::parse(arguments)?)
                .await
                .map(Reply::from),
            CommandName::SCard => scard(store, ScardArguments::parse(arguments)?)
                .await
                .map(Reply::from),
            CommandName::JsonGet => {
                let document = json_get(store, JsonGetArguments::parse(arguments)?).await?;
                Ok(document.map_or(Reply::Null, Reply::Json))
            }
            CommandName::JsonSet => {
                let status = json_set(store, JsonSetArguments::parse(arguments)?).await?;
                Ok(status.map_or(Reply::Null, Reply::SimpleString))
            }
            CommandName::FlushAll | CommandName::FlushDb => {
                flushall(store, FlushallArguments::parse(command, arguments)?).await?;
                Ok(Reply::ok())
            }
            CommandName::Eval | CommandName::EvalSha => Err(CommandError::NotAllowedFromScript),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_names_case_insensitively() {
        assert_eq!(CommandName::resolve("json.set"), Some(CommandName::JsonSet));
        assert_eq!(CommandName::resolve("PeXpIrEaT"), Some(CommandName::PExpireAt));
        assert_eq!(CommandName::resolve("hset"), None);
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert_eq!(
            CommandHandler::new("nope", Vec::<String>::new()),
            Err(CommandError::UnknownCommand("nope".to_string()))
        );
    }

    #[test]
    fn scripting_commands_are_not_script_callable() {
        assert!(!CommandName::Eval.is_script_callable());
        assert!(!CommandName::EvalSha.is_script_callable());
        assert!(CommandName::Get.is_script_callable());
    }
}
