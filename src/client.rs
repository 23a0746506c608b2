use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, debug_span, Instrument};

use crate::{
    commands::{
        self, transactions::Multi, CommandError, CommandHandler, CommandName, DelArguments,
        EvalArguments, ExistsArguments, ExpireArguments, ExpireUnit, FlushallArguments,
        GetArguments, IncrArguments, KeysArguments, MgetArguments, ScardArguments, SetArguments,
        SetMembersOperation, SetOptions, SetnxArguments, SmembersArguments, TtlArguments,
        json::{JsonGetArguments, JsonSetArguments},
        text_arguments,
    },
    key_value_store::{ExpiryMode, KeyValueStore, SharedStore},
    reply::Reply,
    scripting::ScriptingBridge,
};

/// Settings for a new [`Client`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Recorded on every command span.
    pub name: Option<String>,
    /// Whether EVAL gets a Lua VM. Enabled by default.
    pub scripting: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            name: None,
            scripting: true,
        }
    }
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn scripting(mut self, enabled: bool) -> Self {
        self.scripting = enabled;
        self
    }
}

/// An in-process stand-in for a Redis connection.
///
/// Clones share the keyspace and the Lua VM.
#[derive(Debug, Clone)]
pub struct Client {
    store: SharedStore,
    scripting: Option<ScriptingBridge>,
    name: Option<String>,
}

/// Creates a client with default options.
pub fn create_client() -> Result<Client, CommandError> {
    Client::new(ClientOptions::default())
}

/// Pools are not modelled; this returns a fresh independent client.
pub fn create_client_pool() -> Result<Client, CommandError> {
    create_client()
}

fn strings<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

impl Client {
    pub fn new(options: ClientOptions) -> Result<Self, CommandError> {
        let scripting = if options.scripting {
            Some(ScriptingBridge::new()?)
        } else {
            None
        };

        Ok(Self {
            store: KeyValueStore::shared(),
            scripting,
            name: options.name,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn store(&self) -> SharedStore {
        Arc::clone(&self.store)
    }

    /// Runs any command from its name and raw arguments, the way Redis would
    /// parse them off the wire.
    pub async fn execute<I, A>(&self, name: &str, arguments: I) -> Result<Reply, CommandError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Bytes>,
    {
        let command = CommandHandler::new(name, arguments)?;
        self.dispatch(command).await
    }

    pub(crate) async fn dispatch(&self, command: CommandHandler) -> Result<Reply, CommandError> {
        let span = debug_span!("command", client = self.name.as_deref().unwrap_or("default"));

        async move {
            match command.name {
                CommandName::Eval => {
                    let arguments =
                        EvalArguments::parse("eval", text_arguments(&command.arguments))?;
                    self.run_script(arguments).await
                }
                CommandName::EvalSha => {
                    EvalArguments::parse("evalsha", text_arguments(&command.arguments))?;
                    Err(CommandError::NoScript)
                }
                _ => command.handle_command(self.store()).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn run_script(&self, arguments: EvalArguments) -> Result<Reply, CommandError> {
        let Some(scripting) = &self.scripting else {
            return Err(CommandError::ScriptingDisabled);
        };

        scripting.eval(self.store(), arguments).await
    }

    /// Starts recording a transaction.
    pub fn multi(&self) -> Multi {
        Multi::new(self.clone())
    }

    pub fn json(&self) -> JsonCommands<'_> {
        JsonCommands { client: self }
    }

    pub async fn get(&self, key: impl Into<String>) -> Result<Option<Bytes>, CommandError> {
        commands::get(self.store(), GetArguments { key: key.into() }).await
    }

    /// `SET key value`. Returns `Some("OK")`.
    pub async fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<Bytes>,
    ) -> Result<Option<Bytes>, CommandError> {
        self.set_with_options(key, value, SetOptions::default()).await
    }

    /// `SET key value [options]`. Returns `Some("OK")`, `None` when NX/XX
    /// prevented the write, or the previous value when GET was requested.
    pub async fn set_with_options(
        &self,
        key: impl Into<String>,
        value: impl Into<Bytes>,
        options: SetOptions,
    ) -> Result<Option<Bytes>, CommandError> {
        let arguments = SetArguments {
            key: key.into(),
            value: value.into(),
            options,
        };

        commands::set(self.store(), arguments).await
    }

    pub async fn set_nx(
        &self,
        key: impl Into<String>,
        value: impl Into<Bytes>,
    ) -> Result<bool, CommandError> {
        let arguments = SetnxArguments {
            key: key.into(),
            value: value.into(),
        };

        Ok(commands::setnx(self.store(), arguments).await? == 1)
    }

    pub async fn mget<I, S>(&self, keys: I) -> Result<Vec<Option<Bytes>>, CommandError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let arguments = MgetArguments::parse(strings(keys))?;
        commands::mget(self.store(), arguments).await
    }

    pub async fn incr(&self, key: impl Into<String>) -> Result<i64, CommandError> {
        commands::incr(self.store(), IncrArguments { key: key.into() }).await
    }

    pub async fn decr(&self, key: impl Into<String>) -> Result<i64, CommandError> {
        commands::decr(self.store(), IncrArguments { key: key.into() }).await
    }

    pub async fn del<I, S>(&self, keys: I) -> Result<i64, CommandError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let arguments = DelArguments::parse(strings(keys))?;
        commands::del(self.store(), arguments).await
    }

    pub async fn exists<I, S>(&self, keys: I) -> Result<i64, CommandError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let arguments = ExistsArguments::parse(strings(keys))?;
        commands::exists(self.store(), arguments).await
    }

    async fn expire_with(
        &self,
        key: String,
        time: i64,
        unit: ExpireUnit,
        absolute: bool,
        mode: ExpiryMode,
    ) -> Result<bool, CommandError> {
        let arguments = ExpireArguments {
            key,
            time,
            unit,
            absolute,
            mode,
        };

        Ok(commands::expire(self.store(), arguments).await? == 1)
    }

    pub async fn expire(
        &self,
        key: impl Into<String>,
        seconds: i64,
        mode: ExpiryMode,
    ) -> Result<bool, CommandError> {
        self.expire_with(key.into(), seconds, ExpireUnit::Seconds, false, mode)
            .await
    }

    pub async fn pexpire(
        &self,
        key: impl Into<String>,
        milliseconds: i64,
        mode: ExpiryMode,
    ) -> Result<bool, CommandError> {
        self.expire_with(key.into(), milliseconds, ExpireUnit::Milliseconds, false, mode)
            .await
    }

    pub async fn expire_at(
        &self,
        key: impl Into<String>,
        unix_seconds: i64,
        mode: ExpiryMode,
    ) -> Result<bool, CommandError> {
        self.expire_with(key.into(), unix_seconds, ExpireUnit::Seconds, true, mode)
            .await
    }

    pub async fn pexpire_at(
        &self,
        key: impl Into<String>,
        unix_milliseconds: i64,
        mode: ExpiryMode,
    ) -> Result<bool, CommandError> {
        self.expire_with(
            key.into(),
            unix_milliseconds,
            ExpireUnit::Milliseconds,
            true,
            mode,
        )
        .await
    }

    pub async fn ttl(&self, key: impl Into<String>) -> Result<i64, CommandError> {
        commands::ttl(self.store(), TtlArguments { key: key.into() }).await
    }

    pub async fn pttl(&self, key: impl Into<String>) -> Result<i64, CommandError> {
        commands::pttl(self.store(), TtlArguments { key: key.into() }).await
    }

    pub async fn keys(&self, pattern: impl Into<String>) -> Result<Vec<String>, CommandError> {
        let arguments = KeysArguments {
            pattern: pattern.into(),
        };

        commands::keys(self.store(), arguments).await
    }

    pub async fn sadd<I, S>(&self, key: impl Into<String>, members: I) -> Result<i64, CommandError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let arguments = SetMembersOperation {
            key: key.into(),
            members: strings(members),
        };

        commands::sadd(self.store(), arguments).await
    }

    pub async fn srem<I, S>(&self, key: impl Into<String>, members: I) -> Result<i64, CommandError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let arguments = SetMembersOperation {
            key: key.into(),
            members: strings(members),
        };

        commands::srem(self.store(), arguments).await
    }

    pub async fn smembers(&self, key: impl Into<String>) -> Result<Vec<String>, CommandError> {
        commands::smembers(self.store(), SmembersArguments { key: key.into() }).await
    }

    pub async fn scard(&self, key: impl Into<String>) -> Result<i64, CommandError> {
        commands::scard(self.store(), ScardArguments { key: key.into() }).await
    }

    pub async fn eval<K, A, S, T>(
        &self,
        script: impl Into<String>,
        keys: K,
        args: A,
    ) -> Result<Reply, CommandError>
    where
        K: IntoIterator<Item = S>,
        S: Into<String>,
        A: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let arguments = EvalArguments {
            script: script.into(),
            keys: strings(keys),
            args: strings(args),
        };

        self.dispatch(CommandHandler::from_parts(
            CommandName::Eval,
            arguments.to_arguments(),
        ))
        .await
    }

    /// Scripts are never cached, so this always fails with `NOSCRIPT`.
    pub async fn eval_sha<K, A, S, T>(
        &self,
        sha: impl Into<String>,
        keys: K,
        args: A,
    ) -> Result<Reply, CommandError>
    where
        K: IntoIterator<Item = S>,
        S: Into<String>,
        A: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let arguments = EvalArguments {
            script: sha.into(),
            keys: strings(keys),
            args: strings(args),
        };

        self.dispatch(CommandHandler::from_parts(
            CommandName::EvalSha,
            arguments.to_arguments(),
        ))
        .await
    }

    pub async fn flush_all(&self) -> Result<(), CommandError> {
        debug!("FLUSHALL");
        commands::flushall(self.store(), FlushallArguments).await
    }

    pub async fn flush_db(&self) -> Result<(), CommandError> {
        self.flush_all().await
    }
}

/// The `JSON.*` command group of a client.
pub struct JsonCommands<'a> {
    client: &'a Client,
}

impl JsonCommands<'_> {
    /// `JSON.GET key [path...]`.
    pub async fn get<I, S>(
        &self,
        key: impl Into<String>,
        paths: I,
    ) -> Result<Option<serde_json::Value>, CommandError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let arguments = JsonGetArguments {
            key: key.into(),
            paths: strings(paths),
        };

        commands::json::json_get(self.client.store(), arguments).await
    }

    /// `JSON.SET key path value`. Returns `Some("OK")` or `None` when
    /// nothing was written.
    pub async fn set(
        &self,
        key: impl Into<String>,
        path: impl Into<String>,
        value: serde_json::Value,
    ) -> Result<Option<String>, CommandError> {
        let arguments = JsonSetArguments {
            key: key.into(),
            path: path.into(),
            value,
            condition: None,
        };

        commands::json::json_set(self.client.store(), arguments).await
    }

    /// `JSON.SET key path value NX|XX`.
    pub async fn set_with_condition(
        &self,
        key: impl Into<String>,
        path: impl Into<String>,
        value: serde_json::Value,
        condition: commands::SetCondition,
    ) -> Result<Option<String>, CommandError> {
        let arguments = JsonSetArguments {
            key: key.into(),
            path: path.into(),
            value,
            condition: Some(condition),
        };

        commands::json::json_set(self.client.store(), arguments).await
    }
}
