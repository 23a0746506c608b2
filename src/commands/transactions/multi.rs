use bytes::Bytes;

use crate::{
    client::Client,
    commands::{CommandError, CommandHandler, CommandName, SetCondition, SetOptions},
    key_value_store::ExpiryMode,
};

/// Records commands for a later [`Multi::exec`].
///
/// Every recording method appends one `(command, arguments)` entry and returns
/// the recorder, so calls chain:
///
/// ```ignore
/// let replies = client.multi().incr("n").incr("n").get("n").exec().await?;
/// ```
#[derive(Debug)]
pub struct Multi {
    pub(super) client: Client,
    pub(super) queue: Vec<CommandHandler>,
}

fn strings<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

impl Multi {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            queue: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn record(&mut self, name: CommandName, arguments: Vec<String>) -> &mut Self {
        self.record_values(name, arguments.into_iter().map(Bytes::from).collect())
    }

    fn record_values(&mut self, name: CommandName, arguments: Vec<Bytes>) -> &mut Self {
        self.queue.push(CommandHandler::from_parts(name, arguments));
        self
    }

    /// Records any registry command by its name.
    pub fn command<I, A>(&mut self, name: &str, arguments: I) -> Result<&mut Self, CommandError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Bytes>,
    {
        let command = CommandHandler::new(name, arguments)?;
        self.queue.push(command);
        Ok(self)
    }

    pub fn get(&mut self, key: impl Into<String>) -> &mut Self {
        self.record(CommandName::Get, vec![key.into()])
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Bytes>) -> &mut Self {
        self.set_with_options(key, value, SetOptions::default())
    }

    pub fn set_with_options(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Bytes>,
        options: SetOptions,
    ) -> &mut Self {
        let key: String = key.into();
        let mut arguments = vec![Bytes::from(key), value.into()];
        arguments.extend(options.to_arguments().into_iter().map(Bytes::from));
        self.record_values(CommandName::Set, arguments)
    }

    pub fn set_nx(&mut self, key: impl Into<String>, value: impl Into<Bytes>) -> &mut Self {
        let key: String = key.into();
        self.record_values(CommandName::SetNx, vec![Bytes::from(key), value.into()])
    }

    pub fn mget<I, S>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record(CommandName::MGet, strings(keys))
    }

    pub fn incr(&mut self, key: impl Into<String>) -> &mut Self {
        self.record(CommandName::Incr, vec![key.into()])
    }

    pub fn decr(&mut self, key: impl Into<String>) -> &mut Self {
        self.record(CommandName::Decr, vec![key.into()])
    }

    pub fn del<I, S>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record(CommandName::Del, strings(keys))
    }

    pub fn exists<I, S>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record(CommandName::Exists, strings(keys))
    }

    fn record_expire(
        &mut self,
        name: CommandName,
        key: String,
        time: i64,
        mode: ExpiryMode,
    ) -> &mut Self {
        let mut arguments = vec![key, time.to_string()];
        if let Some(mode) = mode.as_argument() {
            arguments.push(mode.to_string());
        }
        self.record(name, arguments)
    }

    pub fn expire(&mut self, key: impl Into<String>, seconds: i64, mode: ExpiryMode) -> &mut Self {
        self.record_expire(CommandName::Expire, key.into(), seconds, mode)
    }

    pub fn pexpire(
        &mut self,
        key: impl Into<String>,
        milliseconds: i64,
        mode: ExpiryMode,
    ) -> &mut Self {
        self.record_expire(CommandName::PExpire, key.into(), milliseconds, mode)
    }

    pub fn expire_at(
        &mut self,
        key: impl Into<String>,
        unix_seconds: i64,
        mode: ExpiryMode,
    ) -> &mut Self {
        self.record_expire(CommandName::ExpireAt, key.into(), unix_seconds, mode)
    }

    pub fn pexpire_at(
        &mut self,
        key: impl Into<String>,
        unix_milliseconds: i64,
        mode: ExpiryMode,
    ) -> &mut Self {
        self.record_expire(CommandName::PExpireAt, key.into(), unix_milliseconds, mode)
    }

    pub fn ttl(&mut self, key: impl Into<String>) -> &mut Self {
        self.record(CommandName::Ttl, vec![key.into()])
    }

    pub fn pttl(&mut self, key: impl Into<String>) -> &mut Self {
        self.record(CommandName::PTtl, vec![key.into()])
    }

    pub fn keys(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.record(CommandName::Keys, vec![pattern.into()])
    }

    pub fn sadd<I, S>(&mut self, key: impl Into<String>, members: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut arguments = vec![key.into()];
        arguments.extend(strings(members));
        self.record(CommandName::SAdd, arguments)
    }

    pub fn srem<I, S>(&mut self, key: impl Into<String>, members: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut arguments = vec![key.into()];
        arguments.extend(strings(members));
        self.record(CommandName::SRem, arguments)
    }

    pub fn smembers(&mut self, key: impl Into<String>) -> &mut Self {
        self.record(CommandName::SMembers, vec![key.into()])
    }

    pub fn scard(&mut self, key: impl Into<String>) -> &mut Self {
        self.record(CommandName::SCard, vec![key.into()])
    }

    pub fn eval<K, A, S, T>(&mut self, script: impl Into<String>, keys: K, args: A) -> &mut Self
    where
        K: IntoIterator<Item = S>,
        S: Into<String>,
        A: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let keys = strings(keys);
        let mut arguments = vec![script.into(), keys.len().to_string()];
        arguments.extend(keys);
        arguments.extend(strings(args));
        self.record(CommandName::Eval, arguments)
    }

    pub fn flush_all(&mut self) -> &mut Self {
        self.record(CommandName::FlushAll, Vec::new())
    }

    pub fn flush_db(&mut self) -> &mut Self {
        self.record(CommandName::FlushDb, Vec::new())
    }

    pub fn json(&mut self) -> MultiJson<'_> {
        MultiJson { multi: self }
    }
}

/// The `JSON.*` group of a [`Multi`]; each call records onto the parent
/// recorder and hands it back.
pub struct MultiJson<'a> {
    multi: &'a mut Multi,
}

impl<'a> MultiJson<'a> {
    pub fn get<I, S>(self, key: impl Into<String>, paths: I) -> &'a mut Multi
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut arguments = vec![key.into()];
        arguments.extend(strings(paths));
        self.multi.record(CommandName::JsonGet, arguments)
    }

    pub fn set(
        self,
        key: impl Into<String>,
        path: impl Into<String>,
        value: &serde_json::Value,
    ) -> &'a mut Multi {
        self.multi.record(
            CommandName::JsonSet,
            vec![key.into(), path.into(), value.to_string()],
        )
    }

    pub fn set_with_condition(
        self,
        key: impl Into<String>,
        path: impl Into<String>,
        value: &serde_json::Value,
        condition: SetCondition,
    ) -> &'a mut Multi {
        let condition = match condition {
            SetCondition::Nx => "NX",
            SetCondition::Xx => "XX",
        };

        self.multi.record(
            CommandName::JsonSet,
            vec![key.into(), path.into(), value.to_string(), condition.to_string()],
        )
    }
}
