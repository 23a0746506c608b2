use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::trace;

use crate::{
    commands::CommandError,
    key_value_store::{ExpiryMode, KeyValueStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpireUnit {
    Seconds,
    Milliseconds,
}

/// Parsed arguments shared by EXPIRE, PEXPIRE, EXPIREAT and PEXPIREAT.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpireArguments {
    pub key: String,
    /// Relative TTL or absolute unix timestamp, in `unit`.
    pub time: i64,
    pub unit: ExpireUnit,
    pub absolute: bool,
    pub mode: ExpiryMode,
}

impl ExpireArguments {
    pub fn parse(
        command: &str,
        arguments: Vec<String>,
        unit: ExpireUnit,
        absolute: bool,
    ) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::WrongArity(command.to_lowercase()));
        }

        let time = arguments[1]
            .parse::<i64>()
            .map_err(|_| CommandError::NotAnInteger)?;

        let mode = match arguments.len() {
            2 => ExpiryMode::Always,
            3 => ExpiryMode::parse(&arguments[2])?,
            _ => return Err(CommandError::SyntaxError),
        };

        Ok(Self {
            key: arguments[0].clone(),
            time,
            unit,
            absolute,
            mode,
        })
    }

    /// Resolves the requested time to an absolute unix timestamp in
    /// milliseconds.
    fn deadline(&self, now_ms: i64) -> Result<i64, CommandError> {
        let overflow = || CommandError::InvalidExpireTime(self.command_name().to_string());

        let millis = match self.unit {
            ExpireUnit::Seconds => self.time.checked_mul(1000).ok_or_else(overflow)?,
            ExpireUnit::Milliseconds => self.time,
        };

        if self.absolute {
            Ok(millis)
        } else {
            now_ms.checked_add(millis).ok_or_else(overflow)
        }
    }

    fn command_name(&self) -> &'static str {
        match (self.unit, self.absolute) {
            (ExpireUnit::Seconds, false) => "expire",
            (ExpireUnit::Milliseconds, false) => "pexpire",
            (ExpireUnit::Seconds, true) => "expireat",
            (ExpireUnit::Milliseconds, true) => "pexpireat",
        }
    }
}

/// Handles every command of the EXPIRE family.
///
/// Returns 1 when the expiration was applied (including a deadline already in
/// the past, which deletes the key) and 0 when the key is missing or the
/// mode condition rejected the change.
pub async fn expire(
    store: Arc<Mutex<KeyValueStore>>,
    arguments: ExpireArguments,
) -> Result<i64, CommandError> {
    let mut store_guard = store.lock().await;
    let deadline = arguments.deadline(store_guard.now_ms())?;

    trace!(key = arguments.key, deadline, mode = ?arguments.mode, "setting expiration");

    Ok(store_guard.set_expiry(&arguments.key, deadline, arguments.mode) as i64)
}
