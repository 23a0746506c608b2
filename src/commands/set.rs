use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::CommandError,
    key_value_store::{DataType, Item, KeyValueStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetCondition {
    /// Only set the key if it does not already exist.
    Nx,
    /// Only set the key if it already exists.
    Xx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// Seconds from now.
    Ex(i64),
    /// Milliseconds from now.
    Px(i64),
    /// Absolute unix time in seconds.
    ExAt(i64),
    /// Absolute unix time in milliseconds.
    PxAt(i64),
    /// Retain the expiration already attached to the key.
    KeepTtl,
}

impl Expiration {
    fn resolve(&self, now_ms: i64) -> Result<Option<i64>, CommandError> {
        let invalid = || CommandError::InvalidExpireTime("set".to_string());

        let (time, absolute_ms) = match *self {
            Expiration::KeepTtl => return Ok(None),
            Expiration::Ex(seconds) => (
                seconds,
                seconds
                    .checked_mul(1000)
                    .and_then(|ms| now_ms.checked_add(ms)),
            ),
            Expiration::Px(ms) => (ms, now_ms.checked_add(ms)),
            Expiration::ExAt(seconds) => (seconds, seconds.checked_mul(1000)),
            Expiration::PxAt(ms) => (ms, Some(ms)),
        };

        if time <= 0 {
            return Err(invalid());
        }

        absolute_ms.map(Some).ok_or_else(invalid)
    }
}

/// Options of the SET command, built fluently.
///
/// ```ignore
/// let options = SetOptions::new().nx().px(1500).get();
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    pub condition: Option<SetCondition>,
    pub expiration: Option<Expiration>,
    pub get: bool,
}

impl SetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nx(mut self) -> Self {
        self.condition = Some(SetCondition::Nx);
        self
    }

    pub fn xx(mut self) -> Self {
        self.condition = Some(SetCondition::Xx);
        self
    }

    pub fn ex(mut self, seconds: i64) -> Self {
        self.expiration = Some(Expiration::Ex(seconds));
        self
    }

    pub fn px(mut self, milliseconds: i64) -> Self {
        self.expiration = Some(Expiration::Px(milliseconds));
        self
    }

    pub fn exat(mut self, unix_seconds: i64) -> Self {
        self.expiration = Some(Expiration::ExAt(unix_seconds));
        self
    }

    pub fn pxat(mut self, unix_milliseconds: i64) -> Self {
        self.expiration = Some(Expiration::PxAt(unix_milliseconds));
        self
    }

    pub fn keep_ttl(mut self) -> Self {
        self.expiration = Some(Expiration::KeepTtl);
        self
    }

    pub fn get(mut self) -> Self {
        self.get = true;
        self
    }

    /// Renders the options as SET command arguments.
    pub fn to_arguments(&self) -> Vec<String> {
        let mut arguments = Vec::new();

        match self.condition {
            Some(SetCondition::Nx) => arguments.push("NX".to_string()),
            Some(SetCondition::Xx) => arguments.push("XX".to_string()),
            None => {}
        }

        match self.expiration {
            Some(Expiration::Ex(t)) => arguments.extend(["EX".to_string(), t.to_string()]),
            Some(Expiration::Px(t)) => arguments.extend(["PX".to_string(), t.to_string()]),
            Some(Expiration::ExAt(t)) => arguments.extend(["EXAT".to_string(), t.to_string()]),
            Some(Expiration::PxAt(t)) => arguments.extend(["PXAT".to_string(), t.to_string()]),
            Some(Expiration::KeepTtl) => arguments.push("KEEPTTL".to_string()),
            None => {}
        }

        if self.get {
            arguments.push("GET".to_string());
        }

        arguments
    }
}

/// Represents the parsed arguments for SET command
pub struct SetArguments {
    /// The key name to write
    pub key: String,
    /// The value to be stored under the given key
    pub value: Bytes,
    pub options: SetOptions,
}

impl SetArguments {
    /// Parses command arguments into a SetArguments structure.
    ///
    /// # Arguments
    ///
    /// * `arguments` - `[key, value, options...]` where options are any of
    ///   `NX | XX`, `EX s | PX ms | EXAT ts | PXAT ts-ms | KEEPTTL` and `GET`,
    ///   case-insensitive and in any order
    ///
    /// # Returns
    ///
    /// * `Ok(SetArguments)` - Successfully parsed arguments
    /// * `Err(CommandError::WrongArity)` - If fewer than 2 arguments are given
    /// * `Err(CommandError::SyntaxError)` - On unknown options, NX together with
    ///   XX, more than one expiration option, or KEEPTTL together with one
    /// * `Err(CommandError::NotAnInteger)` - If an expiration is not an integer
    /// * `Err(CommandError::InvalidExpireTime)` - If an expiration is not positive
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::WrongArity("set".to_string()));
        }

        let mut options = SetOptions::default();
        let mut rest = arguments[2..].iter();

        while let Some(option) = rest.next() {
            let option = String::from_utf8_lossy(option).to_uppercase();

            match option.as_str() {
                "NX" | "XX" => {
                    if options.condition.is_some() {
                        return Err(CommandError::SyntaxError);
                    }
                    options.condition = Some(if option == "NX" {
                        SetCondition::Nx
                    } else {
                        SetCondition::Xx
                    });
                }
                "GET" => options.get = true,
                "KEEPTTL" => {
                    if options.expiration.is_some() {
                        return Err(CommandError::SyntaxError);
                    }
                    options.expiration = Some(Expiration::KeepTtl);
                }
                "EX" | "PX" | "EXAT" | "PXAT" => {
                    if options.expiration.is_some() {
                        return Err(CommandError::SyntaxError);
                    }

                    let time = rest
                        .next()
                        .ok_or(CommandError::SyntaxError)
                        .and_then(parse_integer)?;

                    if time <= 0 {
                        return Err(CommandError::InvalidExpireTime("set".to_string()));
                    }

                    options.expiration = Some(match option.as_str() {
                        "EX" => Expiration::Ex(time),
                        "PX" => Expiration::Px(time),
                        "EXAT" => Expiration::ExAt(time),
                        _ => Expiration::PxAt(time),
                    });
                }
                _ => return Err(CommandError::SyntaxError),
            }
        }

        Ok(Self {
            key: String::from_utf8_lossy(&arguments[0]).into_owned(),
            value: arguments[1].clone(),
            options,
        })
    }
}

fn parse_integer(argument: &Bytes) -> Result<i64, CommandError> {
    std::str::from_utf8(argument)
        .ok()
        .and_then(|text| text.parse::<i64>().ok())
        .ok_or(CommandError::NotAnInteger)
}

/// Handles the Redis SET command.
///
/// # Returns
///
/// * `Ok(Some("OK"))` - The value was written and GET was not requested
/// * `Ok(None)` - NX/XX prevented the write and GET was not requested
/// * `Ok(previous)` - With GET: the previous string value (or `None`),
///   whether or not the write happened
/// * `Err(CommandError::WrongType)` - With GET, if the key holds a non-string
pub async fn set(
    store: Arc<Mutex<KeyValueStore>>,
    arguments: SetArguments,
) -> Result<Option<Bytes>, CommandError> {
    let SetArguments {
        key,
        value,
        options,
    } = arguments;

    let mut store_guard = store.lock().await;
    let now = store_guard.now_ms();

    let existing = store_guard.get(&key).cloned();

    let previous = match existing.as_ref().map(|item| &item.data) {
        Some(DataType::String(s)) => Some(s.clone()),
        Some(_) if options.get => return Err(CommandError::WrongType),
        _ => None,
    };

    let allowed = match options.condition {
        Some(SetCondition::Nx) => existing.is_none(),
        Some(SetCondition::Xx) => existing.is_some(),
        None => true,
    };

    if !allowed {
        return Ok(if options.get { previous } else { None });
    }

    let expiration = match options.expiration {
        Some(Expiration::KeepTtl) => existing.and_then(|item| item.expiration),
        Some(expiration) => expiration.resolve(now)?,
        None => None,
    };

    store_guard.set(
        key,
        Item::with_expiration(DataType::String(value), expiration),
    );

    if options.get {
        Ok(previous)
    } else {
        Ok(Some(Bytes::from_static(b"OK")))
    }
}
