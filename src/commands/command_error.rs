use thiserror::Error;

/// Failure of a single command invocation.
///
/// Messages follow the text a real Redis server replies with, so a script
/// catching one through `redis.pcall` sees the familiar `err` string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,
    #[error("ERR value is not an integer or out of range")]
    NotAnInteger,
    #[error("ERR increment or decrement would overflow")]
    IncrementOverflow,
    #[error("ERR syntax error")]
    SyntaxError,
    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongArity(String),
    #[error("ERR invalid expire time in '{0}' command")]
    InvalidExpireTime(String),
    #[error("ERR new objects must be created at the root")]
    RootMustExist,
    #[error("ERR invalid JSON: {0}")]
    InvalidJson(String),
    #[error("ERR invalid JSONPath: {0}")]
    InvalidJsonPath(String),
    #[error("ERR invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("NOSCRIPT No matching script. Please use EVAL.")]
    NoScript,
    #[error("ERR unknown command '{0}'")]
    UnknownCommand(String),
    #[error("ERR This Redis command is not allowed from script")]
    NotAllowedFromScript,
    #[error("ERR Number of keys can't be greater than number of args")]
    InvalidNumKeys,
    #[error("ERR Number of keys can't be negative")]
    NegativeNumKeys,
    #[error("ERR Lua redis lib command arguments must be strings or integers")]
    InvalidScriptArgument,
    #[error("ERR Error running script: {0}")]
    ScriptError(String),
    /// An error reply produced by a script, surfaced verbatim.
    #[error("{0}")]
    ErrorReply(String),
    #[error("ERR scripting is disabled for this client")]
    ScriptingDisabled,
}
