mod command_error;
mod command_handler;
mod del;
mod eval;
mod exists;
mod expire;
mod flushall;
mod get;
mod incr;
pub mod json;
mod keys;
mod mget;
mod sadd_and_srem;
mod scard;
mod set;
mod setnx;
mod smembers;
pub mod transactions;
mod ttl;

pub use command_error::CommandError;
pub use command_handler::{CommandHandler, CommandName};
pub(crate) use command_handler::text_arguments;
pub use del::{del, DelArguments};
pub use eval::EvalArguments;
pub use exists::{exists, ExistsArguments};
pub use expire::{expire, ExpireArguments, ExpireUnit};
pub use flushall::{flushall, FlushallArguments};
pub use get::{get, GetArguments};
pub use incr::{decr, incr, incr_by, IncrArguments};
pub use keys::{keys, KeysArguments};
pub use mget::{mget, MgetArguments};
pub use sadd_and_srem::{sadd, srem, SetMembersOperation};
pub use scard::{scard, ScardArguments};
pub use set::{set, Expiration, SetArguments, SetCondition, SetOptions};
pub use setnx::{setnx, SetnxArguments};
pub use smembers::{smembers, SmembersArguments};
pub use ttl::{pttl, ttl, TtlArguments};
