//! The Lua scripting bridge behind EVAL.

mod bridge;
mod lua;
mod marshal;

pub use bridge::ScriptingBridge;
pub use marshal::{guest_to_host, host_to_guest, GuestKey, GuestValue, HostValue};
