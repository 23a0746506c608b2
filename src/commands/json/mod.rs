mod json_get;
mod json_set;
pub mod path;

pub use json_get::{json_get, JsonGetArguments};
pub use json_set::{json_set, JsonSetArguments};
