mod discard;
mod exec;
mod multi;

pub use multi::{Multi, MultiJson};
