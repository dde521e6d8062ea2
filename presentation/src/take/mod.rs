//! Interactive run mode

pub mod repl;

pub use repl::{ReplInput, TakeRepl};
