//! Command-line interface module.

mod args;
pub mod decode;
pub mod preview;
mod report;

pub use args::{Cli, Commands};
