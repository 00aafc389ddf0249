//! Command-line interface module.

mod args;
pub mod check;
pub mod render;
pub mod resolve;

pub use args::{Cli, Commands};
